//! `work-items` command: work items of one iteration

use colored::Colorize;

use iterplan_core::planner::WorkItem;
use iterplan_core::queries::and_query;

use crate::planner::{self, PlannerConfig};
use crate::prelude::println;
use crate::prelude::*;
use crate::render::{self, Output};

/// Options for the work-items command
#[derive(Debug, clap::Args, Clone)]
pub struct Options {
    /// Iteration (name or id) to query
    pub iteration: String,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub output: Output,
}

const HEADERS: [&str; 4] = ["Name", "State", "SPs", "Description"];

/// Handle the work-items command
pub async fn run(options: Options, global: crate::Global) -> Result<()> {
    let config =
        PlannerConfig::from_env().with_overrides(global.api_url.clone(), global.page_limit);

    if global.verbose {
        println!("Planner API base: {}", config.base_url);
        println!();
    }

    let query = and_query(&options.iteration, &global.include_item_types);
    let work_items = planner::search_data(&config, &query, &global.space).await?;

    match options.output {
        Output::Table => print_table(&work_items),
        Output::Tsv => println!("{}", render::tsv(&headers(), &rows(&work_items))),
        Output::Json => println!("{}", serde_json::to_string_pretty(&work_items)?),
        Output::Html => println!(
            "{}",
            render::html("Work items", &headers(), &rows(&work_items))?
        ),
    }

    Ok(())
}

fn headers() -> Vec<String> {
    HEADERS.iter().map(|header| header.to_string()).collect()
}

fn rows(work_items: &[WorkItem]) -> Vec<Vec<String>> {
    work_items
        .iter()
        .map(|item| {
            vec![
                item.title.clone().unwrap_or_default(),
                item.state.clone().unwrap_or_default(),
                render::points(item.story_points),
                flatten_text(item.description.as_deref().unwrap_or_default()),
            ]
        })
        .collect()
}

fn print_table(work_items: &[WorkItem]) {
    if work_items.is_empty() {
        println!("No work items found.");
        return;
    }

    let mut table = new_table();
    table.add_row(prettytable::Row::new(
        HEADERS
            .iter()
            .map(|header| prettytable::Cell::new(&header.bold().cyan().to_string()))
            .collect(),
    ));

    for item in work_items {
        table.add_row(prettytable::row![
            item.title.as_deref().unwrap_or(""),
            item.state.as_deref().unwrap_or(""),
            render::points(item.story_points),
            truncate_text(&flatten_text(item.description.as_deref().unwrap_or_default()), 60),
        ]);
    }

    table.printstd();
}

/// Collapse a multi-line description into a single line
fn flatten_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max_len).collect::<String>())
    }
}

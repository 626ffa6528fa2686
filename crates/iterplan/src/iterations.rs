//! `iterations` command: per-iteration statistics over a space

use colored::Colorize;
use serde_json::{Map, Value};

use iterplan_core::columns::{project, select_columns, Column};

use crate::planner::{self, PlannerConfig};
use crate::prelude::println;
use crate::prelude::*;
use crate::render::{self, Output};

/// Options for the iterations command
#[derive(Debug, clap::Args, Clone)]
pub struct Options {
    /// Ordered subset of column ids to show (default: all).
    /// Known ids: id, pid, name, total, wis, woSPs, woACs, spCom, spTot
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub output: Output,
}

/// Handle the iterations command
pub async fn run(options: Options, global: crate::Global) -> Result<()> {
    let config =
        PlannerConfig::from_env().with_overrides(global.api_url.clone(), global.page_limit);

    if global.verbose {
        println!("Planner API base: {}", config.base_url);
        println!();
    }

    let columns = select_columns(&options.columns)?;

    let mut stats =
        planner::iterations_with_details_data(&config, &global.space, &global.include_item_types)
            .await?;

    // sort iterations by name before rendering
    stats.sort_by(|a, b| a.name.cmp(&b.name));

    let records: Vec<Map<String, Value>> =
        stats.iter().map(|stats| project(stats, &columns)).collect();

    match options.output {
        Output::Table => print_table(&columns, &records),
        Output::Tsv => println!("{}", render::tsv(&titles(&columns), &rows(&columns, &records))),
        Output::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        Output::Html => println!(
            "{}",
            render::html("Iterations", &titles(&columns), &rows(&columns, &records))?
        ),
    }

    Ok(())
}

fn titles(columns: &[Column]) -> Vec<String> {
    columns.iter().map(|column| column.title().to_string()).collect()
}

fn rows(columns: &[Column], records: &[Map<String, Value>]) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| render::cell(record.get(column.id())))
                .collect()
        })
        .collect()
}

fn print_table(columns: &[Column], records: &[Map<String, Value>]) {
    if records.is_empty() {
        println!("No iterations found.");
        return;
    }

    let mut table = new_table();
    table.add_row(prettytable::Row::new(
        columns
            .iter()
            .map(|column| prettytable::Cell::new(&column.title().bold().cyan().to_string()))
            .collect(),
    ));

    for record in records {
        table.add_row(prettytable::Row::new(
            columns
                .iter()
                .map(|column| prettytable::Cell::new(&render::cell(record.get(column.id()))))
                .collect(),
        ));
    }

    table.printstd();
}

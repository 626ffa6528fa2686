//! Data functions against the planner backend
//!
//! Every function here is a stateless request/response cycle: fetch JSON:API
//! payloads over HTTP, flatten them with the core transformations, and hand
//! back domain models. The statistics aggregation in
//! [`iterations_with_details_data`] fans out one search per iteration and
//! fails as a whole on the first backend error.

use futures::future::join_all;
use serde::de::DeserializeOwned;

use iterplan_core::columns::{reduce_iteration, IterationStats};
use iterplan_core::planner::{
    transform_iteration_list, transform_search_response, transform_work_item_type_list, Iteration,
    IterationListResponse, SearchResponse, SpaceResponse, WorkItem, WorkItemType,
    WorkItemTypeListResponse,
};
use iterplan_core::queries::{and_query, resolve_filter, Filter};

use crate::prelude::*;

/// Space the CLI points at when none is given ("OpenShift_io")
pub const DEFAULT_SPACE: &str = "e8864cfe-f65a-4351-85a4-3a585d801b45";

/// Planner backend configuration
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub base_url: String,
    pub page_limit: usize,
}

impl PlannerConfig {
    /// Default public planner API base URL
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openshift.io/api";

    /// Default `page[limit]` for search requests
    pub const DEFAULT_PAGE_LIMIT: usize = 200;

    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("PLANNER_API_URL")
                .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string()),
            page_limit: Self::DEFAULT_PAGE_LIMIT,
        }
    }

    /// Apply CLI overrides to the configuration
    pub fn with_overrides(mut self, base_url: Option<String>, page_limit: Option<usize>) -> Self {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        if let Some(limit) = page_limit {
            self.page_limit = limit;
        }
        self
    }
}

/// Create the HTTP client used for all backend requests
fn create_client() -> Result<reqwest::Client> {
    use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
}

/// GET a JSON payload, mapping transport, status, and parse failures into a
/// single backend error shape.
async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
    what: &str,
) -> Result<T> {
    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| eyre!("Failed to fetch {what}: {e}"))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(eyre!("Failed to fetch {what} [{}]: {}", status, body));
    }

    response
        .json()
        .await
        .map_err(|e| eyre!("Failed to parse {what} response: {e}"))
}

/// Finds all iterations in a particular space
pub async fn iterations_data(config: &PlannerConfig, space: &str) -> Result<Vec<Iteration>> {
    let client = create_client()?;
    let base_url = config.base_url.trim_end_matches('/');

    let response: IterationListResponse = get_json(
        &client,
        &format!("{base_url}/spaces/{space}/iterations"),
        &[],
        "iterations",
    )
    .await?;

    Ok(transform_iteration_list(response))
}

/// Finds all work item types in a particular space.
///
/// The type listing URL is not fixed; it is taken from the space descriptor's
/// links, as the backend publishes it.
pub async fn work_item_types_data(
    config: &PlannerConfig,
    space: &str,
) -> Result<Vec<WorkItemType>> {
    let client = create_client()?;
    let base_url = config.base_url.trim_end_matches('/');

    let space_details: SpaceResponse = get_json(
        &client,
        &format!("{base_url}/spaces/{space}"),
        &[],
        "space details",
    )
    .await?;

    let response: WorkItemTypeListResponse = get_json(
        &client,
        &space_details.data.links.workitemtypes,
        &[],
        "work item types",
    )
    .await?;

    Ok(transform_work_item_type_list(response))
}

/// Replace user friendly iteration and work item type names in a filter with
/// their backend identifiers.
///
/// Both lookup tables are fetched fresh on every call; nothing is cached
/// across searches.
pub async fn normalize_query(
    config: &PlannerConfig,
    filter: &Filter,
    space: &str,
) -> Result<Filter> {
    let item_types = work_item_types_data(config, space).await?;
    let iterations = iterations_data(config, space).await?;

    Ok(resolve_filter(filter, &iterations, &item_types))
}

/// Finds all work items matching a filter. Normalizes the filter first.
///
/// Only the first page (up to the configured `page[limit]`) is returned.
pub async fn search_data(
    config: &PlannerConfig,
    filter: &Filter,
    space: &str,
) -> Result<Vec<WorkItem>> {
    let resolved = normalize_query(config, filter, space).await?;

    let client = create_client()?;
    let base_url = config.base_url.trim_end_matches('/');
    let limit = config.page_limit.to_string();
    let expression = resolved.to_expression();

    let response: SearchResponse = get_json(
        &client,
        &format!("{base_url}/search"),
        &[
            ("page[limit]", limit.as_str()),
            ("filter[expression]", expression.as_str()),
        ],
        "work items",
    )
    .await?;

    Ok(transform_search_response(response))
}

/// Provides detailed statistics over iterations.
///
/// Fetches the iteration list, then runs one search-and-reduce per iteration
/// concurrently. All tasks are awaited to completion; the first failure fails
/// the whole operation and no partial result is returned, since a caller
/// cannot tell "zero work items" apart from a silently failed fetch.
pub async fn iterations_with_details_data(
    config: &PlannerConfig,
    space: &str,
    include_types: &[String],
) -> Result<Vec<IterationStats>> {
    let iterations = iterations_data(config, space).await?;

    let details = iterations.iter().map(|iteration| {
        let query = and_query(&iteration.id, include_types);
        async move {
            let work_items = search_data(config, &query, space).await?;
            Ok(reduce_iteration(iteration, Some(&work_items)))
        }
    });

    collect_settled(join_all(details).await)
}

/// Collect per-iteration results once every task has settled, surfacing the
/// first error if any task failed.
fn collect_settled<T>(results: Vec<Result<T>>) -> Result<Vec<T>> {
    results.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_settled_all_ok() {
        let results: Vec<Result<u32>> = vec![Ok(1), Ok(2), Ok(3)];
        assert_eq!(collect_settled(results).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_collect_settled_first_error_wins_and_drops_results() {
        let results: Vec<Result<u32>> = vec![
            Ok(1),
            Err(eyre!("search for iteration B failed")),
            Err(eyre!("later failure")),
        ];

        let error = collect_settled(results).unwrap_err();

        assert!(error.to_string().contains("iteration B"));
    }

    #[tokio::test]
    async fn test_join_all_settles_every_task_before_failing() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        // All sibling tasks run to completion even when one fails; only then
        // is the first error reported.
        let settled = AtomicUsize::new(0);

        let tasks: Vec<_> = (0..3)
            .map(|i| {
                let settled = &settled;
                async move {
                    settled.fetch_add(1, Ordering::SeqCst);
                    if i == 1 {
                        Err(eyre!("transport error"))
                    } else {
                        Ok(i)
                    }
                }
            })
            .collect();

        let outcome = collect_settled(join_all(tasks).await);

        assert_eq!(settled.load(Ordering::SeqCst), 3);
        assert!(outcome.is_err());
    }

    #[test]
    fn test_config_overrides() {
        let config = PlannerConfig {
            base_url: PlannerConfig::DEFAULT_BASE_URL.to_string(),
            page_limit: PlannerConfig::DEFAULT_PAGE_LIMIT,
        }
        .with_overrides(Some("http://localhost:8080/api".to_string()), Some(50));

        assert_eq!(config.base_url, "http://localhost:8080/api");
        assert_eq!(config.page_limit, 50);
    }

    #[test]
    fn test_config_defaults_kept_without_overrides() {
        let config = PlannerConfig {
            base_url: PlannerConfig::DEFAULT_BASE_URL.to_string(),
            page_limit: PlannerConfig::DEFAULT_PAGE_LIMIT,
        }
        .with_overrides(None, None);

        assert_eq!(config.base_url, PlannerConfig::DEFAULT_BASE_URL);
        assert_eq!(config.page_limit, PlannerConfig::DEFAULT_PAGE_LIMIT);
    }
}

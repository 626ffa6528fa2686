//! Column transformer registry
//!
//! Each column is a named statistic over one iteration and (for some columns)
//! its fetched work items. The registry is a fixed, ordered table of column
//! kinds; running every reducer over the same accumulator yields one complete
//! statistics record per iteration. Registry order is display order.

use serde_json::{Map, Value};

use crate::planner::{Iteration, WorkItem};

/// Work item state that counts towards completed story points
pub const STATE_CLOSED: &str = "Closed";

/// Error type for column selection
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ColumnError {
    #[error("Unknown column: {0}")]
    Unknown(String),
}

/// A statistic derived from an iteration and, for some kinds, its work items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Iteration identifier
    Id,
    /// Parent iteration identifier
    Pid,
    /// Iteration name
    Name,
    /// Backend-reported total work items
    Total,
    /// Work items returned by the filtered query
    Wis,
    /// Work items without story points
    WoSps,
    /// Work items without acceptance criteria
    WoAcs,
    /// Story points completed
    SpCom,
    /// Story points total
    SpTot,
}

/// The full registry, in display order
pub const COLUMNS: [Column; 9] = [
    Column::Id,
    Column::Pid,
    Column::Name,
    Column::Total,
    Column::Wis,
    Column::WoSps,
    Column::WoAcs,
    Column::SpCom,
    Column::SpTot,
];

/// Accumulator for one iteration's statistics record.
///
/// Every field stays `None` until its column's reducer has run, so a record
/// reduced without work items carries only the iteration-level fields.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IterationStats {
    pub id: Option<String>,
    pub pid: Option<String>,
    pub name: Option<String>,
    pub total: Option<u64>,
    pub wis: Option<u64>,
    pub wo_sps: Option<u64>,
    pub wo_acs: Option<u64>,
    pub sp_com: Option<f64>,
    pub sp_tot: Option<f64>,
}

impl Column {
    /// Stable column id, used as the field key in every output record
    pub fn id(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Pid => "pid",
            Column::Name => "name",
            Column::Total => "total",
            Column::Wis => "wis",
            Column::WoSps => "woSPs",
            Column::WoAcs => "woACs",
            Column::SpCom => "spCom",
            Column::SpTot => "spTot",
        }
    }

    /// Human-readable column title for table and TSV headers
    pub fn title(&self) -> &'static str {
        match self {
            Column::Id => "ID",
            Column::Pid => "Parent ID",
            Column::Name => "Name",
            Column::Total => "# Total WIs",
            Column::Wis => "# WIs",
            Column::WoSps => "# WIs w/o SPs",
            Column::WoAcs => "# WIs w/o ACs",
            Column::SpCom => "SPs completed",
            Column::SpTot => "SPs total",
        }
    }

    /// Longer, human-oriented description of the statistic
    pub fn description(&self) -> &'static str {
        match self {
            Column::Id => "ID of iteration",
            Column::Pid => "ID of iteration parent, if it exists",
            Column::Name => "Name of iteration",
            Column::Total => {
                "Number of total workitems in iteration (including children and all workitem types)"
            }
            Column::Wis => {
                "Number of workitems in iteration (direct items only and filtered by work item type)"
            }
            Column::WoSps => "Number of workitems in iteration without story points",
            Column::WoAcs => "Number of workitems in iteration without acceptance criteria",
            Column::SpCom => "Total story points completed in the iteration",
            Column::SpTot => "Total story points estimated in the iteration",
        }
    }

    /// Whether the reducer needs the fetched work item list
    pub fn needs_work_items(&self) -> bool {
        matches!(
            self,
            Column::Wis | Column::WoSps | Column::WoAcs | Column::SpCom | Column::SpTot
        )
    }

    /// Look up a column by its stable id
    pub fn from_id(id: &str) -> Option<Column> {
        COLUMNS.iter().copied().find(|column| column.id() == id)
    }

    /// Pure reducer: fold this column's statistic into the accumulator.
    ///
    /// Work-item-dependent columns leave the accumulator untouched when no
    /// work item list is supplied.
    pub fn reduce(
        &self,
        mut acc: IterationStats,
        iteration: &Iteration,
        work_items: Option<&[WorkItem]>,
    ) -> IterationStats {
        match (self, work_items) {
            (Column::Id, _) => acc.id = Some(iteration.id.clone()),
            (Column::Pid, _) => acc.pid = iteration.parent_id.clone(),
            (Column::Name, _) => acc.name = Some(iteration.name.clone()),
            (Column::Total, _) => acc.total = iteration.total,
            (Column::Wis, Some(items)) => acc.wis = Some(items.len() as u64),
            (Column::WoSps, Some(items)) => {
                // Presence, not truthiness: zero story points still count as
                // "has story points".
                acc.wo_sps = Some(
                    items
                        .iter()
                        .filter(|item| item.story_points.is_none())
                        .count() as u64,
                );
            }
            (Column::WoAcs, Some(items)) => {
                acc.wo_acs = Some(
                    items
                        .iter()
                        .filter(|item| !has_acceptance_criteria(item.description.as_deref()))
                        .count() as u64,
                );
            }
            (Column::SpCom, Some(items)) => {
                acc.sp_com = Some(
                    items
                        .iter()
                        .filter(|item| item.state.as_deref() == Some(STATE_CLOSED))
                        .filter_map(|item| item.story_points)
                        .sum(),
                );
            }
            (Column::SpTot, Some(items)) => {
                acc.sp_tot = Some(items.iter().filter_map(|item| item.story_points).sum());
            }
            (_, None) => {}
        }
        acc
    }
}

/// Case-insensitive substring match for acceptance criteria in a description
fn has_acceptance_criteria(description: Option<&str>) -> bool {
    description
        .map(|text| text.to_lowercase().contains("acceptance criteria"))
        .unwrap_or(false)
}

/// Run every registered column over one iteration, producing its record.
///
/// Pass `None` for `work_items` to reduce with iteration-only columns, e.g.
/// when listing iterations without searching their work items.
pub fn reduce_iteration(iteration: &Iteration, work_items: Option<&[WorkItem]>) -> IterationStats {
    COLUMNS.iter().fold(IterationStats::default(), |acc, column| {
        column.reduce(acc, iteration, work_items)
    })
}

/// Validate and order a caller-requested column subset.
///
/// An empty request selects the full registry in its own order; otherwise the
/// caller's order is preserved and an unknown id is an error.
pub fn select_columns(ids: &[String]) -> Result<Vec<Column>, ColumnError> {
    if ids.is_empty() {
        return Ok(COLUMNS.to_vec());
    }
    ids.iter()
        .map(|id| Column::from_id(id).ok_or_else(|| ColumnError::Unknown(id.clone())))
        .collect()
}

/// Project a statistics record onto the requested columns, preserving their
/// order in the output map.
pub fn project(stats: &IterationStats, columns: &[Column]) -> Map<String, Value> {
    let mut record = Map::new();
    for column in columns {
        let value = match column {
            Column::Id => opt_string(&stats.id),
            Column::Pid => opt_string(&stats.pid),
            Column::Name => opt_string(&stats.name),
            Column::Total => stats.total.map(Value::from).unwrap_or(Value::Null),
            Column::Wis => stats.wis.map(Value::from).unwrap_or(Value::Null),
            Column::WoSps => stats.wo_sps.map(Value::from).unwrap_or(Value::Null),
            Column::WoAcs => stats.wo_acs.map(Value::from).unwrap_or(Value::Null),
            Column::SpCom => stats.sp_com.map(points_value).unwrap_or(Value::Null),
            Column::SpTot => stats.sp_tot.map(points_value).unwrap_or(Value::Null),
        };
        record.insert(column.id().to_string(), value);
    }
    record
}

fn opt_string(value: &Option<String>) -> Value {
    value.clone().map(Value::from).unwrap_or(Value::Null)
}

/// Integral story point sums render as plain integers
fn points_value(points: f64) -> Value {
    if points.fract() == 0.0 {
        Value::from(points as i64)
    } else {
        Value::from(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sprint(id: &str, name: &str) -> Iteration {
        Iteration {
            id: id.to_string(),
            name: name.to_string(),
            parent_id: None,
            total: Some(10),
        }
    }

    fn work_item(story_points: Option<f64>, state: &str, description: Option<&str>) -> WorkItem {
        WorkItem {
            id: "wi".to_string(),
            title: None,
            state: Some(state.to_string()),
            story_points,
            description: description.map(str::to_string),
        }
    }

    #[test]
    fn test_reduce_sprint_fixture() {
        // Arrange: the Sprint 1 scenario - three work items, one closed with
        // acceptance criteria, one open without, one with no estimate at all
        let iteration = sprint("A", "Sprint 1");
        let items = vec![
            work_item(Some(3.0), "Closed", Some("Acceptance Criteria met")),
            work_item(Some(2.0), "Open", Some("")),
            work_item(None, "Open", None),
        ];

        // Act
        let stats = reduce_iteration(&iteration, Some(&items));

        // Assert
        assert_eq!(stats.wis, Some(3));
        assert_eq!(stats.wo_sps, Some(1));
        assert_eq!(stats.wo_acs, Some(2));
        assert_eq!(stats.sp_com, Some(3.0));
        assert_eq!(stats.sp_tot, Some(5.0));
        assert_eq!(stats.id.as_deref(), Some("A"));
        assert_eq!(stats.name.as_deref(), Some("Sprint 1"));
        assert_eq!(stats.total, Some(10));
    }

    #[test]
    fn test_zero_story_points_count_as_present() {
        // Presence-based counting: 0 points is still an estimate
        let iteration = sprint("A", "Sprint 1");
        let items = vec![
            work_item(Some(0.0), "Closed", None),
            work_item(None, "Open", None),
        ];

        let stats = reduce_iteration(&iteration, Some(&items));

        assert_eq!(stats.wo_sps, Some(1));
        assert_eq!(stats.sp_tot, Some(0.0));
        assert_eq!(stats.sp_com, Some(0.0));
    }

    #[test]
    fn test_wo_sps_partitions_the_work_item_list() {
        let iteration = sprint("A", "Sprint 1");
        let items = vec![
            work_item(Some(1.0), "Open", None),
            work_item(None, "Open", None),
            work_item(Some(2.0), "Closed", None),
            work_item(None, "Closed", None),
        ];

        let stats = reduce_iteration(&iteration, Some(&items));

        let with_sps = items.iter().filter(|i| i.story_points.is_some()).count() as u64;
        assert_eq!(stats.wis, Some(stats.wo_sps.unwrap() + with_sps));
    }

    #[test]
    fn test_sp_total_is_at_least_sp_completed() {
        let iteration = sprint("A", "Sprint 1");
        let items = vec![
            work_item(Some(5.0), "Closed", None),
            work_item(Some(8.0), "In Progress", None),
            work_item(Some(1.0), "Closed", None),
        ];

        let stats = reduce_iteration(&iteration, Some(&items));

        assert_eq!(stats.sp_com, Some(6.0));
        assert_eq!(stats.sp_tot, Some(14.0));
        assert!(stats.sp_tot >= stats.sp_com);
    }

    #[test]
    fn test_acceptance_criteria_match_is_case_insensitive() {
        let iteration = sprint("A", "Sprint 1");
        let items = vec![
            work_item(None, "Open", Some("Acceptance Criteria: do the thing")),
            work_item(None, "Open", Some("ACCEPTANCE CRITERIA")),
            work_item(None, "Open", Some("acceptance criteria in lowercase")),
            work_item(None, "Open", Some("no criteria here")),
        ];

        let stats = reduce_iteration(&iteration, Some(&items));

        assert_eq!(stats.wo_acs, Some(1));
    }

    #[test]
    fn test_reduce_without_work_items_fills_iteration_columns_only() {
        let iteration = Iteration {
            id: "A".to_string(),
            name: "Sprint 1".to_string(),
            parent_id: Some("root".to_string()),
            total: Some(7),
        };

        let stats = reduce_iteration(&iteration, None);

        assert_eq!(stats.id.as_deref(), Some("A"));
        assert_eq!(stats.pid.as_deref(), Some("root"));
        assert_eq!(stats.total, Some(7));
        assert_eq!(stats.wis, None);
        assert_eq!(stats.sp_tot, None);
    }

    #[test]
    fn test_registry_order_and_stable_ids() {
        let ids: Vec<&str> = COLUMNS.iter().map(Column::id).collect();
        assert_eq!(
            ids,
            vec!["id", "pid", "name", "total", "wis", "woSPs", "woACs", "spCom", "spTot"]
        );
    }

    #[test]
    fn test_select_columns_defaults_to_full_registry() {
        let columns = select_columns(&[]).unwrap();
        assert_eq!(columns, COLUMNS.to_vec());
    }

    #[test]
    fn test_select_columns_preserves_requested_order() {
        let requested = vec!["name".to_string(), "spTot".to_string()];
        let columns = select_columns(&requested).unwrap();
        assert_eq!(columns, vec![Column::Name, Column::SpTot]);
    }

    #[test]
    fn test_select_columns_rejects_unknown_id() {
        let requested = vec!["velocity".to_string()];
        assert_eq!(
            select_columns(&requested),
            Err(ColumnError::Unknown("velocity".to_string()))
        );
    }

    #[test]
    fn test_project_subset_in_requested_order() {
        let iteration = sprint("A", "Sprint 1");
        let items = vec![work_item(Some(2.0), "Closed", None)];
        let stats = reduce_iteration(&iteration, Some(&items));
        let columns = select_columns(&["name".to_string(), "spTot".to_string()]).unwrap();

        let record = project(&stats, &columns);

        let fields: Vec<&String> = record.keys().collect();
        assert_eq!(fields, vec!["name", "spTot"]);
        assert_eq!(record["name"], json!("Sprint 1"));
        assert_eq!(record["spTot"], json!(2));
    }

    #[test]
    fn test_project_missing_parent_is_null() {
        let stats = reduce_iteration(&sprint("A", "Sprint 1"), Some(&[]));
        let record = project(&stats, &COLUMNS);
        assert_eq!(record["pid"], Value::Null);
        assert_eq!(record["wis"], json!(0));
    }

    #[test]
    fn test_points_value_keeps_fractional_sums() {
        assert_eq!(points_value(2.5), json!(2.5));
        assert_eq!(points_value(3.0), json!(3));
    }
}

//! State-count aggregation: turns sparse per-state "todo" counts into the
//! dense pipeline report shown on the progress page.
//!
//! Each real state's `done` is the number of requests sitting in the later
//! working states. DONE reports its own count as `done` and zero `todo`.
//! TOTAL sums the `todo` of the four working states and mirrors DONE's count
//! as its `done`.

use sqlx::PgPool;

use crate::db;
use crate::errors::AppError;
use crate::models::params::DateRange;
use crate::models::state::{PipelineState, RawCount, ReportRow};

/// Dense report, one row per slot of [`PipelineState::ALL`].
pub type StateReport = [ReportRow; 6];

/// Build the six-row report from raw counts.
///
/// Ids outside 1..=5 are ignored. A repeated id overwrites the earlier
/// count. Never fails, and returns all six rows even for empty input.
///
/// A working state's `done` sums the later working states only. DONE's own
/// count is excluded, unlike a loop running over every real state.
pub fn aggregate(raw: &[RawCount]) -> StateReport {
    let mut rows = PipelineState::ALL.map(ReportRow::empty);

    for count in raw {
        match PipelineState::from_id(count.state_id) {
            Some(state) => rows[state.index()].todo = count.todo,
            None => tracing::debug!(state_id = count.state_id, "Ignoring count for unknown state"),
        }
    }

    let done = PipelineState::Done.index();
    let total = PipelineState::Total.index();

    for i in 0..done {
        rows[i].done = rows[i + 1..done].iter().map(|row| row.todo).sum();
        rows[total].todo += rows[i].todo;
    }

    rows[done].done = rows[done].todo;
    rows[total].done = rows[done].todo;
    rows[done].todo = 0;

    rows
}

/// Fetch raw per-state counts for a date range.
///
/// A NULL result from the database means no requests in the range.
pub async fn fetch_raw_counts(pool: &PgPool, range: &DateRange) -> Result<Vec<RawCount>, AppError> {
    let data = db::json_call("SELECT get_state_count($1, $2)::text")
        .bind(range.start)
        .bind(range.end)
        .fetch_one(pool)
        .await?;

    parse_raw_counts(data.as_deref())
}

/// Fetch and aggregate the state-count report for a date range.
pub async fn state_count(pool: &PgPool, range: &DateRange) -> Result<StateReport, AppError> {
    let raw = fetch_raw_counts(pool, range).await?;
    tracing::debug!(
        start = %range.start,
        end = %range.end,
        entries = raw.len(),
        "Aggregating state counts"
    );
    Ok(aggregate(&raw))
}

fn parse_raw_counts(data: Option<&str>) -> Result<Vec<RawCount>, AppError> {
    match data {
        None => Ok(Vec::new()),
        Some(json) => serde_json::from_str(json)
            .map_err(|e| AppError::Internal(format!("Failed to decode state counts: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::state::PipelineState::*;

    fn row(report: &StateReport, state: PipelineState) -> &ReportRow {
        &report[state.index()]
    }

    fn full_input() -> Vec<RawCount> {
        vec![
            RawCount::new(1, 10),
            RawCount::new(2, 5),
            RawCount::new(3, 3),
            RawCount::new(4, 2),
            RawCount::new(5, 7),
        ]
    }

    #[test]
    fn empty_input_yields_six_zero_rows() {
        let report = aggregate(&[]);
        assert_eq!(report.len(), 6);
        for (r, state) in report.iter().zip(PipelineState::ALL) {
            assert_eq!(r, &ReportRow::empty(state));
        }
    }

    #[test]
    fn rows_always_in_pipeline_order() {
        let report = aggregate(&full_input());
        let names: Vec<_> = report.iter().map(|r| r.state_name).collect();
        assert_eq!(
            names,
            ["SUBMITTED", "VALIDATED", "IN PROGRESS", "WAITING FOR REVIEW", "DONE", "TOTAL"]
        );
        let ids: Vec<_> = report.iter().map(|r| r.state_id).collect();
        assert_eq!(ids, [1, 2, 3, 4, 5, -1]);
    }

    #[test]
    fn full_pipeline_report() {
        let report = aggregate(&full_input());

        assert_eq!((row(&report, Submitted).todo, row(&report, Submitted).done), (10, 10));
        assert_eq!((row(&report, Validated).todo, row(&report, Validated).done), (5, 5));
        assert_eq!((row(&report, InProgress).todo, row(&report, InProgress).done), (3, 2));
        assert_eq!(
            (row(&report, WaitingForReview).todo, row(&report, WaitingForReview).done),
            (2, 0)
        );
        assert_eq!((row(&report, Done).todo, row(&report, Done).done), (0, 7));
        assert_eq!((row(&report, Total).todo, row(&report, Total).done), (20, 7));
    }

    #[test]
    fn single_submitted_count() {
        let report = aggregate(&[RawCount::new(1, 4)]);
        assert_eq!(row(&report, Submitted).todo, 4);
        assert_eq!(row(&report, Submitted).done, 0);
        for state in [Validated, InProgress, WaitingForReview, Done] {
            assert_eq!(row(&report, state).todo, 0);
        }
        assert_eq!(row(&report, Total).todo, 4);
        assert_eq!(row(&report, Total).done, 0);
    }

    #[test]
    fn duplicate_state_last_write_wins() {
        let report = aggregate(&[RawCount::new(1, 10), RawCount::new(1, 99)]);
        assert_eq!(row(&report, Submitted).todo, 99);
        assert_eq!(row(&report, Total).todo, 99);
    }

    #[test]
    fn out_of_range_ids_are_ignored() {
        for id in [0, 6, 7, -1, -5, i32::MAX] {
            let report = aggregate(&[RawCount::new(id, 50)]);
            assert_eq!(report, aggregate(&[]), "id {id} leaked into the report");
        }
    }

    #[test]
    fn out_of_range_ids_do_not_disturb_real_rows() {
        let mut input = full_input();
        input.insert(2, RawCount::new(9, 1000));
        input.push(RawCount::new(-1, 1000));
        assert_eq!(aggregate(&input), aggregate(&full_input()));
    }

    #[test]
    fn done_counts_later_working_states_only() {
        let report = aggregate(&[
            RawCount::new(2, 1),
            RawCount::new(3, 20),
            RawCount::new(4, 300),
            RawCount::new(5, 4000),
        ]);
        assert_eq!(row(&report, Submitted).done, 321);
        assert_eq!(row(&report, Validated).done, 320);
        assert_eq!(row(&report, InProgress).done, 300);
        assert_eq!(row(&report, WaitingForReview).done, 0);
    }

    #[test]
    fn done_state_moves_todo_into_done_and_total() {
        let report = aggregate(&[RawCount::new(5, 12)]);
        assert_eq!(row(&report, Done).todo, 0);
        assert_eq!(row(&report, Done).done, 12);
        assert_eq!(row(&report, Total).done, 12);
        assert_eq!(row(&report, Total).todo, 0);
    }

    #[test]
    fn total_todo_excludes_done() {
        let report = aggregate(&[
            RawCount::new(1, 1),
            RawCount::new(2, 2),
            RawCount::new(3, 3),
            RawCount::new(4, 4),
            RawCount::new(5, 100),
        ]);
        assert_eq!(row(&report, Total).todo, 10);
    }

    #[test]
    fn negative_counts_propagate() {
        let report = aggregate(&[RawCount::new(2, -3), RawCount::new(4, 1)]);
        assert_eq!(row(&report, Validated).todo, -3);
        assert_eq!(row(&report, Submitted).done, -2);
        assert_eq!(row(&report, Total).todo, -2);
    }

    #[test]
    fn input_order_does_not_matter_for_distinct_states() {
        let mut reversed = full_input();
        reversed.reverse();
        assert_eq!(aggregate(&reversed), aggregate(&full_input()));
    }

    #[test]
    fn report_serializes_as_json_array() {
        let json = serde_json::to_value(aggregate(&full_input())).unwrap();
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[5]["stateId"], -1);
        assert_eq!(rows[5]["stateName"], "TOTAL");
        assert_eq!(rows[5]["todo"], 20);
        assert_eq!(rows[5]["done"], 7);
    }

    #[test]
    fn sums_beyond_32_bits_do_not_overflow() {
        let half = i64::from(i32::MAX / 2 + 1);
        let report = aggregate(&[
            RawCount::new(1, half),
            RawCount::new(2, half),
            RawCount::new(3, i64::from(i32::MAX)),
        ]);
        assert_eq!(row(&report, Submitted).done, half + i64::from(i32::MAX));
        assert_eq!(row(&report, Total).todo, 2 * half + i64::from(i32::MAX));
    }

    #[test]
    fn large_counts_parse_from_database_json() {
        let raw = parse_raw_counts(Some(r#"[{"stateId":1,"todo":3000000000}]"#)).unwrap();
        assert_eq!(raw, vec![RawCount::new(1, 3_000_000_000)]);
    }

    #[test]
    fn null_counts_parse_as_empty() {
        assert!(parse_raw_counts(None).unwrap().is_empty());
    }

    #[test]
    fn counts_parse_from_database_json() {
        let raw = parse_raw_counts(Some(r#"[{"stateId":1,"todo":2},{"stateId":5,"todo":9}]"#))
            .unwrap();
        assert_eq!(raw, vec![RawCount::new(1, 2), RawCount::new(5, 9)]);
    }

    #[test]
    fn malformed_counts_are_internal_errors() {
        let err = parse_raw_counts(Some("{not json")).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}

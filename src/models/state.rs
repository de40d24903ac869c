//! Pipeline states and the state-count report rows built from them.

use serde::{Deserialize, Serialize};

/// A stage in the request lifecycle, plus the synthetic TOTAL aggregate.
///
/// The declaration order is the pipeline order and also the slot order of
/// every state-count report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Submitted,
    Validated,
    InProgress,
    WaitingForReview,
    Done,
    Total,
}

impl PipelineState {
    /// Every report slot, in pipeline order.
    pub const ALL: [PipelineState; 6] = [
        Self::Submitted,
        Self::Validated,
        Self::InProgress,
        Self::WaitingForReview,
        Self::Done,
        Self::Total,
    ];

    /// Identifier used by the database and the API. TOTAL is `-1`.
    pub fn id(self) -> i32 {
        match self {
            Self::Submitted => 1,
            Self::Validated => 2,
            Self::InProgress => 3,
            Self::WaitingForReview => 4,
            Self::Done => 5,
            Self::Total => -1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Submitted => "SUBMITTED",
            Self::Validated => "VALIDATED",
            Self::InProgress => "IN PROGRESS",
            Self::WaitingForReview => "WAITING FOR REVIEW",
            Self::Done => "DONE",
            Self::Total => "TOTAL",
        }
    }

    /// Slot of this state inside a report.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Resolve a real pipeline state from its identifier.
    ///
    /// Only ids 1..=5 resolve; TOTAL is never produced from raw data.
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Self::Submitted),
            2 => Some(Self::Validated),
            3 => Some(Self::InProgress),
            4 => Some(Self::WaitingForReview),
            5 => Some(Self::Done),
            _ => None,
        }
    }
}

/// Sparse per-state count as returned by `get_state_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCount {
    #[serde(alias = "state_id")]
    pub state_id: i32,
    #[serde(default)]
    pub todo: i64,
}

impl RawCount {
    pub fn new(state_id: i32, todo: i64) -> Self {
        Self { state_id, todo }
    }
}

/// One row of the dense state-count report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub state_id: i32,
    pub state_name: &'static str,
    pub todo: i64,
    pub done: i64,
}

impl ReportRow {
    /// Zero-count row for a state.
    pub fn empty(state: PipelineState) -> Self {
        Self {
            state_id: state.id(),
            state_name: state.name(),
            todo: 0,
            done: 0,
        }
    }
}

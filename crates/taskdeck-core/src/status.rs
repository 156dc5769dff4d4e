//! Async operation status shared by the task and auth stores.
//!
//! Each store operation moves `Loading` to `Succeeded` or `Failed`; the UI
//! reads it to drive loading indicators.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl OpStatus {
    /// True while an operation is in flight.
    pub fn is_loading(self) -> bool {
        matches!(self, OpStatus::Loading)
    }
}

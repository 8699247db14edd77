use serde::{Deserialize, Serialize};

/// Bounds for schedule materialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingConfig {
    /// How far ahead a newly created schedule is expanded into lessons.
    pub initial_horizon_days: u32,
    /// Upper bound on the length of any explicit generation range.
    pub max_range_days: u32,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            initial_horizon_days: 90,
            max_range_days: 90,
        }
    }
}

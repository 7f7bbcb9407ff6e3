//! Roll-up of a cycle's trend results

use serde::{Deserialize, Serialize};

use crate::constants::analysis::UNKNOWN_DEADLINE_HOURS;
use crate::prediction::ConcernLevel;
use crate::trend::TrendResult;

/// A parameter needing attention soon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrgentAction {
    pub parameter: String,
    pub level: ConcernLevel,
    pub action: String,
    pub time_to_threshold: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    /// Highest concern across all parameters
    pub overall_concern: ConcernLevel,
    /// Warning and critical parameters, soonest deadline first
    pub urgent_actions: Vec<UrgentAction>,
}

impl TrendSummary {
    pub fn from_trends<'a>(trends: impl IntoIterator<Item = &'a TrendResult>) -> Self {
        let mut overall_concern = ConcernLevel::None;
        let mut urgent_actions = Vec::new();

        for trend in trends {
            overall_concern = overall_concern.max(trend.concern_level);
            if trend.concern_level.is_urgent() {
                urgent_actions.push(UrgentAction {
                    parameter: trend.parameter.clone(),
                    level: trend.concern_level,
                    action: trend.recommendation.clone(),
                    time_to_threshold: trend.time_to_threshold,
                });
            }
        }

        let deadline = |action: &UrgentAction| action.time_to_threshold.unwrap_or(UNKNOWN_DEADLINE_HOURS);
        urgent_actions.sort_by(|a, b| deadline(a).total_cmp(&deadline(b)));

        Self {
            overall_concern,
            urgent_actions,
        }
    }

    pub fn has_urgent_actions(&self) -> bool {
        !self.urgent_actions.is_empty()
    }
}

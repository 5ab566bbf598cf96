use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ParseEnumError;

/// Lifecycle state of a savings goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Active,
    Completed,
    Paused,
    Cancelled,
}

impl GoalStatus {
    pub fn as_str(&self) -> &str {
        match self {
            GoalStatus::Active => "active",
            GoalStatus::Completed => "completed",
            GoalStatus::Paused => "paused",
            GoalStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for GoalStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(GoalStatus::Active),
            "completed" => Ok(GoalStatus::Completed),
            "paused" => Ok(GoalStatus::Paused),
            "cancelled" => Ok(GoalStatus::Cancelled),
            other => Err(ParseEnumError::new("GoalStatus", other)),
        }
    }
}

/// Savings goal owned by a user
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SavingsGoal {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    /// 1 = highest .. 5 = lowest
    pub priority: i32,
    /// `YYYY-MM-DD`, absent for open-ended goals
    pub target_date: Option<String>,
    pub status: GoalStatus,
}

impl SavingsGoal {
    pub fn remaining(&self) -> f64 {
        self.target_amount - self.current_amount
    }
}

/// A single dated contribution towards a goal
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GoalContribution {
    pub id: i64,
    pub goal_id: i64,
    pub amount: f64,
    pub contribution_date: String,
}

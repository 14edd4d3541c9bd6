use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Reviews,
    Sentiment,
    Entities,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Reviews => "reviews",
            Stage::Sentiment => "sentiment",
            Stage::Entities => "entities",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of a pipeline run.
///
/// `Idle -> Running(Reviews) -> Completed(Reviews) -> Running(Sentiment) -> ...
/// -> Completed(Entities)`; any failure moves to `Failed(stage)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running(Stage),
    Completed(Stage),
    Failed(Stage),
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed(Stage::Entities) | RunState::Failed(_))
    }
}

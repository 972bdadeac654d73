use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Task categories a session can be tracked under. The set is fixed; labels are what users see and
/// what gets written into records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Activity {
    #[serde(rename = "Analizar")]
    Analyze,
    #[serde(rename = "Planificar")]
    Plan,
    #[serde(rename = "Codificar")]
    Code,
    #[serde(rename = "Testear")]
    Test,
    #[serde(rename = "Evaluación del código")]
    CodeEvaluation,
    #[serde(rename = "Revisión del código")]
    CodeReview,
    #[serde(rename = "Lanzamiento")]
    Release,
    #[serde(rename = "Diagramar")]
    Diagram,
    #[serde(rename = "Reunión")]
    Meeting,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown activity \"{0}\". Use a number from 1 to 9 or one of the listed names")]
pub struct ActivityParseError(pub String);

impl Activity {
    /// All activities in menu order.
    pub const ALL: [Activity; 9] = [
        Activity::Analyze,
        Activity::Plan,
        Activity::Code,
        Activity::Test,
        Activity::CodeEvaluation,
        Activity::CodeReview,
        Activity::Release,
        Activity::Diagram,
        Activity::Meeting,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Activity::Analyze => "Analizar",
            Activity::Plan => "Planificar",
            Activity::Code => "Codificar",
            Activity::Test => "Testear",
            Activity::CodeEvaluation => "Evaluación del código",
            Activity::CodeReview => "Revisión del código",
            Activity::Release => "Lanzamiento",
            Activity::Diagram => "Diagramar",
            Activity::Meeting => "Reunión",
        }
    }

    fn short_name(&self) -> &'static str {
        match self {
            Activity::Analyze => "analyze",
            Activity::Plan => "plan",
            Activity::Code => "code",
            Activity::Test => "test",
            Activity::CodeEvaluation => "code-evaluation",
            Activity::CodeReview => "code-review",
            Activity::Release => "release",
            Activity::Diagram => "diagram",
            Activity::Meeting => "meeting",
        }
    }

    /// 1-based position in the selection menu.
    pub fn menu_index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|v| v == self)
            .map(|v| v + 1)
            .unwrap_or_default()
    }
}

impl Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Activity {
    type Err = ActivityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(index) = s.parse::<usize>() {
            return index
                .checked_sub(1)
                .and_then(|i| Self::ALL.get(i))
                .copied()
                .ok_or_else(|| ActivityParseError(s.to_string()));
        }
        let lowered = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|v| v.label().to_lowercase() == lowered || v.short_name() == lowered)
            .ok_or_else(|| ActivityParseError(s.to_string()))
    }
}

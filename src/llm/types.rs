use serde::{Deserialize, Serialize};

/// Action tag of a model decision. `Wait` doubles as the synthetic fallback
/// tag when the model call or reply parsing fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionKind {
    Click,
    Type,
    Scroll,
    Done,
    Wait,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            ActionKind::Click => "CLICK",
            ActionKind::Type => "TYPE",
            ActionKind::Scroll => "SCROLL",
            ActionKind::Done => "DONE",
            ActionKind::Wait => "WAIT",
        };
        f.write_str(tag)
    }
}

/// One structured reply from the vision model. Immutable once produced;
/// exactly one optional payload field is meaningful per action tag, and an
/// absent payload downgrades the action to a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub action: ActionKind,
    #[serde(default)]
    pub reasoning: String,
    /// Screen pixel (x, y); only meaningful for `Click`.
    #[serde(default)]
    pub coordinates: Option<(i32, i32)>,
    /// Only meaningful for `Type`.
    #[serde(default)]
    pub text: Option<String>,
    /// Only meaningful for `Scroll`. Decoded but never executed.
    #[serde(default)]
    pub scroll_amount: Option<i64>,
}

impl Decision {
    /// Fallback decision carrying an error description; the loop treats it
    /// as a no-op step.
    pub fn wait(reasoning: impl Into<String>) -> Self {
        Self {
            action: ActionKind::Wait,
            reasoning: reasoning.into(),
            coordinates: None,
            text: None,
            scroll_amount: None,
        }
    }
}

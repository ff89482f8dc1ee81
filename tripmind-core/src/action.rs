//! The action objects sent back to the engine.

use crate::moves::Phase;
use serde::{Deserialize, Serialize};

/// One engine action. A `[MY_MOVE]` answer is a JSON array of these; an empty
/// array passes.
///
/// ```
/// use tripmind_core::{Action, Phase};
///
/// let action = Action::new(Phase::Purchase, "", "Moscow", "infantry");
/// assert_eq!(
///     serde_json::to_string(&action).unwrap(),
///     r#"{"delegate":"purchase","from":"","to":"Moscow","unit":"infantry"}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub delegate: Phase,
    /// Empty for purchase and placement.
    pub from: String,
    pub to: String,
    pub unit: String,
}

impl Action {
    pub fn new(delegate: Phase, from: &str, to: &str, unit: &str) -> Self {
        Self {
            delegate,
            from: from.to_string(),
            to: to.to_string(),
            unit: unit.to_string(),
        }
    }
}

//! Error types for change-line classification.

use thiserror::Error;

/// Reasons a line could not be turned into a [`ChangeEvent`](crate::ChangeEvent).
///
/// None of these are fatal: the engine renders many internal changes we do not
/// track, so callers log the miss and move on to the next line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The line matched none of the known change forms.
    #[error("unrecognized change line: {line:?}")]
    Unrecognized {
        /// The offending line, trimmed.
        line: String,
    },
    /// A `CompositeChange` header with no `<[` block after it.
    #[error("composite change without an opening `<[` marker")]
    MissingCompositeBlock,
    /// A captured field could not be converted to its target type.
    #[error("malformed {field} field: {value:?}")]
    MalformedField {
        /// Which field failed (e.g. `quantity`).
        field: &'static str,
        /// The captured text.
        value: String,
    },
}

//! Error type for slice operations

use thiserror::Error;

/// Errors reported by the fallible slice entry points.
///
/// Bound dispatch never surfaces these: an unhandled kind reaching a state
/// cell is logged and leaves the state unchanged.
#[derive(Error, Debug)]
pub enum SliceError {
    /// A message named a kind the slice has no handler for.
    #[error("slice `{slice}` has no handler for message kind `{kind}`")]
    UnhandledKind { slice: String, kind: String },

    /// A serialized message could not be parsed.
    #[error("invalid message: {0}")]
    InvalidMessage(#[source] serde_json::Error),
}

impl SliceError {
    /// Returns true if this error reports an unhandled message kind.
    pub fn is_unhandled_kind(&self) -> bool {
        matches!(self, SliceError::UnhandledKind { .. })
    }
}

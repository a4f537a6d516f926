//! Error types for channel contract values.

use thiserror::Error;

/// Errors raised while decoding values stored in channel columns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// A flattened content rating had fewer than three `/`-separated parts.
    #[error("Malformed content rating: {0:?}")]
    MalformedRating(String),

    /// Unknown input state code.
    #[error("Unknown input state: {0}")]
    UnknownInputState(i32),

    /// Unknown playback source type code.
    #[error("Unknown source type: {0}")]
    UnknownSourceType(i32),
}

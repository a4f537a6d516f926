//! Content ratings, video formats and playback source types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::columns::{
    VIDEO_FORMAT_1080P, VIDEO_FORMAT_2160P, VIDEO_FORMAT_4320P, VIDEO_FORMAT_480P,
    VIDEO_FORMAT_576P, VIDEO_FORMAT_720P,
};
use crate::error::ContractError;

/// Map a video height in lines to the progressive video format constant.
pub fn video_format_for_height(height: u32) -> Option<&'static str> {
    match height {
        480 => Some(VIDEO_FORMAT_480P),
        576 => Some(VIDEO_FORMAT_576P),
        720 => Some(VIDEO_FORMAT_720P),
        1080 => Some(VIDEO_FORMAT_1080P),
        2160 => Some(VIDEO_FORMAT_2160P),
        4320 => Some(VIDEO_FORMAT_4320P),
        _ => None,
    }
}

/// A content rating in its flattened `domain/system/rating[/sub...]` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRating {
    pub domain: String,
    pub rating_system: String,
    pub rating: String,
    pub sub_ratings: Vec<String>,
}

impl ContentRating {
    pub fn new(
        domain: impl Into<String>,
        rating_system: impl Into<String>,
        rating: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            rating_system: rating_system.into(),
            rating: rating.into(),
            sub_ratings: Vec::new(),
        }
    }

    /// Parse one flattened rating.
    pub fn unflatten(s: &str) -> Result<Self, ContractError> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() < 3 || parts[..3].iter().any(|p| p.is_empty()) {
            return Err(ContractError::MalformedRating(s.to_string()));
        }
        Ok(Self {
            domain: parts[0].to_string(),
            rating_system: parts[1].to_string(),
            rating: parts[2].to_string(),
            sub_ratings: parts[3..].iter().map(|p| p.to_string()).collect(),
        })
    }

    pub fn flatten(&self) -> String {
        let mut out = format!("{}/{}/{}", self.domain, self.rating_system, self.rating);
        for sub in &self.sub_ratings {
            out.push('/');
            out.push_str(sub);
        }
        out
    }
}

impl fmt::Display for ContentRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.flatten())
    }
}

/// Parse a comma-separated list of flattened ratings.
///
/// Returns `Ok(None)` for empty input.
pub fn parse_content_ratings(s: &str) -> Result<Option<Vec<ContentRating>>, ContractError> {
    if s.trim().is_empty() {
        return Ok(None);
    }
    s.split(',')
        .map(|r| ContentRating::unflatten(r.trim()))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Join ratings into the comma-separated column form.
///
/// Returns `None` for an empty slice.
pub fn content_ratings_to_string(ratings: &[ContentRating]) -> Option<String> {
    if ratings.is_empty() {
        return None;
    }
    Some(
        ratings
            .iter()
            .map(ContentRating::flatten)
            .collect::<Vec<_>>()
            .join(","),
    )
}

/// Playback transport of a channel's stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    Invalid,
    MpegDash,
    SmoothStreaming,
    Hls,
    HttpProgressive,
}

impl TryFrom<i32> for SourceType {
    type Error = ContractError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(SourceType::Invalid),
            0 => Ok(SourceType::MpegDash),
            1 => Ok(SourceType::SmoothStreaming),
            2 => Ok(SourceType::Hls),
            3 => Ok(SourceType::HttpProgressive),
            other => Err(ContractError::UnknownSourceType(other)),
        }
    }
}

impl From<SourceType> for i32 {
    fn from(t: SourceType) -> i32 {
        match t {
            SourceType::Invalid => -1,
            SourceType::MpegDash => 0,
            SourceType::SmoothStreaming => 1,
            SourceType::Hls => 2,
            SourceType::HttpProgressive => 3,
        }
    }
}

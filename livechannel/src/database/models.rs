//! Database model definitions.

use std::fmt;

use livechannel_types::NaturalKey;
use serde::Serialize;

/// Lightweight projection of a channel row: row id plus natural key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelKeyRow {
    pub id: i64,
    pub key: NaturalKey,
}

/// Location of a channel row's logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LogoSlot {
    pub channel_id: i64,
}

impl LogoSlot {
    pub fn for_channel(channel_id: i64) -> Self {
        Self { channel_id }
    }
}

impl fmt::Display for LogoSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channels/{}/logo", self.channel_id)
    }
}

/// Stored logo metadata.
#[derive(Debug, Clone, Serialize)]
pub struct LogoRecord {
    pub channel_id: i64,
    pub source_uri: Option<String>,
    pub size: usize,
    pub updated_at: i64,
}

//! Channel and input source records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::columns::SERVICE_TYPE_AUDIO_VIDEO;
use crate::error::ContractError;

/// Original network id of a channel that never had one assigned.
pub const INVALID_NETWORK_ID: i32 = -1;

// ============================================================================
// Natural key
// ============================================================================

/// Identifies "the same channel" across synchronisation runs, independent of
/// the row id. Only meaningful within one input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NaturalKey {
    pub service_id: i32,
    pub transport_stream_id: i32,
    pub original_network_id: i32,
}

impl NaturalKey {
    pub fn new(service_id: i32, transport_stream_id: i32, original_network_id: i32) -> Self {
        Self {
            service_id,
            transport_stream_id,
            original_network_id,
        }
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.service_id, self.transport_stream_id, self.original_network_id
        )
    }
}

// ============================================================================
// Channel record
// ============================================================================

/// One row of the channel table.
///
/// Built by callers to describe desired state, or read back from the store
/// to describe current state. `None` string fields are stored as NULL, and
/// so are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Channel {
    /// Store-assigned row id. `None` until the row is persisted.
    pub id: Option<i64>,
    pub package_name: Option<String>,
    pub input_id: Option<String>,
    /// Channel type (`TYPE_DVB_T`, `TYPE_OTHER`, ...).
    #[serde(rename = "type")]
    pub channel_type: Option<String>,
    pub service_type: Option<String>,

    // Natural key
    pub original_network_id: i32,
    pub transport_stream_id: i32,
    pub service_id: i32,

    pub display_number: Option<String>,
    pub display_name: Option<String>,
    pub network_affiliation: Option<String>,
    pub description: Option<String>,
    pub video_format: Option<String>,
    /// Source URI of the channel logo, fetched into the row's logo slot.
    pub channel_logo: Option<String>,

    pub browsable: bool,
    pub searchable: bool,
    pub locked: bool,

    // App link
    pub app_link_text: Option<String>,
    pub app_link_color: i32,
    pub app_link_icon_uri: Option<String>,
    pub app_link_poster_art_uri: Option<String>,
    pub app_link_intent_uri: Option<String>,

    // Provider-private payload
    pub internal_provider_id: Option<String>,
    pub internal_provider_data: Option<String>,
    pub internal_provider_flag1: Option<String>,
    pub internal_provider_flag2: Option<String>,
    pub internal_provider_flag3: Option<String>,
    pub internal_provider_flag4: Option<String>,
    pub version_number: i32,
    pub transient: bool,
}

impl Default for Channel {
    fn default() -> Self {
        Self {
            id: None,
            package_name: None,
            input_id: None,
            channel_type: None,
            service_type: Some(SERVICE_TYPE_AUDIO_VIDEO.to_string()),
            original_network_id: INVALID_NETWORK_ID,
            transport_stream_id: 0,
            service_id: 0,
            display_number: None,
            display_name: None,
            network_affiliation: None,
            description: None,
            video_format: None,
            channel_logo: None,
            browsable: false,
            searchable: false,
            locked: false,
            app_link_text: None,
            app_link_color: 0,
            app_link_icon_uri: None,
            app_link_poster_art_uri: None,
            app_link_intent_uri: None,
            internal_provider_id: None,
            internal_provider_data: None,
            internal_provider_flag1: None,
            internal_provider_flag2: None,
            internal_provider_flag3: None,
            internal_provider_flag4: None,
            version_number: 0,
            transient: false,
        }
    }
}

impl Channel {
    /// Create a channel with its natural key set and everything else default.
    pub fn new(service_id: i32, transport_stream_id: i32, original_network_id: i32) -> Self {
        Self {
            service_id,
            transport_stream_id,
            original_network_id,
            ..Self::default()
        }
    }

    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey::new(
            self.service_id,
            self.transport_stream_id,
            self.original_network_id,
        )
    }

    /// Whether the row has been persisted.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Logo source URI, if present and non-empty.
    pub fn logo_source(&self) -> Option<&str> {
        non_empty(&self.channel_logo)
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_display_number(mut self, number: impl Into<String>) -> Self {
        self.display_number = Some(number.into());
        self
    }

    pub fn with_logo(mut self, uri: impl Into<String>) -> Self {
        self.channel_logo = Some(uri.into());
        self
    }

    pub fn with_package_name(mut self, package_name: impl Into<String>) -> Self {
        self.package_name = Some(package_name.into());
        self
    }

    pub fn with_type(mut self, channel_type: impl Into<String>) -> Self {
        self.channel_type = Some(channel_type.into());
        self
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Channel{{id={:?}, inputId={:?}, key={}, displayNumber={:?}, displayName={:?}}}",
            self.id,
            self.input_id,
            self.natural_key(),
            self.display_number,
            self.display_name
        )
    }
}

/// Returns the string if it is present and non-empty.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

// ============================================================================
// Input sources
// ============================================================================

/// Connection state reported for an input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputState {
    #[default]
    Connected,
    ConnectedStandby,
    Disconnected,
}

impl TryFrom<i32> for InputState {
    type Error = ContractError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(InputState::Connected),
            1 => Ok(InputState::ConnectedStandby),
            2 => Ok(InputState::Disconnected),
            other => Err(ContractError::UnknownInputState(other)),
        }
    }
}

impl From<InputState> for i32 {
    fn from(state: InputState) -> i32 {
        match state {
            InputState::Connected => 0,
            InputState::ConnectedStandby => 1,
            InputState::Disconnected => 2,
        }
    }
}

/// A registered provider of channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSource {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub package_name: Option<String>,
    /// Activity that configures the input (channel scan, login, ...).
    #[serde(default)]
    pub setup_activity: Option<String>,
    #[serde(default)]
    pub state: InputState,
}

impl InputSource {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            package_name: None,
            setup_activity: None,
            state: InputState::default(),
        }
    }

    pub fn has_setup(&self) -> bool {
        non_empty(&self.setup_activity).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_channel_defaults() {
        let ch = Channel::default();
        assert_eq!(ch.id, None);
        assert_eq!(ch.original_network_id, INVALID_NETWORK_ID);
        assert_eq!(ch.service_type.as_deref(), Some(SERVICE_TYPE_AUDIO_VIDEO));
        assert!(!ch.is_persisted());
    }

    #[test]
    fn test_natural_key() {
        let ch = Channel::new(1, 3, 2);
        let key = ch.natural_key();
        assert_eq!(key, NaturalKey::new(1, 3, 2));
        assert_eq!(key.to_string(), "1/3/2");
    }

    #[test]
    fn test_logo_source_ignores_empty() {
        assert_eq!(Channel::new(1, 2, 3).logo_source(), None);
        assert_eq!(Channel::new(1, 2, 3).with_logo("").logo_source(), None);
        assert_eq!(
            Channel::new(1, 2, 3).with_logo("http://x/y.png").logo_source(),
            Some("http://x/y.png")
        );
    }

    #[test]
    fn test_channel_from_partial_json() {
        let ch: Channel = serde_json::from_str(
            r#"{"service_id": 5, "transport_stream_id": 7, "original_network_id": 6, "display_name": "X", "type": "TYPE_DVB_T"}"#,
        )
        .unwrap();
        assert_eq!(ch.natural_key(), NaturalKey::new(5, 7, 6));
        assert_eq!(ch.display_name.as_deref(), Some("X"));
        assert_eq!(ch.channel_type.as_deref(), Some("TYPE_DVB_T"));
        assert_eq!(ch.service_type.as_deref(), Some(SERVICE_TYPE_AUDIO_VIDEO));
        assert_eq!(ch.id, None);
    }

    #[test]
    fn test_input_state_codes() {
        for state in [
            InputState::Connected,
            InputState::ConnectedStandby,
            InputState::Disconnected,
        ] {
            let code: i32 = state.into();
            assert_eq!(InputState::try_from(code).unwrap(), state);
        }
        assert!(InputState::try_from(9).is_err());
    }
}

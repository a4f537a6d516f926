//! Column names and well-known values of the channel table.
//!
//! Names follow the TV Input Framework `channels` table so that rows can be
//! exported to or imported from a TV provider without renaming.

pub const ID: &str = "id";
pub const PACKAGE_NAME: &str = "package_name";
pub const INPUT_ID: &str = "input_id";
pub const TYPE: &str = "type";
pub const SERVICE_TYPE: &str = "service_type";
pub const ORIGINAL_NETWORK_ID: &str = "original_network_id";
pub const TRANSPORT_STREAM_ID: &str = "transport_stream_id";
pub const SERVICE_ID: &str = "service_id";
pub const DISPLAY_NUMBER: &str = "display_number";
pub const DISPLAY_NAME: &str = "display_name";
pub const NETWORK_AFFILIATION: &str = "network_affiliation";
pub const DESCRIPTION: &str = "description";
pub const VIDEO_FORMAT: &str = "video_format";
pub const BROWSABLE: &str = "browsable";
pub const SEARCHABLE: &str = "searchable";
pub const LOCKED: &str = "locked";
pub const APP_LINK_ICON_URI: &str = "app_link_icon_uri";
pub const APP_LINK_POSTER_ART_URI: &str = "app_link_poster_art_uri";
pub const APP_LINK_TEXT: &str = "app_link_text";
pub const APP_LINK_COLOR: &str = "app_link_color";
pub const APP_LINK_INTENT_URI: &str = "app_link_intent_uri";
pub const INTERNAL_PROVIDER_ID: &str = "internal_provider_id";
pub const INTERNAL_PROVIDER_DATA: &str = "internal_provider_data";
pub const INTERNAL_PROVIDER_FLAG1: &str = "internal_provider_flag1";
pub const INTERNAL_PROVIDER_FLAG2: &str = "internal_provider_flag2";
pub const INTERNAL_PROVIDER_FLAG3: &str = "internal_provider_flag3";
pub const INTERNAL_PROVIDER_FLAG4: &str = "internal_provider_flag4";
pub const VERSION_NUMBER: &str = "version_number";
pub const TRANSIENT: &str = "transient";
pub const CHANNEL_LOGO: &str = "channel_logo";

/// Column order used by full-row reads.
pub const PROJECTION: &[&str] = &[
    PACKAGE_NAME,
    ID,
    INPUT_ID,
    TYPE,
    SERVICE_TYPE,
    ORIGINAL_NETWORK_ID,
    TRANSPORT_STREAM_ID,
    SERVICE_ID,
    DISPLAY_NUMBER,
    DISPLAY_NAME,
    NETWORK_AFFILIATION,
    DESCRIPTION,
    VIDEO_FORMAT,
    BROWSABLE,
    SEARCHABLE,
    LOCKED,
    APP_LINK_ICON_URI,
    APP_LINK_POSTER_ART_URI,
    APP_LINK_TEXT,
    APP_LINK_COLOR,
    APP_LINK_INTENT_URI,
    INTERNAL_PROVIDER_ID,
    INTERNAL_PROVIDER_DATA,
    INTERNAL_PROVIDER_FLAG1,
    INTERNAL_PROVIDER_FLAG2,
    INTERNAL_PROVIDER_FLAG3,
    INTERNAL_PROVIDER_FLAG4,
    VERSION_NUMBER,
    TRANSIENT,
    CHANNEL_LOGO,
];

/// Comma-separated [`PROJECTION`] for use in `SELECT` statements.
pub fn projection_sql() -> String {
    PROJECTION.join(", ")
}

// Channel types
pub const TYPE_OTHER: &str = "TYPE_OTHER";
pub const TYPE_NTSC: &str = "TYPE_NTSC";
pub const TYPE_PAL: &str = "TYPE_PAL";
pub const TYPE_SECAM: &str = "TYPE_SECAM";
pub const TYPE_DVB_T: &str = "TYPE_DVB_T";
pub const TYPE_DVB_T2: &str = "TYPE_DVB_T2";
pub const TYPE_DVB_S: &str = "TYPE_DVB_S";
pub const TYPE_DVB_S2: &str = "TYPE_DVB_S2";
pub const TYPE_DVB_C: &str = "TYPE_DVB_C";
pub const TYPE_ATSC_T: &str = "TYPE_ATSC_T";
pub const TYPE_ATSC_C: &str = "TYPE_ATSC_C";
pub const TYPE_ISDB_T: &str = "TYPE_ISDB_T";
pub const TYPE_ISDB_S: &str = "TYPE_ISDB_S";
pub const TYPE_ISDB_C: &str = "TYPE_ISDB_C";
pub const TYPE_PREVIEW: &str = "TYPE_PREVIEW";

// Service types
pub const SERVICE_TYPE_AUDIO_VIDEO: &str = "SERVICE_TYPE_AUDIO_VIDEO";
pub const SERVICE_TYPE_AUDIO: &str = "SERVICE_TYPE_AUDIO";
pub const SERVICE_TYPE_OTHER: &str = "SERVICE_TYPE_OTHER";

// Video formats
pub const VIDEO_FORMAT_480I: &str = "VIDEO_FORMAT_480I";
pub const VIDEO_FORMAT_480P: &str = "VIDEO_FORMAT_480P";
pub const VIDEO_FORMAT_576I: &str = "VIDEO_FORMAT_576I";
pub const VIDEO_FORMAT_576P: &str = "VIDEO_FORMAT_576P";
pub const VIDEO_FORMAT_720P: &str = "VIDEO_FORMAT_720P";
pub const VIDEO_FORMAT_1080I: &str = "VIDEO_FORMAT_1080I";
pub const VIDEO_FORMAT_1080P: &str = "VIDEO_FORMAT_1080P";
pub const VIDEO_FORMAT_2160P: &str = "VIDEO_FORMAT_2160P";
pub const VIDEO_FORMAT_4320P: &str = "VIDEO_FORMAT_4320P";

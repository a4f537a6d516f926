//! Database schema definitions.

/// SQL schema for the channel database.
pub const SCHEMA_SQL: &str = r#"
-- Channel table (mirrors the TV Input Framework channels table)
CREATE TABLE IF NOT EXISTS channels (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    package_name TEXT,
    input_id TEXT NOT NULL,
    type TEXT,                               -- TYPE_DVB_T, TYPE_OTHER, ...
    service_type TEXT,                       -- SERVICE_TYPE_AUDIO_VIDEO, ...
    -- Natural key (not enforced unique, matched by the reconciler)
    original_network_id INTEGER NOT NULL DEFAULT -1,
    transport_stream_id INTEGER NOT NULL DEFAULT 0,
    service_id INTEGER NOT NULL DEFAULT 0,
    -- Descriptive attributes
    display_number TEXT,
    display_name TEXT,
    network_affiliation TEXT,
    description TEXT,
    video_format TEXT,
    channel_logo TEXT,                       -- Logo source URI
    browsable INTEGER DEFAULT 0,
    searchable INTEGER DEFAULT 0,
    locked INTEGER DEFAULT 0,
    -- App link
    app_link_icon_uri TEXT,
    app_link_poster_art_uri TEXT,
    app_link_text TEXT,
    app_link_color INTEGER DEFAULT 0,
    app_link_intent_uri TEXT,
    -- Provider-private payload
    internal_provider_id TEXT,
    internal_provider_data TEXT,
    internal_provider_flag1 TEXT,
    internal_provider_flag2 TEXT,
    internal_provider_flag3 TEXT,
    internal_provider_flag4 TEXT,
    version_number INTEGER DEFAULT 0,
    transient INTEGER DEFAULT 0,
    -- Metadata
    created_at INTEGER DEFAULT (strftime('%s', 'now')),
    updated_at INTEGER DEFAULT (strftime('%s', 'now'))
);

-- Logo slot per channel row
CREATE TABLE IF NOT EXISTS channel_logos (
    channel_id INTEGER PRIMARY KEY,
    source_uri TEXT,
    data BLOB NOT NULL,
    updated_at INTEGER DEFAULT (strftime('%s', 'now')),
    FOREIGN KEY(channel_id) REFERENCES channels(id) ON DELETE CASCADE
);

-- Indexes for efficient queries
CREATE INDEX IF NOT EXISTS idx_channels_input ON channels(input_id);
CREATE INDEX IF NOT EXISTS idx_channels_natural_key
    ON channels(input_id, service_id, transport_stream_id, original_network_id);

-- Trigger to update updated_at on channels
CREATE TRIGGER IF NOT EXISTS channels_updated_at
AFTER UPDATE ON channels
BEGIN
    UPDATE channels SET updated_at = strftime('%s', 'now') WHERE id = NEW.id;
END;
"#;

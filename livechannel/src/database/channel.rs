//! Channel CRUD operations.

use std::collections::BTreeMap;

use livechannel_types::columns::{self, projection_sql};
use livechannel_types::types::non_empty;
use livechannel_types::{Channel, NaturalKey};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension};

use super::{ChannelKeyRow, Database, DatabaseError, Result};

/// Columns written on insert and update, in parameter order.
const WRITE_COLUMNS: &[&str] = &[
    columns::PACKAGE_NAME,
    columns::INPUT_ID,
    columns::TYPE,
    columns::SERVICE_TYPE,
    columns::ORIGINAL_NETWORK_ID,
    columns::TRANSPORT_STREAM_ID,
    columns::SERVICE_ID,
    columns::DISPLAY_NUMBER,
    columns::DISPLAY_NAME,
    columns::NETWORK_AFFILIATION,
    columns::DESCRIPTION,
    columns::VIDEO_FORMAT,
    columns::BROWSABLE,
    columns::SEARCHABLE,
    columns::LOCKED,
    columns::APP_LINK_ICON_URI,
    columns::APP_LINK_POSTER_ART_URI,
    columns::APP_LINK_TEXT,
    columns::APP_LINK_COLOR,
    columns::APP_LINK_INTENT_URI,
    columns::INTERNAL_PROVIDER_ID,
    columns::INTERNAL_PROVIDER_DATA,
    columns::INTERNAL_PROVIDER_FLAG1,
    columns::INTERNAL_PROVIDER_FLAG2,
    columns::INTERNAL_PROVIDER_FLAG3,
    columns::INTERNAL_PROVIDER_FLAG4,
    columns::VERSION_NUMBER,
    columns::TRANSIENT,
    columns::CHANNEL_LOGO,
];

fn text(value: &Option<String>) -> Value {
    Value::from(non_empty(value).map(str::to_string))
}

/// Column values in [`WRITE_COLUMNS`] order. Empty strings are written as NULL.
fn channel_values(ch: &Channel) -> Vec<Value> {
    vec![
        text(&ch.package_name),
        text(&ch.input_id),
        text(&ch.channel_type),
        text(&ch.service_type),
        Value::from(ch.original_network_id),
        Value::from(ch.transport_stream_id),
        Value::from(ch.service_id),
        text(&ch.display_number),
        text(&ch.display_name),
        text(&ch.network_affiliation),
        text(&ch.description),
        text(&ch.video_format),
        Value::from(ch.browsable),
        Value::from(ch.searchable),
        Value::from(ch.locked),
        text(&ch.app_link_icon_uri),
        text(&ch.app_link_poster_art_uri),
        text(&ch.app_link_text),
        Value::from(ch.app_link_color),
        text(&ch.app_link_intent_uri),
        text(&ch.internal_provider_id),
        text(&ch.internal_provider_data),
        text(&ch.internal_provider_flag1),
        text(&ch.internal_provider_flag2),
        text(&ch.internal_provider_flag3),
        text(&ch.internal_provider_flag4),
        Value::from(ch.version_number),
        Value::from(ch.transient),
        text(&ch.channel_logo),
    ]
}

fn insert_sql() -> String {
    let placeholders: Vec<String> = (1..=WRITE_COLUMNS.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO channels ({}) VALUES ({})",
        WRITE_COLUMNS.join(", "),
        placeholders.join(", ")
    )
}

fn update_sql() -> String {
    let assignments: Vec<String> = WRITE_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, col)| format!("{} = ?{}", col, i + 1))
        .collect();
    format!(
        "UPDATE channels SET {} WHERE id = ?{}",
        assignments.join(", "),
        WRITE_COLUMNS.len() + 1
    )
}

impl Database {
    /// Insert a new channel. The row id is assigned by the store; any id
    /// already set on `channel` is ignored.
    pub fn insert_channel(&self, channel: &Channel) -> Result<i64> {
        self.conn
            .execute(&insert_sql(), params_from_iter(channel_values(channel)))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Overwrite every column of row `id` with the values of `channel`.
    ///
    /// Returns `false` if no such row exists.
    pub fn update_channel(&self, id: i64, channel: &Channel) -> Result<bool> {
        let mut values = channel_values(channel);
        values.push(Value::from(id));
        let changed = self.conn.execute(&update_sql(), params_from_iter(values))?;
        Ok(changed > 0)
    }

    /// Get row id and natural key of every channel of an input.
    pub fn query_channel_keys(&self, input_id: &str) -> Result<Vec<ChannelKeyRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, service_id, transport_stream_id, original_network_id
             FROM channels WHERE input_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([input_id], |row| {
            Ok(ChannelKeyRow {
                id: row.get(0)?,
                key: NaturalKey::new(row.get(1)?, row.get(2)?, row.get(3)?),
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Get all channels of every input.
    pub fn get_channels(&self) -> Result<Vec<Channel>> {
        let sql = format!("SELECT {} FROM channels ORDER BY id", projection_sql());
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], Self::row_to_channel)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Get all channels of an input.
    pub fn get_channels_by_input(&self, input_id: &str) -> Result<Vec<Channel>> {
        let sql = format!(
            "SELECT {} FROM channels WHERE input_id = ?1 ORDER BY id",
            projection_sql()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([input_id], Self::row_to_channel)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Get a channel by row id.
    pub fn get_channel(&self, id: i64) -> Result<Option<Channel>> {
        let sql = format!("SELECT {} FROM channels WHERE id = ?1", projection_sql());
        Ok(self
            .conn
            .query_row(&sql, [id], Self::row_to_channel)
            .optional()?)
    }

    /// Get a channel by row id, only if it belongs to `input_id`.
    pub fn get_channel_by_id(&self, input_id: &str, id: i64) -> Result<Option<Channel>> {
        let sql = format!(
            "SELECT {} FROM channels WHERE input_id = ?1 AND id = ?2",
            projection_sql()
        );
        Ok(self
            .conn
            .query_row(&sql, params![input_id, id], Self::row_to_channel)
            .optional()?)
    }

    /// Get the first channel of an input matching a natural key.
    pub fn get_channel_by_key(&self, input_id: &str, key: &NaturalKey) -> Result<Option<Channel>> {
        let sql = format!(
            "SELECT {} FROM channels
             WHERE input_id = ?1 AND service_id = ?2 AND original_network_id = ?3 AND transport_stream_id = ?4
             ORDER BY id LIMIT 1",
            projection_sql()
        );
        Ok(self
            .conn
            .query_row(
                &sql,
                params![
                    input_id,
                    key.service_id,
                    key.original_network_id,
                    key.transport_stream_id
                ],
                Self::row_to_channel,
            )
            .optional()?)
    }

    /// Build a map of row id to channel for an input.
    pub fn build_channel_map(&self, input_id: &str) -> Result<BTreeMap<i64, Channel>> {
        Ok(self
            .get_channels_by_input(input_id)?
            .into_iter()
            .filter_map(|ch| ch.id.map(|id| (id, ch)))
            .collect())
    }

    /// Count channels of an input.
    pub fn count_channels(&self, input_id: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM channels WHERE input_id = ?1",
            [input_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Delete a channel by row id. Returns `false` if no such row exists.
    pub fn delete_channel(&self, id: i64) -> Result<bool> {
        let changed = self.conn.execute("DELETE FROM channels WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    /// Delete several channels in one transaction.
    ///
    /// Either every row is deleted or none is. Returns the number of rows
    /// removed (ids that do not exist are not counted).
    pub fn delete_channels(&mut self, ids: &[i64]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        let mut deleted = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM channels WHERE id = ?1")?;
            for id in ids {
                deleted += stmt.execute([id])?;
            }
        }
        tx.commit()?;

        log::debug!("Deleted {} of {} channels", deleted, ids.len());
        Ok(deleted)
    }

    /// Delete every channel of an input.
    pub fn delete_all_channels(&self, input_id: &str) -> Result<usize> {
        let deleted = self
            .conn
            .execute("DELETE FROM channels WHERE input_id = ?1", [input_id])?;
        log::info!("Deleted all {} channels of input {}", deleted, input_id);
        Ok(deleted)
    }

    /// Get a channel by row id, failing if it does not exist.
    pub fn require_channel(&self, id: i64) -> Result<Channel> {
        self.get_channel(id)?
            .ok_or(DatabaseError::ChannelNotFound(id))
    }

    /// Helper to convert a projected row to `Channel`.
    fn row_to_channel(row: &rusqlite::Row) -> rusqlite::Result<Channel> {
        Ok(Channel {
            id: Some(row.get(columns::ID)?),
            package_name: row.get(columns::PACKAGE_NAME)?,
            input_id: row.get(columns::INPUT_ID)?,
            channel_type: row.get(columns::TYPE)?,
            service_type: row.get(columns::SERVICE_TYPE)?,
            original_network_id: row.get(columns::ORIGINAL_NETWORK_ID)?,
            transport_stream_id: row.get(columns::TRANSPORT_STREAM_ID)?,
            service_id: row.get(columns::SERVICE_ID)?,
            display_number: row.get(columns::DISPLAY_NUMBER)?,
            display_name: row.get(columns::DISPLAY_NAME)?,
            network_affiliation: row.get(columns::NETWORK_AFFILIATION)?,
            description: row.get(columns::DESCRIPTION)?,
            video_format: row.get(columns::VIDEO_FORMAT)?,
            channel_logo: row.get(columns::CHANNEL_LOGO)?,
            browsable: row.get::<_, Option<bool>>(columns::BROWSABLE)?.unwrap_or(false),
            searchable: row.get::<_, Option<bool>>(columns::SEARCHABLE)?.unwrap_or(false),
            locked: row.get::<_, Option<bool>>(columns::LOCKED)?.unwrap_or(false),
            app_link_text: row.get(columns::APP_LINK_TEXT)?,
            app_link_color: row.get::<_, Option<i32>>(columns::APP_LINK_COLOR)?.unwrap_or(0),
            app_link_icon_uri: row.get(columns::APP_LINK_ICON_URI)?,
            app_link_poster_art_uri: row.get(columns::APP_LINK_POSTER_ART_URI)?,
            app_link_intent_uri: row.get(columns::APP_LINK_INTENT_URI)?,
            internal_provider_id: row.get(columns::INTERNAL_PROVIDER_ID)?,
            internal_provider_data: row.get(columns::INTERNAL_PROVIDER_DATA)?,
            internal_provider_flag1: row.get(columns::INTERNAL_PROVIDER_FLAG1)?,
            internal_provider_flag2: row.get(columns::INTERNAL_PROVIDER_FLAG2)?,
            internal_provider_flag3: row.get(columns::INTERNAL_PROVIDER_FLAG3)?,
            internal_provider_flag4: row.get(columns::INTERNAL_PROVIDER_FLAG4)?,
            version_number: row.get::<_, Option<i32>>(columns::VERSION_NUMBER)?.unwrap_or(0),
            transient: row.get::<_, Option<bool>>(columns::TRANSIENT)?.unwrap_or(false),
        })
    }
}

//! Logo slot storage.

use rusqlite::{params, OptionalExtension};

use super::{Database, LogoRecord, LogoSlot, Result};

impl Database {
    /// Store logo bytes in a channel's logo slot, replacing any previous logo.
    ///
    /// Fails if the channel row does not exist.
    pub fn write_logo(&self, slot: LogoSlot, source_uri: Option<&str>, data: &[u8]) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO channel_logos (channel_id, source_uri, data, updated_at)
             VALUES (?1, ?2, ?3, strftime('%s', 'now'))",
            params![slot.channel_id, source_uri, data],
        )?;
        Ok(())
    }

    /// Read the logo bytes of a channel.
    pub fn read_logo(&self, slot: LogoSlot) -> Result<Option<Vec<u8>>> {
        Ok(self
            .conn
            .query_row(
                "SELECT data FROM channel_logos WHERE channel_id = ?1",
                [slot.channel_id],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// Get logo metadata without the image bytes.
    pub fn get_logo_record(&self, slot: LogoSlot) -> Result<Option<LogoRecord>> {
        Ok(self
            .conn
            .query_row(
                "SELECT channel_id, source_uri, length(data), updated_at
                 FROM channel_logos WHERE channel_id = ?1",
                [slot.channel_id],
                |row| {
                    Ok(LogoRecord {
                        channel_id: row.get(0)?,
                        source_uri: row.get(1)?,
                        size: row.get::<_, i64>(2)? as usize,
                        updated_at: row.get(3)?,
                    })
                },
            )
            .optional()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livechannel_types::Channel;

    fn insert(db: &Database) -> i64 {
        let mut ch = Channel::new(1, 2, 3);
        ch.input_id = Some("input".to_string());
        db.insert_channel(&ch).unwrap()
    }

    #[test]
    fn test_write_and_read_logo() {
        let db = Database::open_in_memory().unwrap();
        let slot = LogoSlot::for_channel(insert(&db));

        assert!(db.read_logo(slot).unwrap().is_none());

        db.write_logo(slot, Some("http://x/y.png"), b"png-1").unwrap();
        db.write_logo(slot, Some("http://x/y.png"), b"png-22").unwrap();

        assert_eq!(db.read_logo(slot).unwrap().unwrap(), b"png-22".to_vec());
        let record = db.get_logo_record(slot).unwrap().unwrap();
        assert_eq!(record.size, 6);
        assert_eq!(record.source_uri.as_deref(), Some("http://x/y.png"));
        assert_eq!(slot.to_string(), format!("channels/{}/logo", slot.channel_id));
    }

    #[test]
    fn test_logo_removed_with_channel() {
        let db = Database::open_in_memory().unwrap();
        let id = insert(&db);
        let slot = LogoSlot::for_channel(id);
        db.write_logo(slot, None, b"png").unwrap();

        db.delete_channel(id).unwrap();
        assert!(db.read_logo(slot).unwrap().is_none());
    }

    #[test]
    fn test_logo_requires_channel() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.write_logo(LogoSlot::for_channel(77), None, b"png").is_err());
    }
}

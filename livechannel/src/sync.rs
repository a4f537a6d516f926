//! Channel synchronisation service.
//!
//! Runs a reconciliation against the shared database and hands the logos of
//! written rows to the logo fetcher as one batch.

use livechannel_types::Channel;
use log::info;

use crate::logo_fetcher::{LogoFetchHandle, LogoFetcher};
use crate::reconcile::{self, ReconcileError, ReconcileOptions, ReconcileReport};
use crate::DatabaseHandle;

/// Result of one synchronisation.
#[derive(Debug)]
pub struct SyncOutcome {
    pub report: ReconcileReport,
    /// Running logo batch, if any logo was requested.
    pub logos: Option<LogoFetchHandle>,
}

/// Reconciles desired channel lists into the database.
pub struct ChannelSync {
    database: DatabaseHandle,
    fetcher: Option<LogoFetcher>,
    options: ReconcileOptions,
}

impl ChannelSync {
    pub fn new(database: DatabaseHandle, options: ReconcileOptions) -> Self {
        Self {
            database,
            fetcher: None,
            options,
        }
    }

    /// Fetch logos of written rows with `fetcher`.
    pub fn with_logo_fetcher(mut self, fetcher: LogoFetcher) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Reconcile the channels of `input_id` with `desired`.
    ///
    /// The database lock is held for the whole reconciliation, so concurrent
    /// calls are serialised. Logo fetching starts after the lock is released.
    pub async fn sync(&self, input_id: &str, desired: &[Channel]) -> Result<SyncOutcome, ReconcileError> {
        let report = {
            let mut db = self.database.lock().await;
            reconcile::reconcile(&mut *db, input_id, desired, &self.options)?
        };

        let logos = match &self.fetcher {
            Some(fetcher) if !report.logos.is_empty() => {
                info!("Fetching {} channel logos for input {}", report.logos.len(), input_id);
                Some(fetcher.spawn(report.logos.clone()))
            }
            _ => None,
        };

        Ok(SyncOutcome { report, logos })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{Database, LogoSlot};
    use crate::logo_fetcher::LogoFetcherConfig;
    use std::sync::Arc;

    const INPUT: &str = "com.example.tuner/.TunerInputService";

    fn handle() -> DatabaseHandle {
        Arc::new(tokio::sync::Mutex::new(Database::open_in_memory().unwrap()))
    }

    #[tokio::test]
    async fn test_sync_hands_logos_to_fetcher() {
        let dir = tempfile::tempdir().unwrap();
        let logo_path = dir.path().join("y.png");
        std::fs::write(&logo_path, b"png").unwrap();

        let db = handle();
        let sync = ChannelSync::new(db.clone(), ReconcileOptions::new("com.example"))
            .with_logo_fetcher(LogoFetcher::new(db.clone(), LogoFetcherConfig::default()));

        let desired = vec![
            Channel::new(5, 7, 6)
                .with_display_name("X")
                .with_logo(format!("file://{}", logo_path.display())),
            Channel::new(6, 7, 6).with_display_name("Y"),
        ];

        let outcome = sync.sync(INPUT, &desired).await.unwrap();
        assert_eq!(outcome.report.inserted, 2);

        let report = outcome.logos.unwrap().join().await.unwrap();
        let slot = LogoSlot::for_channel(outcome.report.written[0]);
        assert_eq!(report.stored, vec![slot]);
        assert_eq!(db.lock().await.read_logo(slot).unwrap().unwrap(), b"png".to_vec());
    }

    #[tokio::test]
    async fn test_sync_without_logos_spawns_nothing() {
        let db = handle();
        let sync = ChannelSync::new(db.clone(), ReconcileOptions::new("com.example"))
            .with_logo_fetcher(LogoFetcher::new(db.clone(), LogoFetcherConfig::default()));

        let outcome = sync
            .sync(INPUT, &[Channel::new(1, 2, 3).with_display_name("A")])
            .await
            .unwrap();
        assert_eq!(outcome.report.inserted, 1);
        assert!(outcome.logos.is_none());
    }

    #[tokio::test]
    async fn test_sync_without_fetcher_keeps_requests() {
        let db = handle();
        let sync = ChannelSync::new(db, ReconcileOptions::new("com.example"));

        let outcome = sync
            .sync(INPUT, &[Channel::new(1, 2, 3).with_logo("http://x/y.png")])
            .await
            .unwrap();
        assert!(outcome.logos.is_none());
        assert_eq!(outcome.report.logos.len(), 1);
    }
}

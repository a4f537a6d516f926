//! Background channel logo fetcher.
//!
//! Downloads logo images and stores them in the logo slot of their channel
//! row. A batch runs on its own tokio task; the caller gets a
//! [`LogoFetchHandle`] to await the per-item outcome or cancel the rest of
//! the batch. A failed item is logged and recorded, and the batch moves on.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::database::{DatabaseError, LogoSlot};
use crate::DatabaseHandle;

#[cfg(feature = "http")]
use futures_util::StreamExt;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Logo fetch errors.
#[derive(Error, Debug)]
pub enum LogoError {
    #[error("Invalid logo source: {0:?}")]
    InvalidSource(String),

    #[error("Unsupported logo source scheme: {0}")]
    UnsupportedScheme(String),

    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logo exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Failed to store logo: {0}")]
    Store(#[from] DatabaseError),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Cancelled")]
    Cancelled,

    #[error("Logo task failed: {0}")]
    TaskFailed(String),
}

/// One logo to fetch: where it goes and where it comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoRequest {
    pub slot: LogoSlot,
    pub source: String,
}

/// Parsed logo source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoSource {
    Http(Url),
    File(PathBuf),
}

impl LogoSource {
    /// Parse a source URI. `http(s)://` and `file:` URLs are accepted, as are
    /// bare filesystem paths.
    pub fn parse(source: &str) -> Result<Self, LogoError> {
        let source = source.trim();
        if source.is_empty() {
            return Err(LogoError::InvalidSource(source.to_string()));
        }

        let url = match Url::parse(source) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                return Ok(LogoSource::File(PathBuf::from(source)))
            }
            Err(e) => {
                debug!("[LogoFetcher] Malformed logo source {:?}: {}", source, e);
                return Err(LogoError::InvalidSource(source.to_string()));
            }
        };

        match url.scheme() {
            "http" | "https" => match url.host_str() {
                Some(host) if !host.is_empty() => Ok(LogoSource::Http(url)),
                _ => Err(LogoError::InvalidSource(source.to_string())),
            },
            "file" => url
                .to_file_path()
                .map(LogoSource::File)
                .map_err(|_| LogoError::InvalidSource(source.to_string())),
            other => Err(LogoError::UnsupportedScheme(other.to_string())),
        }
    }
}

/// Logo fetcher configuration.
#[derive(Debug, Clone)]
pub struct LogoFetcherConfig {
    /// Per-item timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Largest accepted logo in bytes.
    pub max_bytes: usize,
}

impl Default for LogoFetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            max_bytes: 1024 * 1024,
        }
    }
}

/// A failed logo item.
#[derive(Debug, Clone)]
pub struct LogoFailure {
    pub slot: LogoSlot,
    pub source: String,
    pub error: String,
}

/// Outcome of a logo batch.
#[derive(Debug, Clone, Default)]
pub struct LogoFetchReport {
    pub stored: Vec<LogoSlot>,
    pub failed: Vec<LogoFailure>,
}

/// Handle to a running logo batch.
pub struct LogoFetchHandle {
    task: JoinHandle<LogoFetchReport>,
    cancel: CancellationToken,
}

impl LogoFetchHandle {
    /// Stop the batch. Items not yet started are reported as cancelled; an
    /// item in flight is abandoned.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the batch to finish.
    pub async fn join(self) -> Result<LogoFetchReport, LogoError> {
        self.task
            .await
            .map_err(|e| LogoError::TaskFailed(e.to_string()))
    }
}

impl std::fmt::Debug for LogoFetchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogoFetchHandle")
            .field("finished", &self.task.is_finished())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

/// Downloads logos into channel logo slots.
#[derive(Clone)]
pub struct LogoFetcher {
    database: DatabaseHandle,
    config: LogoFetcherConfig,
    #[cfg(feature = "http")]
    client: reqwest::Client,
}

impl LogoFetcher {
    pub fn new(database: DatabaseHandle, config: LogoFetcherConfig) -> Self {
        Self {
            database,
            config,
            #[cfg(feature = "http")]
            client: reqwest::Client::new(),
        }
    }

    /// Start fetching a batch on a background task.
    pub fn spawn(&self, requests: Vec<LogoRequest>) -> LogoFetchHandle {
        let cancel = CancellationToken::new();
        let fetcher = self.clone();
        let token = cancel.clone();
        let task = tokio::spawn(async move { fetcher.run(requests, token).await });
        LogoFetchHandle { task, cancel }
    }

    async fn run(self, requests: Vec<LogoRequest>, cancel: CancellationToken) -> LogoFetchReport {
        let mut report = LogoFetchReport::default();
        let total = requests.len();

        for request in requests {
            let result = if cancel.is_cancelled() {
                Err(LogoError::Cancelled)
            } else {
                tokio::select! {
                    _ = cancel.cancelled() => Err(LogoError::Cancelled),
                    r = self.fetch_one(&request) => r,
                }
            };

            match result {
                Ok(size) => {
                    debug!("[LogoFetcher] Stored {} bytes from {} to {}", size, request.source, request.slot);
                    report.stored.push(request.slot);
                }
                Err(e) => {
                    if !matches!(e, LogoError::Cancelled) {
                        warn!("[LogoFetcher] Failed to write {} to {}: {}", request.source, request.slot, e);
                    }
                    report.failed.push(LogoFailure {
                        slot: request.slot,
                        source: request.source,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            "[LogoFetcher] Batch done: {} stored, {} failed of {}",
            report.stored.len(),
            report.failed.len(),
            total
        );
        report
    }

    /// Fetch one logo and store it. Returns the stored size.
    pub async fn fetch_one(&self, request: &LogoRequest) -> Result<usize, LogoError> {
        let source = LogoSource::parse(&request.source)?;

        let data = match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, self.read_source(&source))
                .await
                .map_err(|_| LogoError::Timeout(limit))??,
            None => self.read_source(&source).await?,
        };

        let db = self.database.lock().await;
        db.write_logo(request.slot, Some(&request.source), &data)?;
        Ok(data.len())
    }

    async fn read_source(&self, source: &LogoSource) -> Result<Vec<u8>, LogoError> {
        match source {
            LogoSource::File(path) => self.read_file(path).await,
            #[cfg(feature = "http")]
            LogoSource::Http(url) => self.read_http(url).await,
            #[cfg(not(feature = "http"))]
            LogoSource::Http(_) => Err(LogoError::UnsupportedScheme("http".to_string())),
        }
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, LogoError> {
        let mut file = tokio::fs::File::open(path).await?;
        let mut data = Vec::new();
        let mut buf = vec![0u8; READ_CHUNK_SIZE];
        loop {
            let n = file.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            self.append_limited(&mut data, &buf[..n])?;
        }
        Ok(data)
    }

    #[cfg(feature = "http")]
    async fn read_http(&self, url: &Url) -> Result<Vec<u8>, LogoError> {
        let response = self.client.get(url.clone()).send().await?.error_for_status()?;
        let mut stream = response.bytes_stream();
        let mut data = Vec::new();
        while let Some(chunk) = stream.next().await {
            self.append_limited(&mut data, &chunk?)?;
        }
        Ok(data)
    }

    fn append_limited(&self, data: &mut Vec<u8>, chunk: &[u8]) -> Result<(), LogoError> {
        if data.len() + chunk.len() > self.config.max_bytes {
            return Err(LogoError::TooLarge {
                limit: self.config.max_bytes,
            });
        }
        data.extend_from_slice(chunk);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use livechannel_types::Channel;
    use std::sync::Arc;

    async fn setup(count: usize) -> (DatabaseHandle, Vec<LogoSlot>) {
        let db = Database::open_in_memory().unwrap();
        let slots = (0..count)
            .map(|i| {
                let mut ch = Channel::new(i as i32, 1, 1);
                ch.input_id = Some("input".to_string());
                LogoSlot::for_channel(db.insert_channel(&ch).unwrap())
            })
            .collect();
        (Arc::new(tokio::sync::Mutex::new(db)), slots)
    }

    fn write_source(dir: &tempfile::TempDir, name: &str, data: &[u8]) -> String {
        let path = dir.path().join(name);
        std::fs::write(&path, data).unwrap();
        format!("file://{}", path.display())
    }

    #[test]
    fn test_parse_source() {
        assert_eq!(
            LogoSource::parse("http://x/y.png").unwrap(),
            LogoSource::Http(Url::parse("http://x/y.png").unwrap())
        );
        assert_eq!(
            LogoSource::parse("file:///tmp/a.png").unwrap(),
            LogoSource::File(PathBuf::from("/tmp/a.png"))
        );
        assert_eq!(
            LogoSource::parse("logos/a.png").unwrap(),
            LogoSource::File(PathBuf::from("logos/a.png"))
        );
        assert!(matches!(LogoSource::parse(""), Err(LogoError::InvalidSource(_))));
        assert!(matches!(LogoSource::parse("http://"), Err(LogoError::InvalidSource(_))));
        assert!(matches!(LogoSource::parse("ftp://x/y.png"), Err(LogoError::UnsupportedScheme(s)) if s == "ftp"));
    }

    #[cfg(unix)]
    #[test]
    fn test_parse_file_url_host_and_escapes() {
        assert_eq!(
            LogoSource::parse("file://localhost/tmp/a.png").unwrap(),
            LogoSource::File(PathBuf::from("/tmp/a.png"))
        );
        assert_eq!(
            LogoSource::parse("file:///tmp/my%20logo.png").unwrap(),
            LogoSource::File(PathBuf::from("/tmp/my logo.png"))
        );
        assert!(matches!(
            LogoSource::parse("file://fileserver/share/a.png"),
            Err(LogoError::InvalidSource(_))
        ));
    }

    #[test]
    fn test_parse_rejects_malformed_http() {
        for source in ["http://exa mple.com/y.png", "http://x:notaport/y.png"] {
            assert!(
                matches!(LogoSource::parse(source), Err(LogoError::InvalidSource(_))),
                "{} should be rejected",
                source
            );
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_fetch_percent_encoded_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("my logo.png");
        std::fs::write(&path, b"spaced").unwrap();
        let source = Url::from_file_path(&path).unwrap().to_string();
        assert!(source.contains("%20"));

        let (db, slots) = setup(1).await;
        let fetcher = LogoFetcher::new(db.clone(), LogoFetcherConfig::default());
        let size = fetcher
            .fetch_one(&LogoRequest { slot: slots[0], source })
            .await
            .unwrap();

        assert_eq!(size, 6);
        assert_eq!(db.lock().await.read_logo(slots[0]).unwrap().unwrap(), b"spaced".to_vec());
    }

    #[tokio::test]
    async fn test_batch_stores_logos() {
        let dir = tempfile::tempdir().unwrap();
        let (db, slots) = setup(2).await;
        let fetcher = LogoFetcher::new(db.clone(), LogoFetcherConfig::default());

        let requests = vec![
            LogoRequest { slot: slots[0], source: write_source(&dir, "a.png", b"logo-a") },
            LogoRequest { slot: slots[1], source: write_source(&dir, "b.png", b"logo-bb") },
        ];

        let report = fetcher.spawn(requests).join().await.unwrap();
        assert_eq!(report.stored, slots);
        assert!(report.failed.is_empty());

        let db = db.lock().await;
        assert_eq!(db.read_logo(slots[0]).unwrap().unwrap(), b"logo-a".to_vec());
        assert_eq!(db.read_logo(slots[1]).unwrap().unwrap(), b"logo-bb".to_vec());
    }

    #[tokio::test]
    async fn test_bad_item_does_not_abort_batch() {
        let dir = tempfile::tempdir().unwrap();
        let (db, slots) = setup(3).await;
        let fetcher = LogoFetcher::new(db.clone(), LogoFetcherConfig::default());

        let requests = vec![
            LogoRequest { slot: slots[0], source: "http://x:notaport/y.png".to_string() },
            LogoRequest { slot: slots[1], source: format!("file://{}", dir.path().join("missing.png").display()) },
            LogoRequest { slot: slots[2], source: write_source(&dir, "c.png", b"logo-c") },
        ];

        let report = fetcher.spawn(requests).join().await.unwrap();
        assert_eq!(report.stored, vec![slots[2]]);
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.failed[0].slot, slots[0]);
        assert!(db.lock().await.read_logo(slots[0]).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_channel_row_fails_item() {
        let dir = tempfile::tempdir().unwrap();
        let (db, _) = setup(0).await;
        let fetcher = LogoFetcher::new(db, LogoFetcherConfig::default());

        let request = LogoRequest {
            slot: LogoSlot::for_channel(404),
            source: write_source(&dir, "a.png", b"logo"),
        };
        assert!(matches!(fetcher.fetch_one(&request).await, Err(LogoError::Store(_))));
    }

    #[tokio::test]
    async fn test_oversized_logo_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (db, slots) = setup(1).await;
        let config = LogoFetcherConfig { timeout: None, max_bytes: 4 };
        let fetcher = LogoFetcher::new(db, config);

        let request = LogoRequest { slot: slots[0], source: write_source(&dir, "big.png", b"too-large") };
        assert!(matches!(
            fetcher.fetch_one(&request).await,
            Err(LogoError::TooLarge { limit: 4 })
        ));
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let dir = tempfile::tempdir().unwrap();
        let (db, slots) = setup(2).await;
        let fetcher = LogoFetcher::new(db.clone(), LogoFetcherConfig::default());

        let requests = slots
            .iter()
            .map(|slot| LogoRequest { slot: *slot, source: write_source(&dir, "a.png", b"logo") })
            .collect();

        // The current-thread test runtime does not start the task until we await.
        let handle = fetcher.spawn(requests);
        handle.cancel();
        let report = handle.join().await.unwrap();

        assert!(report.stored.is_empty());
        assert_eq!(report.failed.len(), 2);
        assert!(report.failed.iter().all(|f| f.error == "Cancelled"));
        assert!(db.lock().await.read_logo(slots[0]).unwrap().is_none());
    }
}

//! Channel list reconciliation.
//!
//! Brings the rows of one input in the channel store in line with a desired
//! channel list:
//!
//! 1. Read row id + natural key of every existing row of the input
//! 2. Plan: match each desired channel to an unused row with the same
//!    natural key (update) or mark it for insertion
//! 3. Apply the plan row by row, collecting logo requests for written rows
//!
//! Planning is a pure function of the existing keys and the desired list.
//! Applying is best-effort: a failed row write is logged and counted, and the
//! remaining rows are still written. Nothing is rolled back.

use std::collections::{HashMap, HashSet, VecDeque};

use livechannel_types::columns::TYPE_OTHER;
use livechannel_types::types::non_empty;
use livechannel_types::{Channel, NaturalKey};
use log::{debug, info, warn};
use thiserror::Error;

use crate::database::{self, ChannelKeyRow, Database, DatabaseError, LogoSlot};
use crate::logo_fetcher::LogoRequest;

/// Reconciliation errors. Only raised before any row is written.
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Failed to query existing channels: {0}")]
    Store(#[from] DatabaseError),

    #[error("Duplicate natural key {0} in desired channel list")]
    DuplicateKey(NaturalKey),

    #[error("Input id must not be empty")]
    EmptyInputId,
}

/// Channel store operations needed by the reconciler.
pub trait ChannelStore {
    fn query_channel_keys(&self, input_id: &str) -> database::Result<Vec<ChannelKeyRow>>;
    fn insert_channel(&mut self, channel: &Channel) -> database::Result<i64>;
    fn update_channel(&mut self, id: i64, channel: &Channel) -> database::Result<bool>;
    fn delete_channels(&mut self, ids: &[i64]) -> database::Result<usize>;
}

impl ChannelStore for Database {
    fn query_channel_keys(&self, input_id: &str) -> database::Result<Vec<ChannelKeyRow>> {
        Database::query_channel_keys(self, input_id)
    }

    fn insert_channel(&mut self, channel: &Channel) -> database::Result<i64> {
        Database::insert_channel(self, channel)
    }

    fn update_channel(&mut self, id: i64, channel: &Channel) -> database::Result<bool> {
        Database::update_channel(self, id, channel)
    }

    fn delete_channels(&mut self, ids: &[i64]) -> database::Result<usize> {
        Database::delete_channels(self, ids)
    }
}

/// What to do with existing rows that no desired channel matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Leave them in the store.
    #[default]
    Keep,
    /// Delete them in one batch after all writes.
    Delete,
}

/// What to do when the desired list repeats a natural key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Keep the first occurrence, skip the rest.
    #[default]
    FirstWins,
    /// Fail the whole call before writing anything.
    Reject,
}

/// Reconciliation settings.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Package name written for channels that do not carry one.
    pub package_name: String,
    pub stale: StalePolicy,
    pub duplicates: DuplicatePolicy,
}

impl ReconcileOptions {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            stale: StalePolicy::default(),
            duplicates: DuplicatePolicy::default(),
        }
    }

    pub fn with_stale(mut self, stale: StalePolicy) -> Self {
        self.stale = stale;
        self
    }

    pub fn with_duplicates(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }
}

/// One planned row write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteAction {
    Insert { channel: Channel },
    Update { id: i64, channel: Channel },
}

impl WriteAction {
    pub fn channel(&self) -> &Channel {
        match self {
            WriteAction::Insert { channel } | WriteAction::Update { channel, .. } => channel,
        }
    }
}

/// Match-or-insert decisions for one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Writes in desired-list order.
    pub actions: Vec<WriteAction>,
    /// Existing rows no desired channel matched.
    pub unmatched: Vec<i64>,
    /// Rows to delete (empty unless [`StalePolicy::Delete`]).
    pub delete: Vec<i64>,
    /// Natural keys skipped because they were already in the desired list.
    pub duplicates: Vec<NaturalKey>,
}

/// Outcome of applying a plan.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    pub failed: usize,
    pub duplicates: Vec<NaturalKey>,
    pub unmatched: Vec<i64>,
    /// Row ids of successful writes, in desired-list order.
    pub written: Vec<i64>,
    /// Logos to fetch for written rows.
    pub logos: Vec<LogoRequest>,
}

impl ReconcileReport {
    pub fn total_changes(&self) -> usize {
        self.inserted + self.updated + self.deleted
    }
}

/// Fill the columns a stored channel must not leave empty.
fn with_defaults(channel: &Channel, id: Option<i64>, input_id: &str, options: &ReconcileOptions) -> Channel {
    let mut out = channel.clone();
    out.id = id;
    out.input_id = Some(input_id.to_string());
    if non_empty(&out.package_name).is_none() {
        out.package_name = Some(options.package_name.clone());
    }
    if non_empty(&out.channel_type).is_none() {
        out.channel_type = Some(TYPE_OTHER.to_string());
    }
    out
}

/// Decide, for every desired channel, whether it updates an existing row or
/// is inserted.
///
/// Existing rows are matched by natural key in encounter order and each row
/// is used at most once.
pub fn plan(
    input_id: &str,
    existing: &[ChannelKeyRow],
    desired: &[Channel],
    options: &ReconcileOptions,
) -> Result<ReconcilePlan, ReconcileError> {
    if input_id.is_empty() {
        return Err(ReconcileError::EmptyInputId);
    }

    let mut index: HashMap<NaturalKey, VecDeque<i64>> = HashMap::new();
    for row in existing {
        index.entry(row.key).or_default().push_back(row.id);
    }

    let mut seen = HashSet::new();
    let mut result = ReconcilePlan::default();

    for channel in desired {
        let key = channel.natural_key();
        if !seen.insert(key) {
            match options.duplicates {
                DuplicatePolicy::Reject => return Err(ReconcileError::DuplicateKey(key)),
                DuplicatePolicy::FirstWins => {
                    warn!("[Reconcile] Skipping duplicate channel {} for input {}", key, input_id);
                    result.duplicates.push(key);
                    continue;
                }
            }
        }

        let matched = index.get_mut(&key).and_then(VecDeque::pop_front);
        let action = match matched {
            Some(id) => WriteAction::Update {
                id,
                channel: with_defaults(channel, Some(id), input_id, options),
            },
            None => WriteAction::Insert {
                channel: with_defaults(channel, None, input_id, options),
            },
        };
        result.actions.push(action);
    }

    let mut unmatched: Vec<i64> = index.into_values().flatten().collect();
    unmatched.sort_unstable();
    if options.stale == StalePolicy::Delete {
        result.delete = unmatched.clone();
    }
    result.unmatched = unmatched;

    Ok(result)
}

/// Execute a plan against the store.
///
/// Row failures are logged and counted; they never stop the remaining writes.
pub fn apply<S: ChannelStore>(store: &mut S, plan: ReconcilePlan) -> ReconcileReport {
    let mut report = ReconcileReport {
        duplicates: plan.duplicates,
        unmatched: plan.unmatched,
        ..ReconcileReport::default()
    };

    for action in plan.actions {
        let written = match &action {
            WriteAction::Insert { channel } => match store.insert_channel(channel) {
                Ok(id) => {
                    debug!("[Reconcile] Added channel {:?} at {}", channel.display_name, id);
                    report.inserted += 1;
                    Some(id)
                }
                Err(e) => {
                    warn!("[Reconcile] Failed to insert channel {}: {}", channel, e);
                    None
                }
            },
            WriteAction::Update { id, channel } => match store.update_channel(*id, channel) {
                Ok(true) => {
                    debug!("[Reconcile] Updated channel {:?} at {}", channel.display_name, id);
                    report.updated += 1;
                    Some(*id)
                }
                Ok(false) => {
                    warn!("[Reconcile] Channel row {} disappeared before update", id);
                    None
                }
                Err(e) => {
                    warn!("[Reconcile] Failed to update channel {}: {}", channel, e);
                    None
                }
            },
        };

        let Some(id) = written else {
            report.failed += 1;
            continue;
        };

        report.written.push(id);
        if let Some(source) = action.channel().logo_source() {
            report.logos.push(LogoRequest {
                slot: LogoSlot::for_channel(id),
                source: source.to_string(),
            });
        }
    }

    if !plan.delete.is_empty() {
        match store.delete_channels(&plan.delete) {
            Ok(deleted) => report.deleted = deleted,
            Err(e) => {
                warn!("[Reconcile] Failed to delete {} stale channels: {}", plan.delete.len(), e);
                report.failed += plan.delete.len();
            }
        }
    }

    report
}

/// Reconcile the rows of `input_id` with `desired`.
pub fn reconcile<S: ChannelStore>(
    store: &mut S,
    input_id: &str,
    desired: &[Channel],
    options: &ReconcileOptions,
) -> Result<ReconcileReport, ReconcileError> {
    let existing = store.query_channel_keys(input_id)?;
    let plan = plan(input_id, &existing, desired, options)?;
    let report = apply(store, plan);

    info!(
        "[Reconcile] input={} inserted={} updated={} deleted={} failed={} logos={}",
        input_id,
        report.inserted,
        report.updated,
        report.deleted,
        report.failed,
        report.logos.len()
    );

    Ok(report)
}

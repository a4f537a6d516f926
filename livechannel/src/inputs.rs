//! Input source registry.
//!
//! The set of known input sources is published as immutable snapshots.
//! Change notifications are applied as a batch of [`InputEvent`]s which
//! produces a new snapshot; readers holding the previous snapshot keep a
//! consistent view.

use std::collections::BTreeMap;
use std::sync::Arc;

use livechannel_types::{InputSource, InputState};
use log::{debug, warn};
use tokio::sync::watch;

/// Immutable view of the registered input sources, ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    inputs: BTreeMap<String, InputSource>,
    version: u64,
}

impl InputSnapshot {
    pub fn from_inputs(inputs: impl IntoIterator<Item = InputSource>) -> Self {
        Self {
            inputs: inputs.into_iter().map(|i| (i.id.clone(), i)).collect(),
            version: 0,
        }
    }

    pub fn get(&self, id: &str) -> Option<&InputSource> {
        self.inputs.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inputs.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputSource> {
        self.inputs.values()
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Number of event batches applied since the registry was created.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Display label of an input, falling back to its id.
    pub fn label<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map(|i| i.label.as_str()).unwrap_or(id)
    }

    /// Return a new snapshot with `events` applied in order.
    pub fn apply(&self, events: &[InputEvent]) -> Self {
        let mut inputs = self.inputs.clone();
        for event in events {
            match event {
                InputEvent::Added(input) | InputEvent::Updated(input) => {
                    debug!("[Inputs] Upsert input {}", input.id);
                    inputs.insert(input.id.clone(), input.clone());
                }
                InputEvent::Removed(id) => {
                    if inputs.remove(id).is_none() {
                        debug!("[Inputs] Remove of unknown input {}", id);
                    }
                }
                InputEvent::StateChanged { id, state } => match inputs.get_mut(id) {
                    Some(input) => input.state = *state,
                    None => warn!("[Inputs] State change for unknown input {}", id),
                },
            }
        }
        Self {
            inputs,
            version: self.version + 1,
        }
    }
}

/// Change notification for the input source set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Added(InputSource),
    Updated(InputSource),
    Removed(String),
    StateChanged { id: String, state: InputState },
}

/// Publishes input snapshots to subscribers.
pub struct InputRegistry {
    sender: watch::Sender<Arc<InputSnapshot>>,
}

impl InputRegistry {
    pub fn new(initial: InputSnapshot) -> Self {
        let (sender, _) = watch::channel(Arc::new(initial));
        Self { sender }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<InputSnapshot> {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<InputSnapshot>> {
        self.sender.subscribe()
    }

    /// Apply a batch of events and publish the resulting snapshot.
    pub fn apply(&self, events: &[InputEvent]) -> Arc<InputSnapshot> {
        let mut published = None;
        self.sender.send_modify(|current| {
            let next = Arc::new(current.apply(events));
            *current = next.clone();
            published = Some(next);
        });
        published.unwrap_or_else(|| self.snapshot())
    }
}

impl Default for InputRegistry {
    fn default() -> Self {
        Self::new(InputSnapshot::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuner() -> InputSource {
        InputSource::new("com.example/.Tuner", "Tuner")
    }

    #[test]
    fn test_snapshot_apply_does_not_mutate_original() {
        let base = InputSnapshot::from_inputs([tuner()]);
        let next = base.apply(&[
            InputEvent::Added(InputSource::new("com.example/.Hdmi", "HDMI 1")),
            InputEvent::StateChanged {
                id: "com.example/.Tuner".to_string(),
                state: InputState::Disconnected,
            },
        ]);

        assert_eq!(base.len(), 1);
        assert_eq!(base.get("com.example/.Tuner").unwrap().state, InputState::Connected);
        assert_eq!(next.len(), 2);
        assert_eq!(next.get("com.example/.Tuner").unwrap().state, InputState::Disconnected);
        assert_eq!(next.version(), base.version() + 1);
    }

    #[test]
    fn test_update_and_remove() {
        let base = InputSnapshot::from_inputs([tuner()]);
        let mut renamed = tuner();
        renamed.label = "Antenna".to_string();

        let next = base.apply(&[InputEvent::Updated(renamed)]);
        assert_eq!(next.label("com.example/.Tuner"), "Antenna");

        let next = next.apply(&[
            InputEvent::Removed("com.example/.Tuner".to_string()),
            InputEvent::Removed("missing".to_string()),
        ]);
        assert!(next.is_empty());
        assert_eq!(next.label("com.example/.Tuner"), "com.example/.Tuner");
    }

    #[tokio::test]
    async fn test_registry_publishes_snapshots() {
        let registry = InputRegistry::new(InputSnapshot::from_inputs([tuner()]));
        let mut rx = registry.subscribe();
        let before = registry.snapshot();

        let published = registry.apply(&[InputEvent::Removed("com.example/.Tuner".to_string())]);

        rx.changed().await.unwrap();
        assert!(rx.borrow().is_empty());
        assert!(published.is_empty());
        assert_eq!(before.len(), 1);
        assert!(Arc::ptr_eq(&published, &registry.snapshot()));
    }
}

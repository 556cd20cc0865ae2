//! History entries, status and change notifications.

use serde::{Deserialize, Serialize};

use crate::layer::model::{Layer, Metadata};

/// Kind tag of a history entry. Only whole-canvas updates exist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryKind {
    /// Whole-canvas snapshot.
    #[default]
    Update,
}

/// One snapshot of the canvas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Entry kind, serialized as `type`.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Canvas-space layers, structural types removed.
    pub objects: Vec<Layer>,
    /// Side-channel values attached with `amend`; never inherited by later entries.
    #[serde(default)]
    pub extras: Metadata,
}

impl HistoryEntry {
    /// Entry without extras.
    pub fn new(objects: Vec<Layer>) -> Self {
        Self {
            kind: EntryKind::Update,
            objects,
            extras: Metadata::new(),
        }
    }
}

/// Read-only view of the log.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistoryStatus {
    /// `index > 0`.
    pub has_undo: bool,
    /// `index < history.len() - 1`.
    pub has_redo: bool,
    /// Current entry.
    pub index: usize,
    /// Every entry, oldest first.
    pub history: Vec<HistoryEntry>,
}

impl HistoryStatus {
    /// Entry at the current index.
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.history.get(self.index)
    }
}

/// Broadcast notifications.
#[derive(Clone, Debug)]
pub enum HistoryEvent {
    /// A new entry was appended.
    Saved,
    /// Index or length changed.
    Changed(HistoryStatus),
    /// The canvas was rebuilt from this entry.
    Restored(HistoryEntry),
}

impl HistoryEvent {
    /// Stable event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Saved => "history:saved",
            Self::Changed(_) => "history:changed",
            Self::Restored(_) => "history:restored",
        }
    }
}

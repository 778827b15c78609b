// events.rs — Selection change events and subscribers.
//
// Every screen that displays the selection subscribes to the store. The
// store emits an event after each hydration, write, and reset, and every
// subscriber sees it before the triggering call returns.
//
// Subscriber errors are logged and never stop the write or the other
// subscribers.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::bridge::SelectionTier;
use crate::error::SlotError;
use crate::goal::GoalSelection;

/// Handle returned by `SelectionStore::subscribe`.
pub type SubscriptionId = Uuid;

/// Events emitted by the SelectionStore.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum SelectionEvent {
    /// The store was seeded from persisted tiers at cold start.
    Hydrated {
        selection: GoalSelection,
        tier: SelectionTier,
        timestamp: DateTime<Utc>,
    },

    /// A write replaced the selection.
    Changed {
        previous: GoalSelection,
        current: GoalSelection,
        timestamp: DateTime<Utc>,
    },

    /// The selection was explicitly cleared everywhere.
    Reset { timestamp: DateTime<Utc> },
}

impl SelectionEvent {
    pub fn event_type(&self) -> &str {
        match self {
            SelectionEvent::Hydrated { .. } => "hydrated",
            SelectionEvent::Changed { .. } => "changed",
            SelectionEvent::Reset { .. } => "reset",
        }
    }

    /// The selection as of this event.
    pub fn selection(&self) -> GoalSelection {
        match self {
            SelectionEvent::Hydrated { selection, .. } => selection.clone(),
            SelectionEvent::Changed { current, .. } => current.clone(),
            SelectionEvent::Reset { .. } => GoalSelection::empty(),
        }
    }

    pub fn hydrated(selection: &GoalSelection, tier: SelectionTier) -> Self {
        SelectionEvent::Hydrated {
            selection: selection.clone(),
            tier,
            timestamp: Utc::now(),
        }
    }

    pub fn changed(previous: &GoalSelection, current: &GoalSelection) -> Self {
        SelectionEvent::Changed {
            previous: previous.clone(),
            current: current.clone(),
            timestamp: Utc::now(),
        }
    }

    pub fn reset() -> Self {
        SelectionEvent::Reset {
            timestamp: Utc::now(),
        }
    }
}

/// Receives selection events.
pub trait SelectionSubscriber: Send {
    fn notify(&self, event: &SelectionEvent) -> Result<(), SlotError>;
}

/// Adapts a closure into a subscriber.
pub struct CallbackSubscriber<F>(pub F);

impl<F> SelectionSubscriber for CallbackSubscriber<F>
where
    F: Fn(&SelectionEvent) + Send,
{
    fn notify(&self, event: &SelectionEvent) -> Result<(), SlotError> {
        (self.0)(event);
        Ok(())
    }
}

/// Appends events as JSON lines to a file.
///
/// Each line carries the log's session id and a per-session sequence
/// number next to the event fields, so lines written by separate processes
/// sharing one file can be told apart and ordered.
pub struct JsonlEventLog {
    path: PathBuf,
    session: Uuid,
    inner: Mutex<LogWriter>,
}

struct LogWriter {
    out: BufWriter<File>,
    seq: u64,
}

#[derive(Serialize)]
struct LogLine<'a> {
    session: Uuid,
    seq: u64,
    #[serde(flatten)]
    event: &'a SelectionEvent,
}

impl JsonlEventLog {
    /// Open `path` for appending, creating it and its parent directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SlotError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_error(&path))?;
        Ok(Self {
            session: Uuid::new_v4(),
            inner: Mutex::new(LogWriter {
                out: BufWriter::new(file),
                seq: 0,
            }),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn session(&self) -> Uuid {
        self.session
    }
}

impl SelectionSubscriber for JsonlEventLog {
    fn notify(&self, event: &SelectionEvent) -> Result<(), SlotError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| SlotError::Unavailable("event log lock poisoned".to_string()))?;
        inner.seq += 1;
        let line = LogLine {
            session: self.session,
            seq: inner.seq,
            event,
        };
        serde_json::to_writer(&mut inner.out, &line)?;
        // Flushed per event: the CLI exits right after the write it logs.
        inner.out.write_all(b"\n").map_err(io_error(&self.path))?;
        inner.out.flush().map_err(io_error(&self.path))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SlotError {
    let path = path.display().to_string();
    move |source| SlotError::IoError { path, source }
}

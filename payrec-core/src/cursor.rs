//! Event cursor store.

use std::path::PathBuf;
use tracing::warn;

/// Last-consumed position in the payout event log.
///
/// Single-writer: only the reconciler mutates it, and only forward.
/// When constructed with a persistence path, the cursor reloads its
/// value at startup so a restart does not re-scan the log from the
/// beginning. Persistence is best-effort; a write failure degrades to
/// in-memory behavior and is logged, never propagated.
#[derive(Debug, Default)]
pub struct EventCursor {
    last_seen: Option<u64>,
    persist_path: Option<PathBuf>,
}

impl EventCursor {
    /// In-memory cursor, starting at the beginning of the log.
    pub fn new() -> Self {
        Self::default()
    }

    /// File-backed cursor. An unreadable or corrupt cursor file is
    /// ignored (the cursor starts unset) rather than failing startup.
    pub fn with_persistence(path: PathBuf) -> Self {
        let last_seen = match std::fs::read_to_string(&path) {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ignoring corrupt cursor file");
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read cursor file");
                None
            }
        };
        Self {
            last_seen,
            persist_path: Some(path),
        }
    }

    /// The last-seen sequence number, or `None` if nothing has been
    /// consumed yet.
    pub fn current(&self) -> Option<u64> {
        self.last_seen
    }

    /// Advance the cursor to `to`. The cursor only moves forward.
    pub fn advance(&mut self, to: u64) {
        debug_assert!(
            self.last_seen.is_none_or(|current| to >= current),
            "cursor moved backwards: {:?} -> {to}",
            self.last_seen
        );
        self.last_seen = Some(to);

        if let Some(path) = &self.persist_path {
            if let Err(e) = std::fs::write(path, to.to_string()) {
                warn!(path = %path.display(), error = %e, "Failed to persist cursor");
            }
        }
    }
}

//! History persistence and capacity enforcement.

use crate::history::{HistoryEntry, MS_PER_DAY, RecencyBuckets, start_of_today_ms};
use crate::storage::StorageBackend;
use tracing::warn;

/// Snapshot key in the backing store.
const HISTORY_KEY: &str = "history";

/// Max history entries to keep.
pub const MAX_HISTORY: usize = 10;

/// Millisecond clock, injectable so id assignment and bucketing are
/// deterministic in tests.
pub trait Clock: Send {
    fn now_ms(&self) -> i64;
}

/// Wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Capacity-bounded, chronologically ordered cache of past generation
/// results.
///
/// The in-memory collection is the source of truth; every mutation rewrites
/// the full durable snapshot. Persistence failures are warned and do not
/// block the in-memory update, so behavior stays consistent within a session
/// even when the snapshot could not be written.
pub struct HistoryStore {
    storage: Box<dyn StorageBackend>,
    clock: Box<dyn Clock>,
    entries: Vec<HistoryEntry>,
    last_id: i64,
}

impl HistoryStore {
    /// Open a store, hydrating from the backing storage.
    ///
    /// An absent or unreadable snapshot yields an empty collection; startup
    /// never fails on bad history data.
    pub fn open(storage: Box<dyn StorageBackend>) -> Self {
        Self::with_clock(storage, Box::new(SystemClock))
    }

    pub fn with_clock(storage: Box<dyn StorageBackend>, clock: Box<dyn Clock>) -> Self {
        let mut entries = match storage.read(HISTORY_KEY) {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<HistoryEntry>>(&bytes) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("discarding unparseable history snapshot: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("failed to read history snapshot: {e}");
                Vec::new()
            }
        };

        // Most recent first; a hand-edited snapshot cannot break the
        // ordering invariant.
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries.truncate(MAX_HISTORY);

        let last_id = entries.iter().map(|e| e.id).max().unwrap_or(0);

        Self {
            storage,
            clock,
            entries,
            last_id,
        }
    }

    /// All entries, most recent first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Insert a new entry at the front, evicting the oldest beyond
    /// [`MAX_HISTORY`], and persist the resulting snapshot.
    ///
    /// Ids are time-derived and strictly increasing, so an id is never
    /// reused even after deletion or under a frozen clock.
    pub fn add(&mut self, source_url: &str, generated_text: &str) -> HistoryEntry {
        let now = self.clock.now_ms();
        let id = now.max(self.last_id + 1);
        self.last_id = id;

        let entry = HistoryEntry {
            id,
            source_url: source_url.to_string(),
            generated_text: generated_text.to_string(),
            created_at: now,
        };

        self.entries.insert(0, entry.clone());
        self.entries.truncate(MAX_HISTORY);
        self.persist();

        entry
    }

    /// Remove the entry with the given id, if present, and persist.
    ///
    /// An absent id is a no-op on the collection, not an error. Remaining
    /// entries keep their order.
    pub fn remove(&mut self, id: i64) {
        self.entries.retain(|e| e.id != id);
        self.persist();
    }

    /// Partition the collection into recency groups relative to the
    /// caller-supplied current time.
    ///
    /// Pure with respect to store contents and `now_ms`: mutation history
    /// plays no part, so the same collection and instant always bucket the
    /// same way.
    pub fn bucket_by_recency(&self, now_ms: i64) -> RecencyBuckets {
        let day_start = start_of_today_ms(now_ms);
        let yesterday_start = day_start - MS_PER_DAY;
        let week_start = day_start - 7 * MS_PER_DAY;

        let mut buckets = RecencyBuckets::default();
        for entry in &self.entries {
            let group = if entry.created_at >= day_start {
                &mut buckets.today
            } else if entry.created_at >= yesterday_start {
                &mut buckets.yesterday
            } else if entry.created_at >= week_start {
                &mut buckets.last_7_days
            } else {
                &mut buckets.older
            };
            group.push(entry.clone());
        }
        buckets
    }

    fn persist(&mut self) {
        let bytes = match serde_json::to_vec(&self.entries) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("failed to serialize history snapshot: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.write(HISTORY_KEY, &bytes) {
            warn!("failed to persist history snapshot: {e}");
        }
    }
}

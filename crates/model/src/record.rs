use chrono::{DateTime, Utc};
use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

/// Stable identity assigned to a [`Record`] when it is minted, either by a
/// source reading from the messaging substrate or by a processor emitting a
/// derived record. The runtime keys every identity-sensitive map (the
/// processor driver's per-trial result map, the tracker's outstanding-count
/// map) by this value instead of relying on reference or structural
/// equality, so records remain trackable across (de)serialization at a
/// language boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(u64);

impl RecordId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rec-{}", self.0)
    }
}

static NEXT_RECORD_ID: AtomicU64 = AtomicU64::new(1);

/// Mints fresh, process-wide unique [`RecordId`]s.
///
/// A single counter is shared by every source and processor in the pod;
/// there is exactly one pod per process, so a global atomic is sufficient
/// and avoids threading a generator handle through every call site.
pub fn next_record_id() -> RecordId {
    RecordId(NEXT_RECORD_ID.fetch_add(1, Ordering::Relaxed))
}

/// Opaque unit of streaming data.
///
/// The runtime does not interpret `payload`, `key` or `headers`; it only
/// needs to move the record between collaborators and track it by
/// identity. `topic` and `timestamp` are carried for agents that want them
/// but are never inspected by the core loop.
#[derive(Debug, Clone)]
pub struct Record {
    id: RecordId,
    pub payload: serde_json::Value,
    pub key: Option<Vec<u8>>,
    pub headers: HashMap<String, String>,
    pub topic: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Record {
    /// Mints a new record with a fresh identity. This is the only
    /// constructor: records are never copied with their identity intact,
    /// matching the one-origin-per-record contract in the spec.
    pub fn new(payload: serde_json::Value) -> Self {
        Self {
            id: next_record_id(),
            payload,
            key: None,
            headers: HashMap::new(),
            topic: None,
            timestamp: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = Some(ts);
        self
    }

    pub fn id(&self) -> RecordId {
        self.id
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for Record {}

impl std::hash::Hash for Record {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

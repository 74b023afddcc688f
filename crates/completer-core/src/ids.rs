//! Thread and stage identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadId(pub(crate) String);

impl ThreadId {
    pub(crate) fn from_counter(n: u64) -> Self {
        Self(format!("thread-{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StageId(pub(crate) u64);

impl StageId {
    pub fn parse(raw: &str) -> Option<Self> {
        raw.parse::<u64>().ok().map(Self)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic allocator for stage ids within a single graph, starting at 1.
#[derive(Default)]
pub(crate) struct IdAllocator(AtomicU64);

impl IdAllocator {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn next(&self) -> StageId {
        StageId(self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_allocator_strictly_increasing() {
        let alloc = IdAllocator::new();
        assert_eq!(alloc.next().value(), 1);
        assert_eq!(alloc.next().value(), 2);
        assert_eq!(alloc.next().value(), 3);
    }

    #[test]
    fn stage_id_parse_roundtrip() {
        let id = StageId(42);
        assert_eq!(StageId::parse(&id.to_string()), Some(id));
        assert_eq!(StageId::parse("not-a-number"), None);
    }

    #[test]
    fn thread_id_textual_form() {
        let tid = ThreadId::from_counter(7);
        assert_eq!(tid.to_string(), "thread-7");
    }
}

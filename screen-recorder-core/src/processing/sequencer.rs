use std::collections::BTreeMap;

/// Restores delivery order for chunks whose bytes become available
/// asynchronously and possibly out of order.
///
/// Each chunk reserves a sequence number when the encoder announces it.
/// When its bytes arrive, `complete` releases every chunk that is now
/// contiguous with what has already been released. After `request_stop`,
/// `is_drained` turns true once every reserved chunk has been released.
#[derive(Debug, Default)]
pub struct ChunkSequencer {
    next_to_issue: u64,
    next_to_release: u64,
    pending: BTreeMap<u64, Vec<u8>>,
    stop_requested: bool,
}

impl ChunkSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next position in delivery order.
    pub fn reserve(&mut self) -> u64 {
        let seq = self.next_to_issue;
        self.next_to_issue += 1;
        seq
    }

    /// Record the bytes for `seq` and return every chunk now ready, in
    /// order. Empty chunks hold their slot but are not returned.
    pub fn complete(&mut self, seq: u64, data: Vec<u8>) -> Vec<Vec<u8>> {
        if seq < self.next_to_release || seq >= self.next_to_issue {
            log::warn!("ignoring chunk with unexpected sequence number {}", seq);
            return Vec::new();
        }
        self.pending.insert(seq, data);

        let mut ready = Vec::new();
        while let Some(data) = self.pending.remove(&self.next_to_release) {
            self.next_to_release += 1;
            if !data.is_empty() {
                ready.push(data);
            }
        }
        ready
    }

    /// The encoder has stopped; no more chunks will be reserved.
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// Chunks reserved but not yet released.
    pub fn in_flight(&self) -> u64 {
        self.next_to_issue - self.next_to_release
    }

    /// Stop was requested and every reserved chunk has been released.
    pub fn is_drained(&self) -> bool {
        self.stop_requested && self.in_flight() == 0
    }
}

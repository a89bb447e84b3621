/// Append-only buffer of encoded media chunks.
///
/// Chunks are kept exactly in the order they were pushed; `concat` joins
/// them in that order. Empty chunks are dropped on push.
#[derive(Debug, Default)]
pub struct ChunkBuffer {
    chunks: Vec<Vec<u8>>,
    total_bytes: usize,
}

impl ChunkBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk. Returns `false` if it was empty and ignored.
    pub fn push(&mut self, chunk: Vec<u8>) -> bool {
        if chunk.is_empty() {
            return false;
        }
        self.total_bytes += chunk.len();
        self.chunks.push(chunk);
        true
    }

    /// Number of chunks buffered.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Join all chunks in arrival order and leave the buffer empty.
    pub fn take_concat(&mut self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.total_bytes);
        for chunk in self.chunks.drain(..) {
            out.extend_from_slice(&chunk);
        }
        self.total_bytes = 0;
        out
    }

    /// Discard all buffered chunks.
    pub fn reset(&mut self) {
        self.chunks.clear();
        self.total_bytes = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_preserves_order() {
        let mut buf = ChunkBuffer::new();
        buf.push(vec![1, 2]);
        buf.push(vec![3]);
        buf.push(vec![4, 5, 6]);

        assert_eq!(buf.len(), 3);
        assert_eq!(buf.total_bytes(), 6);
        assert_eq!(buf.take_concat(), vec![1, 2, 3, 4, 5, 6]);
        assert!(buf.is_empty());
        assert_eq!(buf.total_bytes(), 0);
    }

    #[test]
    fn empty_chunks_are_ignored() {
        let mut buf = ChunkBuffer::new();
        assert!(!buf.push(Vec::new()));
        assert!(buf.is_empty());
        assert!(buf.push(vec![9]));
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn reset_clears_buffer() {
        let mut buf = ChunkBuffer::new();
        buf.push(vec![1, 2, 3]);
        buf.reset();

        assert!(buf.is_empty());
        assert_eq!(buf.total_bytes(), 0);
        assert!(buf.take_concat().is_empty());
    }
}

use std::cmp::min;

/// A fixed-capacity, flow-controlled byte buffer connecting the application to the sender.
///
/// The application pushes bytes at the write cursor and eventually closes the stream; the
///  sender peeks and pops bytes at the read cursor to frame segments. Both cursors are
///  monotonic absolute byte counts, so they double as the cumulative pushed/popped totals.
///  Storage is a single pre-allocated ring indexed modulo `capacity`.
///
/// Backpressure is not an error: a `push` that exceeds the available capacity is silently
///  truncated, and the caller can see the limit via [`available_capacity`](Self::available_capacity).
pub struct ByteStream {
    storage: Vec<u8>,
    capacity: usize,
    writer_cursor: u64,
    reader_cursor: u64,
    closed: bool,
    error: bool,
}

impl ByteStream {
    pub fn new(capacity: usize) -> ByteStream {
        assert!(capacity > 0, "stream capacity must be positive");

        ByteStream {
            storage: vec![0; capacity],
            capacity,
            writer_cursor: 0,
            reader_cursor: 0,
            closed: false,
            error: false,
        }
    }

    /// Append as much of `data` as fits, returning the number of bytes accepted.
    pub fn push(&mut self, data: &[u8]) -> usize {
        let accepted = min(data.len(), self.available_capacity());
        if accepted == 0 {
            return 0;
        }

        let start = (self.writer_cursor % self.capacity as u64) as usize;
        let first_run = min(accepted, self.capacity - start);
        self.storage[start..start + first_run].copy_from_slice(&data[..first_run]);
        self.storage[..accepted - first_run].copy_from_slice(&data[first_run..accepted]);

        self.writer_cursor += accepted as u64;
        self.check_invariants();
        accepted
    }

    /// The writer declares that no more data will be pushed. Idempotent.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Mark the stream as abnormally terminated. Once set, the flag is never cleared.
    pub fn set_error(&mut self) {
        self.error = true;
    }

    pub fn has_error(&self) -> bool {
        self.error
    }

    /// A contiguous view of the next buffered bytes, without consuming them.
    ///
    /// NB: This returns fewer bytes than [`bytes_buffered`](Self::bytes_buffered) only when the
    ///      buffered data wraps past the end of the ring, in which case it is the first
    ///      contiguous run and a subsequent pop+peek yields the rest.
    pub fn peek(&self) -> &[u8] {
        let buffered = self.bytes_buffered();
        let start = (self.reader_cursor % self.capacity as u64) as usize;
        let run = min(buffered, self.capacity - start);
        &self.storage[start..start + run]
    }

    /// Discard up to `len` bytes from the front of the buffer.
    pub fn pop(&mut self, len: usize) {
        let popped = min(len, self.bytes_buffered());
        self.reader_cursor += popped as u64;
        self.check_invariants();
    }

    pub fn available_capacity(&self) -> usize {
        self.capacity - self.bytes_buffered()
    }

    pub fn bytes_buffered(&self) -> usize {
        (self.writer_cursor - self.reader_cursor) as usize
    }

    /// Closed and fully drained?
    pub fn is_finished(&self) -> bool {
        self.closed && self.bytes_buffered() == 0
    }

    /// Cumulative bytes ever pushed.
    pub fn bytes_pushed(&self) -> u64 {
        self.writer_cursor
    }

    /// Cumulative bytes ever popped.
    pub fn bytes_popped(&self) -> u64 {
        self.reader_cursor
    }

    fn check_invariants(&self) {
        debug_assert!(self.writer_cursor >= self.reader_cursor);
        debug_assert!(self.writer_cursor - self.reader_cursor <= self.capacity as u64);
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use super::*;

    #[rstest]
    #[case::single_push(8, vec![b"abc".to_vec()], b"abc".to_vec())]
    #[case::two_pushes(8, vec![b"abc".to_vec(), b"de".to_vec()], b"abcde".to_vec())]
    #[case::exactly_full(4, vec![b"ab".to_vec(), b"cd".to_vec()], b"abcd".to_vec())]
    #[case::empty_push(4, vec![b"".to_vec(), b"xy".to_vec()], b"xy".to_vec())]
    fn test_push_then_drain(#[case] capacity: usize, #[case] pushes: Vec<Vec<u8>>, #[case] expected: Vec<u8>) {
        let mut stream = ByteStream::new(capacity);

        let mut total = 0;
        for data in &pushes {
            total += stream.push(data);
        }
        assert_eq!(total, expected.len());
        assert_eq!(stream.bytes_buffered(), expected.len());
        assert_eq!(stream.bytes_pushed(), expected.len() as u64);

        let mut drained = Vec::new();
        while stream.bytes_buffered() > 0 {
            let chunk = stream.peek().to_vec();
            assert!(!chunk.is_empty());
            drained.extend_from_slice(&chunk);
            stream.pop(chunk.len());
        }
        assert_eq!(drained, expected);
        assert_eq!(stream.bytes_popped(), expected.len() as u64);
    }

    #[rstest]
    #[case::overflowing_push(3, b"abcdef".to_vec(), 3, b"abc".to_vec())]
    #[case::second_push_truncated(4, b"abc".to_vec(), 4, b"abc".to_vec())]
    fn test_push_is_bounded(
        #[case] capacity: usize,
        #[case] data: Vec<u8>,
        #[case] expected_accepted_total: usize,
        #[case] expected_retained: Vec<u8>,
    ) {
        let mut stream = ByteStream::new(capacity);
        let mut accepted = stream.push(&data);
        accepted += stream.push(b"x");
        accepted += stream.push(b""); // no-op

        assert!(stream.bytes_buffered() <= capacity);
        assert_eq!(accepted, min(expected_accepted_total, capacity));

        let retained = if expected_retained.len() < capacity {
            let mut r = expected_retained.clone();
            r.push(b'x');
            r
        }
        else {
            expected_retained.clone()
        };
        assert_eq!(stream.peek(), &retained[..]);
    }

    #[rstest]
    fn test_wrap_around_preserves_order() {
        let mut stream = ByteStream::new(4);

        assert_eq!(stream.push(b"abcd"), 4);
        stream.pop(3);
        // writer is at 4, reader at 3, so this write wraps past the end of the ring
        assert_eq!(stream.push(b"efg"), 3);

        // first peek returns the run up to the end of the ring only
        assert_eq!(stream.peek(), b"d");
        stream.pop(1);
        assert_eq!(stream.peek(), b"efg");
        stream.pop(3);

        assert_eq!(stream.bytes_buffered(), 0);
        assert_eq!(stream.bytes_pushed(), 7);
        assert_eq!(stream.bytes_popped(), 7);
    }

    #[rstest]
    fn test_pop_is_clamped() {
        let mut stream = ByteStream::new(4);
        stream.push(b"ab");
        stream.pop(100);

        assert_eq!(stream.bytes_buffered(), 0);
        assert_eq!(stream.bytes_popped(), 2);
        assert_eq!(stream.available_capacity(), 4);
    }

    #[rstest]
    #[case::open_with_data(false, b"a".to_vec(), false)]
    #[case::closed_with_data(true, b"a".to_vec(), false)]
    #[case::closed_and_drained(true, vec![], true)]
    #[case::open_and_drained(false, vec![], false)]
    fn test_is_finished(#[case] close: bool, #[case] data: Vec<u8>, #[case] expected: bool) {
        let mut stream = ByteStream::new(4);
        stream.push(&data);
        if close {
            stream.close();
            stream.close(); // idempotent
        }

        assert_eq!(stream.is_closed(), close);
        assert_eq!(stream.is_finished(), expected);
    }

    #[rstest]
    fn test_error_flag_is_sticky() {
        let mut stream = ByteStream::new(4);
        assert!(!stream.has_error());

        stream.set_error();
        assert!(stream.has_error());

        // pushing and popping do not clear it
        stream.push(b"ab");
        stream.pop(2);
        assert!(stream.has_error());
    }
}

use crate::segment::Segment;

/// This is an abstraction for handing finished segments to the transport layer, introduced to
///  facilitate mocking the I/O part away for testing.
///
/// The transport owns all framing and encapsulation concerns; the sender's only contract is
///  that segments are handed over in strictly increasing sequence-number order, except for
///  retransmissions.
#[cfg_attr(test, mockall::automock)]
pub trait SegmentSink {
    fn send_segment(&mut self, segment: Segment);
}

/// Records every emitted segment, for assertions in tests.
#[cfg(test)]
pub struct RecordingSink {
    pub segments: Vec<Segment>,
}

#[cfg(test)]
impl RecordingSink {
    pub fn new() -> RecordingSink {
        RecordingSink { segments: Vec::new() }
    }

    /// Drain everything emitted since the last call.
    pub fn take(&mut self) -> Vec<Segment> {
        std::mem::take(&mut self.segments)
    }
}

#[cfg(test)]
impl SegmentSink for RecordingSink {
    fn send_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }
}

use std::collections::BTreeMap;
use crate::segment::Segment;

/// The set of sent-but-unacknowledged segments, keyed by absolute starting sequence number.
///
/// Segments are recorded in emission order and removed only when a cumulative acknowledgment
///  covers their entire span, so at all times the outstanding ranges plus the acknowledged
///  prefix cover everything sent, without gaps. Retransmission does not change an entry.
///
/// The retransmission candidate is always the entry with the smallest key; scanning the
///  ordered map for it is sufficient given bounded window sizes.
pub struct FlightTracker {
    outstanding: BTreeMap<u64, Segment>,
    bytes_in_flight: u64,
}

impl FlightTracker {
    pub fn new() -> FlightTracker {
        FlightTracker {
            outstanding: BTreeMap::default(),
            bytes_in_flight: 0,
        }
    }

    /// Record a freshly emitted segment starting at absolute sequence number `start`.
    pub fn record(&mut self, start: u64, segment: Segment) {
        self.bytes_in_flight += segment.sequence_length();
        let previous = self.outstanding.insert(start, segment);
        debug_assert!(previous.is_none(), "this is a bug: overlapping outstanding segments");
    }

    /// Remove every segment fully covered by the cumulative ack `ackno` (absolute).
    ///
    /// Returns true if at least one segment was newly acknowledged in full. A segment that is
    ///  only partially covered stays outstanding as a whole.
    pub fn ack_through(&mut self, ackno: u64) -> bool {
        let mut newly_acked = false;
        while let Some((&start, segment)) = self.outstanding.first_key_value() {
            if start + segment.sequence_length() > ackno {
                break;
            }
            let (_, acked) = self.outstanding.pop_first()
                .expect("this is a bug: first_key_value and pop_first disagree");
            self.bytes_in_flight -= acked.sequence_length();
            newly_acked = true;
        }
        newly_acked
    }

    /// The segment with the smallest starting sequence number, i.e. the retransmission candidate.
    pub fn oldest(&self) -> Option<&Segment> {
        self.outstanding.first_key_value().map(|(_, segment)| segment)
    }

    /// The absolute starting sequence number of the oldest outstanding segment, the send
    ///  buffer's low-water mark.
    pub fn lowest_outstanding(&self) -> Option<u64> {
        self.outstanding.keys().next().cloned()
    }

    pub fn bytes_in_flight(&self) -> u64 {
        self.bytes_in_flight
    }

    pub fn is_empty(&self) -> bool {
        self.outstanding.is_empty()
    }
}

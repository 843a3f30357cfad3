use bytes::Bytes;
use crate::seq_no::SeqNo;

/// An outbound segment, handed to the transport layer for encapsulation and delivery.
///
/// A segment occupies `syn + payload.len() + fin` sequence numbers. It is immutable once
///  emitted; a retransmission re-sends an identical copy (the payload is a cheaply clonable
///  [`Bytes`]).
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Segment {
    pub seqno: SeqNo,
    pub syn: bool,
    pub payload: Bytes,
    pub fin: bool,
}

impl Segment {
    /// The number of sequence numbers this segment occupies.
    pub fn sequence_length(&self) -> u64 {
        self.syn as u64 + self.payload.len() as u64 + self.fin as u64
    }
}

/// Feedback from the peer's receiving side.
#[derive(Copy, Clone, Debug)]
pub struct PeerFeedback {
    /// The cumulative acknowledgment: all sequence numbers below this are received. Absent
    ///  while the peer has not seen the SYN yet.
    pub ackno: Option<SeqNo>,
    /// The number of bytes the peer is currently willing to buffer beyond `ackno`.
    pub window_size: u16,
    /// The peer signalled abnormal termination.
    pub reset: bool,
}

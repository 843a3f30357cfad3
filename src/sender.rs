use std::cmp::min;
use std::time::Duration;
use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace, warn};

use crate::byte_stream::ByteStream;
use crate::config::SenderConfig;
use crate::flight::FlightTracker;
use crate::rto::RetransmissionTimer;
use crate::segment::{PeerFeedback, Segment};
use crate::seq_no::SeqNo;
use crate::transport::SegmentSink;

/// The connection lifecycle, made explicit so that illegal transitions (e.g. sending data
///  before the SYN is acknowledged) are unrepresentable rather than a flag combination.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SenderState {
    /// Nothing sent yet.
    Idle,
    /// The SYN is on the wire but not acknowledged. No data may be sent.
    SynSent,
    /// The SYN is acknowledged, data is flowing.
    Streaming,
    /// The FIN is on the wire but not yet acknowledged.
    FinSent,
    /// Everything up to and including the FIN is acknowledged.
    Done,
    /// The peer signalled a reset. Terminal; no further segments, ever.
    Errored,
}

/// The sending half of a reliable, ordered byte-stream connection.
///
/// The sender is a pure state machine advanced by exactly three triggers: [`push`](Self::push)
///  after the application wrote to (or closed) the outbound stream, [`receive`](Self::receive)
///  for inbound ack/window feedback, and [`tick`](Self::tick) carrying explicitly measured
///  elapsed time. None of these block; segments are handed to the given [`SegmentSink`] before
///  the call returns.
pub struct Sender {
    config: SenderConfig,
    state: SenderState,
    outbound: ByteStream,
    flight: FlightTracker,
    timer: RetransmissionTimer,
    /// absolute sequence number of the next byte to send
    next_seqno: u64,
    /// last window advertised by the peer; 1 until feedback arrives
    window_size: u16,
    consecutive_retransmissions: u32,
}

impl Sender {
    pub fn new(config: SenderConfig) -> Sender {
        Sender {
            outbound: ByteStream::new(config.capacity),
            flight: FlightTracker::new(),
            timer: RetransmissionTimer::new(config.initial_rto),
            config,
            state: SenderState::Idle,
            next_seqno: 0,
            window_size: 1,
            consecutive_retransmissions: 0,
        }
    }

    /// The outbound stream, for the application to push into and close.
    pub fn outbound_mut(&mut self) -> &mut ByteStream {
        &mut self.outbound
    }

    pub fn outbound(&self) -> &ByteStream {
        &self.outbound
    }

    pub fn state(&self) -> SenderState {
        self.state
    }

    pub fn bytes_in_flight(&self) -> u64 {
        self.flight.bytes_in_flight()
    }

    pub fn consecutive_retransmissions(&self) -> u32 {
        self.consecutive_retransmissions
    }

    /// Liveness signal: the configured retransmission ceiling was exceeded. The sender keeps
    ///  retransmitting regardless; tearing down the connection is the caller's decision.
    pub fn retransmission_limit_exceeded(&self) -> bool {
        self.consecutive_retransmissions > self.config.max_retransmissions
    }

    pub fn has_errored(&self) -> bool {
        self.state == SenderState::Errored || self.outbound.has_error()
    }

    /// The wire sequence number of the next byte to send.
    pub fn next_seqno(&self) -> SeqNo {
        SeqNo::wrap(self.next_seqno, self.config.isn)
    }

    /// The send buffer's low-water mark: the wire sequence number of the oldest unacknowledged
    ///  segment, if any.
    pub fn lowest_outstanding_seqno(&self) -> Option<SeqNo> {
        self.flight.lowest_outstanding()
            .map(|start| SeqNo::wrap(start, self.config.isn))
    }

    /// Frame and emit as many segments as the window allows. Called by the embedding endpoint
    ///  after the application pushed data or closed the stream; also called internally after
    ///  feedback freed up window space.
    pub fn push(&mut self, sink: &mut dyn SegmentSink) {
        if self.has_errored() {
            return;
        }
        match self.state {
            SenderState::Idle => self.send_syn(sink),
            SenderState::SynSent => {
                // handshake pending, data must wait for the SYN to be acknowledged
            }
            SenderState::Streaming => self.push_data(sink),
            SenderState::FinSent | SenderState::Done | SenderState::Errored => {}
        }
    }

    /// Process ack/window feedback from the peer, then try to send more.
    pub fn receive(&mut self, feedback: PeerFeedback, sink: &mut dyn SegmentSink) {
        if feedback.reset {
            debug!("peer signalled reset, shutting down the sender");
            self.outbound.set_error();
            self.state = SenderState::Errored;
            return;
        }
        if self.has_errored() {
            return;
        }

        let Some(ackno) = feedback.ackno else {
            // the peer has not seen our SYN, there is nothing to synchronize on yet
            trace!("feedback without an ackno, ignoring");
            return;
        };
        let ackno = ackno.unwrap(self.config.isn, self.next_seqno);

        // everything below ack_floor is acknowledged already; everything at or above
        //  next_seqno was never sent
        let ack_floor = self.next_seqno - self.flight.bytes_in_flight();
        if ackno < ack_floor {
            trace!("stale ack {} below the send buffer's low-water mark {}, ignoring", ackno, ack_floor);
            return;
        }
        if ackno > self.next_seqno {
            warn!("ack {} acknowledges bytes that were never sent (next seqno {}), ignoring", ackno, self.next_seqno);
            return;
        }

        if self.flight.ack_through(ackno) {
            trace!("ack {} acknowledged new data, {} bytes still in flight", ackno, self.flight.bytes_in_flight());
            self.consecutive_retransmissions = 0;
            self.timer.reset_rto();
            if self.flight.is_empty() {
                self.timer.stop();
            }
            else {
                self.timer.restart();
            }

            match self.state {
                SenderState::SynSent => {
                    // the SYN was the only thing in flight, so any progress acknowledges it
                    debug!("SYN acknowledged, connection established");
                    self.state = SenderState::Streaming;
                }
                SenderState::FinSent if self.flight.is_empty() => {
                    debug!("FIN acknowledged, stream fully delivered");
                    self.state = SenderState::Done;
                }
                _ => {}
            }
        }
        self.window_size = feedback.window_size;

        // the freed window may allow more segments out
        self.push(sink);
    }

    /// Advance time by `elapsed`. On expiry of the retransmission timeout, re-send the oldest
    ///  outstanding segment (never more than one per expiry).
    pub fn tick(&mut self, elapsed: Duration, sink: &mut dyn SegmentSink) {
        if self.has_errored() {
            return;
        }
        if !self.timer.tick(elapsed) {
            return;
        }

        let Some(segment) = self.flight.oldest() else {
            self.timer.stop();
            return;
        };
        let segment = segment.clone();

        debug!("retransmission timeout, resending segment at {}", segment.seqno);
        if self.window_size != 0 {
            // a zero-window probe is limited by the peer, not by loss, and does not back off
            self.timer.back_off();
        }
        self.consecutive_retransmissions += 1;
        if self.retransmission_limit_exceeded() {
            warn!("{} consecutive retransmissions, link presumed down", self.consecutive_retransmissions);
        }
        self.timer.restart();
        sink.send_segment(segment);
    }

    fn effective_window(&self) -> u64 {
        // a zero window is treated as one byte so the peer can be probed
        std::cmp::max(self.window_size as u64, 1)
    }

    fn send_syn(&mut self, sink: &mut dyn SegmentSink) {
        debug_assert!(self.state == SenderState::Idle && self.next_seqno == 0);

        let segment = Segment {
            seqno: SeqNo::wrap(self.next_seqno, self.config.isn),
            syn: true,
            payload: Bytes::new(),
            fin: false,
        };
        debug!("initiating connection, sending SYN at {}", segment.seqno);
        self.state = SenderState::SynSent;
        self.emit(segment, sink);
    }

    fn push_data(&mut self, sink: &mut dyn SegmentSink) {
        debug_assert!(self.state == SenderState::Streaming);

        while self.flight.bytes_in_flight() < self.effective_window() {
            let budget = self.effective_window() - self.flight.bytes_in_flight();
            let payload_len = min(
                min(self.config.max_segment_size as u64, budget),
                self.outbound.bytes_buffered() as u64,
            ) as usize;
            let payload = self.take_payload(payload_len);

            // the FIN occupies a sequence number of its own, so it needs budget beyond the payload
            let fin = self.outbound.is_finished() && (payload.len() as u64) < budget;

            if payload.is_empty() && !fin {
                break;
            }

            let segment = Segment {
                seqno: SeqNo::wrap(self.next_seqno, self.config.isn),
                syn: false,
                payload,
                fin,
            };
            if fin {
                debug!("outbound stream finished, sending FIN at {}", segment.seqno);
                self.state = SenderState::FinSent;
            }
            self.emit(segment, sink);

            if self.state == SenderState::FinSent {
                break;
            }
        }
    }

    /// Move up to `len` bytes from the outbound stream into a payload buffer.
    fn take_payload(&mut self, len: usize) -> Bytes {
        debug_assert!(len <= self.outbound.bytes_buffered());

        let mut payload = BytesMut::with_capacity(len);
        while payload.len() < len {
            let taken = {
                let chunk = self.outbound.peek();
                let taken = min(chunk.len(), len - payload.len());
                payload.put_slice(&chunk[..taken]);
                taken
            };
            if taken == 0 {
                break;
            }
            self.outbound.pop(taken);
        }
        payload.freeze()
    }

    fn emit(&mut self, segment: Segment, sink: &mut dyn SegmentSink) {
        trace!("sending segment at {}: {} sequence numbers, syn={}, fin={}",
            segment.seqno, segment.sequence_length(), segment.syn, segment.fin);

        self.flight.record(self.next_seqno, segment.clone());
        self.next_seqno += segment.sequence_length();
        self.timer.ensure_started();
        sink.send_segment(segment);
    }
}

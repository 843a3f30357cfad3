//! The sending half of a reliable, ordered byte-stream transport, designed to run over an
//!  unreliable, unordered, possibly-duplicating segment-delivery substrate (the TCP-over-IP
//!  shape, without prescribing any particular wire encapsulation).
//!
//! ## Design goals
//!
//! * The abstraction offered to the application is a *byte stream*: it pushes bytes into a
//!   bounded outbound buffer and eventually closes it, without ever seeing segments,
//!   sequence numbers or retransmissions
//! * Strict ordering and no-loss guarantees on the sending side, under arbitrary ack delay,
//!   loss, duplication and reordering of feedback
//!   * segments carry monotonically increasing sequence numbers and are retransmitted on
//!     timeout until acknowledged
//!   * acknowledgments are cumulative: acking a sequence number acknowledges everything
//!     below it
//! * Sequence numbers are 32-bit wrap-around values relative to a random ISN; all internal
//!   bookkeeping is in absolute 64-bit stream offsets, converted at the wire boundary
//!   ([`seq_no::SeqNo`])
//! * The only send-rate throttles are the receiver-advertised flow-control window and the
//!   retransmission backoff. Congestion control is explicitly out of scope
//!   * a zero window is probed with single-byte segments so a window reopening can never be
//!     missed
//! * Retransmission uses a single logical timer with exponential backoff, resending only the
//!   oldest outstanding segment per expiry, never a burst
//! * The sender is a pure, single-threaded state machine: it is advanced only by stream
//!   writes, inbound feedback and explicit `tick` calls carrying elapsed time. No operation
//!   blocks, and there is no background timer task
//! * Liveness failures (a retransmission ceiling being exceeded) and peer resets are
//!   *reported* through flags and the state enum; the sender never panics on network input
//!   and never tears the connection down on its own
//!
//! ## Data flow
//!
//! ```ascii
//! application --push/close--> ByteStream --peek/pop--> Sender --Segment--> SegmentSink
//! transport   --PeerFeedback(ackno, window, reset)--> Sender
//! caller      --tick(elapsed)-----------------------> Sender
//! ```
//!
//! The receiving side (reassembly, ack/window computation) and the raw segment transport are
//!  external collaborators; they interact with this crate only through [`segment::Segment`],
//!  [`segment::PeerFeedback`] and the [`transport::SegmentSink`] seam.

pub mod byte_stream;
pub mod config;
pub mod flight;
pub mod rto;
pub mod segment;
pub mod seq_no;
pub mod sender;
pub mod transport;

#[cfg(test)]
mod test {
    use tracing::Level;

    #[ctor::ctor]
    fn init_test_logging() {
        tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(Level::DEBUG)
            .try_init()
            .ok();
    }
}

use std::time::Duration;
use anyhow::bail;
use crate::seq_no::SeqNo;

/// Construction-time configuration for a [`Sender`](crate::sender::Sender).
pub struct SenderConfig {
    /// Capacity of the outbound byte stream, i.e. the amount of application data that can be
    ///  staged ahead of what the window allows to be sent.
    pub capacity: usize,

    /// The maximum payload size per segment.
    ///
    /// The transport layer adds its own framing on top, so this must leave room for that
    ///  inside whatever the underlying network can carry without fragmentation. With full
    ///  Ethernet frames and no optional IP headers that is `1500 - 20 - 8 = 1472` bytes of
    ///  UDP payload for IPV4; the default stays well below it.
    pub max_segment_size: usize,

    /// Timeout before the first retransmission of a segment. Doubles on each backoff.
    pub initial_rto: Duration,

    /// Consecutive retransmissions beyond this count are reported as a dead link via
    ///  [`Sender::retransmission_limit_exceeded`](crate::sender::Sender::retransmission_limit_exceeded).
    pub max_retransmissions: u32,

    /// The initial sequence number of this connection.
    pub isn: SeqNo,
}

impl SenderConfig {
    pub fn default_for_isn(isn: SeqNo) -> SenderConfig {
        SenderConfig {
            capacity: 64 * 1024,
            max_segment_size: 1000,
            initial_rto: Duration::from_millis(1000),
            max_retransmissions: 8,
            isn,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.capacity == 0 {
            bail!("stream capacity must be positive");
        }
        if self.max_segment_size == 0 {
            bail!("max segment size must be positive");
        }
        if self.initial_rto.is_zero() {
            bail!("initial RTO must be positive");
        }
        Ok(())
    }
}

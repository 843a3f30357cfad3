use std::time::Duration;

/// The sender's single retransmission timer.
///
/// Time is advanced explicitly by the caller via [`tick`](Self::tick); there is no background
///  task. The timeout starts at the configured initial RTO and doubles on each backoff, with
///  no upper cap. Liveness is bounded by the sender's retransmission ceiling instead.
//TODO seed the RTO from an RTT estimate (RFC 6298) once the feedback path carries timestamps
pub struct RetransmissionTimer {
    initial_rto: Duration,
    current_rto: Duration,
    /// accumulated time since the last (re)start, or `None` while the timer is stopped
    elapsed: Option<Duration>,
}

impl RetransmissionTimer {
    pub fn new(initial_rto: Duration) -> RetransmissionTimer {
        RetransmissionTimer {
            initial_rto,
            current_rto: initial_rto,
            elapsed: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.elapsed.is_some()
    }

    /// Start measuring from zero, unless already running.
    pub fn ensure_started(&mut self) {
        if self.elapsed.is_none() {
            self.elapsed = Some(Duration::ZERO);
        }
    }

    /// Start measuring from zero, unconditionally.
    pub fn restart(&mut self) {
        self.elapsed = Some(Duration::ZERO);
    }

    pub fn stop(&mut self) {
        self.elapsed = None;
    }

    /// Double the current timeout.
    pub fn back_off(&mut self) {
        self.current_rto = self.current_rto.saturating_mul(2);
    }

    /// Fall back to the initial timeout after progress was made.
    pub fn reset_rto(&mut self) {
        self.current_rto = self.initial_rto;
    }

    pub fn current_rto(&self) -> Duration {
        self.current_rto
    }

    /// Advance the timer. Returns true when the accumulated time has reached the current
    ///  timeout; the caller is expected to restart (or stop) the timer in response.
    #[must_use]
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        match &mut self.elapsed {
            Some(total) => {
                *total = total.saturating_add(elapsed);
                *total >= self.current_rto
            }
            None => false,
        }
    }
}

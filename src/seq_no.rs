use std::fmt::{Display, Formatter};
use std::ops::Add;
use rand::RngExt;

/// A 32-bit wrap-around sequence number as it appears on the wire.
///
/// The stream itself is indexed by absolute `u64` offsets (starting at 0 for the SYN); this
///  type is the modular image of such an offset relative to the connection's ISN. Converting
///  back requires a checkpoint, see [`SeqNo::unwrap`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct SeqNo(u32);

impl Display for SeqNo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl SeqNo {
    pub const ZERO: SeqNo = SeqNo(0);

    pub fn from_raw(value: u32) -> Self {
        Self(value)
    }

    pub fn to_raw(&self) -> u32 {
        self.0
    }

    /// Pick a random ISN for a new connection.
    pub fn random() -> SeqNo {
        SeqNo(rand::rng().random())
    }

    /// Reduce an absolute stream index to its wire representation relative to `isn`.
    pub fn wrap(absolute: u64, isn: SeqNo) -> SeqNo {
        SeqNo(isn.0.wrapping_add(absolute as u32))
    }

    /// Resolve this wire value back to an absolute stream index.
    ///
    /// The raw offset `self - isn` is ambiguous modulo 2^32. The `checkpoint` (the most recent
    ///  absolute index the caller knows about) disambiguates: of the candidates in the
    ///  checkpoint's cycle and the two adjacent cycles, the one closest to the checkpoint wins,
    ///  with ties broken toward the smaller value.
    pub fn unwrap(&self, isn: SeqNo, checkpoint: u64) -> u64 {
        const CYCLE: i128 = 1 << 32;

        let offset = self.0.wrapping_sub(isn.0) as i128;
        let base = (checkpoint as i128 / CYCLE) * CYCLE;

        let mut best: Option<i128> = None;
        for candidate in [base - CYCLE + offset, base + offset, base + CYCLE + offset] {
            if candidate < 0 || candidate > u64::MAX as i128 {
                continue;
            }
            let distance = (candidate - checkpoint as i128).abs();
            let better = match best {
                None => true,
                Some(b) => {
                    let best_distance = (b - checkpoint as i128).abs();
                    distance < best_distance || (distance == best_distance && candidate < b)
                }
            };
            if better {
                best = Some(candidate);
            }
        }

        // the same-cycle candidate is always representable, so there is at least one
        best.expect("this is a bug: no unwrap candidate in range") as u64
    }
}

impl Add<u64> for SeqNo {
    type Output = SeqNo;

    fn add(self, rhs: u64) -> SeqNo {
        SeqNo(self.0.wrapping_add(rhs as u32))
    }
}

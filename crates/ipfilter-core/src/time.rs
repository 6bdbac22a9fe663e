//! Monotonic timing helpers used for decision latency measurement.

use std::time::Instant;

/// A started timer; call [`Elapsed::stop`] to capture elapsed nanoseconds.
#[derive(Debug, Clone, Copy)]
pub struct Elapsed(Instant);

/// Start a latency measurement.
#[must_use]
pub fn start() -> Elapsed {
    Elapsed(Instant::now())
}

impl Elapsed {
    /// Capture the elapsed time since `start()` in nanoseconds.
    #[must_use]
    pub fn stop(self) -> u64 {
        u64::try_from(self.0.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_nonzero_after_work() {
        let t = start();
        let mut x = 0u64;
        for i in 0..10_000 {
            x = x.wrapping_add(i);
        }
        std::hint::black_box(x);
        assert!(t.stop() > 0);
    }
}

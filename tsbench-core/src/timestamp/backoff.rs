use std::hint;

/// Per-thread spin delay for a contended shared counter.
///
/// The magnitude halves after a won compare-and-swap and doubles after a lost
/// one, and always stays within [`Backoff::MIN`]..=[`Backoff::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    magnitude: u32,
}

impl Backoff {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 512;

    pub const fn new() -> Self {
        Self {
            magnitude: Self::MIN,
        }
    }

    /// Current number of spin iterations.
    #[inline]
    pub fn magnitude(&self) -> u32 {
        self.magnitude
    }

    /// Busy-waits for `magnitude` iterations without yielding.
    #[inline]
    pub fn spin(&self) {
        for _ in 0..self.magnitude {
            hint::spin_loop();
        }
    }

    #[inline]
    pub fn on_win(&mut self) {
        self.magnitude = (self.magnitude / 2).max(Self::MIN);
    }

    #[inline]
    pub fn on_loss(&mut self) {
        self.magnitude = self.magnitude.saturating_mul(2).min(Self::MAX);
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn starts_at_floor() {
        assert_eq!(Backoff::default().magnitude(), Backoff::MIN);
    }

    #[test]
    fn saturates_at_ceiling() {
        let mut backoff = Backoff::new();
        for _ in 0..20 {
            backoff.on_loss();
        }
        assert_eq!(backoff.magnitude(), Backoff::MAX);
        backoff.on_win();
        assert_eq!(backoff.magnitude(), Backoff::MAX / 2);
    }

    proptest! {
        #[test]
        fn magnitude_stays_in_bounds(outcomes in proptest::collection::vec(any::<bool>(), 0..256)) {
            let mut backoff = Backoff::new();
            for won in outcomes {
                if won {
                    backoff.on_win();
                } else {
                    backoff.on_loss();
                }
                prop_assert!((Backoff::MIN..=Backoff::MAX).contains(&backoff.magnitude()));
            }
        }
    }
}

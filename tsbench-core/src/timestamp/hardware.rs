//! Cycle-counter sources. Neither holds shared state, so `Local` is `()`.
//!
//! Values are only ordered for reads taken on the same core; counters on
//! different cores may drift or be observed out of order.

use super::{Timestamp, TimestampSource};
use crate::error::CoreError;
use crate::platform::CycleCounter;

/// Unserialized cycle counter. `read` and `advance` are identical.
#[derive(Debug, Clone, Copy)]
pub struct HardwareCycleCounter {
    counter: CycleCounter,
}

impl HardwareCycleCounter {
    pub fn new() -> Result<Self, CoreError> {
        Ok(Self {
            counter: CycleCounter::detect()?,
        })
    }
}

impl TimestampSource for HardwareCycleCounter {
    type Local = ();

    #[inline(always)]
    fn read(&self) -> Timestamp {
        self.counter.sample_cycle_counter()
    }

    #[inline(always)]
    fn advance(&self, _: &mut ()) -> Timestamp {
        self.counter.sample_cycle_counter()
    }
}

/// Cycle counter fenced against reordering of surrounding instructions.
#[derive(Debug, Clone, Copy)]
pub struct SerializedHardwareCycleCounter {
    counter: CycleCounter,
}

impl SerializedHardwareCycleCounter {
    pub fn new() -> Result<Self, CoreError> {
        Ok(Self {
            counter: CycleCounter::detect()?,
        })
    }
}

impl TimestampSource for SerializedHardwareCycleCounter {
    type Local = ();

    #[inline(always)]
    fn read(&self) -> Timestamp {
        self.counter.sample_cycle_counter_serialized()
    }

    #[inline(always)]
    fn advance(&self, _: &mut ()) -> Timestamp {
        self.counter.sample_cycle_counter_serialized()
    }
}

/// Cycle counter read with `RDTSCP` and a trailing load fence.
#[derive(Debug, Clone, Copy)]
pub struct RdtscpHardwareCycleCounter {
    counter: CycleCounter,
}

impl RdtscpHardwareCycleCounter {
    pub fn new() -> Result<Self, CoreError> {
        Ok(Self {
            counter: CycleCounter::detect_rdtscp()?,
        })
    }
}

impl TimestampSource for RdtscpHardwareCycleCounter {
    type Local = ();

    #[inline(always)]
    fn read(&self) -> Timestamp {
        self.counter.sample_cycle_counter_rdtscp()
    }

    #[inline(always)]
    fn advance(&self, _: &mut ()) -> Timestamp {
        self.counter.sample_cycle_counter_rdtscp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn single_thread_reads_do_not_go_backwards() {
        let source = SerializedHardwareCycleCounter::new().unwrap();
        let mut previous = source.read();
        for _ in 0..1_000 {
            let next = source.advance(&mut ());
            assert!(next >= previous);
            previous = next;
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn unserialized_counter_is_nonzero() {
        let source = HardwareCycleCounter::new().unwrap();
        assert!(source.read() > 0);
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn rdtscp_reads_do_not_go_backwards() {
        let Ok(source) = RdtscpHardwareCycleCounter::new() else {
            return;
        };
        let mut previous = source.read();
        for _ in 0..1_000 {
            let next = source.advance(&mut ());
            assert!(next >= previous);
            previous = next;
        }
    }

    #[cfg(not(target_arch = "x86_64"))]
    #[test]
    fn construction_fails_without_counter() {
        assert!(matches!(
            HardwareCycleCounter::new(),
            Err(CoreError::UnsupportedPlatform(_))
        ));
        assert!(SerializedHardwareCycleCounter::new().is_err());
        assert!(RdtscpHardwareCycleCounter::new().is_err());
    }
}

//! ## tsbench-core::platform
//! **Cycle counter access for the running target**
//!
//! The only way to sample the hardware counter is through a [`CycleCounter`]
//! obtained from [`CycleCounter::detect`]. On targets without a usable
//! counter detection fails with [`CoreError::UnsupportedPlatform`] and the
//! capability type is uninhabited, so no sampling code can be reached.
//!
//! ### Supported:
//! - x86_64 (`RDTSC`, with `CPUID`/`LFENCE` for the serialized form, and
//!   `RDTSCP` followed by `LFENCE`)

use crate::error::CoreError;

/// Proof that the current target has a readable cycle counter.
#[derive(Debug, Clone, Copy)]
pub struct CycleCounter {
    capability: Capability,
}

impl CycleCounter {
    /// Returns a handle if this target exposes a cycle counter.
    pub fn detect() -> Result<Self, CoreError> {
        Capability::detect().map(|capability| Self { capability })
    }

    /// Like [`CycleCounter::detect`], but also requires the `RDTSCP`
    /// instruction, which older x86_64 parts lack.
    pub fn detect_rdtscp() -> Result<Self, CoreError> {
        let counter = Self::detect()?;
        if counter.capability.has_rdtscp() {
            Ok(counter)
        } else {
            Err(CoreError::UnsupportedPlatform("x86_64 without rdtscp"))
        }
    }

    /// Whether [`CycleCounter::detect`] would succeed on this target.
    pub const fn is_supported() -> bool {
        cfg!(target_arch = "x86_64")
    }

    /// Samples the free-running counter without any ordering guarantee
    /// against surrounding instructions.
    #[inline(always)]
    pub fn sample_cycle_counter(&self) -> u64 {
        self.capability.sample()
    }

    /// Samples the counter behind a serializing instruction, followed by a
    /// load fence so later loads cannot move above the sample point.
    #[inline(always)]
    pub fn sample_cycle_counter_serialized(&self) -> u64 {
        self.capability.sample_serialized()
    }

    /// Samples the counter with `RDTSCP`, which waits for earlier
    /// instructions to retire, then fences so later ones start after it.
    ///
    /// Only call this on a handle from [`CycleCounter::detect_rdtscp`].
    #[inline(always)]
    pub fn sample_cycle_counter_rdtscp(&self) -> u64 {
        self.capability.sample_rdtscp()
    }
}

#[cfg(target_arch = "x86_64")]
#[derive(Debug, Clone, Copy)]
struct Capability;

#[cfg(target_arch = "x86_64")]
impl Capability {
    fn detect() -> Result<Self, CoreError> {
        Ok(Capability)
    }

    #[inline(always)]
    fn sample(&self) -> u64 {
        // SAFETY: RDTSC is available on every x86_64 processor.
        unsafe { core::arch::x86_64::_rdtsc() }
    }

    #[inline(always)]
    fn sample_serialized(&self) -> u64 {
        use core::arch::x86_64::{__cpuid, _mm_lfence, _rdtsc};

        // SAFETY: CPUID, RDTSC and LFENCE (SSE2) are baseline x86_64.
        unsafe {
            let _ = __cpuid(0);
            let cycles = _rdtsc();
            _mm_lfence();
            cycles
        }
    }

    fn has_rdtscp(&self) -> bool {
        use core::arch::x86_64::__cpuid;

        // SAFETY: CPUID is baseline x86_64. RDTSCP is leaf 0x8000_0001, EDX bit 27.
        unsafe {
            __cpuid(0x8000_0000).eax >= 0x8000_0001 && __cpuid(0x8000_0001).edx & (1 << 27) != 0
        }
    }

    #[inline(always)]
    fn sample_rdtscp(&self) -> u64 {
        use core::arch::x86_64::{__rdtscp, _mm_lfence};

        let mut aux = 0u32;
        // SAFETY: RDTSCP support is checked by `detect_rdtscp`; LFENCE is SSE2.
        unsafe {
            let cycles = __rdtscp(&mut aux);
            _mm_lfence();
            cycles
        }
    }
}

#[cfg(not(target_arch = "x86_64"))]
#[derive(Debug, Clone, Copy)]
enum Capability {}

#[cfg(not(target_arch = "x86_64"))]
impl Capability {
    fn detect() -> Result<Self, CoreError> {
        Err(CoreError::UnsupportedPlatform(std::env::consts::ARCH))
    }

    fn sample(&self) -> u64 {
        match *self {}
    }

    fn sample_serialized(&self) -> u64 {
        match *self {}
    }

    fn has_rdtscp(&self) -> bool {
        match *self {}
    }

    fn sample_rdtscp(&self) -> u64 {
        match *self {}
    }
}

//! Deterministic RNG for host tests.

use rand_core::{impls, Error, RngCore};

/// Either a fixed output or a fixed additive step - both make drawn
/// delays predictable in tests.
pub struct StepRng {
    state: u32,
    step: u32,
}

impl StepRng {
    /// Starts at `seed` and advances by an odd step each draw.
    pub fn new(seed: u32) -> Self {
        Self {
            state: seed,
            step: 0x9E37_79B9,
        }
    }

    /// Always returns `value`.
    pub fn constant(value: u32) -> Self {
        Self {
            state: value,
            step: 0,
        }
    }
}

impl RngCore for StepRng {
    fn next_u32(&mut self) -> u32 {
        let out = self.state;
        self.state = self.state.wrapping_add(self.step);
        out
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

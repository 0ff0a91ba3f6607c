#![doc = include_str!("../README.md")]

/// State multiplier of the linear congruential step, from the PCG reference implementation.
const MULTIPLIER: u64 = 6364136223846793005;

/// Default stream increment, from the PCG reference implementation.
const DEFAULT_INCREMENT: u64 = 1442695040888963407;

/// Default initial state.
const DEFAULT_STATE: u64 = 5573589319906701683u64.wrapping_add(DEFAULT_INCREMENT);

/// Permuted congruential generator (PCG-XSH-RR) with 64-bit state and 32-bit output.
///
/// The generator is fully deterministic: equal seeds give equal sequences and
/// [`Clone`] forks an identical stream. It is small and statistically good,
/// but not cryptographically secure.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Pcg32 {
    state: u64,
    increment: u64,
}

impl Pcg32 {
    /// Returns a generator seeded with `seed`, drawing from stream `stream`.
    ///
    /// Follows the reference PCG initialization: the increment is derived
    /// from `stream` (forced odd), the state is advanced once before and
    /// once after mixing in `seed`.
    pub fn new(seed: u64, stream: u64) -> Self {
        let mut result = Self { state: 0, increment: (stream << 1) | 1 };
        result.next_u32();
        result.state = result.state.wrapping_add(seed);
        result.next_u32();
        result
    }

    /// Advances the state by one step and returns the next 32-bit output.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let old_state = self.state;
        self.state = old_state.wrapping_mul(MULTIPLIER).wrapping_add(self.increment);
        let xor_shifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rot = (old_state >> 59) as u32;
        xor_shifted.rotate_right(rot)
    }

    /// Returns the next 64-bit output, composed of two 32-bit outputs
    /// (low word drawn first).
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let low = self.next_u32() as u64;
        low | (self.next_u32() as u64) << 32
    }

    /// Returns the next 128-bit output, composed of four 32-bit outputs
    /// (lowest word drawn first).
    #[inline]
    pub fn next_u128(&mut self) -> u128 {
        let low = self.next_u64() as u128;
        low | (self.next_u64() as u128) << 64
    }
}

impl Default for Pcg32 {
    /// Returns the generator with the reference initial state and stream.
    #[inline]
    fn default() -> Self {
        Self { state: DEFAULT_STATE, increment: DEFAULT_INCREMENT }
    }
}

impl Iterator for Pcg32 {
    type Item = u32;

    #[inline(always)]
    fn next(&mut self) -> Option<u32> {
        Some(self.next_u32())
    }
}

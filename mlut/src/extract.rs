//! Bit-extracted layout: a minimal mask of key bits addresses a dense
//! array directly, with no randomized search.

use std::sync::OnceLock;

use crate::canon::bits_mask;
use crate::stats::BuildStatsCollector;
use crate::values::Values;

/// Returns the smallest locally irreducible subset of the `key_bits` lowest
/// bit positions that keeps all `keys` pairwise distinct.
///
/// Starts with all bits selected and scans from the most significant to the
/// least significant position, keeping a bit cleared whenever distinctness
/// survives without it. Always succeeds: all-ones trivially distinguishes
/// pairwise distinct keys. The result is locally irreducible, not
/// guaranteed globally minimal.
pub fn find_mask(keys: &[u128], key_bits: u8) -> u128 {
    let mut mask = bits_mask(key_bits);
    let mut scratch = Vec::with_capacity(keys.len());
    for bit in (0..key_bits).rev() {
        let tentative = mask & !(1u128 << bit);
        if all_distinct(keys, tentative, &mut scratch) {
            mask = tentative;
        }
    }
    mask
}

/// Extraction keeps the relative order of bits, so keys are distinct under
/// extraction of `mask` exactly when they are distinct under `& mask`.
fn all_distinct(keys: &[u128], mask: u128, scratch: &mut Vec<u128>) -> bool {
    scratch.clear();
    scratch.extend(keys.iter().map(|key| key & mask));
    scratch.sort_unstable();
    scratch.windows(2).all(|pair| pair[0] != pair[1])
}

type Pext64 = fn(u64, u64) -> u64;

static PEXT64: OnceLock<Pext64> = OnceLock::new();

/// Software parallel bit extract: gathers the bits of `value` selected by
/// `mask` into a contiguous low-order result, lowest selected bit first.
pub fn pext64_soft(value: u64, mask: u64) -> u64 {
    let mut result = 0;
    let mut out = 0u32;
    let mut remaining = mask;
    while remaining != 0 {
        let bit = remaining & remaining.wrapping_neg();
        if value & bit != 0 {
            result |= 1u64 << out;
        }
        out += 1;
        remaining &= remaining - 1;
    }
    result
}

#[cfg(target_arch = "x86_64")]
fn pext64_bmi2(value: u64, mask: u64) -> u64 {
    // selected only after a successful bmi2 feature check
    unsafe { pext64_bmi2_impl(value, mask) }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "bmi2")]
unsafe fn pext64_bmi2_impl(value: u64, mask: u64) -> u64 {
    core::arch::x86_64::_pext_u64(value, mask)
}

fn choose_pext64() -> Pext64 {
    #[cfg(target_arch = "x86_64")]
    if std::arch::is_x86_feature_detected!("bmi2") {
        return pext64_bmi2;
    }
    pext64_soft
}

/// Parallel bit extract, resolved once per process to the hardware
/// instruction when the CPU has one and to [`pext64_soft`] otherwise.
/// Both paths agree bit for bit.
#[inline(always)]
pub fn pext64(value: u64, mask: u64) -> u64 {
    (PEXT64.get_or_init(choose_pext64))(value, mask)
}

/// 128-bit parallel bit extract, composed of two 64-bit halves.
#[inline(always)]
pub fn pext128(value: u128, mask: u128) -> u128 {
    let low = pext64(value as u64, mask as u64) as u128;
    let high = pext64((value >> 64) as u64, (mask >> 64) as u64) as u128;
    low | high << (mask as u64).count_ones()
}

/// Layout addressing a dense array by the key bits selected by `mask`.
pub(crate) struct BitExtracted {
    pub mask: u128,
    pub values: Values,
}

impl BitExtracted {
    /// Returns the slot content at the extracted index of `key`. Exact only
    /// for keys of the input table; absent keys can address past the array
    /// and panic.
    #[inline(always)]
    pub fn get(&self, key: u128) -> u128 {
        self.values.get(pext128(key, self.mask) as usize)
    }
}

/// Builds the bit-extracted layout for `pairs`. Deterministic; the only
/// way it can fail is an extracted index space wider than the address
/// space, which no practical table reaches.
pub(crate) fn try_build<BS: BuildStatsCollector>(
    pairs: &[(u128, u128)],
    key_bits: u8,
    value_width_bytes: u8,
    stats: &mut BS,
) -> Option<BitExtracted> {
    let keys: Vec<u128> = pairs.iter().map(|(key, _)| *key).collect();
    let mask = find_mask(&keys, key_bits);
    let max_index = keys.iter().map(|key| pext128(*key, mask)).max().unwrap_or(0);
    let len = usize::try_from(max_index).ok()?.checked_add(1)?;
    let mut values = Values::zeroed(value_width_bytes, len);
    for (key, value) in pairs {
        values.set(pext128(*key, mask) as usize, *value);
    }
    stats.searched("extract", 1, true);
    Some(BitExtracted { mask, values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcgen::Pcg32;

    #[test]
    fn mask_uniqueness() {
        assert_eq!(find_mask(&[0b11, 0b01], 8), 0b10);
        assert_eq!(find_mask(&[0b101, 0b111], 8), 0b010);
        assert_eq!(find_mask(&[0b101, 0b110, 0b111], 8), 0b011);
    }

    #[test]
    fn mask_distinguishes_and_is_irreducible() {
        let keys = [0b101, 0b110, 0b111];
        let mask = find_mask(&keys, 128);
        let extracted: Vec<u128> = keys.iter().map(|k| pext128(*k, mask)).collect();
        let mut sorted = extracted.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), keys.len());
        // no single bit of the mask can be cleared without a collision
        for bit in 0..128 {
            let smaller = mask & !(1u128 << bit);
            if smaller == mask { continue; }
            let mut masked: Vec<u128> = keys.iter().map(|k| k & smaller).collect();
            masked.sort_unstable();
            masked.dedup();
            assert!(masked.len() < keys.len());
        }
    }

    #[test]
    fn pext_extraction() {
        assert_eq!(pext64_soft(0b010, 0b101), 0b000);
        assert_eq!(pext64_soft(0b110, 0b101), 0b010);
        assert_eq!(pext64(0b010, 0b101), 0b000);
        assert_eq!(pext64(0b110, 0b101), 0b010);
        assert_eq!(pext64_soft(u64::MAX, u64::MAX), u64::MAX);
        assert_eq!(pext64_soft(0, u64::MAX), 0);
    }

    #[test]
    fn pext_paths_agree() {
        let mut rng = Pcg32::default();
        for _ in 0..1000 {
            let value = rng.next_u64();
            let mask = rng.next_u64();
            assert_eq!(pext64(value, mask), pext64_soft(value, mask));
        }
    }

    #[test]
    fn pext_wide() {
        let mask = (0b101u128 << 64) | 0b11;
        let value = (0b111u128 << 64) | 0b10;
        // low half gives 0b10, high half gives 0b11 shifted past it
        assert_eq!(pext128(value, mask), 0b11_10);
        assert_eq!(pext128(u128::MAX, u128::MAX), u128::MAX);
    }

    #[test]
    fn builds_consecutive_keys_compactly() {
        let pairs: Vec<(u128, u128)> = (0..64).map(|i| (i, i + 13)).collect();
        let extracted = try_build(&pairs, 32, 4, &mut ()).unwrap();
        assert_eq!(extracted.mask, 0b11_1111);
        assert_eq!(extracted.values.len(), 64);
        for (key, value) in pairs {
            assert_eq!(extracted.get(key), value);
        }
    }

    #[test]
    fn builds_sparse_keys() {
        let pairs = [(0x10, 1), (0x20, 2), (0x40, 3), (0x83, 4)];
        let extracted = try_build(&pairs, 32, 1, &mut ()).unwrap();
        for (key, value) in pairs {
            assert_eq!(extracted.get(key), value);
        }
    }
}

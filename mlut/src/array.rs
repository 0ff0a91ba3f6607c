//! Array-packed layout: a searched multiplier indexes a dense value array.

use bitm::{bits_to_store, BitAccess, BitVec};
use pcgen::Pcg32;

use crate::canon::bits_mask;
use crate::stats::BuildStatsCollector;
use crate::values::Values;

/// Perfect-hash layout that maps each key to a slot of a dense array:
/// `((key * magic) mod 2^key_bits) >> (key_bits - index_bits)`, masked to
/// `index_bits` bits. `2^index_bits` is the next power of two at or above
/// the entry count, so the index range can exceed the array; construction
/// only accepts multipliers that keep every key inside it.
pub(crate) struct ArrayPacked {
    pub magic: u128,
    pub key_bits: u8,
    pub index_bits: u8,
    pub values: Values,
}

#[inline(always)]
fn index_of(key: u128, magic: u128, key_bits: u8, index_bits: u8) -> usize {
    if index_bits == 0 {
        return 0;
    }
    let product = key.wrapping_mul(magic) & bits_mask(key_bits);
    ((product >> (key_bits - index_bits)) & bits_mask(index_bits)) as usize
}

impl ArrayPacked {
    /// Returns the slot content at the index of `key`. Exact only for keys
    /// verified during construction; absent keys can address past the array
    /// and panic.
    #[inline(always)]
    pub fn get(&self, key: u128) -> u128 {
        self.values.get(index_of(key, self.magic, self.key_bits, self.index_bits))
    }
}

/// Searches for a multiplier giving every pair its own slot of a dense
/// array, drawing at most `budget` candidates from `rng`.
///
/// The multiplication runs at `max(key width, 32)` bits, so narrow key
/// types still leave a full 32-bit multiplier space to draw from.
pub(crate) fn try_build<BS: BuildStatsCollector>(
    pairs: &[(u128, u128)],
    key_width_bytes: u8,
    value_width_bytes: u8,
    mut rng: Pcg32,
    budget: u64,
    stats: &mut BS,
) -> Option<ArrayPacked> {
    let key_bits = (key_width_bytes * 8).max(32);
    let count = pairs.len();
    let index_bits = bits_to_store(count.next_power_of_two() as u64 - 1);
    debug_assert!(index_bits <= key_bits);

    let mut occupancy = Box::<[u64]>::with_zeroed_bits(count);
    for attempt in 1..=budget {
        let magic = match key_bits {
            32 => rng.next_u32() as u128,
            64 => rng.next_u64() as u128,
            _ => rng.next_u128(),
        };
        occupancy.fill(0);
        let mut perfect = true;
        for (key, _) in pairs {
            let index = index_of(*key, magic, key_bits, index_bits);
            if index >= count || occupancy.get_bit(index) {
                perfect = false;
                break;
            }
            occupancy.set_bit(index);
        }
        if !perfect {
            continue;
        }
        let mut values = Values::zeroed(value_width_bytes, count);
        for (key, value) in pairs {
            values.set(index_of(*key, magic, key_bits, index_bits), *value);
        }
        let candidate = ArrayPacked { magic, key_bits, index_bits, values };
        if pairs.iter().all(|(key, value)| candidate.get(*key) == *value) {
            stats.searched("array", attempt, true);
            return Some(candidate);
        }
    }
    stats.searched("array", budget, false);
    None
}

//! Word-packed layout: all values in bit fields of a single machine word.

use bitm::n_lowest_bits_1_64;
use pcgen::Pcg32;

use crate::canon::bits_to_store_canon;
use crate::stats::BuildStatsCollector;

/// Perfect-hash layout that keeps every value in a `bits_per_value`-bit
/// field of one `word_bits`-wide word. The field offset of a key is
/// `((key * magic) mod 2^word_bits) >> (word_bits - bits_per_value)`.
pub(crate) struct WordPacked {
    pub magic: u64,
    pub lut: u64,
    pub word_bits: u8,
    pub bits_per_value: u8,
}

impl WordPacked {
    #[inline(always)]
    fn offset(&self, key: u128) -> u64 {
        let word_mask = n_lowest_bits_1_64(self.word_bits);
        ((key as u64).wrapping_mul(self.magic) & word_mask) >> (self.word_bits - self.bits_per_value)
    }

    /// Returns the field content at the offset of `key`. Exact only for
    /// keys verified during construction.
    #[inline(always)]
    pub fn get(&self, key: u128) -> u128 {
        (self.lut.wrapping_shr(self.offset(key) as u32) & n_lowest_bits_1_64(self.bits_per_value)) as u128
    }
}

/// Searches for a multiplier packing all `pairs` into one `word_bits`-wide
/// word, drawing at most `budget` candidates from `rng`.
///
/// A candidate is accepted only if every entry re-decodes to its exact
/// value, which simultaneously rules out field overlap, truncation at the
/// word top and hash collisions.
pub(crate) fn try_build<BS: BuildStatsCollector>(
    pairs: &[(u128, u128)],
    word_bits: u8,
    mut rng: Pcg32,
    budget: u64,
    stats: &mut BS,
) -> Option<WordPacked> {
    let engine = if word_bits <= 32 { "word32" } else { "word64" };
    let max_value = pairs.iter().map(|(_, value)| *value).max().unwrap_or(0);
    let bits_per_value = bits_to_store_canon(max_value).max(1);
    if bits_per_value as usize * pairs.len() > word_bits as usize {
        // the values provably cannot fit, searching would be pointless
        stats.searched(engine, 0, false);
        return None;
    }

    let word_mask = n_lowest_bits_1_64(word_bits);
    let shift = word_bits - bits_per_value;
    for attempt in 1..=budget {
        let magic = if word_bits <= 32 { rng.next_u32() as u64 } else { rng.next_u64() };
        let mut lut = 0u64;
        let mut in_word = true;
        for (key, value) in pairs {
            let offset = ((*key as u64).wrapping_mul(magic) & word_mask) >> shift;
            if offset >= word_bits as u64 {
                in_word = false;
                break;
            }
            lut |= ((*value as u64) << offset) & word_mask;
        }
        if !in_word {
            continue;
        }
        let candidate = WordPacked { magic, lut, word_bits, bits_per_value };
        if pairs.iter().all(|(key, value)| candidate.get(*key) == *value) {
            stats.searched(engine, attempt, true);
            return Some(candidate);
        }
    }
    stats.searched(engine, budget, false);
    None
}

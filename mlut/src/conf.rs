//! Build configuration of the lookup tables.

use pcgen::Pcg32;

/// Which table layouts construction may try, and in which order.
///
/// There is no fallback across a restriction: if the permitted layouts all
/// fail, construction fails.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Method {
    /// Word-packed only: 32-bit word first, then 64-bit.
    Word,
    /// Dense-array layouts only: array-packed first, then bit-extracted.
    Array,
    /// Any layout, most compact first: word-packed (32, then 64 bits),
    /// array-packed, bit-extracted.
    #[default]
    Auto,
}

/// Build configuration that is accepted by [`Lut`](crate::Lut) constructors.
///
/// See field descriptions for details.
#[derive(Clone)]
pub struct BuildConf {
    /// The layouts construction may try. (default: [`Method::Auto`])
    pub method: Method,

    /// Attempt budget of each word-packed search.
    /// (default: [`BuildConf::DEFAULT_WORD_ATTEMPTS`])
    pub word_attempts: u64,

    /// Attempt budget of the array-packed search.
    /// (default: [`BuildConf::DEFAULT_ARRAY_ATTEMPTS`], smaller than the
    /// word budget because the deterministic bit-extraction fallback always
    /// backs this search up)
    pub array_attempts: u64,

    /// Generator of candidate multipliers. Every engine search starts from
    /// an identical clone of it, so equal configurations build identical
    /// tables. (default: [`Pcg32::default`])
    pub rng: Pcg32,
}

impl Default for BuildConf {
    fn default() -> Self {
        Self {
            method: Method::default(),
            word_attempts: Self::DEFAULT_WORD_ATTEMPTS,
            array_attempts: Self::DEFAULT_ARRAY_ATTEMPTS,
            rng: Pcg32::default(),
        }
    }
}

impl BuildConf {
    /// The default value for [`word_attempts`](BuildConf::word_attempts).
    pub const DEFAULT_WORD_ATTEMPTS: u64 = 100_000;

    /// The default value for [`array_attempts`](BuildConf::array_attempts).
    pub const DEFAULT_ARRAY_ATTEMPTS: u64 = 10_000;

    /// Returns configuration that restricts construction to the layouts of
    /// [`method`](BuildConf::method).
    pub fn method(method: Method) -> Self {
        Self { method, ..Default::default() }
    }

    /// Returns configuration that draws multiplier candidates from `rng`.
    pub fn rng(rng: Pcg32) -> Self {
        Self { rng, ..Default::default() }
    }

    /// Returns configuration with custom [`method`](BuildConf::method) and
    /// multiplier source.
    pub fn method_rng(method: Method, rng: Pcg32) -> Self {
        Self { method, rng, ..Default::default() }
    }
}

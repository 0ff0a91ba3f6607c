//! The frozen lookup structure and the construction dispatcher.

use std::io;
use std::marker::PhantomData;

use binout::{AsIs, Serializer, VByte};
use dyn_size_of::GetSize;

use crate::array::{self, ArrayPacked};
use crate::canon::{self, FromCanon, ToCanon};
use crate::conf::{BuildConf, Method};
use crate::err::Error;
use crate::extract::{self, BitExtracted};
use crate::stats::BuildStatsCollector;
use crate::values::{read_u128, write_u128, Values};
use crate::word::{self, WordPacked};

/// One of the three frozen layouts.
enum Repr {
    Word(WordPacked),
    Array(ArrayPacked),
    Extracted(BitExtracted),
}

/// Perfect-hash lookup table, frozen at construction, that maps the keys of
/// a complete input table to values of type `V`.
///
/// Lookups never lock or allocate and the structure is never mutated, so it
/// can be shared freely between threads.
pub struct Lut<V> {
    repr: Repr,
    key_bytes: u8,
    value_bytes: u8,
    len: usize,
    value_type: PhantomData<V>,
}

/// Tries the layouts permitted by `conf`, in the declared priority order,
/// and returns the first that constructs.
fn build_repr<BS: BuildStatsCollector>(
    pairs: &[(u128, u128)],
    key_bytes: u8,
    value_bytes: u8,
    conf: &BuildConf,
    stats: &mut BS,
) -> Option<Repr> {
    if matches!(conf.method, Method::Word | Method::Auto) {
        for word_bits in [32u8, 64] {
            if let Some(packed) = word::try_build(pairs, word_bits, conf.rng.clone(), conf.word_attempts, stats) {
                return Some(Repr::Word(packed));
            }
        }
    }
    if matches!(conf.method, Method::Array | Method::Auto) {
        if let Some(packed) = array::try_build(pairs, key_bytes, value_bytes, conf.rng.clone(), conf.array_attempts, stats) {
            return Some(Repr::Array(packed));
        }
        if let Some(extracted) = extract::try_build(pairs, key_bytes * 8, value_bytes, stats) {
            return Some(Repr::Extracted(extracted));
        }
    }
    None
}

impl<V: ToCanon> Lut<V> {
    /// Builds [`Lut`] for the given complete `table` of distinct keys,
    /// with configuration `conf`, reporting the build process to `stats`.
    pub fn try_with_conf_stats<K, BS>(table: &[(K, V)], conf: BuildConf, stats: &mut BS) -> Result<Self, Error>
        where K: ToCanon, BS: BuildStatsCollector
    {
        if table.is_empty() {
            return Err(Error::EmptyTable);
        }
        let key_bytes = canon::scan_width(table.iter().map(|(key, _)| key.canon_bytes()))?;
        let value_bytes = canon::scan_width(table.iter().map(|(_, value)| value.canon_bytes()))?;
        let pairs: Vec<(u128, u128)> = table.iter().map(|(key, value)| (
            canon::truncate_to_width(key.to_canon(), key_bytes),
            canon::truncate_to_width(value.to_canon(), value_bytes),
        )).collect();
        let mut keys: Vec<u128> = pairs.iter().map(|(key, _)| *key).collect();
        keys.sort_unstable();
        if keys.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err(Error::DuplicateKeys);
        }
        let repr = build_repr(&pairs, key_bytes, value_bytes, &conf, stats);
        stats.end();
        Ok(Self {
            repr: repr.ok_or(Error::Unbuildable)?,
            key_bytes,
            value_bytes,
            len: pairs.len(),
            value_type: PhantomData,
        })
    }

    /// Builds [`Lut`] for the given complete `table` of distinct keys,
    /// with configuration `conf`.
    #[inline]
    pub fn try_with_conf<K: ToCanon>(table: &[(K, V)], conf: BuildConf) -> Result<Self, Error> {
        Self::try_with_conf_stats(table, conf, &mut ())
    }

    /// Builds [`Lut`] for the given complete `table` of distinct keys,
    /// with the default configuration.
    #[inline]
    pub fn try_new<K: ToCanon>(table: &[(K, V)]) -> Result<Self, Error> {
        Self::try_with_conf(table, Default::default())
    }

    /// Builds [`Lut`] for the given complete `table` of distinct keys,
    /// restricted to the layouts of `method`.
    ///
    /// Panics when construction fails; see [`Self::try_with_conf`].
    pub fn with_method<K: ToCanon>(table: &[(K, V)], method: Method) -> Self {
        Self::try_with_conf(table, BuildConf::method(method))
            .unwrap_or_else(|err| panic!("cannot construct the lookup table: {err}"))
    }

    /// Builds [`Lut`] for the given complete `table` of distinct keys.
    ///
    /// Panics when construction fails; see [`Self::try_new`].
    pub fn new<K: ToCanon>(table: &[(K, V)]) -> Self {
        Self::try_new(table)
            .unwrap_or_else(|err| panic!("cannot construct the lookup table: {err}"))
    }
}

impl<K: ToCanon, V: ToCanon> From<&[(K, V)]> for Lut<V> {
    #[inline]
    fn from(table: &[(K, V)]) -> Self {
        Self::new(table)
    }
}

impl<V: FromCanon> Lut<V> {
    /// Returns the value assigned to `key` by the input table.
    ///
    /// Defined only for keys present in the input table given during
    /// construction. For any other key the result is unspecified: an
    /// arbitrary value, or a panic when a dense-array layout is addressed
    /// past its end. Lookups are never guarded at run time.
    #[inline]
    pub fn get<K>(&self, key: &K) -> V
        where K: ToCanon + ?Sized
    {
        V::from_canon(self.get_canon(canon::truncate_to_width(key.to_canon(), self.key_bytes)))
    }
}

impl<V> Lut<V> {
    /// Returns the canonical value assigned to canonical `key`. Same
    /// contract as [`Self::get`].
    #[inline]
    pub fn get_canon(&self, key: u128) -> u128 {
        match &self.repr {
            Repr::Word(packed) => packed.get(key),
            Repr::Array(packed) => packed.get(key),
            Repr::Extracted(extracted) => extracted.get(key),
        }
    }

    /// Returns the number of entries of the input table given during
    /// construction.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns a short name of the constructed layout:
    /// `"word32"`, `"word64"`, `"array"` or `"extract"`.
    pub fn layout(&self) -> &'static str {
        match &self.repr {
            Repr::Word(packed) if packed.word_bits <= 32 => "word32",
            Repr::Word(_) => "word64",
            Repr::Array(_) => "array",
            Repr::Extracted(_) => "extract",
        }
    }

    #[inline]
    fn layout_tag(&self) -> u8 {
        match &self.repr {
            Repr::Word(_) => 0,
            Repr::Array(_) => 1,
            Repr::Extracted(_) => 2,
        }
    }

    /// Returns the number of bytes which `write` will write.
    pub fn write_bytes(&self) -> usize {
        AsIs::size(self.layout_tag()) + AsIs::size(self.key_bytes)
            + AsIs::size(self.value_bytes) + VByte::size(self.len)
            + match &self.repr {
                Repr::Word(packed) =>
                    AsIs::size(packed.word_bits) + AsIs::size(packed.bits_per_value)
                    + AsIs::size(packed.magic) + AsIs::size(packed.lut),
                Repr::Array(packed) =>
                    AsIs::size(packed.key_bits) + AsIs::size(packed.index_bits)
                    + 2 * AsIs::size(0u64) + packed.values.write_bytes(),
                Repr::Extracted(extracted) =>
                    2 * AsIs::size(0u64) + extracted.values.write_bytes(),
            }
    }

    /// Writes `self` to the `output`.
    pub fn write(&self, output: &mut dyn io::Write) -> io::Result<()> {
        AsIs::write(output, self.layout_tag())?;
        AsIs::write(output, self.key_bytes)?;
        AsIs::write(output, self.value_bytes)?;
        VByte::write(output, self.len)?;
        match &self.repr {
            Repr::Word(packed) => {
                AsIs::write(output, packed.word_bits)?;
                AsIs::write(output, packed.bits_per_value)?;
                AsIs::write(output, packed.magic)?;
                AsIs::write(output, packed.lut)
            }
            Repr::Array(packed) => {
                AsIs::write(output, packed.key_bits)?;
                AsIs::write(output, packed.index_bits)?;
                write_u128(output, packed.magic)?;
                packed.values.write(output)
            }
            Repr::Extracted(extracted) => {
                write_u128(output, extracted.mask)?;
                extracted.values.write(output)
            }
        }
    }

    /// Reads `Self` from the `input`.
    pub fn read(input: &mut dyn io::Read) -> io::Result<Self> {
        let tag: u8 = AsIs::read(input)?;
        let key_bytes: u8 = AsIs::read(input)?;
        let value_bytes: u8 = AsIs::read(input)?;
        let len: usize = VByte::read(input)?;
        let repr = match tag {
            0 => Repr::Word(WordPacked {
                word_bits: AsIs::read(input)?,
                bits_per_value: AsIs::read(input)?,
                magic: AsIs::read(input)?,
                lut: AsIs::read(input)?,
            }),
            1 => Repr::Array(ArrayPacked {
                key_bits: AsIs::read(input)?,
                index_bits: AsIs::read(input)?,
                magic: read_u128(input)?,
                values: Values::read(input, value_bytes)?,
            }),
            2 => Repr::Extracted(BitExtracted {
                mask: read_u128(input)?,
                values: Values::read(input, value_bytes)?,
            }),
            _ => return Err(io::Error::new(io::ErrorKind::InvalidData, "unknown lookup table layout")),
        };
        Ok(Self { repr, key_bytes, value_bytes, len, value_type: PhantomData })
    }
}

impl<V> GetSize for Lut<V> {
    fn size_bytes_dyn(&self) -> usize {
        match &self.repr {
            Repr::Word(_) => 0,
            Repr::Array(packed) => packed.values.size_bytes_dyn(),
            Repr::Extracted(extracted) => extracted.values.size_bytes_dyn(),
        }
    }
    const USES_DYN_MEM: bool = true;
}

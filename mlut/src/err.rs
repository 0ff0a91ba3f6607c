//! Error types for the `mlut` crate.

/// Errors that can occur while constructing a lookup table.
///
/// Construction never exposes a partially built table: every variant below
/// means no structure was produced at all.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A key or value needs more bytes than the largest supported canonical
    /// width. Fatal: widening the budget cannot help.
    #[error("a key or value of {bytes} bytes exceeds the largest supported canonical width of 16 bytes")]
    WidthOverflow {
        /// Length in bytes of the offending datum.
        bytes: usize,
    },

    /// The input table contains no entries, so no width can be selected and
    /// every lookup would be out of contract.
    #[error("the input table is empty")]
    EmptyTable,

    /// Two keys share the same canonical encoding (e.g. `"a"` and `"a\0"`),
    /// so no collision-free assignment can exist.
    #[error("two keys of the input table share the same canonical encoding")]
    DuplicateKeys,

    /// Every permitted engine exhausted its attempt budget without finding
    /// a collision-free assignment.
    #[error("no perfect hash found for the input table within the attempt budgets")]
    Unbuildable,
}

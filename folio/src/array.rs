//! In-memory pagination of already materialized sequences.

use crate::{Page, labels::Labels, meta::PageMeta, options::Positioning};

/// A window of an in-memory sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArraySlice<T> {
    pub docs: Vec<T>,
    /// Length of the sequence before slicing.
    pub total_docs: u64,
}

/// Takes at most `limit` items starting at `offset`.
///
/// Negative `offset` or `limit` count as `0`, and windows reaching past the
/// end are clipped, so this never fails.
pub fn paginate_array<I>(items: I, offset: i64, limit: i64) -> ArraySlice<I::Item>
where
    I: IntoIterator,
    I::IntoIter: ExactSizeIterator,
{
    let items = items.into_iter();
    let total_docs = items.len() as u64;

    let offset = usize::try_from(offset).unwrap_or(0);
    let limit = usize::try_from(limit).unwrap_or(0);

    ArraySlice {
        docs: items.skip(offset).take(limit).collect(),
        total_docs,
    }
}

impl<T> Page<T> {
    /// Paginates an in-memory sequence into the same shape a query produces.
    pub fn from_array<I>(items: I, offset: i64, limit: i64, labels: Labels) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let ArraySlice { docs, total_docs } = paginate_array(items, offset, limit);

        let meta = PageMeta::compute(
            total_docs,
            u64::try_from(limit).unwrap_or(0),
            Positioning::Offset(u64::try_from(offset).unwrap_or(0)),
            true,
        );

        Self::new(docs, meta, labels)
    }
}

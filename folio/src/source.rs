//! The data-access interface the paginator runs against.
//!
//! [`Source`] is the only seam between pagination and storage. The paginator
//! configures a [`FindQuery`] the way a chained driver query is configured and
//! hands it to [`Source::find`]; it never inspects how the source filters,
//! sorts, projects or expands relations.

use crate::{Result, options::PopulateSpec};
use futures_util::future::BoxFuture;
use mongodb::{
    bson::Document,
    options::{FindOptions, ReadPreference},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountMode {
    /// Count the documents matching the filter.
    Exact,
    /// Use the collection-wide estimate and ignore the filter.
    Estimated,
}

pub trait Source: Send + Sync {
    fn count<'a>(&'a self, filter: &'a Document, mode: CountMode) -> BoxFuture<'a, Result<u64>>;

    fn find(&self, query: FindQuery) -> BoxFuture<'_, Result<Vec<Document>>>;

    /// Relation declared for a populate path, if any.
    fn relation(&self, path: &str) -> Option<&Relation>;
}

impl<S: Source + ?Sized> Source for &S {
    fn count<'a>(&'a self, filter: &'a Document, mode: CountMode) -> BoxFuture<'a, Result<u64>> {
        (**self).count(filter, mode)
    }

    fn find(&self, query: FindQuery) -> BoxFuture<'_, Result<Vec<Document>>> {
        (**self).find(query)
    }

    fn relation(&self, path: &str) -> Option<&Relation> {
        (**self).relation(path)
    }
}

/// A configured find, executed by [`Source::find`].
#[derive(Clone, Debug, Default)]
pub struct FindQuery {
    pub filter: Document,
    pub projection: Document,
    pub query_options: Option<FindOptions>,
    pub sort: Option<Document>,
    pub lean: bool,
    /// Only set when non-empty.
    pub collation: Option<Document>,
    pub read: Option<ReadPreference>,
    pub populate: Vec<PopulateSpec>,
    pub skip: Option<u64>,
    pub limit: Option<i64>,
}

impl FindQuery {
    pub fn new(filter: Document, projection: Document, query_options: Option<FindOptions>) -> Self {
        Self {
            filter,
            projection,
            query_options,
            ..Self::default()
        }
    }

    /// Merges `select` into the projection, `select` winning on conflicts.
    pub fn select(mut self, select: Document) -> Self {
        self.projection.extend(select);
        self
    }

    pub fn sort(mut self, sort: Option<Document>) -> Self {
        self.sort = sort;
        self
    }

    pub fn lean(mut self, lean: bool) -> Self {
        self.lean = lean;
        self
    }

    pub fn collation(mut self, collation: Document) -> Self {
        self.collation = Some(collation);
        self
    }

    pub fn read(mut self, read: ReadPreference) -> Self {
        self.read = Some(read);
        self
    }

    pub fn populate(mut self, populate: Vec<PopulateSpec>) -> Self {
        self.populate = populate;
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A virtual field filled from another collection.
///
/// Records whose `foreign_field` in `from` equals this record's `local_field`
/// are attached under `path`, as an array, or as a single record when
/// `just_one` is set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relation {
    pub path: String,
    pub from: String,
    pub local_field: String,
    pub foreign_field: String,
    pub just_one: bool,
}

impl Relation {
    pub fn many(
        path: impl Into<String>,
        from: impl Into<String>,
        local_field: impl Into<String>,
        foreign_field: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            from: from.into(),
            local_field: local_field.into(),
            foreign_field: foreign_field.into(),
            just_one: false,
        }
    }

    pub fn one(
        path: impl Into<String>,
        from: impl Into<String>,
        local_field: impl Into<String>,
        foreign_field: impl Into<String>,
    ) -> Self {
        Self {
            just_one: true,
            ..Self::many(path, from, local_field, foreign_field)
        }
    }
}

//! Folio paginates `MongoDB` query results.
//!
//! A call counts the records matching a filter, fetches one window of them,
//! and returns the window together with navigation metadata: total pages,
//! current and adjacent page numbers, and the 1-based position of the first
//! record.
//!
//! ## Example
//!
//! ```rust,ignore
//! struct Book;
//!
//! impl Model for Book {
//!     const COLLECTION_NAME: &'static str = "book";
//! }
//!
//! // db.book.find({ author: "a" }).skip(40).limit(10)
//! let page = Book::paginate(&db, doc! { "author": "a" }, PaginateOptions::new()
//!     .page(5)
//!     .limit(10)
//!     .sort(fields::sort("-_id")),
//! ).await?;
//!
//! assert_eq!(page.meta.page, Some(5));
//! assert_eq!(page.meta.next_page, Some(6));
//!
//! // Paginate an in-memory list with the same metadata rules
//! let page = Page::from_array(vec![1, 2, 3, 4, 5], 2, 2, Labels::default());
//! assert_eq!(page.docs, [3, 4]);
//! ```
//!
//! See [`guides`] module to learn more!

#![warn(clippy::pedantic)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_errors_doc
)]

use futures_util::{FutureExt, future::BoxFuture};
use mongodb::{Collection, Database, bson::Document};
use serde::de::DeserializeOwned;

pub use mongodb;

pub use array::{ArraySlice, paginate_array};
pub use error::{Error, Result};
pub use labels::{CustomLabels, Label, Labels, MetaField};
pub use meta::PageMeta;
pub use mongo::MongoSource;
pub use options::{
    DEFAULT_LIMIT, DEFAULT_POPULATE_LIMIT, PaginateOptions, PopulateSpec, PopulateWindow,
    Positioning, ResolvedOptions,
};
pub use page::Page;
pub use paginate::Paginator;
pub use source::{CountMode, FindQuery, Relation, Source};

mod array;
mod coerce;
mod error;
pub mod fields;
pub mod guides;
mod labels;
mod meta;
mod mongo;
mod options;
mod page;
mod paginate;
mod source;

/// Tracing target for option resolution and page assembly.
pub const TRACING_TARGET_PAGINATE: &str = "folio::paginate";

/// Tracing target for queries issued against a collection.
pub const TRACING_TARGET_SOURCE: &str = "folio::source";

/// A paginated collection.
///
/// Implementors name their collection and may declare the relations that can
/// be populated and the options every call on the model starts from.
pub trait Model: Send + Sync + 'static {
    const COLLECTION_NAME: &'static str;

    fn relations() -> Vec<Relation> {
        Vec::new()
    }

    /// Options layered between the defaults and the options of each call.
    fn paginate_options() -> PaginateOptions {
        PaginateOptions::default()
    }

    fn collection(db: &Database) -> Collection<Document> {
        db.collection(Self::COLLECTION_NAME)
    }

    fn source(db: &Database) -> MongoSource {
        MongoSource::new(Self::collection(db)).with_relations(Self::relations())
    }

    fn paginator(db: &Database) -> Paginator<MongoSource> {
        Paginator::new(Self::source(db)).with_options(Self::paginate_options())
    }

    fn paginate(
        db: &Database,
        filter: Document,
        options: PaginateOptions,
    ) -> BoxFuture<'static, Result<Page<Document>>> {
        let paginator = Self::paginator(db);

        async move { paginator.paginate(filter, options).await }.boxed()
    }

    /// [`Model::paginate`], deserializing every record into `P`.
    fn paginate_as<P>(
        db: &Database,
        filter: Document,
        options: PaginateOptions,
    ) -> BoxFuture<'static, Result<Page<P>>>
    where
        P: DeserializeOwned + Send + 'static,
    {
        let page = Self::paginate(db, filter, options);

        async move { page.await?.hydrate() }.boxed()
    }
}

/// ## Getting started
///
/// The [`Model`](crate::Model) trait maps a Rust type to a `MongoDB` collection and
/// gives it a [`paginate`](crate::Model::paginate) method. Only the collection name
/// is required:
///
/// ```rust,ignore
/// use folio::{Model, PaginateOptions};
/// use mongodb::bson::doc;
///
/// struct Book;
///
/// impl Model for Book {
///     const COLLECTION_NAME: &'static str = "book";
/// }
///
/// // Equivalent to:
/// // db.book.countDocuments({ author: "a" })
/// // db.book.find({ author: "a" }).skip(40).limit(10)
/// let page = Book::paginate(&db, doc! { "author": "a" }, PaginateOptions::new()
///     .page(5)
///     .limit(10),
/// ).await?;
/// ```
///
/// The count and the find run concurrently. The returned [`Page`](crate::Page) holds
/// the records in `docs` and the navigation metadata in `meta`:
///
/// | Field            | Value for 110 matches, `{ page: 5, limit: 10 }` |
/// |------------------|-------------------------------------------------|
/// | `total_docs`     | `110`                                           |
/// | `limit`          | `10`                                            |
/// | `total_pages`    | `Some(11)`                                      |
/// | `page`           | `Some(5)`                                       |
/// | `paging_counter` | `Some(41)`                                      |
/// | `has_prev_page`  | `true`                                          |
/// | `has_next_page`  | `true`                                          |
/// | `prev_page`      | `Some(4)`                                       |
/// | `next_page`      | `Some(6)`                                       |
///
/// Records are plain documents. Use [`Page::hydrate`](crate::Page::hydrate) or
/// [`Model::paginate_as`](crate::Model::paginate_as) to deserialize them:
///
/// ```rust,ignore
/// #[derive(Deserialize)]
/// struct Title {
///     title: String,
/// }
///
/// let page: Page<Title> = Book::paginate_as(&db, doc! {}, PaginateOptions::new()
///     .select(fields::select("title -_id")),
/// ).await?;
/// ```
///
/// ### Positioning
///
/// A call is positioned by `offset`, by `page`, or by neither:
///
/// - `offset` skips that many records. The page number is derived from it, so
///   `{ offset: 40, limit: 10 }` reports page 5.
/// - `page` skips `(page - 1) * limit` records.
/// - without either, the first page is returned.
///
/// `offset` wins when both are given. Numbers are never rejected: negative or
/// unparseable values fall back to their defaults.
///
/// ### Special limits
///
/// `limit: 0` only counts. No records are fetched, `limit` is reported as `0`
/// and every page number is `None`.
///
/// `pagination: false` fetches every matching record. The page reports itself as
/// the only page, with `limit` equal to the total.
///
/// ### Options
///
/// Options are merged in three layers, each overriding the previous one field by
/// field: [`PaginateOptions::defaults`](crate::PaginateOptions::defaults), then
/// [`Model::paginate_options`](crate::Model::paginate_options), then the options of
/// the call. Custom labels are merged per label.
///
/// | Option              | Default | Description                                                     |
/// |---------------------|---------|-----------------------------------------------------------------|
/// | `select`            | `{}`    | Projection merged over `projection`, or `"title -_id"`.         |
/// | `projection`        | `{}`    | Base projection.                                                |
/// | `query_options`     | none    | [`FindOptions`](mongodb::options::FindOptions) passed through.  |
/// | `sort`              | none    | Sort document, or `"-price title"`.                             |
/// | `collation`         | `{}`    | Only forwarded when non-empty.                                  |
/// | `populate`          | none    | Relations to expand, see [`populate`](super::populate).         |
/// | `read`              | none    | Read preference for both the count and the find.                |
/// | `lean`              | `false` | Return plain records.                                           |
/// | `lean_with_id`      | `true`  | With `lean`, copy `_id` into a string `id` field.               |
/// | `pagination`        | `true`  | `false` fetches everything.                                     |
/// | `force_count_fn`    | `false` | Use the collection-wide estimate instead of counting.           |
/// | `custom_labels`     | none    | Output names, see [`labels`](super::labels).                    |
/// | `offset`            | none    | Records to skip.                                                |
/// | `page`              | `1`     | 1-based page number.                                            |
/// | `limit`             | `10`    | Records per page.                                               |
///
/// Options deserialize from camelCase documents, so they can be taken straight
/// from a request:
///
/// ```rust,ignore
/// let options: PaginateOptions = serde_json::from_str(r#"{ "page": "2", "limit": 25 }"#)?;
/// ```
///
/// ### Other sources
///
/// [`Paginator`](crate::Paginator) runs against any [`Source`](crate::Source). The
/// [`MongoSource`](crate::MongoSource) used by [`Model`](crate::Model) wraps a
/// [`Collection`](mongodb::Collection), but a source can equally be backed by a cache
/// or by fixtures in tests.
///
/// ```rust,ignore
/// let paginator = Paginator::new(MongoSource::new(db.collection("book")))
///     .with_options(PaginateOptions::new().limit(25));
///
/// paginator.paginate_with(doc! {}, PaginateOptions::new(), |result| match result {
///     Ok(page) => println!("{} books", page.meta.total_docs),
///     Err(err) => eprintln!("{err}"),
/// }).await;
/// ```
pub mod getting_started {}

/// Pages serialize with `serde`. By default the records go under `docs` and the
/// metadata is flattened next to them:
///
/// ```json
/// {
///   "docs": [...],
///   "totalDocs": 110,
///   "limit": 10,
///   "totalPages": 11,
///   "page": 5,
///   "pagingCounter": 41,
///   "hasPrevPage": true,
///   "hasNextPage": true,
///   "prevPage": 4,
///   "nextPage": 6
/// }
/// ```
///
/// An `offset` field is added when the call was positioned by `offset` or not
/// positioned at all.
///
/// ### Renaming fields
///
/// Every field can be renamed through [`CustomLabels`](crate::CustomLabels):
///
/// ```rust,ignore
/// let options = PaginateOptions::new().custom_labels(CustomLabels {
///     docs: Some("itemsList".into()),
///     total_docs: Some("itemCount".into()),
///     ..Default::default()
/// });
/// ```
///
/// ### Dropping fields
///
/// [`Label::Suppressed`](crate::Label::Suppressed) omits a field from the output.
/// In a deserialized label set, `false` has the same effect:
///
/// ```json
/// { "customLabels": { "prevPage": false, "nextPage": false } }
/// ```
///
/// ### Nesting metadata
///
/// A `meta` label moves every metadata field under that key:
///
/// ```json
/// { "docs": [...], "meta": { "totalDocs": 110, "limit": 10, ... } }
/// ```
///
/// When two fields share a name, the one emitted later wins.
pub mod labels {}

/// Populated relations are expanded with a `$lookup` after the parent records are
/// windowed. A relation has to be declared on the model before it can be
/// populated:
///
/// ```rust,ignore
/// struct Author;
///
/// impl Model for Author {
///     const COLLECTION_NAME: &'static str = "author";
///
///     fn relations() -> Vec<Relation> {
///         // db.book.find({ author: <author._id> })
///         vec![Relation::many("books", "book", "_id", "author")]
///     }
/// }
///
/// let page = Author::paginate(&db, doc! {}, PaginateOptions::new()
///     .populate([PopulateSpec::new("books").sort(fields::sort("title"))]),
/// ).await?;
/// ```
///
/// Populating a path without a declared relation fails with
/// [`Error::UnknownRelation`](crate::Error::UnknownRelation).
///
/// ### Paginating populated relations
///
/// With `paginate_populates`, every to-many relation of every fetched record is
/// replaced by a page of its own, using the default labels. The window of each
/// path comes from `populate_options` and defaults to offset `0` and limit `10`:
///
/// ```rust,ignore
/// let options = PaginateOptions::new()
///     .populate(["books".into()])
///     .paginate_populates(true)
///     .populate_options([("books".into(), PopulateWindow::new(8, 3))]);
/// ```
///
/// For an author with 10 books this yields 2 books under `books.docs`, with
/// `books.totalDocs` of 10. To-one relations are left as they are.
///
/// The same rules are available for any list through
/// [`paginate_array`](crate::paginate_array) and
/// [`Page::from_array`](crate::Page::from_array).
pub mod populate {}

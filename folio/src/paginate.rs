use crate::{
    Error, Page, Result, TRACING_TARGET_PAGINATE,
    labels::Labels,
    meta::PageMeta,
    options::{PaginateOptions, ResolvedOptions},
    source::{FindQuery, Source},
};
use futures_util::{
    FutureExt,
    future::{self, BoxFuture},
};
use mongodb::bson::{self, Bson, Document};
use tracing::Instrument;

/// Paginates the records of a [`Source`].
///
/// Options passed to [`Paginator::with_options`] form the model layer: they
/// override the defaults and are overridden by the options of each call.
#[derive(Clone, Debug)]
pub struct Paginator<S> {
    source: S,
    options: PaginateOptions,
}

impl<S: Source> Paginator<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            options: PaginateOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PaginateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn options(&self) -> &PaginateOptions {
        &self.options
    }

    /// Counts the records matching `filter` and fetches one page of them.
    ///
    /// The count and the fetch run concurrently and are not isolated from
    /// each other, so writes landing in between can make the total disagree
    /// with the returned page. Either failure fails the whole call.
    pub fn paginate(
        &self,
        filter: Document,
        options: PaginateOptions,
    ) -> BoxFuture<'_, Result<Page<Document>>> {
        let options = PaginateOptions::defaults()
            .merge(self.options.clone())
            .merge(options)
            .resolve();

        let span = tracing::debug_span!(
            target: TRACING_TARGET_PAGINATE,
            "paginate",
            limit = options.limit,
            skip = options.skip(),
        );

        async move {
            tracing::debug!(
                target: TRACING_TARGET_PAGINATE,
                positioning = ?options.positioning,
                count_mode = ?options.count_mode,
                pagination = options.pagination,
                "Resolved pagination options"
            );

            let count = self.source.count(&filter, options.count_mode);
            let docs = self.fetch(&filter, &options);

            let (total_docs, mut docs) = future::try_join(count, docs).await?;

            tracing::debug!(
                target: TRACING_TARGET_PAGINATE,
                total_docs,
                fetched = docs.len(),
                "Fetched page"
            );

            if options.paginate_populates && !options.populate.is_empty() {
                self.paginate_populates(&mut docs, &options)?;
            }

            let meta = PageMeta::compute(
                total_docs,
                options.limit,
                options.positioning,
                options.pagination,
            );

            Ok(Page::new(docs, meta, options.labels))
        }
        .instrument(span)
        .boxed()
    }

    /// Runs [`Paginator::paginate`] and hands the outcome to `callback`.
    pub async fn paginate_with<F, R>(
        &self,
        filter: Document,
        options: PaginateOptions,
        callback: F,
    ) -> R
    where
        F: FnOnce(Result<Page<Document>>) -> R,
    {
        callback(self.paginate(filter, options).await)
    }

    async fn fetch(&self, filter: &Document, options: &ResolvedOptions) -> Result<Vec<Document>> {
        if options.limit == 0 {
            return Ok(Vec::new());
        }

        let mut docs = self.source.find(find_query(filter, options)).await?;

        if options.lean && options.lean_with_id {
            docs.iter_mut().for_each(stamp_id);
        }

        Ok(docs)
    }

    /// Replaces every multi-valued populated field with a page of its
    /// related records, records first, then paths in the requested order.
    fn paginate_populates(&self, docs: &mut [Document], options: &ResolvedOptions) -> Result<()> {
        let mut paths = Vec::with_capacity(options.populate.len());

        for spec in &options.populate {
            let relation = self
                .source
                .relation(&spec.path)
                .ok_or_else(|| Error::UnknownRelation(spec.path.clone()))?;

            if !relation.just_one {
                let window = options.populate_window(&spec.path);

                tracing::debug!(
                    target: TRACING_TARGET_PAGINATE,
                    path = spec.path.as_str(),
                    offset = window.offset_or_default(),
                    limit = window.limit_or_default(),
                    "Paginating populated relation"
                );

                paths.push((spec.path.as_str(), window));
            }
        }

        for document in docs {
            for (path, window) in &paths {
                let related = match document
                    .get_mut(*path)
                    .map(|value| std::mem::replace(value, Bson::Null))
                {
                    Some(Bson::Array(items)) => items,
                    Some(Bson::Null) | None => Vec::new(),
                    Some(item) => vec![item],
                };

                let page = Page::from_array(
                    related,
                    window.offset_or_default(),
                    window.limit_or_default(),
                    Labels::default(),
                );

                document.insert(*path, bson::to_bson(&page)?);
            }
        }

        Ok(())
    }
}

fn find_query(filter: &Document, options: &ResolvedOptions) -> FindQuery {
    let mut query = FindQuery::new(
        filter.clone(),
        options.projection.clone(),
        options.query_options.clone(),
    )
    .select(options.select.clone())
    .sort(options.sort.clone())
    .lean(options.lean);

    // Older servers reject an empty collation.
    if !options.collation.is_empty() {
        query = query.collation(options.collation.clone());
    }

    if let Some(read) = &options.read {
        query = query.read(read.clone());
    }

    if !options.populate.is_empty() {
        query = query.populate(options.populate.clone());
    }

    if options.pagination {
        query = query
            .skip(options.skip())
            .limit(i64::try_from(options.limit).unwrap_or(i64::MAX));
    }

    query
}

/// Copies the primary key into a string `id` field.
fn stamp_id(document: &mut Document) {
    let id = match document.get("_id") {
        Some(Bson::ObjectId(id)) => id.to_hex(),
        Some(Bson::String(id)) => id.clone(),
        Some(Bson::Int32(id)) => id.to_string(),
        Some(Bson::Int64(id)) => id.to_string(),
        Some(other) => other.to_string(),
        None => return,
    };

    document.insert("id", id);
}

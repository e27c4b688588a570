use crate::{
    Error, Result, TRACING_TARGET_SOURCE,
    options::PopulateSpec,
    source::{CountMode, FindQuery, Relation, Source},
};
use futures_util::{FutureExt, TryStreamExt, future::BoxFuture};
use mongodb::{
    Collection,
    bson::{self, Bson, Document, doc},
    options::{AggregateOptions, FindOptions, SelectionCriteria},
};

/// [`Source`] backed by a MongoDB collection.
///
/// Queries without populate specs run as a plain `find`. Populated queries run
/// as an aggregation that windows the parent records first and then expands
/// every relation with a `$lookup`; `query_options` only apply to plain finds.
/// Records always come back as plain documents, so `lean` has no effect here.
#[derive(Clone, Debug)]
pub struct MongoSource {
    collection: Collection<Document>,
    relations: Vec<Relation>,
}

impl MongoSource {
    pub fn new(collection: Collection<Document>) -> Self {
        Self {
            collection,
            relations: Vec::new(),
        }
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    pub fn with_relations(mut self, relations: impl IntoIterator<Item = Relation>) -> Self {
        self.relations.extend(relations);
        self
    }

    async fn find_documents(&self, mut query: FindQuery) -> Result<Vec<Document>> {
        let filter = std::mem::take(&mut query.filter);
        let options = find_options(query)?;

        tracing::debug!(
            target: TRACING_TARGET_SOURCE,
            collection = self.collection.name(),
            skip = options.skip,
            limit = options.limit,
            "Running find"
        );

        let documents = self
            .collection
            .find(filter)
            .with_options(options)
            .await?
            .try_collect()
            .await?;

        Ok(documents)
    }

    async fn aggregate_documents(&self, query: FindQuery) -> Result<Vec<Document>> {
        let stages = pipeline(&query, &self.relations)?;

        let mut options = AggregateOptions::default();

        if let Some(collation) = query.collation {
            options.collation = Some(bson::from_document(collation)?);
        }

        if let Some(read) = query.read {
            options.selection_criteria = Some(SelectionCriteria::ReadPreference(read));
        }

        tracing::debug!(
            target: TRACING_TARGET_SOURCE,
            collection = self.collection.name(),
            stages = stages.len(),
            "Running populate aggregation"
        );

        let documents = self
            .collection
            .aggregate(stages)
            .with_options(options)
            .await?
            .try_collect()
            .await?;

        Ok(documents)
    }
}

impl Source for MongoSource {
    fn count<'a>(&'a self, filter: &'a Document, mode: CountMode) -> BoxFuture<'a, Result<u64>> {
        async move {
            let count = match mode {
                CountMode::Exact => self.collection.count_documents(filter.clone()).await?,
                CountMode::Estimated => self.collection.estimated_document_count().await?,
            };

            Ok(count)
        }
        .boxed()
    }

    fn find(&self, query: FindQuery) -> BoxFuture<'_, Result<Vec<Document>>> {
        async move {
            if query.populate.is_empty() {
                self.find_documents(query).await
            } else {
                self.aggregate_documents(query).await
            }
        }
        .boxed()
    }

    fn relation(&self, path: &str) -> Option<&Relation> {
        self.relations.iter().find(|relation| relation.path == path)
    }
}

/// Layers the configured query over the caller's `query_options`.
fn find_options(query: FindQuery) -> Result<FindOptions> {
    let FindQuery {
        projection,
        query_options,
        sort,
        collation,
        read,
        skip,
        limit,
        ..
    } = query;

    let mut options = query_options.unwrap_or_default();

    if !projection.is_empty() {
        options.projection = Some(projection);
    }

    if let Some(sort) = sort {
        options.sort = Some(sort);
    }

    if let Some(skip) = skip {
        options.skip = Some(skip);
    }

    if let Some(limit) = limit {
        options.limit = Some(limit);
    }

    if let Some(collation) = collation {
        options.collation = Some(bson::from_document(collation)?);
    }

    if let Some(read) = read {
        options.selection_criteria = Some(SelectionCriteria::ReadPreference(read));
    }

    Ok(options)
}

/// Aggregation equivalent of a populated find.
///
/// The projection runs last so that relation keys are still present when the
/// lookups run; inclusion projections keep every populated path.
fn pipeline(query: &FindQuery, relations: &[Relation]) -> Result<Vec<Document>> {
    let mut stages = vec![doc! { "$match": query.filter.clone() }];

    if let Some(sort) = query.sort.as_ref().filter(|sort| !sort.is_empty()) {
        stages.push(doc! { "$sort": sort.clone() });
    }

    if let Some(skip) = query.skip.filter(|skip| *skip > 0) {
        stages.push(doc! { "$skip": i64::try_from(skip).unwrap_or(i64::MAX) });
    }

    if let Some(limit) = query.limit.filter(|limit| *limit > 0) {
        stages.push(doc! { "$limit": limit });
    }

    for spec in &query.populate {
        let relation = relations
            .iter()
            .find(|relation| relation.path == spec.path)
            .ok_or_else(|| Error::UnknownRelation(spec.path.clone()))?;

        stages.extend(lookup(relation, spec));
    }

    if !query.projection.is_empty() {
        let projection = populated_projection(&query.projection, &query.populate);
        stages.push(doc! { "$project": projection });
    }

    Ok(stages)
}

/// Adds the populated paths to an inclusion projection.
fn populated_projection(projection: &Document, populate: &[PopulateSpec]) -> Document {
    let inclusive = projection.iter().any(|(field, value)| {
        field != "_id" && !matches!(value, Bson::Int32(0) | Bson::Int64(0) | Bson::Boolean(false))
    });

    let mut projection = projection.clone();

    if inclusive {
        for spec in populate {
            if !projection.contains_key(&spec.path) {
                projection.insert(spec.path.as_str(), 1);
            }
        }
    }

    projection
}

fn lookup(relation: &Relation, spec: &PopulateSpec) -> Vec<Document> {
    let mut related = vec![doc! {
        "$match": { "$expr": { "$eq": [format!("${}", relation.foreign_field), "$$local"] } }
    }];

    if let Some(filter) = &spec.filter {
        related.push(doc! { "$match": filter.clone() });
    }

    if let Some(sort) = &spec.sort {
        related.push(doc! { "$sort": sort.clone() });
    }

    if let Some(select) = &spec.select {
        related.push(doc! { "$project": select.clone() });
    }

    let path = relation.path.as_str();

    let mut stages = vec![doc! {
        "$lookup": {
            "from": relation.from.as_str(),
            "let": { "local": format!("${}", relation.local_field) },
            "pipeline": related,
            "as": path,
        }
    }];

    if relation.just_one {
        stages.push(doc! {
            "$addFields": { path: { "$arrayElemAt": [format!("${path}"), 0] } }
        });
    }

    stages
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::options::ReadPreference;

    fn relations() -> Vec<Relation> {
        vec![
            Relation::many("books", "book", "_id", "author"),
            Relation::one("publisher", "publisher", "publisher", "_id"),
        ]
    }

    #[test]
    fn windows_before_expanding() {
        let query = FindQuery::new(doc! { "name": "Faulkner" }, doc! {}, None)
            .sort(Some(doc! { "_id": 1 }))
            .skip(1)
            .limit(1)
            .populate(vec![PopulateSpec::new("books").sort(doc! { "_id": 1 })]);

        let stages = pipeline(&query, &relations()).unwrap();

        assert_eq!(
            stages,
            vec![
                doc! { "$match": { "name": "Faulkner" } },
                doc! { "$sort": { "_id": 1 } },
                doc! { "$skip": 1_i64 },
                doc! { "$limit": 1_i64 },
                doc! {
                    "$lookup": {
                        "from": "book",
                        "let": { "local": "$_id" },
                        "pipeline": [
                            { "$match": { "$expr": { "$eq": ["$author", "$$local"] } } },
                            { "$sort": { "_id": 1 } },
                        ],
                        "as": "books",
                    }
                },
            ]
        );
    }

    #[test]
    fn unwraps_to_one_relations() {
        let query = FindQuery::new(doc! {}, doc! {}, None)
            .populate(vec![PopulateSpec::new("publisher").select(doc! { "name": 1 })]);

        let stages = pipeline(&query, &relations()).unwrap();

        assert_eq!(
            stages[2],
            doc! { "$addFields": { "publisher": { "$arrayElemAt": ["$publisher", 0] } } }
        );
    }

    #[test]
    fn projects_after_lookups() {
        let query = FindQuery::new(doc! {}, doc! { "title": 1 }, None)
            .populate(vec![PopulateSpec::new("publisher")]);

        let stages = pipeline(&query, &relations()).unwrap();

        let lookup = stages
            .iter()
            .position(|stage| stage.contains_key("$lookup"))
            .unwrap();
        let project = stages
            .iter()
            .position(|stage| stage.contains_key("$project"))
            .unwrap();

        assert!(lookup < project);
        assert_eq!(
            stages.last(),
            Some(&doc! { "$project": { "title": 1, "publisher": 1 } })
        );
    }

    #[test]
    fn exclusion_projections_are_kept_as_given() {
        let projection = doc! { "author": 0, "_id": 0 };

        let projection = populated_projection(&projection, &[PopulateSpec::new("books")]);

        assert_eq!(projection, doc! { "author": 0, "_id": 0 });
    }

    #[test]
    fn explicitly_excluded_paths_stay_excluded() {
        let projection = doc! { "title": 1, "publisher": 0 };

        let projection = populated_projection(&projection, &[PopulateSpec::new("publisher")]);

        assert_eq!(projection, doc! { "title": 1, "publisher": 0 });
    }

    #[test]
    fn find_options_layer_over_query_options() {
        let mut query_options = FindOptions::default();
        query_options.batch_size = Some(50);
        query_options.allow_disk_use = Some(true);
        query_options.limit = Some(500);

        let query = FindQuery::new(doc! {}, doc! { "title": 1 }, Some(query_options))
            .sort(Some(doc! { "_id": -1 }))
            .collation(doc! { "locale": "fr" })
            .read(ReadPreference::Primary)
            .skip(20)
            .limit(10);

        let options = find_options(query).unwrap();

        assert_eq!(options.batch_size, Some(50));
        assert_eq!(options.allow_disk_use, Some(true));
        assert_eq!(options.limit, Some(10));
        assert_eq!(options.skip, Some(20));
        assert_eq!(options.projection, Some(doc! { "title": 1 }));
        assert_eq!(options.sort, Some(doc! { "_id": -1 }));
        assert_eq!(options.collation.map(|collation| collation.locale), Some("fr".to_owned()));
        assert!(matches!(
            options.selection_criteria,
            Some(SelectionCriteria::ReadPreference(ReadPreference::Primary))
        ));
    }

    #[test]
    fn find_options_keep_unset_fields() {
        let mut query_options = FindOptions::default();
        query_options.limit = Some(500);

        let options = find_options(FindQuery::new(doc! {}, doc! {}, Some(query_options))).unwrap();

        assert_eq!(options.limit, Some(500));
        assert_eq!(options.projection, None);
        assert!(options.selection_criteria.is_none());
    }

    #[test]
    fn zero_skip_is_omitted() {
        let query = FindQuery::new(doc! {}, doc! {}, None)
            .skip(0)
            .limit(5)
            .populate(vec![PopulateSpec::new("books")]);

        let stages = pipeline(&query, &relations()).unwrap();

        assert!(stages.iter().all(|stage| !stage.contains_key("$skip")));
        assert_eq!(stages[1], doc! { "$limit": 5_i64 });
    }

    #[test]
    fn unknown_relation_fails() {
        let query =
            FindQuery::new(doc! {}, doc! {}, None).populate(vec![PopulateSpec::new("reviews")]);

        let result = pipeline(&query, &relations());

        assert!(matches!(result, Err(Error::UnknownRelation(path)) if path == "reviews"));
    }
}

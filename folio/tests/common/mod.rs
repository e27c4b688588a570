#![allow(dead_code)]

use folio::{
    CountMode, Error, FindQuery, Relation, Result, Source,
    mongodb::bson::{Bson, Document, doc},
};
use futures_util::{
    FutureExt,
    future::{self, BoxFuture},
};
use std::{
    cmp::Ordering,
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering as AtomicOrdering},
    },
};

/// A [`Source`] over in-memory records.
///
/// Filters match top-level fields by equality, sorts compare integers and
/// strings, and projections follow `MongoDB` inclusion and exclusion rules.
#[derive(Default)]
pub struct MemorySource {
    records: Vec<Document>,
    collections: HashMap<String, Vec<Document>>,
    relations: Vec<Relation>,
    fail_count: bool,
    fail_find: bool,
    counts: AtomicUsize,
    finds: AtomicUsize,
    queries: Mutex<Vec<FindQuery>>,
}

impl MemorySource {
    pub fn new(records: Vec<Document>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn with_collection(mut self, name: &str, records: Vec<Document>) -> Self {
        self.collections.insert(name.to_owned(), records);
        self
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    pub fn failing_count(mut self) -> Self {
        self.fail_count = true;
        self
    }

    pub fn failing_find(mut self) -> Self {
        self.fail_find = true;
        self
    }

    pub fn count_calls(&self) -> usize {
        self.counts.load(AtomicOrdering::SeqCst)
    }

    pub fn find_calls(&self) -> usize {
        self.finds.load(AtomicOrdering::SeqCst)
    }

    pub fn last_query(&self) -> Option<FindQuery> {
        self.queries.lock().unwrap().last().cloned()
    }

    fn matching(&self, filter: &Document) -> Vec<Document> {
        self.records
            .iter()
            .filter(|record| filter.iter().all(|(key, value)| record.get(key) == Some(value)))
            .cloned()
            .collect()
    }

    fn run(&self, query: &FindQuery) -> Result<Vec<Document>> {
        let mut records = self.matching(&query.filter);

        if let Some(sort) = &query.sort {
            sort_documents(&mut records, sort);
        }

        let skip = usize::try_from(query.skip.unwrap_or(0)).unwrap();
        let limit = query
            .limit
            .filter(|limit| *limit > 0)
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap());

        let mut records: Vec<Document> = records
            .into_iter()
            .skip(skip)
            .take(limit)
            .collect();

        for spec in &query.populate {
            let relation = self
                .relation(&spec.path)
                .ok_or_else(|| Error::UnknownRelation(spec.path.clone()))?;

            let related = self
                .collections
                .get(&relation.from)
                .map(Vec::as_slice)
                .unwrap_or_default();

            for record in &mut records {
                let local = record.get(&relation.local_field).cloned();

                let mut matches: Vec<Document> = related
                    .iter()
                    .filter(|other| {
                        local.is_some() && other.get(&relation.foreign_field) == local.as_ref()
                    })
                    .cloned()
                    .collect();

                if let Some(sort) = &spec.sort {
                    sort_documents(&mut matches, sort);
                }

                let value = if relation.just_one {
                    matches.into_iter().next().map_or(Bson::Null, Bson::Document)
                } else {
                    Bson::Array(matches.into_iter().map(Bson::Document).collect())
                };

                record.insert(relation.path.clone(), value);
            }
        }

        let mut projection = query.projection.clone();
        if is_inclusive(&projection) {
            for spec in &query.populate {
                if !projection.contains_key(&spec.path) {
                    projection.insert(spec.path.as_str(), 1);
                }
            }
        }

        Ok(records
            .into_iter()
            .map(|record| project(record, &projection))
            .collect())
    }
}

impl Source for MemorySource {
    fn count<'a>(&'a self, filter: &'a Document, mode: CountMode) -> BoxFuture<'a, Result<u64>> {
        self.counts.fetch_add(1, AtomicOrdering::SeqCst);

        let result = if self.fail_count {
            Err(connection_error())
        } else {
            let count = match mode {
                CountMode::Exact => self.matching(filter).len(),
                CountMode::Estimated => self.records.len(),
            };
            Ok(count as u64)
        };

        future::ready(result).boxed()
    }

    fn find(&self, query: FindQuery) -> BoxFuture<'_, Result<Vec<Document>>> {
        self.finds.fetch_add(1, AtomicOrdering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());

        let result = if self.fail_find {
            Err(connection_error())
        } else {
            self.run(&query)
        };

        future::ready(result).boxed()
    }

    fn relation(&self, path: &str) -> Option<&Relation> {
        self.relations.iter().find(|relation| relation.path == path)
    }
}

pub fn connection_error() -> Error {
    folio::mongodb::error::Error::from(std::io::Error::other("connection reset")).into()
}

fn number(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(value) => Some(i64::from(*value)),
        Bson::Int64(value) => Some(*value),
        _ => None,
    }
}

fn compare(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a, b) {
        (Some(Bson::Int32(a)), Some(Bson::Int32(b))) => a.cmp(b),
        (Some(Bson::Int64(a)), Some(Bson::Int64(b))) => a.cmp(b),
        (Some(Bson::String(a)), Some(Bson::String(b))) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

fn sort_documents(records: &mut [Document], sort: &Document) {
    records.sort_by(|a, b| {
        sort.iter()
            .map(|(field, direction)| {
                let ordering = compare(a.get(field), b.get(field));
                if number(direction) == Some(-1) {
                    ordering.reverse()
                } else {
                    ordering
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}

fn is_inclusive(projection: &Document) -> bool {
    projection
        .iter()
        .any(|(field, value)| field != "_id" && number(value) == Some(1))
}

fn project(record: Document, projection: &Document) -> Document {
    if projection.is_empty() {
        return record;
    }

    let inclusive = is_inclusive(projection);

    record
        .into_iter()
        .filter(|(field, _)| {
            let flag = projection.get(field).and_then(number);
            if inclusive {
                flag.map_or(field == "_id", |flag| flag == 1)
            } else {
                flag != Some(0)
            }
        })
        .collect()
}

/// 110 books: 100 by author `a`, 10 by author `b`; the first 14 belong to
/// the `first` series.
pub fn books() -> Vec<Document> {
    (1..=110)
        .map(|n: i32| {
            let author = if n <= 100 { "a" } else { "b" };
            let series = if n <= 14 { "first" } else { "rest" };

            doc! {
                "_id": n,
                "title": format!("Book #{n}"),
                "author": author,
                "series": series,
                "publisher": "p1",
            }
        })
        .collect()
}

pub fn authors() -> Vec<Document> {
    vec![
        doc! { "_id": "a", "name": "Ann" },
        doc! { "_id": "b", "name": "Bo" },
    ]
}

pub fn publishers() -> Vec<Document> {
    vec![doc! { "_id": "p1", "name": "Press" }]
}

pub fn book_source() -> MemorySource {
    MemorySource::new(books())
        .with_collection("publisher", publishers())
        .with_relation(Relation::one("publisher", "publisher", "publisher", "_id"))
}

pub fn author_source() -> MemorySource {
    MemorySource::new(authors())
        .with_collection("book", books())
        .with_relation(Relation::many("books", "book", "_id", "author"))
}

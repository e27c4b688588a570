use crate::{
    labels::{Labels, MetaField},
    meta::PageMeta,
};
use mongodb::bson::{self, Document};
use serde::{Serialize, Serializer, de::DeserializeOwned, ser::SerializeMap};

/// A page of records together with its position in the full result set.
///
/// Serializing a page applies its [`Labels`]: metadata fields are emitted
/// under their configured names, suppressed fields are omitted, and a `meta`
/// label nests every metadata field under that key next to the documents.
///
/// ```json
/// { "docs": [...], "totalDocs": 110, "limit": 10, "totalPages": 11, "page": 5, ... }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub docs: Vec<T>,
    pub meta: PageMeta,
    pub labels: Labels,
}

impl<T> Page<T> {
    pub fn new(docs: Vec<T>, meta: PageMeta, labels: Labels) -> Self {
        Self { docs, meta, labels }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            docs: self.docs.into_iter().map(f).collect(),
            meta: self.meta,
            labels: self.labels,
        }
    }

    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        Ok(Page {
            docs: self.docs.into_iter().map(f).collect::<Result<_, _>>()?,
            meta: self.meta,
            labels: self.labels,
        })
    }

    /// Labeled metadata in output order, later duplicates overwriting
    /// earlier values in place.
    fn metadata(&self) -> Vec<(&str, MetaValue)> {
        fn insert<'a>(
            entries: &mut Vec<(&'a str, MetaValue)>,
            key: Option<&'a str>,
            value: MetaValue,
        ) {
            let Some(key) = key else {
                return;
            };

            match entries.iter_mut().find(|(existing, _)| *existing == key) {
                Some(entry) => entry.1 = value,
                None => entries.push((key, value)),
            }
        }

        let labels = &self.labels;
        let meta = &self.meta;
        let mut entries = Vec::with_capacity(10);

        insert(
            &mut entries,
            labels.name(MetaField::TotalDocs),
            MetaValue::Count(meta.total_docs),
        );
        if let Some(offset) = meta.offset {
            insert(&mut entries, Some("offset"), MetaValue::Count(offset));
        }
        insert(
            &mut entries,
            labels.name(MetaField::Limit),
            MetaValue::Count(meta.limit),
        );
        insert(
            &mut entries,
            labels.name(MetaField::TotalPages),
            meta.total_pages.into(),
        );
        insert(&mut entries, labels.name(MetaField::Page), meta.page.into());
        insert(
            &mut entries,
            labels.name(MetaField::PagingCounter),
            meta.paging_counter.into(),
        );
        insert(
            &mut entries,
            labels.name(MetaField::HasPrevPage),
            MetaValue::Flag(meta.has_prev_page),
        );
        insert(
            &mut entries,
            labels.name(MetaField::HasNextPage),
            MetaValue::Flag(meta.has_next_page),
        );
        insert(
            &mut entries,
            labels.name(MetaField::PrevPage),
            meta.prev_page.into(),
        );
        insert(
            &mut entries,
            labels.name(MetaField::NextPage),
            meta.next_page.into(),
        );

        entries
    }
}

impl Page<Document> {
    /// Deserializes every record into `P`.
    pub fn hydrate<P: DeserializeOwned>(self) -> crate::Result<Page<P>> {
        self.try_map(|document| bson::from_document(document).map_err(crate::Error::from))
    }
}

impl<T: Serialize> Page<T> {
    /// Renders the labeled page as a BSON document.
    pub fn to_document(&self) -> crate::Result<Document> {
        Ok(bson::to_document(self)?)
    }
}

impl<T: Serialize> Serialize for Page<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.metadata();
        let mut map = serializer.serialize_map(None)?;

        if let Some(meta_label) = self.labels.meta() {
            if let Some(docs_label) = self.labels.docs().filter(|label| *label != meta_label) {
                map.serialize_entry(docs_label, &self.docs)?;
            }
            map.serialize_entry(meta_label, &Metadata(&entries))?;
        } else {
            let docs_label = self
                .labels
                .docs()
                .filter(|label| entries.iter().all(|(key, _)| key != label));
            if let Some(docs_label) = docs_label {
                map.serialize_entry(docs_label, &self.docs)?;
            }
            for (key, value) in &entries {
                map.serialize_entry(key, value)?;
            }
        }

        map.end()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MetaValue {
    Count(u64),
    Flag(bool),
    Null,
}

impl From<Option<u64>> for MetaValue {
    fn from(value: Option<u64>) -> Self {
        value.map_or(Self::Null, Self::Count)
    }
}

impl Serialize for MetaValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Self::Count(count) => serializer.serialize_u64(count),
            Self::Flag(flag) => serializer.serialize_bool(flag),
            Self::Null => serializer.serialize_none(),
        }
    }
}

struct Metadata<'a>(&'a [(&'a str, MetaValue)]);

impl Serialize for Metadata<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

//! Pagination options and their resolution.
//!
//! Options are layered: [`PaginateOptions::defaults`], then the model or
//! paginator level, then the call. Every field is optional so that a layer
//! only overrides what it sets; [`PaginateOptions::merge`] combines two layers
//! field by field and [`PaginateOptions::resolve`] turns the result into the
//! concrete values a single request runs with.

use crate::{
    coerce,
    labels::{CustomLabels, Labels},
    source::CountMode,
};
use mongodb::{
    bson::Document,
    options::{FindOptions, ReadPreference},
};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

pub const DEFAULT_LIMIT: i64 = 10;

pub const DEFAULT_POPULATE_LIMIT: i64 = 10;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginateOptions {
    #[serde(deserialize_with = "coerce::select")]
    pub select: Option<Document>,
    pub projection: Option<Document>,
    /// Passed to the source untouched.
    #[serde(skip)]
    pub query_options: Option<FindOptions>,
    #[serde(deserialize_with = "coerce::sort")]
    pub sort: Option<Document>,
    pub collation: Option<Document>,
    #[serde(deserialize_with = "one_or_many")]
    pub populate: Option<Vec<PopulateSpec>>,
    #[serde(skip)]
    pub read: Option<ReadPreference>,
    pub lean: Option<bool>,
    pub lean_with_id: Option<bool>,
    pub pagination: Option<bool>,
    pub force_count_fn: Option<bool>,
    pub custom_labels: CustomLabels,
    pub paginate_populates: Option<bool>,
    pub populate_options: Option<BTreeMap<String, PopulateWindow>>,
    #[serde(deserialize_with = "coerce::lenient")]
    pub offset: Option<i64>,
    #[serde(deserialize_with = "coerce::lenient")]
    pub page: Option<i64>,
    #[serde(deserialize_with = "coerce::lenient")]
    pub limit: Option<i64>,
}

impl PaginateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bottom configuration layer.
    pub fn defaults() -> Self {
        Self {
            select: Some(Document::new()),
            projection: Some(Document::new()),
            collation: Some(Document::new()),
            lean: Some(false),
            lean_with_id: Some(true),
            pagination: Some(true),
            force_count_fn: Some(false),
            paginate_populates: Some(false),
            limit: Some(DEFAULT_LIMIT),
            ..Self::default()
        }
    }

    /// Layers `over` on top of `self`; every field set in `over` wins and
    /// custom labels are merged key by key.
    pub fn merge(self, over: Self) -> Self {
        Self {
            select: over.select.or(self.select),
            projection: over.projection.or(self.projection),
            query_options: over.query_options.or(self.query_options),
            sort: over.sort.or(self.sort),
            collation: over.collation.or(self.collation),
            populate: over.populate.or(self.populate),
            read: over.read.or(self.read),
            lean: over.lean.or(self.lean),
            lean_with_id: over.lean_with_id.or(self.lean_with_id),
            pagination: over.pagination.or(self.pagination),
            force_count_fn: over.force_count_fn.or(self.force_count_fn),
            custom_labels: self.custom_labels.merge(over.custom_labels),
            paginate_populates: over.paginate_populates.or(self.paginate_populates),
            populate_options: over.populate_options.or(self.populate_options),
            offset: over.offset.or(self.offset),
            page: over.page.or(self.page),
            limit: over.limit.or(self.limit),
        }
    }

    pub fn resolve(self) -> ResolvedOptions {
        let limit = u64::try_from(self.limit.unwrap_or(DEFAULT_LIMIT)).unwrap_or(0);

        let positioning = match (self.offset, self.page) {
            (Some(offset), _) => Positioning::Offset(u64::try_from(offset).unwrap_or(0)),
            (None, Some(page)) => Positioning::Page(u64::try_from(page).unwrap_or(1).max(1)),
            (None, None) => Positioning::Default,
        };

        ResolvedOptions {
            select: self.select.unwrap_or_default(),
            projection: self.projection.unwrap_or_default(),
            query_options: self.query_options,
            sort: self.sort,
            collation: self.collation.unwrap_or_default(),
            populate: self.populate.unwrap_or_default(),
            read: self.read,
            lean: self.lean.unwrap_or(false),
            lean_with_id: self.lean_with_id.unwrap_or(true),
            pagination: self.pagination.unwrap_or(true),
            count_mode: if self.force_count_fn.unwrap_or(false) {
                CountMode::Estimated
            } else {
                CountMode::Exact
            },
            labels: self.custom_labels.resolve(),
            paginate_populates: self.paginate_populates.unwrap_or(false),
            populate_options: self.populate_options.unwrap_or_default(),
            limit,
            positioning,
        }
    }

    pub fn select(mut self, select: Document) -> Self {
        self.select = Some(select);
        self
    }

    pub fn projection(mut self, projection: Document) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn query_options(mut self, query_options: FindOptions) -> Self {
        self.query_options = Some(query_options);
        self
    }

    pub fn sort(mut self, sort: Document) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn collation(mut self, collation: Document) -> Self {
        self.collation = Some(collation);
        self
    }

    pub fn populate(mut self, populate: impl IntoIterator<Item = PopulateSpec>) -> Self {
        self.populate = Some(populate.into_iter().collect());
        self
    }

    pub fn read(mut self, read: ReadPreference) -> Self {
        self.read = Some(read);
        self
    }

    pub fn lean(mut self, lean: bool) -> Self {
        self.lean = Some(lean);
        self
    }

    pub fn lean_with_id(mut self, lean_with_id: bool) -> Self {
        self.lean_with_id = Some(lean_with_id);
        self
    }

    pub fn pagination(mut self, pagination: bool) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn force_count_fn(mut self, force_count_fn: bool) -> Self {
        self.force_count_fn = Some(force_count_fn);
        self
    }

    pub fn custom_labels(mut self, custom_labels: CustomLabels) -> Self {
        self.custom_labels = custom_labels;
        self
    }

    pub fn paginate_populates(mut self, paginate_populates: bool) -> Self {
        self.paginate_populates = Some(paginate_populates);
        self
    }

    pub fn populate_options(
        mut self,
        populate_options: impl IntoIterator<Item = (String, PopulateWindow)>,
    ) -> Self {
        self.populate_options = Some(populate_options.into_iter().collect());
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Where a page starts. Built once during resolution; `offset` wins over
/// `page` when both were given.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Positioning {
    Offset(u64),
    /// 1-based page number.
    Page(u64),
    /// Neither key was given: offset 0, page 1.
    Default,
}

impl Positioning {
    pub fn skip(self, limit: u64) -> u64 {
        match self {
            Self::Offset(offset) => offset,
            Self::Page(page) => page.saturating_sub(1).saturating_mul(limit),
            Self::Default => 0,
        }
    }

    /// The offset reported in the page metadata, absent in page mode.
    pub fn offset(self) -> Option<u64> {
        match self {
            Self::Offset(offset) => Some(offset),
            Self::Page(_) => None,
            Self::Default => Some(0),
        }
    }

    /// The page number, derived from the offset in offset mode.
    pub fn page(self, limit: u64) -> u64 {
        match self {
            Self::Page(page) => page,
            Self::Offset(offset) if limit > 0 => offset.saturating_add(1).div_ceil(limit),
            Self::Offset(_) | Self::Default => 1,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedOptions {
    pub select: Document,
    pub projection: Document,
    pub query_options: Option<FindOptions>,
    pub sort: Option<Document>,
    pub collation: Document,
    pub populate: Vec<PopulateSpec>,
    pub read: Option<ReadPreference>,
    pub lean: bool,
    pub lean_with_id: bool,
    pub pagination: bool,
    pub count_mode: CountMode,
    pub labels: Labels,
    pub paginate_populates: bool,
    pub populate_options: BTreeMap<String, PopulateWindow>,
    pub limit: u64,
    pub positioning: Positioning,
}

impl ResolvedOptions {
    pub fn skip(&self) -> u64 {
        self.positioning.skip(self.limit)
    }

    pub fn populate_window(&self, path: &str) -> PopulateWindow {
        self.populate_options.get(path).copied().unwrap_or_default()
    }
}

/// A relation to expand alongside every fetched record.
#[derive(Clone, Debug, PartialEq)]
pub struct PopulateSpec {
    pub path: String,
    pub select: Option<Document>,
    pub filter: Option<Document>,
    pub sort: Option<Document>,
}

impl PopulateSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            select: None,
            filter: None,
            sort: None,
        }
    }

    pub fn select(mut self, select: Document) -> Self {
        self.select = Some(select);
        self
    }

    pub fn filter(mut self, filter: Document) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn sort(mut self, sort: Document) -> Self {
        self.sort = Some(sort);
        self
    }
}

impl From<&str> for PopulateSpec {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for PopulateSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct QueryOptions {
            #[serde(default, deserialize_with = "coerce::sort")]
            sort: Option<Document>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Path(String),
            Spec {
                path: String,
                #[serde(default, deserialize_with = "coerce::select")]
                select: Option<Document>,
                #[serde(default, rename = "match")]
                filter: Option<Document>,
                #[serde(default, deserialize_with = "coerce::sort")]
                sort: Option<Document>,
                #[serde(default)]
                options: Option<QueryOptions>,
            },
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Path(path) => Self::new(path),
            Repr::Spec {
                path,
                select,
                filter,
                sort,
                options,
            } => Self {
                path,
                select,
                filter,
                sort: sort.or_else(|| options.and_then(|options| options.sort)),
            },
        })
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<PopulateSpec>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(PopulateSpec),
        Many(Vec<PopulateSpec>),
    }

    Ok(
        Option::<OneOrMany>::deserialize(deserializer)?.map(|populate| match populate {
            OneOrMany::One(spec) => vec![spec],
            OneOrMany::Many(specs) => specs,
        }),
    )
}

/// Window applied to a populated collection when `paginate_populates` is on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PopulateWindow {
    #[serde(deserialize_with = "coerce::lenient")]
    pub offset: Option<i64>,
    #[serde(deserialize_with = "coerce::lenient")]
    pub limit: Option<i64>,
}

impl PopulateWindow {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
        }
    }

    pub fn offset_or_default(self) -> i64 {
        self.offset.unwrap_or(0)
    }

    pub fn limit_or_default(self) -> i64 {
        self.limit.unwrap_or(DEFAULT_POPULATE_LIMIT)
    }
}

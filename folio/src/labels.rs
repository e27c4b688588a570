//! Output field names of a [`Page`](crate::Page).
//!
//! Every metadata field has a fixed semantic name and a default output label
//! equal to its camelCase form (`totalDocs`, `hasNextPage`, ...). Callers
//! override labels per field with [`CustomLabels`]; overrides from several
//! configuration layers are merged key by key, so a call can rename a single
//! field while keeping the model-level renames of the others.

use serde::{
    Deserialize, Deserializer,
    de::{self, Visitor},
};
use std::fmt;

/// Override for a single output field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Label {
    /// Emit the field under this name.
    Name(String),
    /// Omit the field from the output (`false` in a JSON configuration).
    Suppressed,
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Self::Name(value.to_owned())
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LabelVisitor;

        impl Visitor<'_> for LabelVisitor {
            type Value = Label;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a field name or `false`")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Label, E> {
                Ok(Label::Name(value.to_owned()))
            }

            fn visit_string<E: de::Error>(self, value: String) -> Result<Label, E> {
                Ok(Label::Name(value))
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<Label, E> {
                if value {
                    Err(E::invalid_value(de::Unexpected::Bool(true), &self))
                } else {
                    Ok(Label::Suppressed)
                }
            }
        }

        deserializer.deserialize_any(LabelVisitor)
    }
}

/// Semantic metadata fields that can be relabeled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetaField {
    TotalDocs,
    Limit,
    Page,
    TotalPages,
    PagingCounter,
    PrevPage,
    NextPage,
    HasPrevPage,
    HasNextPage,
}

impl MetaField {
    pub const fn default_label(self) -> &'static str {
        match self {
            Self::TotalDocs => "totalDocs",
            Self::Limit => "limit",
            Self::Page => "page",
            Self::TotalPages => "totalPages",
            Self::PagingCounter => "pagingCounter",
            Self::PrevPage => "prevPage",
            Self::NextPage => "nextPage",
            Self::HasPrevPage => "hasPrevPage",
            Self::HasNextPage => "hasNextPage",
        }
    }
}

/// Per-field label overrides. `None` keeps the label of the layer below.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomLabels {
    pub docs: Option<Label>,
    pub total_docs: Option<Label>,
    pub limit: Option<Label>,
    pub page: Option<Label>,
    pub total_pages: Option<Label>,
    pub paging_counter: Option<Label>,
    pub prev_page: Option<Label>,
    pub next_page: Option<Label>,
    pub has_prev_page: Option<Label>,
    pub has_next_page: Option<Label>,
    /// Nest all metadata under this key instead of flattening it next to
    /// the documents. An empty name or `false` flattens.
    pub meta: Option<Label>,
}

impl CustomLabels {
    /// Layers `over` on top of `self`; every key set in `over` wins.
    pub fn merge(self, over: Self) -> Self {
        Self {
            docs: over.docs.or(self.docs),
            total_docs: over.total_docs.or(self.total_docs),
            limit: over.limit.or(self.limit),
            page: over.page.or(self.page),
            total_pages: over.total_pages.or(self.total_pages),
            paging_counter: over.paging_counter.or(self.paging_counter),
            prev_page: over.prev_page.or(self.prev_page),
            next_page: over.next_page.or(self.next_page),
            has_prev_page: over.has_prev_page.or(self.has_prev_page),
            has_next_page: over.has_next_page.or(self.has_next_page),
            meta: over.meta.or(self.meta),
        }
    }

    pub fn resolve(&self) -> Labels {
        fn name(label: Option<&Label>, default: &str) -> Option<String> {
            match label {
                None => Some(default.to_owned()),
                Some(Label::Name(name)) => Some(name.clone()),
                Some(Label::Suppressed) => None,
            }
        }

        Labels {
            docs: name(self.docs.as_ref(), "docs"),
            total_docs: name(self.total_docs.as_ref(), MetaField::TotalDocs.default_label()),
            limit: name(self.limit.as_ref(), MetaField::Limit.default_label()),
            page: name(self.page.as_ref(), MetaField::Page.default_label()),
            total_pages: name(self.total_pages.as_ref(), MetaField::TotalPages.default_label()),
            paging_counter: name(
                self.paging_counter.as_ref(),
                MetaField::PagingCounter.default_label(),
            ),
            prev_page: name(self.prev_page.as_ref(), MetaField::PrevPage.default_label()),
            next_page: name(self.next_page.as_ref(), MetaField::NextPage.default_label()),
            has_prev_page: name(
                self.has_prev_page.as_ref(),
                MetaField::HasPrevPage.default_label(),
            ),
            has_next_page: name(
                self.has_next_page.as_ref(),
                MetaField::HasNextPage.default_label(),
            ),
            meta: match &self.meta {
                Some(Label::Name(name)) if !name.is_empty() => Some(name.clone()),
                _ => None,
            },
        }
    }
}

/// Resolved output names; `None` means the field is omitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Labels {
    docs: Option<String>,
    total_docs: Option<String>,
    limit: Option<String>,
    page: Option<String>,
    total_pages: Option<String>,
    paging_counter: Option<String>,
    prev_page: Option<String>,
    next_page: Option<String>,
    has_prev_page: Option<String>,
    has_next_page: Option<String>,
    meta: Option<String>,
}

impl Labels {
    pub fn docs(&self) -> Option<&str> {
        self.docs.as_deref()
    }

    pub fn meta(&self) -> Option<&str> {
        self.meta.as_deref()
    }

    pub fn name(&self, field: MetaField) -> Option<&str> {
        match field {
            MetaField::TotalDocs => self.total_docs.as_deref(),
            MetaField::Limit => self.limit.as_deref(),
            MetaField::Page => self.page.as_deref(),
            MetaField::TotalPages => self.total_pages.as_deref(),
            MetaField::PagingCounter => self.paging_counter.as_deref(),
            MetaField::PrevPage => self.prev_page.as_deref(),
            MetaField::NextPage => self.next_page.as_deref(),
            MetaField::HasPrevPage => self.has_prev_page.as_deref(),
            MetaField::HasNextPage => self.has_next_page.as_deref(),
        }
    }
}

impl Default for Labels {
    fn default() -> Self {
        CustomLabels::default().resolve()
    }
}

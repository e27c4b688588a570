//! Field specifications written as strings.
//!
//! `"title price -_id"` selects `title` and `price` and drops `_id`;
//! `"-price title"` sorts by `price` descending, then `title` ascending.

use mongodb::bson::{Bson, Document};
use std::sync::LazyLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Order {
    Asc,
    Desc,
}

impl From<Order> for Bson {
    fn from(value: Order) -> Self {
        match value {
            Order::Asc => Bson::Int32(1),
            Order::Desc => Bson::Int32(-1),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Kind {
    Select,
    Sort,
}

/// Parses a selection string into a projection document.
pub fn parse_select(spec: &str) -> Document {
    parse(spec, Kind::Select)
}

/// Parses a sort string into a sort document.
pub fn parse_sort(spec: &str) -> Document {
    parse(spec, Kind::Sort)
}

/// Cached [`parse_select`] for specifications known at compile time.
pub fn select(spec: &'static str) -> Document {
    cached(spec, Kind::Select)
}

/// Cached [`parse_sort`] for specifications known at compile time.
pub fn sort(spec: &'static str) -> Document {
    cached(spec, Kind::Sort)
}

fn cached(spec: &'static str, kind: Kind) -> Document {
    static DOCUMENTS: LazyLock<dashmap::DashMap<(&'static str, Kind), Document>> =
        LazyLock::new(dashmap::DashMap::new);

    if let Some(document) = DOCUMENTS.get(&(spec, kind)) {
        document.clone()
    } else {
        let document = parse(spec, kind);
        DOCUMENTS.insert((spec, kind), document.clone());
        document
    }
}

fn parse(spec: &str, kind: Kind) -> Document {
    let mut document = Document::new();

    for field in spec.split_whitespace() {
        let (field, order) = match field.strip_prefix('-') {
            Some(field) => (field, Order::Desc),
            None => (field.strip_prefix('+').unwrap_or(field), Order::Asc),
        };

        if field.is_empty() {
            continue;
        }

        let value = match (kind, order) {
            (Kind::Sort, order) => order.into(),
            (Kind::Select, Order::Asc) => Bson::Int32(1),
            (Kind::Select, Order::Desc) => Bson::Int32(0),
        };

        document.insert(field, value);
    }

    document
}

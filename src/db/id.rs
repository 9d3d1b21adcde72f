//! Item identifiers.
//!
//! Stored items are keyed either by a driver-native `ObjectId` under `_id`
//! or by an application-assigned string under `id`. Parsing attempts the
//! native form first and falls back to the plain string; filter construction
//! is a pure function of the resulting variant.

use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};

/// A menu item identifier: exactly one of the two representations is
/// authoritative for any given item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemId {
    Native(ObjectId),
    Plain(String),
}

impl ItemId {
    /// Parse a raw id string, preferring the native object identifier.
    pub fn parse(raw: &str) -> Self {
        ObjectId::parse_str(raw)
            .map(ItemId::Native)
            .unwrap_or_else(|_| ItemId::Plain(raw.to_string()))
    }

    /// Build the filter document matching this id.
    pub fn filter(&self) -> Document {
        match self {
            ItemId::Native(oid) => doc! { "_id": oid },
            ItemId::Plain(s) => doc! { "id": s },
        }
    }
}

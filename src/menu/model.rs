//! Document shape classification.
//!
//! Stored menu data arrives in two shapes: collections of already-flat item
//! documents, or wrapper documents carrying nested item arrays. The
//! heuristic lives here as an explicit predicate so it can be tested apart
//! from the flattening logic.

use mongodb::bson::{Bson, Document};

/// Classification of a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocShape {
    /// The document is itself a menu item.
    FlatItem,
    /// The document wraps item arrays (`items`, `data`, `menu`,
    /// `categories[].items`).
    Wrapper,
}

impl DocShape {
    /// A document counts as a flat item when it carries a display name and
    /// at least one item-like field.
    pub fn classify(doc: &Document) -> Self {
        let named = truthy(doc.get("name")) || truthy(doc.get("title"));
        let item_like = present(doc.get("price"))
            || truthy(doc.get("image"))
            || truthy(doc.get("description"))
            || truthy(doc.get("desc"));
        if named && item_like {
            DocShape::FlatItem
        } else {
            DocShape::Wrapper
        }
    }
}

/// Loose truthiness over BSON values: absent, null, empty strings, `false`
/// and numeric zero all count as falsy.
pub(crate) fn truthy(value: Option<&Bson>) -> bool {
    match value {
        None | Some(Bson::Null) => false,
        Some(Bson::Boolean(b)) => *b,
        Some(Bson::String(s)) => !s.is_empty(),
        Some(Bson::Int32(i)) => *i != 0,
        Some(Bson::Int64(i)) => *i != 0,
        Some(Bson::Double(f)) => *f != 0.0,
        Some(_) => true,
    }
}

/// Present-and-non-null, without the full truthiness rules (a price of `0`
/// still marks a document as item-shaped).
fn present(value: Option<&Bson>) -> bool {
    !matches!(value, None | Some(Bson::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn titled_document_with_price_is_flat() {
        let doc = doc! { "title": "Espresso", "price": 2.5 };
        assert_eq!(DocShape::classify(&doc), DocShape::FlatItem);
    }

    #[test]
    fn zero_price_still_counts_as_item_like() {
        let doc = doc! { "name": "Water", "price": 0 };
        assert_eq!(DocShape::classify(&doc), DocShape::FlatItem);
    }

    #[test]
    fn name_alone_is_not_enough() {
        let doc = doc! { "name": "menu-v2" };
        assert_eq!(DocShape::classify(&doc), DocShape::Wrapper);
    }

    #[test]
    fn wrapper_with_items_array() {
        let doc = doc! { "items": [ { "title": "A" } ] };
        assert_eq!(DocShape::classify(&doc), DocShape::Wrapper);
    }
}

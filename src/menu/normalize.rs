//! Flattening heterogeneous stored documents into one item sequence.

use mongodb::bson::{Bson, Document};

use crate::menu::model::DocShape;

/// Array fields a wrapper document may carry items under, probed in order.
const WRAPPER_ARRAY_KEYS: &[&str] = &["items", "data", "menu"];

/// Convert raw stored documents into a flat list of item documents.
///
/// An input that already looks like an item list is returned unchanged.
/// Otherwise every document is treated as a wrapper and its recognized item
/// arrays are concatenated in encounter order. No recognizable shape yields
/// an empty list, which the caller treats as "no items" rather than an
/// error.
pub fn normalize(docs: Vec<Document>) -> Vec<Document> {
    match docs.first().map(DocShape::classify) {
        Some(DocShape::FlatItem) => docs,
        None => Vec::new(),
        Some(DocShape::Wrapper) => {
            let mut items = Vec::new();
            for doc in &docs {
                for key in WRAPPER_ARRAY_KEYS {
                    if let Some(Bson::Array(entries)) = doc.get(key) {
                        items.extend(entries.iter().filter_map(|e| e.as_document().cloned()));
                    }
                }
                if let Some(Bson::Array(categories)) = doc.get("categories") {
                    for category in categories {
                        if let Some(Bson::Array(entries)) =
                            category.as_document().and_then(|c| c.get("items"))
                        {
                            items.extend(entries.iter().filter_map(|e| e.as_document().cloned()));
                        }
                    }
                }
            }
            items
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn wrapper_items_are_extracted() {
        let docs = vec![doc! { "items": [ { "title": "A" }, { "title": "B" } ] }];
        let items = normalize(docs);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get_str("title").unwrap(), "A");
        assert_eq!(items[1].get_str("title").unwrap(), "B");
    }

    #[test]
    fn flat_list_passes_through_unchanged() {
        let docs = vec![doc! { "title": "A", "price": 5 }];
        let items = normalize(docs.clone());
        assert_eq!(items, docs);
    }

    #[test]
    fn unrecognizable_shape_yields_empty() {
        assert!(normalize(vec![doc! {}]).is_empty());
        assert!(normalize(Vec::new()).is_empty());
    }

    #[test]
    fn all_wrapper_fields_concatenate_in_order() {
        let docs = vec![
            doc! {
                "items": [ { "title": "A" } ],
                "data": [ { "title": "B" } ],
                "menu": [ { "title": "C" } ],
                "categories": [ { "name": "Drinks", "items": [ { "title": "D" } ] } ],
            },
            doc! { "items": [ { "title": "E" } ] },
        ];
        let titles: Vec<_> = normalize(docs)
            .iter()
            .map(|d| d.get_str("title").unwrap().to_string())
            .collect();
        assert_eq!(titles, ["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn non_document_array_entries_are_skipped() {
        let docs = vec![doc! { "items": [ "stray", { "title": "A" } ] }];
        let items = normalize(docs);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get_str("title").unwrap(), "A");
    }
}

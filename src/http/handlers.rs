//! Canonical request handlers.
//!
//! One implementation per CRUD operation; the `/api/menu/{id}` routes are
//! thin adapters that feed the path segment into the same logic that also
//! accepts ids from the query string or the payload.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use serde_json::{json, Map, Value};

use crate::db::ItemId;
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::menu::format::{coerce_price_json, format_item, RequestContext};
use crate::menu::{load_fallback_menu, normalize};

/// `GET /` — liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// Catch-all for unmatched routes; keeps 404s in the API's JSON shape.
pub async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

/// `GET /menu` and `GET /api/menu`.
///
/// Database-first: a configured but unreachable database is a hard 502, a
/// reachable database with no recognizable items is a 404. Only a fully
/// unconfigured deployment falls back to the static file, returned verbatim.
pub async fn get_menu(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    if state.config.mongodb_uri.is_empty() {
        return match load_fallback_menu(&state.config.fallback_menu_file) {
            Some(items) => Ok(Json(Value::Array(items))),
            None => Err(ApiError::NoDataSource),
        };
    }

    let resolved = state.store.ensure_connected(false).await?;
    let docs: Vec<Document> = resolved
        .collection
        .find(doc! {})
        .await?
        .try_collect()
        .await?;

    let items = normalize(docs);
    if items.is_empty() {
        return Err(ApiError::NoItems {
            collection: resolved.name,
        });
    }

    let ctx = RequestContext::from_request(&headers, &state.config);
    let formatted: Vec<Value> = items
        .into_iter()
        .map(|item| format_item(item, &ctx))
        .collect();
    tracing::debug!(items = formatted.len(), collection = %resolved.name, "Serving menu from database");
    Ok(Json(Value::Array(formatted)))
}

/// `POST /api/menu` — create a menu item.
pub async fn create_item(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let payload = parse_json_body(&body).ok_or(ApiError::MissingFields)?;
    let obj = payload.as_object().ok_or(ApiError::MissingFields)?;
    if !json_truthy(obj.get("title"))
        || !json_truthy(obj.get("category"))
        || !json_truthy(obj.get("price"))
    {
        return Err(ApiError::MissingFields);
    }

    let mut doc = mongodb::bson::to_document(&payload)?;
    doc.insert(
        "price",
        Bson::Double(coerce_price_json(obj.get("price").unwrap_or(&Value::Null))),
    );
    let description = effective_description(obj).unwrap_or_else(|| json!(""));
    let description = mongodb::bson::to_bson(&description)?;
    doc.insert("description", description.clone());
    doc.insert("desc", description);

    let resolved = state.store.ensure_connected(false).await?;
    let result = resolved.collection.insert_one(doc).await?;
    tracing::info!(collection = %resolved.name, "Inserted menu item");

    match resolved
        .collection
        .find_one(doc! { "_id": result.inserted_id.clone() })
        .await?
    {
        Some(created) => Ok(Json(Bson::Document(created).into_relaxed_extjson())),
        None => Ok(Json(json!({
            "ok": true,
            "insertedId": result.inserted_id.into_relaxed_extjson(),
        }))),
    }
}

/// `PUT /api/menu` — id from query string or payload.
pub async fn update_item(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    update_inner(state, None, query, parse_json_body(&body)).await
}

/// `PUT /api/menu/{id}` — thin adapter over the canonical update.
pub async fn update_item_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    update_inner(state, Some(id), query, parse_json_body(&body)).await
}

/// `DELETE /api/menu` — id from query string or payload.
pub async fn delete_item(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    delete_inner(state, None, query, parse_json_body(&body)).await
}

/// `DELETE /api/menu/{id}` — thin adapter over the canonical delete.
pub async fn delete_item_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    delete_inner(state, Some(id), query, parse_json_body(&body)).await
}

/// `GET /debug/db` — last connection failure and visible collections.
/// `?reconnect=true` drops any cached client and dials again first.
pub async fn debug_db(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let mut connected = None;
    if query.get("reconnect").map(String::as_str) == Some("true") {
        connected = Some(state.store.ensure_connected(true).await.is_ok());
    }
    let last_error = state.store.last_error().await;
    let collections = state.store.collection_names().await;
    Json(json!({
        "ok": true,
        "info": {
            "lastError": last_error,
            "collections": collections,
            "reconnected": connected,
        }
    }))
}

async fn update_inner(
    state: AppState,
    path_id: Option<String>,
    query: HashMap<String, String>,
    payload: Option<Value>,
) -> Result<Json<Value>, ApiError> {
    let payload = payload.ok_or(ApiError::MissingPayload)?;
    let obj = payload.as_object().ok_or(ApiError::MissingPayload)?;
    let id = resolve_id(path_id, &query, Some(obj)).ok_or(ApiError::MissingId)?;

    // Only allow-listed fields present in the payload reach the store.
    let mut set = Document::new();
    for key in ["category", "title", "image"] {
        if let Some(value) = obj.get(key) {
            set.insert(key, mongodb::bson::to_bson(value)?);
        }
    }
    if let Some(value) = obj.get("price") {
        set.insert("price", Bson::Double(coerce_price_json(value)));
    }
    if obj.contains_key("description") || obj.contains_key("desc") {
        let description = match effective_description(obj) {
            Some(value) => mongodb::bson::to_bson(&value)?,
            None => Bson::Null,
        };
        set.insert("description", description.clone());
        set.insert("desc", description);
    }
    if set.is_empty() {
        return Err(ApiError::NoUpdatableFields);
    }

    let resolved = state.store.ensure_connected(false).await?;
    let filter = ItemId::parse(&id).filter();
    let result = resolved
        .collection
        .update_one(filter.clone(), doc! { "$set": set })
        .await?;
    if result.matched_count == 0 {
        return Err(ApiError::ItemNotFound);
    }

    // A matched-but-unmodified update is a no-op success, not an error.
    match resolved.collection.find_one(filter).await? {
        Some(updated) => Ok(Json(Bson::Document(updated).into_relaxed_extjson())),
        None => Ok(Json(json!({
            "ok": true,
            "matched": result.matched_count,
            "modified": result.modified_count,
        }))),
    }
}

async fn delete_inner(
    state: AppState,
    path_id: Option<String>,
    query: HashMap<String, String>,
    payload: Option<Value>,
) -> Result<Json<Value>, ApiError> {
    let body = payload.as_ref().and_then(Value::as_object);
    let id = resolve_id(path_id, &query, body).ok_or(ApiError::MissingId)?;

    let resolved = state.store.ensure_connected(false).await?;
    let filter = ItemId::parse(&id).filter();
    let result = resolved.collection.delete_one(filter).await?;
    if result.deleted_count == 0 {
        return Err(ApiError::ItemNotFound);
    }
    tracing::info!(collection = %resolved.name, "Deleted menu item");
    Ok(Json(json!({ "ok": true })))
}

/// Parse a request body as JSON, treating an empty or malformed body the
/// same as a missing one.
fn parse_json_body(body: &Bytes) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice(body).ok()
}

/// Resolve the target id: route segment, then `id` query parameter, then
/// the payload's `_id`/`id` field.
fn resolve_id(
    path_id: Option<String>,
    query: &HashMap<String, String>,
    body: Option<&Map<String, Value>>,
) -> Option<String> {
    path_id
        .filter(|s| !s.is_empty())
        .or_else(|| query.get("id").cloned().filter(|s| !s.is_empty()))
        .or_else(|| body.and_then(|obj| obj.get("_id").and_then(id_string)))
        .or_else(|| body.and_then(|obj| obj.get("id").and_then(id_string)))
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        // Relaxed Extended JSON object ids round-trip as {"$oid": "..."}.
        Value::Object(map) => map.get("$oid").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

/// First non-null of `description`, `desc` in the payload.
fn effective_description(obj: &Map<String, Value>) -> Option<Value> {
    obj.get("description")
        .filter(|v| !v.is_null())
        .or_else(|| obj.get("desc").filter(|v| !v.is_null()))
        .cloned()
}

/// Loose truthiness over JSON payload values, mirroring the BSON rules used
/// on the read path.
fn json_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_resolution_precedence() {
        let mut query = HashMap::new();
        query.insert("id".to_string(), "from-query".to_string());
        let body = serde_json::from_str::<Value>(r#"{"_id":"from-body"}"#).unwrap();
        let body = body.as_object().cloned().unwrap();

        assert_eq!(
            resolve_id(Some("from-path".into()), &query, Some(&body)),
            Some("from-path".to_string())
        );
        assert_eq!(
            resolve_id(None, &query, Some(&body)),
            Some("from-query".to_string())
        );
        assert_eq!(
            resolve_id(None, &HashMap::new(), Some(&body)),
            Some("from-body".to_string())
        );
        assert_eq!(resolve_id(None, &HashMap::new(), None), None);
    }

    #[test]
    fn extended_json_oid_is_accepted() {
        let value = json!({ "$oid": "507f1f77bcf86cd799439011" });
        assert_eq!(
            id_string(&value),
            Some("507f1f77bcf86cd799439011".to_string())
        );
    }

    #[test]
    fn required_field_truthiness() {
        assert!(!json_truthy(None));
        assert!(!json_truthy(Some(&Value::Null)));
        assert!(!json_truthy(Some(&json!(""))));
        assert!(!json_truthy(Some(&json!(0))));
        assert!(json_truthy(Some(&json!("Food"))));
        assert!(json_truthy(Some(&json!(2.5))));
    }

    #[test]
    fn description_synonyms_resolve_in_order() {
        let both = json!({ "description": "a", "desc": "b" });
        assert_eq!(
            effective_description(both.as_object().unwrap()),
            Some(json!("a"))
        );

        let only_desc = json!({ "desc": "b" });
        assert_eq!(
            effective_description(only_desc.as_object().unwrap()),
            Some(json!("b"))
        );

        let neither = json!({ "title": "x" });
        assert_eq!(effective_description(neither.as_object().unwrap()), None);
    }
}

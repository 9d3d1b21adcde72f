//! Per-item formatting: defaulting, price coercion and image URL
//! resolution.
//!
//! Stored documents pass through untouched except for the handful of
//! display fields the frontend depends on; everything else is carried over
//! as relaxed Extended JSON.

use axum::http::{header, HeaderMap};
use mongodb::bson::{Bson, Document};
use serde_json::{json, Value};

use crate::config::Config;
use crate::menu::model::truthy;

/// Per-request context for resolving relative image references.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// `proto://host` of the serving deployment, or an explicit override.
    /// Empty when neither is known.
    pub base_url: String,
    /// Image base override; wins over `base_url` when set.
    pub image_base_url: String,
}

impl RequestContext {
    /// Derive the context from request headers and configuration.
    ///
    /// A configured `BASE_URL` wins; otherwise the base URL is rebuilt from
    /// the `Host` header, honoring `x-forwarded-proto` when the service sits
    /// behind a proxy.
    pub fn from_request(headers: &HeaderMap, config: &Config) -> Self {
        let base_url = if !config.base_url.is_empty() {
            config.base_url.trim_end_matches('/').to_string()
        } else {
            let proto = headers
                .get("x-forwarded-proto")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("http");
            match headers.get(header::HOST).and_then(|v| v.to_str().ok()) {
                Some(host) if !host.is_empty() => format!("{proto}://{host}"),
                _ => String::new(),
            }
        };
        Self {
            base_url,
            image_base_url: config.image_base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Format one stored item for the client.
pub fn format_item(doc: Document, ctx: &RequestContext) -> Value {
    let price = coerce_price(doc.get("price"));
    let badge_default = !truthy(doc.get("badge"));
    let tags_default = !truthy(doc.get("tags"));
    let category_default = !truthy(doc.get("category"));
    let description = effective_description(&doc);
    let image = doc
        .get("image")
        .and_then(|b| b.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| resolve_image(s, ctx));

    let mut value = Bson::Document(doc).into_relaxed_extjson();
    if let Value::Object(map) = &mut value {
        map.insert("price".to_string(), json!(price));
        if badge_default {
            map.insert("badge".to_string(), json!(""));
        }
        if tags_default {
            map.insert("tags".to_string(), json!(""));
        }
        if category_default {
            map.insert("category".to_string(), json!("Other"));
        }
        map.insert("description".to_string(), description.clone());
        map.insert("desc".to_string(), description);
        map.insert("image".to_string(), image.map(Value::String).unwrap_or(Value::Null));
    }
    value
}

/// Effective description: `description` when truthy, else `desc`, else null.
/// Both output fields mirror this value.
fn effective_description(doc: &Document) -> Value {
    for key in ["description", "desc"] {
        if let Some(bson) = doc.get(key) {
            if truthy(Some(bson)) {
                return bson.clone().into_relaxed_extjson();
            }
        }
    }
    Value::Null
}

/// Coerce a stored price to a finite number; anything unparsable yields 0.
pub fn coerce_price(value: Option<&Bson>) -> f64 {
    match value {
        None | Some(Bson::Null) => 0.0,
        Some(Bson::Double(f)) => {
            if f.is_finite() {
                *f
            } else {
                0.0
            }
        }
        Some(Bson::Int32(i)) => f64::from(*i),
        Some(Bson::Int64(i)) => *i as f64,
        Some(Bson::String(s)) => parse_leading_float(s),
        // Decimal128 and friends: go through the value's string form.
        Some(other) => parse_leading_float(&other.to_string()),
    }
}

/// Coerce a JSON payload price the same way (write path).
pub fn coerce_price_json(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).unwrap_or(0.0),
        Value::String(s) => parse_leading_float(s),
        _ => 0.0,
    }
}

/// Parse the longest numeric prefix of a string, like JS `parseFloat`.
/// `" 12.5 kr"` parses to 12.5; no numeric prefix yields 0.
pub fn parse_leading_float(s: &str) -> f64 {
    let t = s.trim_start();
    let bytes = t.as_bytes();
    let mut i = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    while i < bytes.len() {
        match bytes[i] {
            b'0'..=b'9' => {
                seen_digit = true;
                i += 1;
            }
            b'.' if !seen_dot => {
                seen_dot = true;
                i += 1;
            }
            _ => break,
        }
    }
    if !seen_digit {
        return 0.0;
    }
    // Optional exponent suffix
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    t[..i].parse().unwrap_or(0.0)
}

/// Resolve an image reference to a URL.
///
/// Absolute URLs pass through; bare filenames resolve against, in
/// precedence order, the image base override, the request base URL plus
/// `/images/`, or a bare `/images/`-relative path.
fn resolve_image(image: &str, ctx: &RequestContext) -> String {
    if is_absolute_url(image) {
        return image.to_string();
    }
    if !ctx.image_base_url.is_empty() {
        return format!("{}/{}", ctx.image_base_url, image);
    }
    if !ctx.base_url.is_empty() {
        return format!("{}/images/{}", ctx.base_url, image);
    }
    format!("/images/{image}")
}

fn is_absolute_url(s: &str) -> bool {
    let prefix = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    prefix.starts_with("http://") || prefix.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    fn ctx(base: &str, image_base: &str) -> RequestContext {
        RequestContext {
            base_url: base.to_string(),
            image_base_url: image_base.to_string(),
        }
    }

    #[test]
    fn price_coercion_grid() {
        assert_eq!(coerce_price(Some(&Bson::Double(12.5))), 12.5);
        assert_eq!(coerce_price(Some(&Bson::Int32(7))), 7.0);
        assert_eq!(coerce_price(Some(&Bson::String("12.5".into()))), 12.5);
        assert_eq!(coerce_price(Some(&Bson::String("abc".into()))), 0.0);
        assert_eq!(coerce_price(Some(&Bson::Null)), 0.0);
        assert_eq!(coerce_price(None), 0.0);
    }

    #[test]
    fn leading_float_parsing() {
        assert_eq!(parse_leading_float("12.5"), 12.5);
        assert_eq!(parse_leading_float(" 12.5 kr"), 12.5);
        assert_eq!(parse_leading_float("-3.25"), -3.25);
        assert_eq!(parse_leading_float("1e3"), 1000.0);
        assert_eq!(parse_leading_float("1e"), 1.0);
        assert_eq!(parse_leading_float("abc"), 0.0);
        assert_eq!(parse_leading_float(""), 0.0);
    }

    #[test]
    fn missing_category_defaults_to_other() {
        let item = format_item(doc! { "title": "Tea", "price": "2.50" }, &ctx("", ""));
        assert_eq!(item["category"], "Other");
        assert_eq!(item["price"], 2.5);
        assert_eq!(item["badge"], "");
        assert_eq!(item["tags"], "");
    }

    #[test]
    fn existing_display_fields_are_kept() {
        let item = format_item(
            doc! { "title": "Tea", "category": "Drinks", "badge": "new", "tags": ["hot"] },
            &ctx("", ""),
        );
        assert_eq!(item["category"], "Drinks");
        assert_eq!(item["badge"], "new");
        assert_eq!(item["tags"], json!(["hot"]));
    }

    #[test]
    fn description_and_desc_are_mirrored() {
        let item = format_item(doc! { "title": "Tea", "desc": "leafy" }, &ctx("", ""));
        assert_eq!(item["description"], "leafy");
        assert_eq!(item["desc"], "leafy");

        let neither = format_item(doc! { "title": "Tea" }, &ctx("", ""));
        assert_eq!(neither["description"], Value::Null);
        assert_eq!(neither["desc"], Value::Null);
    }

    #[test]
    fn absolute_image_urls_pass_through() {
        let item = format_item(
            doc! { "title": "Tea", "image": "HTTPS://cdn.example.com/tea.png" },
            &ctx("http://localhost:3000", "http://img.example.com"),
        );
        assert_eq!(item["image"], "HTTPS://cdn.example.com/tea.png");
    }

    #[test]
    fn image_resolution_precedence() {
        let doc_with_image = || doc! { "title": "Tea", "image": "tea.png" };

        let via_override = format_item(doc_with_image(), &ctx("http://h", "http://img.example.com"));
        assert_eq!(via_override["image"], "http://img.example.com/tea.png");

        let via_base = format_item(doc_with_image(), &ctx("http://h", ""));
        assert_eq!(via_base["image"], "http://h/images/tea.png");

        let bare = format_item(doc_with_image(), &ctx("", ""));
        assert_eq!(bare["image"], "/images/tea.png");
    }

    #[test]
    fn missing_image_is_null() {
        let item = format_item(doc! { "title": "Tea" }, &ctx("", ""));
        assert_eq!(item["image"], Value::Null);
    }

    #[test]
    fn context_from_headers_honors_forwarded_proto() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "menu.example.com".parse().unwrap());
        headers.insert("x-forwarded-proto", "https".parse().unwrap());
        let context = RequestContext::from_request(&headers, &Config::default());
        assert_eq!(context.base_url, "https://menu.example.com");
    }

    #[test]
    fn context_prefers_configured_base_url() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "internal:8080".parse().unwrap());
        let config = Config {
            base_url: "https://public.example.com/".to_string(),
            ..Config::default()
        };
        let context = RequestContext::from_request(&headers, &config);
        assert_eq!(context.base_url, "https://public.example.com");
    }
}

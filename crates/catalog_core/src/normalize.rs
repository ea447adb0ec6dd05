use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::entity::{location_label, ContentEntity, DEFAULT_AUTHOR};

/// Accepted source field names for every canonical attribute.
///
/// For each attribute the first alias holding a non-null value wins, so the canonical
/// name is listed first and legacy/localized names follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAliases {
    /// Object keys that may hold the record array when the document is not a bare array.
    pub collection_keys: &'static [&'static str],
    pub id: &'static [&'static str],
    pub title: &'static [&'static str],
    pub body: &'static [&'static str],
    pub author: &'static [&'static str],
    pub city: &'static [&'static str],
    pub country: &'static [&'static str],
    pub created_at: &'static [&'static str],
    pub tags: &'static [&'static str],
    pub price: &'static [&'static str],
    pub discounted_price: &'static [&'static str],
    pub image_ref: &'static [&'static str],
    pub subtitle: &'static [&'static str],
    pub modality: &'static [&'static str],
    pub duration: &'static [&'static str],
    pub rating: &'static [&'static str],
}

/// Canonical names plus the Spanish feed schema used by the blog and course feeds.
pub const DEFAULT_ALIASES: FieldAliases = FieldAliases {
    collection_keys: &["posts", "courses", "cursos", "items"],
    id: &["id", "_id"],
    title: &["title", "titulo"],
    body: &[
        "body",
        "content",
        "contenido",
        "text",
        "description",
        "descripcion",
    ],
    author: &["author", "autor"],
    city: &["city", "ciudad"],
    country: &["country", "pais"],
    created_at: &["createdAt", "fecha", "created_at"],
    tags: &["tags", "etiquetas", "temas"],
    price: &["price", "precio"],
    discounted_price: &["discountedPrice", "precio_descuento", "discounted_price"],
    image_ref: &["imageRef", "image", "imagen"],
    subtitle: &["subtitle", "subtitulo"],
    modality: &["modality", "modalidad"],
    duration: &["duration", "duracion"],
    rating: &["rating", "valoracion"],
};

/// Output of one normalization pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Normalized {
    /// Valid entities in source order.
    pub entities: Vec<ContentEntity>,
    /// Records excluded for missing id, title or body (or for not being objects).
    pub dropped: usize,
}

/// Normalizes a parsed feed document using [`DEFAULT_ALIASES`].
pub fn normalize(raw: &Value) -> Normalized {
    normalize_with(raw, &DEFAULT_ALIASES)
}

/// Maps every record of `raw` to a [`ContentEntity`], dropping invalid records.
///
/// `raw` may be a bare array or an object holding the array under one of the
/// collection keys. Anything else yields an empty result. Never fails.
pub fn normalize_with(raw: &Value, aliases: &FieldAliases) -> Normalized {
    let records = record_slice(raw, aliases);
    let mut entities = Vec::with_capacity(records.len());
    let mut dropped = 0;

    for record in records {
        match record.as_object().and_then(|obj| normalize_record(obj, aliases)) {
            Some(entity) => entities.push(entity),
            None => dropped += 1,
        }
    }

    Normalized { entities, dropped }
}

fn record_slice<'a>(raw: &'a Value, aliases: &FieldAliases) -> &'a [Value] {
    match raw {
        Value::Array(items) => items.as_slice(),
        Value::Object(obj) => aliases
            .collection_keys
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_array))
            .map_or(&[][..], Vec::as_slice),
        _ => &[],
    }
}

fn normalize_record(record: &Map<String, Value>, aliases: &FieldAliases) -> Option<ContentEntity> {
    let id = text_field(record, aliases.id)?;
    let title = text_field(record, aliases.title)?;
    let body = text_field(record, aliases.body)?;

    let city = text_field(record, aliases.city);
    let country = text_field(record, aliases.country);
    let location_label = location_label(city.as_deref(), country.as_deref());

    Some(ContentEntity {
        id,
        title,
        body,
        author: text_field(record, aliases.author).unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        city,
        country,
        location_label,
        created_at: lookup(record, aliases.created_at).and_then(parse_timestamp),
        tags: lookup(record, aliases.tags).map(tag_list).unwrap_or_default(),
        price: lookup(record, aliases.price).and_then(non_negative_number),
        discounted_price: lookup(record, aliases.discounted_price).and_then(non_negative_number),
        image_ref: text_field(record, aliases.image_ref),
        subtitle: text_field(record, aliases.subtitle),
        modality: text_field(record, aliases.modality),
        duration: text_field(record, aliases.duration),
        rating: lookup(record, aliases.rating).and_then(non_negative_number),
    })
}

/// First alias whose value is present and not null.
fn lookup<'a>(record: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| record.get(*name))
        .find(|value| !value.is_null())
}

fn text_field(record: &Map<String, Value>, names: &[&str]) -> Option<String> {
    lookup(record, names).and_then(coerce_text)
}

/// Trimmed string form of a scalar; `None` for empty strings, arrays and objects.
fn coerce_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn non_negative_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (number.is_finite() && number >= 0.0).then_some(number)
}

fn tag_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(coerce_text).collect())
        .unwrap_or_default()
}

/// Parses a source timestamp: RFC 3339, ISO date-time without offset (UTC),
/// plain `YYYY-MM-DD` (UTC midnight) or epoch milliseconds. Unparsable input yields `None`.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s.trim()),
        Value::Number(n) => {
            // Zero and negative millis are placeholders, not dates.
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            (millis > 0)
                .then(|| DateTime::from_timestamp_millis(millis))
                .flatten()
        }
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

//! Display-only fields computed from an entity at render time. Nothing here is
//! stored back on the entity.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;
use url::Url;

use crate::entity::ContentEntity;

/// Shown instead of a date that is missing or unparsable.
pub const DATE_PLACEHOLDER: &str = "Fecha por confirmar";
/// Rendered when a body has no paragraphs.
pub const EMPTY_BODY_HTML: &str = "<p>—</p>";
/// Rendering shows at most this many tags.
pub const MAX_VISIBLE_TAGS: usize = 12;
pub const ELLIPSIS: char = '…';

const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Currency rendering with zero fractional digits (es-CL peso style by default).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub grouping_separator: char,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            symbol: "$".to_string(),
            grouping_separator: '.',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceDisplay {
    /// Formatted effective price.
    pub current: String,
    /// Formatted list price, present only while a discount is active.
    pub list: Option<String>,
    pub discount_percent: Option<u32>,
}

/// Rounds to whole units and groups thousands: `12990.0` -> `$12.990`.
pub fn format_currency(value: f64, format: &CurrencyFormat) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(format.grouping_separator);
        }
        grouped.push(ch);
    }
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}{}{grouped}", format.symbol)
}

/// `round(100 * (list - discounted) / list)`, only when `0 < discounted < list`.
pub fn discount_percent(list: f64, discounted: f64) -> Option<u32> {
    if discounted > 0.0 && discounted < list {
        Some((100.0 * (list - discounted) / list).round() as u32)
    } else {
        None
    }
}

/// Discounted price while a discount is active, else the list price.
/// Entities without a list price fall back to the discounted price when they have one.
pub fn effective_price(entity: &ContentEntity) -> Option<f64> {
    if entity.has_active_discount() {
        entity.discounted_price
    } else {
        entity.price.or(entity.discounted_price)
    }
}

pub fn price_display(entity: &ContentEntity, format: &CurrencyFormat) -> Option<PriceDisplay> {
    let current = effective_price(entity)?;
    let discount = match (entity.price, entity.discounted_price) {
        (Some(list), Some(discounted)) => discount_percent(list, discounted).map(|pct| (list, pct)),
        _ => None,
    };
    Some(PriceDisplay {
        current: format_currency(current, format),
        list: discount.map(|(list, _)| format_currency(list, format)),
        discount_percent: discount.map(|(_, pct)| pct),
    })
}

/// Collapses whitespace runs and trims; texts longer than `cap` characters are cut to
/// `cap - 1` characters followed by a single ellipsis.
pub fn excerpt(text: &str, cap: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= cap {
        return collapsed;
    }
    if cap == 0 {
        return String::new();
    }
    let mut cut: String = collapsed.chars().take(cap - 1).collect();
    cut.push(ELLIPSIS);
    cut
}

/// Long es-CL calendar date, e.g. `05 de marzo de 2024`.
pub fn format_date(created_at: Option<DateTime<Utc>>) -> String {
    match created_at {
        Some(ts) => format!(
            "{:02} de {} de {}",
            ts.day(),
            MONTHS_ES[ts.month0() as usize],
            ts.year()
        ),
        None => DATE_PLACEHOLDER.to_string(),
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

/// Splits body text on blank lines into escaped `<p>` blocks; single newlines
/// inside a paragraph become `<br>`.
pub fn paragraphs_html(body: &str) -> String {
    let text = body.replace("\r\n", "\n");
    let text = text.trim();
    if text.is_empty() {
        return EMPTY_BODY_HTML.to_string();
    }

    let mut paragraphs: Vec<Vec<&str>> = vec![Vec::new()];
    for line in text.split('\n') {
        if line.is_empty() {
            paragraphs.push(Vec::new());
        } else if let Some(current) = paragraphs.last_mut() {
            current.push(line);
        }
    }

    let html: String = paragraphs
        .iter()
        .map(|lines| lines.join("\n"))
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", escape_html(&p).replace('\n', "<br>")))
        .collect();

    if html.is_empty() {
        EMPTY_BODY_HTML.to_string()
    } else {
        html
    }
}

/// Absolute `http(s)` URLs and root-relative paths pass through; other names are
/// joined to `base_path`. Missing references resolve to `fallback`.
pub fn resolve_image(image_ref: Option<&str>, base_path: &str, fallback: &str) -> String {
    match image_ref.map(str::trim).filter(|r| !r.is_empty()) {
        None => fallback.to_string(),
        Some(r) if is_absolute_ref(r) => r.to_string(),
        Some(r) if base_path.is_empty() => r.to_string(),
        Some(r) => format!("{}/{}", base_path.trim_end_matches('/'), r),
    }
}

fn is_absolute_ref(reference: &str) -> bool {
    reference.starts_with('/')
        || Url::parse(reference).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

pub fn visible_tags(tags: &[String]) -> &[String] {
    &tags[..tags.len().min(MAX_VISIBLE_TAGS)]
}

/// One-decimal rating label; zero ratings are not shown.
pub fn rating_label(rating: Option<f64>) -> Option<String> {
    rating.filter(|r| *r > 0.0).map(|r| format!("{r:.1}"))
}

/// Link to a detail page for `id`, e.g. `curso.html?id=taller+1`.
pub fn detail_href(page: &str, id: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("id", id)
        .finish();
    format!("{page}?{query}")
}

/// WhatsApp click-to-chat link carrying an enquiry about `title`.
pub fn whatsapp_link(number: &str, title: &str) -> String {
    let message = format!("Hola! Me interesa el curso: {title}");
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("text", &message)
        .finish();
    format!("https://wa.me/{number}?{query}")
}

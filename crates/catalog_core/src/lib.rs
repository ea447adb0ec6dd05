//! Catalog core: content pipeline and page state machine. No IO.
mod config;
mod derive;
mod effect;
mod entity;
mod msg;
mod normalize;
mod query;
mod session;
mod state;
mod update;
mod view_model;

pub use config::{DisplayConfig, ExcerptLengths, PageConfig, PageKind};
pub use derive::{
    detail_href, discount_percent, effective_price, escape_html, excerpt, format_currency,
    format_date, paragraphs_html, price_display, rating_label, resolve_image, visible_tags,
    whatsapp_link, CurrencyFormat, PriceDisplay, DATE_PLACEHOLDER, ELLIPSIS, EMPTY_BODY_HTML,
    MAX_VISIBLE_TAGS,
};
pub use effect::Effect;
pub use entity::{Collection, ContentEntity, DEFAULT_AUTHOR};
pub use msg::Msg;
pub use normalize::{
    normalize, normalize_with, parse_timestamp, FieldAliases, Normalized, DEFAULT_ALIASES,
};
pub use query::{apply, compare_titles, sort_entities, Query, SortMode};
pub use session::{
    account_access, display_name_from_email, AccountAccess, SessionData, SessionGate, SESSION_KEY,
};
pub use state::{selected_id_from_url, AttemptId, LoadError, PageState, ViewState};
pub use update::update;
pub use view_model::{
    EntityCard, EntityDetail, PageStatus, PageViewModel, DEFAULT_MODALITY, MISSING_VALUE,
};

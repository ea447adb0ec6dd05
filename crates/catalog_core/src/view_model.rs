use crate::config::{DisplayConfig, PageKind};
use crate::derive::{
    detail_href, excerpt, format_date, paragraphs_html, price_display, rating_label,
    resolve_image, visible_tags, whatsapp_link, PriceDisplay,
};
use crate::entity::ContentEntity;
use crate::query::{apply, Query, SortMode};
use crate::state::{AttemptId, LoadError, PageState, ViewState};

/// Shown when a course has no modality.
pub const DEFAULT_MODALITY: &str = "Online";
/// Shown for absent location or duration.
pub const MISSING_VALUE: &str = "—";

/// What the renderer should display for the page as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStatus {
    Loading,
    Empty,
    Error(LoadError),
    /// Detail page whose id is missing or not in the loaded collection.
    NotFound,
    Ready,
}

/// Listing card for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityCard {
    pub id: String,
    pub href: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub excerpt: String,
    pub author: String,
    pub date: String,
    pub image_url: String,
    pub price: Option<PriceDisplay>,
    pub modality: String,
    pub duration: Option<String>,
    pub rating: Option<String>,
}

impl EntityCard {
    pub fn derive(entity: &ContentEntity, display: &DisplayConfig, excerpt_len: usize) -> Self {
        Self {
            id: entity.id.clone(),
            href: detail_href(&display.detail_page, &entity.id),
            title: entity.title.clone(),
            subtitle: entity.subtitle.clone(),
            excerpt: excerpt(&entity.body, excerpt_len),
            author: entity.author.clone(),
            date: format_date(entity.created_at),
            image_url: resolve_image(
                entity.image_ref.as_deref(),
                &display.image_base_path,
                &display.fallback_image,
            ),
            price: price_display(entity, &display.currency),
            modality: entity
                .modality
                .clone()
                .unwrap_or_else(|| DEFAULT_MODALITY.to_string()),
            duration: entity.duration.clone(),
            rating: rating_label(entity.rating),
        }
    }
}

/// Full view of a single entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDetail {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    /// Escaped paragraph markup.
    pub body_html: String,
    pub author: String,
    pub location: String,
    pub date: String,
    pub tags: Vec<String>,
    pub image_url: String,
    pub price: Option<PriceDisplay>,
    pub modality: String,
    pub duration: String,
    pub rating: Option<String>,
    pub whatsapp_link: Option<String>,
}

impl EntityDetail {
    pub fn derive(entity: &ContentEntity, display: &DisplayConfig) -> Self {
        Self {
            id: entity.id.clone(),
            title: entity.title.clone(),
            subtitle: entity.subtitle.clone(),
            body_html: paragraphs_html(&entity.body),
            author: entity.author.clone(),
            location: entity
                .location_label
                .clone()
                .unwrap_or_else(|| MISSING_VALUE.to_string()),
            date: format_date(entity.created_at),
            tags: visible_tags(&entity.tags).to_vec(),
            image_url: resolve_image(
                entity.image_ref.as_deref(),
                &display.image_base_path,
                &display.fallback_image,
            ),
            price: price_display(entity, &display.currency),
            modality: entity
                .modality
                .clone()
                .unwrap_or_else(|| DEFAULT_MODALITY.to_string()),
            duration: entity
                .duration
                .clone()
                .unwrap_or_else(|| MISSING_VALUE.to_string()),
            rating: rating_label(entity.rating),
            whatsapp_link: display
                .whatsapp_number
                .as_deref()
                .map(|number| whatsapp_link(number, &entity.title)),
        }
    }
}

/// Plain-data snapshot handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageViewModel {
    pub kind: PageKind,
    pub status: PageStatus,
    pub attempt_id: AttemptId,
    /// Entities in the loaded collection.
    pub total: usize,
    /// Entities after search and sort.
    pub entries: Vec<EntityCard>,
    /// Newest entity of the whole collection, independent of the query.
    pub featured: Option<EntityCard>,
    /// The entity selected by the page's `id`, when it exists.
    pub detail: Option<EntityDetail>,
    pub query: Query,
    pub dropped_records: usize,
    /// Fallback image the renderer swaps in when an image fails to load.
    pub fallback_image: String,
}

impl PageViewModel {
    pub(crate) fn build(state: &PageState) -> Self {
        let config = state.config();
        let display = &config.display;

        let mut view = Self {
            kind: config.kind,
            status: PageStatus::Loading,
            attempt_id: state.latest_attempt(),
            total: 0,
            entries: Vec::new(),
            featured: None,
            detail: None,
            query: state.query().clone(),
            dropped_records: state.dropped_records(),
            fallback_image: display.fallback_image.clone(),
        };

        let collection = match state.view_state() {
            ViewState::Loading => None,
            ViewState::Empty => {
                view.status = PageStatus::Empty;
                None
            }
            ViewState::Error(err) => {
                view.status = PageStatus::Error(err.clone());
                None
            }
            ViewState::Ready(collection) => {
                view.status = PageStatus::Ready;
                Some(collection)
            }
        };

        if let Some(collection) = collection {
            view.total = collection.len();
            view.entries = apply(collection, state.query())
                .into_iter()
                .map(|entity| EntityCard::derive(entity, display, display.excerpt.card))
                .collect();
            view.featured = apply(collection, &Query::new("", SortMode::Newest))
                .first()
                .map(|entity| EntityCard::derive(entity, display, display.excerpt.featured));
            view.detail = config
                .selected_id
                .as_deref()
                .and_then(|id| collection.iter().find(|entity| entity.id == id))
                .map(|entity| EntityDetail::derive(entity, display));
        }

        let loaded = matches!(view.status, PageStatus::Ready | PageStatus::Empty);
        if config.kind == PageKind::Detail && loaded && view.detail.is_none() {
            view.status = PageStatus::NotFound;
        }

        view
    }

    pub fn shown(&self) -> usize {
        self.entries.len()
    }
}

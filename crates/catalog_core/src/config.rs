use serde::{Deserialize, Serialize};

use crate::derive::CurrencyFormat;

/// Character caps for excerpts at each call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExcerptLengths {
    /// Listing cards.
    pub card: usize,
    /// The featured entity above the listing.
    pub featured: usize,
}

impl Default for ExcerptLengths {
    fn default() -> Self {
        Self {
            card: 155,
            featured: 180,
        }
    }
}

/// Presentation settings consumed when deriving display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Prefix for relative image names.
    pub image_base_path: String,
    /// Used when an entity has no image, and by the renderer when an image fails to load.
    pub fallback_image: String,
    pub excerpt: ExcerptLengths,
    pub currency: CurrencyFormat,
    /// Page that shows a single entity; cards link to `<detail_page>?id=<id>`.
    pub detail_page: String,
    /// Enables the WhatsApp call to action on detail pages.
    pub whatsapp_number: Option<String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            image_base_path: "assets/images/".to_string(),
            fallback_image: "assets/images/hero-banner.jpg".to_string(),
            excerpt: ExcerptLengths::default(),
            currency: CurrencyFormat::default(),
            detail_page: "blog.html".to_string(),
            whatsapp_number: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageKind {
    /// Listing with search/sort; a matching selected id adds a detail panel.
    #[default]
    Listing,
    /// Single-entity page; a missing or unknown id renders as not found.
    Detail,
}

/// Everything one page session needs to load and present its collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageConfig {
    pub kind: PageKind,
    /// Where the feed document is fetched from.
    pub data_source: String,
    /// The `id` query parameter of the page, if any.
    pub selected_id: Option<String>,
    pub display: DisplayConfig,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            kind: PageKind::Listing,
            data_source: "blog.json".to_string(),
            selected_id: None,
            display: DisplayConfig::default(),
        }
    }
}

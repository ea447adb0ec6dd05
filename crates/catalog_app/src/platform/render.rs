use std::fmt::Write;

use catalog_core::{
    escape_html, EntityCard, EntityDetail, LoadError, PageKind, PageStatus, PageViewModel,
    PriceDisplay, SortMode,
};

const EMPTY_TOPICS: &str = "Temario por confirmar.";

/// Renders the page body for `view`. Every entity-derived string is escaped.
pub fn render(view: &PageViewModel) -> String {
    let mut html = String::new();
    let _ = writeln!(
        html,
        "<main class=\"tc-page\" data-kind=\"{}\" data-attempt=\"{}\">",
        kind_label(view.kind),
        view.attempt_id
    );
    let fallback = escape_html(&view.fallback_image);

    match &view.status {
        PageStatus::Loading => {
            html.push_str("<p class=\"tc-status\" aria-busy=\"true\">Cargando…</p>\n");
        }
        PageStatus::Empty => {
            html.push_str(
                "<section class=\"tc-empty\"><h2>Aún no hay publicaciones</h2>\
                 <p>Cuando el administrador publique, aparecerá aquí.</p></section>\n",
            );
            push_counts(&mut html, view);
        }
        PageStatus::Error(err) => push_error(&mut html, err),
        PageStatus::NotFound => {
            html.push_str(
                "<section class=\"tc-not-found\"><h2>No encontramos este contenido</h2>\
                 <p>Revisa el enlace o vuelve al listado.</p></section>\n",
            );
        }
        PageStatus::Ready => match view.kind {
            PageKind::Detail => {
                if let Some(detail) = &view.detail {
                    push_detail(&mut html, detail, &fallback);
                }
            }
            PageKind::Listing => {
                if let Some(detail) = &view.detail {
                    push_detail(&mut html, detail, &fallback);
                }
                if let Some(featured) = &view.featured {
                    html.push_str("<section class=\"tc-featured\">\n");
                    push_card(&mut html, featured, &fallback);
                    html.push_str("</section>\n");
                }
                push_counts(&mut html, view);
                push_grid(&mut html, view, &fallback);
            }
        },
    }

    html.push_str("</main>\n");
    html
}

fn kind_label(kind: PageKind) -> &'static str {
    match kind {
        PageKind::Listing => "listing",
        PageKind::Detail => "detail",
    }
}

fn push_error(html: &mut String, err: &LoadError) {
    let reason = match err {
        LoadError::Network {
            status: Some(code), ..
        } => format!("El servidor respondió {code}."),
        LoadError::Network { status: None, .. } => "No hay conexión con el servidor.".to_string(),
        LoadError::Parse { .. } => "El contenido recibido no es válido.".to_string(),
    };
    let _ = writeln!(
        html,
        "<section class=\"tc-error\"><h2>No pudimos cargar el contenido</h2><p>{}</p>\
         <button type=\"button\" data-action=\"retry\">Reintentar</button></section>",
        escape_html(&reason)
    );
}

fn push_counts(html: &mut String, view: &PageViewModel) {
    let _ = writeln!(
        html,
        "<p class=\"tc-count\">Mostrando <span data-count=\"shown\">{}</span> de \
         <span data-count=\"total\">{}</span> · {}</p>",
        view.shown(),
        view.total,
        sort_label(view.query.sort)
    );
}

fn sort_label(sort: SortMode) -> &'static str {
    match sort {
        SortMode::Newest => "Más recientes",
        SortMode::Oldest => "Más antiguos",
        SortMode::Alphabetical => "A–Z",
    }
}

fn push_grid(html: &mut String, view: &PageViewModel, fallback: &str) {
    if view.entries.is_empty() {
        let _ = writeln!(
            html,
            "<p class=\"tc-no-results\">Sin resultados para «{}».</p>",
            escape_html(&view.query.text)
        );
        return;
    }
    html.push_str("<section class=\"tc-grid\">\n");
    for card in &view.entries {
        push_card(html, card, fallback);
    }
    html.push_str("</section>\n");
}

fn push_image(html: &mut String, src: &str, alt: &str, fallback: &str) {
    let _ = write!(
        html,
        "<img src=\"{}\" alt=\"{}\" loading=\"lazy\" data-fallback=\"{}\" \
         onerror=\"this.onerror=null;this.src=this.dataset.fallback\">",
        escape_html(src),
        escape_html(alt),
        fallback
    );
}

fn push_price(html: &mut String, price: &PriceDisplay) {
    let _ = write!(
        html,
        "<div class=\"tc-price\"><span class=\"tc-price-now\">{}</span>",
        escape_html(&price.current)
    );
    if let Some(list) = &price.list {
        let _ = write!(html, "<span class=\"tc-price-old\">{}</span>", escape_html(list));
    }
    if let Some(percent) = price.discount_percent {
        let _ = write!(html, "<span class=\"tc-discount\">-{percent}%</span>");
    }
    html.push_str("</div>");
}

fn push_card(html: &mut String, card: &EntityCard, fallback: &str) {
    html.push_str("<article class=\"tc-card\">");
    push_image(html, &card.image_url, &card.title, fallback);
    let _ = write!(html, "<h3>{}</h3>", escape_html(&card.title));
    if let Some(subtitle) = &card.subtitle {
        let _ = write!(html, "<p class=\"tc-sub\">{}</p>", escape_html(subtitle));
    }
    let _ = write!(
        html,
        "<p class=\"tc-excerpt\">{}</p><p class=\"tc-meta\"><strong>{}</strong> <span>{}</span></p>",
        escape_html(&card.excerpt),
        escape_html(&card.author),
        escape_html(&card.date)
    );
    if let Some(price) = &card.price {
        let _ = write!(html, "<span class=\"tc-badge\">{}</span>", escape_html(&card.modality));
        if let Some(duration) = &card.duration {
            let _ = write!(html, "<span class=\"tc-badge\">{}</span>", escape_html(duration));
        }
        push_price(html, price);
    }
    if let Some(rating) = &card.rating {
        let _ = write!(html, "<div class=\"tc-rating\">★ {}</div>", escape_html(rating));
    }
    let _ = writeln!(
        html,
        "<a href=\"{}\" aria-label=\"Leer: {}\">Leer →</a></article>",
        escape_html(&card.href),
        escape_html(&card.title)
    );
}

fn push_detail(html: &mut String, detail: &EntityDetail, fallback: &str) {
    html.push_str("<article class=\"tc-detail\">");
    push_image(html, &detail.image_url, &detail.title, fallback);
    let _ = write!(html, "<h1>{}</h1>", escape_html(&detail.title));
    if let Some(subtitle) = &detail.subtitle {
        let _ = write!(html, "<p class=\"tc-sub\">{}</p>", escape_html(subtitle));
    }
    let _ = write!(
        html,
        "<p class=\"tc-meta\"><strong>{}</strong> · {} · {}</p>",
        escape_html(&detail.author),
        escape_html(&detail.location),
        escape_html(&detail.date)
    );
    if let Some(price) = &detail.price {
        let _ = write!(
            html,
            "<p class=\"tc-facts\">{} · {}</p>",
            escape_html(&detail.modality),
            escape_html(&detail.duration)
        );
        push_price(html, price);
    }
    if let Some(rating) = &detail.rating {
        let _ = write!(html, "<div class=\"tc-rating\">★ {}</div>", escape_html(rating));
    }
    // Already escaped paragraph markup.
    let _ = write!(html, "<div class=\"tc-body\">{}</div>", detail.body_html);

    html.push_str("<div class=\"tc-tags\">");
    if detail.tags.is_empty() {
        let _ = write!(html, "<p>{EMPTY_TOPICS}</p>");
    }
    for tag in &detail.tags {
        let _ = write!(html, "<span class=\"tc-tag\">{}</span>", escape_html(tag));
    }
    html.push_str("</div>");

    if let Some(link) = &detail.whatsapp_link {
        let _ = write!(
            html,
            "<a class=\"tc-whatsapp\" href=\"{}\" target=\"_blank\" rel=\"noopener\">Hablar por WhatsApp</a>",
            escape_html(link)
        );
    }
    html.push_str("</article>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::{update, Effect, Msg, PageConfig, PageState};
    use serde_json::json;

    fn loaded(config: PageConfig, document: serde_json::Value) -> PageViewModel {
        let (state, effects) = update(PageState::new(config), Msg::PageOpened);
        let attempt_id = match effects.as_slice() {
            [Effect::FetchDocument { attempt_id, .. }] => *attempt_id,
            other => panic!("unexpected effects {other:?}"),
        };
        let (state, _) = update(
            state,
            Msg::FetchCompleted {
                attempt_id,
                result: Ok(document),
            },
        );
        state.view()
    }

    #[test]
    fn entity_text_is_escaped() {
        let view = loaded(
            PageConfig::default(),
            json!([{"id": "x", "title": "<script>alert(1)</script>", "content": "a & b", "author": "O'Neil"}]),
        );
        let html = render(&view);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("a &amp; b"));
        assert!(html.contains("O&#039;Neil"));
    }

    #[test]
    fn images_carry_fallback_handler() {
        let view = loaded(
            PageConfig::default(),
            json!([{"id": "1", "title": "T", "content": "B", "image": "foto.jpg"}]),
        );
        let html = render(&view);
        assert!(html.contains("src=\"assets/images/foto.jpg\""));
        assert!(html.contains("data-fallback=\"assets/images/hero-banner.jpg\""));
        assert!(html.contains("this.src=this.dataset.fallback"));
    }

    #[test]
    fn quotes_in_fallback_path_stay_inside_the_attribute() {
        let mut config = PageConfig::default();
        config.display.fallback_image = "assets/img/d'or\"x.jpg".to_string();
        let view = loaded(
            config,
            json!([{"id": "1", "title": "T", "content": "B", "image": "foto.jpg"}]),
        );
        let html = render(&view);
        assert!(html.contains("data-fallback=\"assets/img/d&#039;or&quot;x.jpg\""));
        // The handler never embeds the path itself.
        assert!(!html.contains("this.src='"));
    }

    #[test]
    fn listing_shows_counts_and_featured() {
        let view = loaded(
            PageConfig::default(),
            json!({"posts": [
                {"id": "1", "title": "Uno", "content": "A", "createdAt": "2024-03-05"},
                {"id": "2", "title": "Dos", "content": "B", "createdAt": "2023-01-01"}
            ]}),
        );
        let html = render(&view);
        assert!(html.contains("<span data-count=\"shown\">2</span>"));
        assert!(html.contains("<section class=\"tc-featured\">"));
        assert!(html.contains("05 de marzo de 2024"));
        assert!(html.contains("href=\"blog.html?id=1\""));
    }

    #[test]
    fn statuses_render_their_own_sections() {
        let loading = PageState::new(PageConfig::default()).view();
        assert!(render(&loading).contains("Cargando…"));

        let empty = loaded(PageConfig::default(), json!([]));
        assert!(render(&empty).contains("Aún no hay publicaciones"));

        let mut error = loading.clone();
        error.status = PageStatus::Error(LoadError::Network {
            status: Some(404),
            message: "404".to_string(),
        });
        let html = render(&error);
        assert!(html.contains("El servidor respondió 404."));
        assert!(html.contains("data-action=\"retry\""));

        let detail = loaded(
            PageConfig {
                kind: PageKind::Detail,
                selected_id: Some("nope".to_string()),
                ..PageConfig::default()
            },
            json!([{"id": "1", "title": "Uno", "content": "A"}]),
        );
        assert!(render(&detail).contains("No encontramos este contenido"));
    }

    #[test]
    fn course_detail_shows_topics_placeholder_and_cta() {
        let mut config = PageConfig {
            kind: PageKind::Detail,
            selected_id: Some("c1".to_string()),
            ..PageConfig::default()
        };
        config.display.whatsapp_number = Some("56900000000".to_string());
        let view = loaded(
            config,
            json!([{"id": "c1", "titulo": "Curso", "descripcion": "Texto", "precio": 12990}]),
        );
        let html = render(&view);
        assert!(html.contains("$12.990"));
        assert!(html.contains(EMPTY_TOPICS));
        assert!(html.contains("https://wa.me/56900000000?text="));
        assert!(html.contains("Online · —"));
    }
}

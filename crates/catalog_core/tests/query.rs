use catalog_core::{apply, normalize, ContentEntity, Query, SortMode};
use pretty_assertions::assert_eq;
use serde_json::json;

fn collection() -> Vec<ContentEntity> {
    normalize(&json!([
        {"id": "a", "title": "Atención y TDAH", "body": "Claves para el aula", "createdAt": "2023-02-01"},
        {"id": "b", "title": "Funciones ejecutivas", "body": "Planificación", "createdAt": "2024-05-10"},
        {"id": "c", "title": "Lectura temprana", "body": "Estrategias", "author": "Equipo tdah"},
        {"id": "d", "title": "Ñandúes y números", "body": "Matemática", "createdAt": "2024-05-10"},
        {"id": "e", "title": "árbol de decisiones", "body": "Evaluación", "createdAt": "2022-11-30"}
    ]))
    .entities
}

fn ids(entities: &[&ContentEntity]) -> Vec<String> {
    entities.iter().map(|e| e.id.clone()).collect()
}

#[test]
fn newest_puts_missing_dates_last() {
    let entities = normalize(&json!([
        {"id": "1", "title": "T1", "body": "B", "createdAt": "2024-01-01"},
        {"id": "2", "title": "T2", "body": "B", "createdAt": null},
        {"id": "3", "title": "T3", "body": "B", "createdAt": "2023-06-01"}
    ]))
    .entities;

    let out = apply(&entities, &Query::new("", SortMode::Newest));
    assert_eq!(ids(&out), vec!["1", "3", "2"]);

    let out = apply(&entities, &Query::new("", SortMode::Oldest));
    assert_eq!(ids(&out), vec!["2", "3", "1"]);
}

#[test]
fn search_matches_title_body_or_author_case_insensitively() {
    let entities = collection();
    let out = apply(&entities, &Query::new("tdah", SortMode::Oldest));

    assert_eq!(out.len(), 2);
    // "c" has no date (epoch zero) so it is oldest; relative order of matches is kept.
    assert_eq!(ids(&out), vec!["c", "a"]);

    let out = apply(&entities, &Query::new("  PLANIFICACIÓN ", SortMode::Newest));
    assert_eq!(ids(&out), vec!["b"]);
}

#[test]
fn search_scenario_preserves_input_order_among_matches() {
    let entities = normalize(&json!([
        {"id": "1", "title": "TDAH en casa", "body": "x", "createdAt": "2024-01-01"},
        {"id": "2", "title": "Otro", "body": "x", "createdAt": "2024-01-01"},
        {"id": "3", "title": "Otro", "body": "Sobre el Tdah", "createdAt": "2024-01-01"},
        {"id": "4", "title": "Otro", "body": "x", "createdAt": "2024-01-01"},
        {"id": "5", "title": "Otro", "body": "x", "createdAt": "2024-01-01"}
    ]))
    .entities;

    let out = apply(&entities, &Query::new("tdah", SortMode::default()));
    assert_eq!(ids(&out), vec!["1", "3"]);
}

#[test]
fn empty_query_matches_everything() {
    let entities = collection();
    assert_eq!(apply(&entities, &Query::new("   ", SortMode::Newest)).len(), entities.len());
}

#[test]
fn alphabetical_uses_spanish_collation() {
    let entities = collection();
    let out = apply(&entities, &Query::new("", SortMode::Alphabetical));
    assert_eq!(ids(&out), vec!["e", "a", "b", "c", "d"]);
}

#[test]
fn sorting_is_stable_for_equal_keys_in_every_mode() {
    let entities = normalize(&json!([
        {"id": "1", "title": "Igual", "body": "x", "createdAt": "2024-01-01"},
        {"id": "2", "title": "igual", "body": "x", "createdAt": "2024-01-01"},
        {"id": "3", "title": "IGUAL", "body": "x", "createdAt": "2024-01-01"},
        {"id": "4", "title": "Ígual", "body": "x", "createdAt": "2024-01-01"}
    ]))
    .entities;

    for mode in [SortMode::Newest, SortMode::Oldest, SortMode::Alphabetical] {
        let out = apply(&entities, &Query::new("", mode));
        assert_eq!(ids(&out), vec!["1", "2", "3", "4"], "{mode:?}");
    }
}

#[test]
fn apply_is_deterministic_and_leaves_input_untouched() {
    let entities = collection();
    let before = entities.clone();
    for mode in [SortMode::Newest, SortMode::Oldest, SortMode::Alphabetical] {
        let query = Query::new("e", mode);
        let first = ids(&apply(&entities, &query));
        let second = ids(&apply(&entities, &query));
        assert_eq!(first, second);
    }
    assert_eq!(entities, before);
}

#[test]
fn alphabetical_puts_inverted_punctuation_first() {
    let entities = normalize(&json!([
        {"id": "z", "title": "Zeta", "body": "x"},
        {"id": "q", "title": "¿Qué es el TDAH?", "body": "x"},
        {"id": "a", "title": "Atención", "body": "x"},
        {"id": "h", "title": "¡Hola, familias!", "body": "x"}
    ]))
    .entities;

    let out = apply(&entities, &Query::new("", SortMode::Alphabetical));
    assert_eq!(ids(&out), vec!["h", "q", "a", "z"]);
}

use std::cmp::Ordering;
use std::str::FromStr;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::entity::ContentEntity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Most recent first; undated entities sort as epoch zero (last).
    #[default]
    Newest,
    Oldest,
    /// Spanish collation on the title, ignoring case and accents.
    Alphabetical,
}

impl SortMode {
    /// Lenient parse of a sort selector; unknown values fall back to `Newest`.
    pub fn from_selector(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::Newest => "newest",
            SortMode::Oldest => "oldest",
            SortMode::Alphabetical => "alphabetical",
        }
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" | "newest" => Ok(SortMode::Newest),
            "old" | "oldest" => Ok(SortMode::Oldest),
            "az" | "alpha" | "alphabetical" => Ok(SortMode::Alphabetical),
            other => Err(format!("unknown sort mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    pub text: String,
    pub sort: SortMode,
}

impl Query {
    pub fn new(text: impl Into<String>, sort: SortMode) -> Self {
        Self {
            text: text.into(),
            sort,
        }
    }
}

/// Filters `collection` by the query text, then orders the matches by the sort mode.
///
/// Pure: the input is never reordered and equal sort keys keep their input order.
pub fn apply<'a>(collection: &'a [ContentEntity], query: &Query) -> Vec<&'a ContentEntity> {
    let needle = query.text.trim().to_lowercase();
    let mut matches: Vec<&ContentEntity> = collection
        .iter()
        .filter(|entity| needle.is_empty() || matches_text(entity, &needle))
        .collect();
    sort_entities(&mut matches, query.sort);
    matches
}

fn matches_text(entity: &ContentEntity, needle: &str) -> bool {
    [&entity.title, &entity.body, &entity.author]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Stable sort in place.
pub fn sort_entities(entities: &mut [&ContentEntity], mode: SortMode) {
    match mode {
        SortMode::Newest => entities.sort_by(|a, b| b.created_millis().cmp(&a.created_millis())),
        SortMode::Oldest => entities.sort_by_key(|entity| entity.created_millis()),
        SortMode::Alphabetical => {
            let mut keyed: Vec<(Vec<CollationElement>, &ContentEntity)> = entities
                .iter()
                .map(|entity| (collation_key(&entity.title), *entity))
                .collect();
            keyed.sort_by(|a, b| a.0.cmp(&b.0));
            for (slot, (_, entity)) in entities.iter_mut().zip(keyed) {
                *slot = entity;
            }
        }
    }
}

/// Orders two titles the way a Spanish reader expects: case and accents are
/// ignored, `ñ` sorts as its own letter after `n`, and punctuation such as a
/// leading `¿` or `¡` sorts before digits, which sort before letters.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    collation_key(a).cmp(&collation_key(b))
}

/// Primary weight classes, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum CharClass {
    Punctuation,
    Digit,
    Letter,
}

type CollationElement = (CharClass, char);

/// Sorts after every other `n*` sequence and before `o`.
const ENYE_WEIGHT: char = '\u{10FFFF}';

fn collation_key(text: &str) -> Vec<CollationElement> {
    let mut key = Vec::with_capacity(text.len());
    let mut chars = text.nfd().flat_map(char::to_lowercase).peekable();
    while let Some(ch) = chars.next() {
        if is_combining_mark(ch) {
            continue;
        }
        key.push((char_class(ch), ch));
        if ch == 'n' && chars.peek() == Some(&'\u{303}') {
            chars.next();
            key.push((CharClass::Letter, ENYE_WEIGHT));
        }
    }
    key
}

fn char_class(ch: char) -> CharClass {
    if ch.is_alphabetic() {
        CharClass::Letter
    } else if ch.is_numeric() {
        CharClass::Digit
    } else {
        CharClass::Punctuation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collation_ignores_case_and_accents() {
        assert_eq!(compare_titles("Árbol", "arbol"), Ordering::Equal);
        assert_eq!(compare_titles("atención", "Atencion"), Ordering::Equal);
        assert_eq!(compare_titles("Émile", "zeta"), Ordering::Less);
    }

    #[test]
    fn enye_sorts_after_n() {
        assert_eq!(compare_titles("ñandú", "nube"), Ordering::Greater);
        assert_eq!(compare_titles("ñandú", "oso"), Ordering::Less);
        assert_eq!(compare_titles("Niño", "ninos"), Ordering::Greater);
    }

    #[test]
    fn punctuation_sorts_before_digits_and_letters() {
        assert_eq!(compare_titles("¿Qué es el TDAH?", "Atención"), Ordering::Less);
        assert_eq!(compare_titles("¡Hola!", "abeja"), Ordering::Less);
        assert_eq!(compare_titles("\u{201C}Cita\u{201D}", "Zeta"), Ordering::Less);
        assert_eq!(compare_titles("10 claves", "Atención"), Ordering::Less);
        assert_eq!(compare_titles("¿Qué?", "10 claves"), Ordering::Less);
    }

    #[test]
    fn sort_selectors_parse_leniently() {
        assert_eq!(SortMode::from_selector("old"), SortMode::Oldest);
        assert_eq!(SortMode::from_selector(" AZ "), SortMode::Alphabetical);
        assert_eq!(SortMode::from_selector("whatever"), SortMode::Newest);
        assert_eq!("newest".parse::<SortMode>(), Ok(SortMode::Newest));
    }
}

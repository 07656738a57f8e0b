//! Normalizes raw request fields before validation.
//!
//! Single-line fields lose all markup and are entity-escaped; long-form
//! fields keep ammonia's safe tag set so formatted stories survive.

use crate::models::fiction::FictionInput;

/// Trim and strip every tag, escaping what remains.
fn plain_text(raw: &str) -> String {
    ammonia::Builder::empty().clean(raw.trim()).to_string()
}

/// Trim and remove anything outside the safe HTML subset.
fn rich_text(raw: &str) -> String {
    ammonia::clean(raw.trim())
}

pub fn fiction_input(raw: &FictionInput) -> FictionInput {
    FictionInput {
        title: plain_text(&raw.title),
        description: rich_text(&raw.description),
        category: plain_text(&raw.category),
        body: rich_text(&raw.body),
    }
}

pub fn search_query(raw: &str) -> String {
    plain_text(raw)
}

//! Field rules applied to sanitized input.

use crate::error::FieldErrors;
use crate::models::fiction::FictionInput;

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 300;
pub const CATEGORY_MAX: usize = 50;
pub const BODY_MIN: usize = 10;
pub const QUERY_MAX: usize = 100;

/// Length as a reader sees it: sanitizing escapes `&` to `&amp;` and so on,
/// and each such entity counts as a single character.
fn char_len(s: &str) -> usize {
    let mut len = 0;
    let mut rest = s;
    while let Some(c) = rest.chars().next() {
        len += 1;
        let step = match c {
            '&' => entity_len(rest).unwrap_or(1),
            c => c.len_utf8(),
        };
        rest = &rest[step..];
    }
    len
}

/// Byte length of the entity `s` starts with (`&name;`, `&#39;`), if any.
fn entity_len(s: &str) -> Option<usize> {
    let end = s.get(1..)?.find(';')? + 1;
    let name = &s[1..end];
    let is_entity = !name.is_empty()
        && name.len() <= 10
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '#');
    is_entity.then_some(end + 1)
}

/// Check a sanitized fiction. `Ok` iff every field passes.
pub fn fiction_input(input: &FictionInput) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if input.title.is_empty() {
        errors.insert("title".into(), "Title is required".into());
    } else if !(TITLE_MIN..=TITLE_MAX).contains(&char_len(&input.title)) {
        errors.insert(
            "title".into(),
            format!("Title must be between {TITLE_MIN} and {TITLE_MAX} characters"),
        );
    }

    if input.description.is_empty() {
        errors.insert("description".into(), "Description is required".into());
    } else if char_len(&input.description) > DESCRIPTION_MAX {
        errors.insert(
            "description".into(),
            format!("Description must be at most {DESCRIPTION_MAX} characters"),
        );
    }

    if input.category.is_empty() {
        errors.insert("category".into(), "Category is required".into());
    } else if char_len(&input.category) > CATEGORY_MAX {
        errors.insert(
            "category".into(),
            format!("Category must be at most {CATEGORY_MAX} characters"),
        );
    }

    if input.body.is_empty() {
        errors.insert("body".into(), "Body is required".into());
    } else if char_len(&input.body) < BODY_MIN {
        errors.insert(
            "body".into(),
            format!("Body must be at least {BODY_MIN} characters"),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check a sanitized search query.
pub fn search_query(query: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if query.is_empty() {
        errors.insert("q".into(), "Search query is required".into());
    } else if char_len(query) > QUERY_MAX {
        errors.insert(
            "q".into(),
            format!("Search query must be at most {QUERY_MAX} characters"),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

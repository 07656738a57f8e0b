use serde::Deserialize;

use crate::db::fiction_repository::{ListOptions, SortDirection, SortField};
use crate::error::AppError;

/// Raw `GET /api/fictions` query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub sort: Option<String>,
    pub limit: Option<String>,
}

/// Raw `GET /api/fictions/search` query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Turn the raw listing query into bounded options.
///
/// `sort` is a field name, `-` prefixed for descending order. `limit` of 0
/// (or none) means unlimited; anything above `max_limit` is clamped.
pub fn parse_list_options(query: &ListQuery, max_limit: u32) -> Result<ListOptions, AppError> {
    let sort = match query.sort.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => {
            let (name, direction) = match raw.strip_prefix('-') {
                Some(name) => (name, SortDirection::Descending),
                None => (raw, SortDirection::Ascending),
            };
            let field = SortField::parse(name).ok_or_else(|| {
                AppError::invalid_query(
                    "sort",
                    format!(
                        "Unknown sort field '{name}'. Expected one of: title, category, createdAt"
                    ),
                )
            })?;
            Some((field, direction))
        }
    };

    let limit = match query.limit.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => {
            let parsed: u32 = raw.parse().map_err(|_| {
                AppError::invalid_query("limit", "Limit must be a non-negative integer")
            })?;
            match parsed {
                0 => None,
                n => Some(n.min(max_limit)),
            }
        }
    };

    Ok(ListOptions { sort, limit })
}

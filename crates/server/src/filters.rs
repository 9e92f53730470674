//! Custom Askama template filters.

use std::fmt::Display;

use crate::services::uploads::format_file_size;

/// Formats a byte count for display, e.g. `1.5 KB`.
///
/// Usage in templates: `{{ file.size|file_size }}`
#[askama::filter_fn]
pub fn file_size(bytes: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let bytes: u64 = bytes.to_string().parse().map_err(askama::Error::custom)?;
    Ok(format_file_size(bytes))
}

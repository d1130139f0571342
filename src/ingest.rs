//! Ingestion facade: the collaborator-facing boundary of the store.
//!
//! Text acquisition lives here; the core only ever sees plain text and does
//! not know whether it came from direct input, a file, or a URL. This module
//! also re-exposes the sole query surface so CLI-level callers never touch
//! the encoder or scan directly.

use crate::error::{StoreError, StoreResult};
use crate::search::{self, Match};
use crate::store::{RecordId, Store};
use std::path::Path;
use tracing::info;

/// Inserts raw text into a collection.
pub fn insert_text(store: &mut Store, collection: &str, text: &str) -> StoreResult<RecordId> {
    store.insert(collection, text)
}

/// Inserts the UTF-8 contents of a file.
pub fn insert_file(
    store: &mut Store,
    collection: &str,
    path: impl AsRef<Path>,
) -> StoreResult<RecordId> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| StoreError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), bytes = text.len(), "ingesting file");
    store.insert(collection, &text)
}

/// Fetches a URL and inserts the response body.
///
/// HTML responses get a crude tag-stripping pass so the vocabulary is built
/// from page text rather than markup. This is not a DOM-aware extraction.
pub fn insert_url(store: &mut Store, collection: &str, url: &str) -> StoreResult<RecordId> {
    let fetch_error = |reason: String| StoreError::Fetch {
        url: url.to_string(),
        reason,
    };

    let response = reqwest::blocking::get(url).map_err(|e| fetch_error(e.to_string()))?;
    let response = response
        .error_for_status()
        .map_err(|e| fetch_error(e.to_string()))?;

    let is_html = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("text/html"));

    let body = response.text().map_err(|e| fetch_error(e.to_string()))?;
    let text = if is_html { strip_tags(&body) } else { body };

    info!(url, bytes = text.len(), "ingesting url");
    store.insert(collection, &text)
}

/// Finds the stored document closest to the query text.
///
/// Returns `Ok(None)` (not an error) when the store is empty.
pub fn find_closest(store: &Store, text: &str) -> StoreResult<Option<Match>> {
    search::closest(store, text)
}

/// Drops `<...>` tag spans and decodes the handful of entities that matter
/// for word boundaries.
fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                // Tag boundaries separate words ("</p><p>" must not glue them).
                text.push(' ');
            }
            _ if in_tag => {}
            _ => text.push(c),
        }
    }
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

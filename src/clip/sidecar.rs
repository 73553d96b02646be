use std::path::Path;

use chrono::NaiveDateTime;
use tracing::{debug, warn};

/// Width of the `+HH:MM` / `-HH:MM` suffix on CreationDate values
const OFFSET_SUFFIX_LEN: usize = 6;

/// Read the capture time from a clip's non-real-time metadata sidecar.
///
/// Returns `None` when the file is missing, is not valid XML, has no
/// `CreationDate` element directly under the root, or carries a value that
/// does not parse. None of these abort extraction.
pub fn read_capture_timestamp(path: &Path, namespace: &str) -> Option<NaiveDateTime> {
    if !path.exists() {
        debug!("No sidecar metadata at {:?}", path);
        return None;
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Could not read sidecar {:?}: {}", path, e);
            return None;
        }
    };

    let doc = match roxmltree::Document::parse(&content) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Skipping malformed sidecar {:?}: {}", path, e);
            return None;
        }
    };

    let value = doc
        .root_element()
        .children()
        .find(|n| n.has_tag_name((namespace, "CreationDate")))
        .and_then(|n| n.attribute("value"))?;

    let timestamp = parse_creation_date(value);
    if timestamp.is_none() {
        warn!("Unparsable CreationDate '{}' in {:?}", value, path);
    }
    timestamp
}

/// Parse a CreationDate value such as `2025-10-17T10:38:39-05:00`.
///
/// The trailing UTC offset is cut off, not applied: the result is the
/// camera's wall-clock reading. Files converted by earlier releases carry the
/// same overlay, so this is kept on purpose.
pub fn parse_creation_date(value: &str) -> Option<NaiveDateTime> {
    let cut = value.len().checked_sub(OFFSET_SUFFIX_LEN)?;
    let naive = value.get(..cut)?;
    naive.parse::<NaiveDateTime>().ok()
}

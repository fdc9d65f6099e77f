//! Scratch entry naming.
//!
//! Entries are named `<YYYYMMDDHHMMSS>_<token>` where the token is the
//! logical path with every separator replaced by `__`. Sorting entries that
//! share a token lexicographically yields chronological order.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

/// `chrono` format of the timestamp prefix.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

const SEPARATOR_TOKEN: &str = "__";

static STORAGE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{14})_(.+)$").expect("storage name pattern is valid"));

/// Encode a logical path into the token used in scratch entry names.
#[must_use]
pub fn encode_path(path: &Path) -> String {
    path.to_string_lossy()
        .chars()
        .fold(String::new(), |mut token, c| {
            if c == '/' || c == '\\' {
                token.push_str(SEPARATOR_TOKEN);
            } else {
                token.push(c);
            }
            token
        })
}

/// Decode a token back into the logical path it was built from.
///
/// Best effort: a path that itself contains `__` or underscores next to a
/// separator does not round-trip. Entries are always matched by comparing
/// encoded tokens, never decoded paths.
#[must_use]
pub fn decode_path(token: &str) -> PathBuf {
    PathBuf::from(token.replace(SEPARATOR_TOKEN, "/"))
}

/// Build the scratch entry name for a capture of `path` at `timestamp`.
#[must_use]
pub fn storage_name(timestamp: &NaiveDateTime, path: &Path) -> String {
    format!("{}_{}", timestamp.format(TIMESTAMP_FORMAT), encode_path(path))
}

/// Split a scratch entry name into its timestamp and path token.
///
/// Returns `None` for names that were not produced by [`storage_name`].
#[must_use]
pub fn parse_storage_name(name: &str) -> Option<(NaiveDateTime, &str)> {
    let caps = STORAGE_NAME.captures(name)?;
    let stamp = caps.get(1)?.as_str();
    let token = caps.get(2)?.as_str();
    let timestamp = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;
    Some((timestamp, token))
}

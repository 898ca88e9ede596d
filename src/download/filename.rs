// ClipFetch - Media Retrieval Client
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Output filename derivation
//!
//! Priority order:
//! 1. A filename from the response's `Content-Disposition` header
//!    (`filename*=UTF-8''...` first, then `filename="..."` or bare
//!    `filename=...`), percent-decoded and otherwise used verbatim.
//! 2. A name synthesized from the resolved title: only `[A-Za-z0-9 \-_]`
//!    survive, at most 100 characters, then `.` and the output format.

use crate::api::models::Metadata;
use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;

/// Stem used when there is no title or nothing of it survives sanitizing
pub const FALLBACK_STEM: &str = "download";

/// Extension used when no output format is selected
pub const GENERIC_EXTENSION: &str = "bin";

/// Maximum characters kept from the title
pub const MAX_STEM_CHARS: usize = 100;

lazy_static! {
    static ref EXTENDED_FILENAME: Regex =
        Regex::new(r#"(?i)(?:^|;)\s*filename\*\s*=\s*"?([^;"]+)"?"#).unwrap();
    static ref QUOTED_FILENAME: Regex =
        Regex::new(r#"(?i)(?:^|;)\s*filename\s*=\s*"((?:[^"\\]|\\.)*)""#).unwrap();
    static ref BARE_FILENAME: Regex =
        Regex::new(r#"(?i)(?:^|;)\s*filename\s*=\s*([^;"\s][^;]*)"#).unwrap();
}

/// Pull a filename out of a `Content-Disposition` value
///
/// Returns `None` when the header carries no usable filename.
pub fn parse_content_disposition(header: &str) -> Option<String> {
    let name = if let Some(caps) = EXTENDED_FILENAME.captures(header) {
        // charset'language'value
        let raw = caps[1].trim();
        let value = raw.splitn(3, '\'').nth(2).unwrap_or(raw);
        percent_decode(value)
    } else if let Some(caps) = QUOTED_FILENAME.captures(header) {
        let unescaped = caps[1].replace("\\\"", "\"").replace("\\\\", "\\");
        percent_decode(&unescaped)
    } else if let Some(caps) = BARE_FILENAME.captures(header) {
        percent_decode(caps[1].trim())
    } else {
        return None;
    };

    Some(name).filter(|n| !n.trim().is_empty())
}

fn percent_decode(value: &str) -> String {
    match urlencoding::decode(value) {
        Ok(Cow::Borrowed(s)) => s.to_string(),
        Ok(Cow::Owned(s)) => s,
        // Not valid UTF-8 once decoded; keep what the server sent
        Err(_) => value.to_string(),
    }
}

/// Keep only `[A-Za-z0-9 \-_]`, at most [`MAX_STEM_CHARS`] of them
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .take(MAX_STEM_CHARS)
        .collect()
}

/// Normalize an output format token into an extension
pub fn extension_for(output_format: &str) -> &str {
    let ext = output_format.trim().trim_start_matches('.');
    if ext.is_empty() {
        GENERIC_EXTENSION
    } else {
        ext
    }
}

/// Build a filename from a title (or the fallback stem) and output format
pub fn synthesize_filename(title: Option<&str>, output_format: &str) -> String {
    let stem = sanitize_title(title.unwrap_or(FALLBACK_STEM));
    let stem = if stem.is_empty() { FALLBACK_STEM.to_string() } else { stem };
    format!("{}.{}", stem, extension_for(output_format))
}

/// Decide the name of a finished download
pub fn derive_filename(disposition: Option<&str>, metadata: Option<&Metadata>, output_format: &str) -> String {
    disposition
        .and_then(parse_content_disposition)
        .unwrap_or_else(|| synthesize_filename(metadata.map(|m| m.title.as_str()), output_format))
}

/// Filename derivation for foreign UIs
#[uniffi::export]
pub fn derive_download_filename(disposition: Option<String>, title: Option<String>, output_format: String) -> String {
    disposition
        .as_deref()
        .and_then(parse_content_disposition)
        .unwrap_or_else(|| synthesize_filename(title.as_deref(), &output_format))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extended_filename_is_decoded() {
        let header = "attachment; filename*=UTF-8''My%20Clip%20%E2%9C%93.mp4";
        assert_eq!(parse_content_disposition(header).as_deref(), Some("My Clip ✓.mp4"));
    }

    #[test]
    fn test_extended_filename_wins_over_plain() {
        let header = "attachment; filename=\"fallback.mp4\"; filename*=UTF-8''real%20name.mp4";
        assert_eq!(parse_content_disposition(header).as_deref(), Some("real name.mp4"));
    }

    #[test]
    fn test_quoted_filename() {
        let header = "attachment; filename=\"Test Clip.webm\"";
        assert_eq!(parse_content_disposition(header).as_deref(), Some("Test Clip.webm"));

        let header = "attachment; filename=\"say \\\"hi\\\".mp3\"";
        assert_eq!(parse_content_disposition(header).as_deref(), Some("say \"hi\".mp3"));
    }

    #[test]
    fn test_bare_filename() {
        let header = "attachment; filename=clip%2Bextra.mkv";
        assert_eq!(parse_content_disposition(header).as_deref(), Some("clip+extra.mkv"));
    }

    #[test]
    fn test_disposition_without_filename() {
        assert_eq!(parse_content_disposition("attachment"), None);
        assert_eq!(parse_content_disposition("attachment; filename=\"\""), None);
        assert_eq!(parse_content_disposition("inline; name=\"x\""), None);
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("Test: Clip / #1 (HD)!"), "Test Clip  1 HD");
        assert_eq!(sanitize_title("Ünïcødé_ok-1"), "ncd_ok-1");
        assert_eq!(sanitize_title(&"a".repeat(150)).len(), MAX_STEM_CHARS);
    }

    #[test]
    fn test_synthesize_filename() {
        assert_eq!(synthesize_filename(Some("Test Clip"), "mp4"), "Test Clip.mp4");
        assert_eq!(synthesize_filename(Some("Test Clip"), ".mp3"), "Test Clip.mp3");
        assert_eq!(synthesize_filename(Some("Test Clip"), ""), "Test Clip.bin");
        assert_eq!(synthesize_filename(Some("???"), "mp4"), "download.mp4");
        assert_eq!(synthesize_filename(None, "webm"), "download.webm");
    }

    #[test]
    fn test_header_takes_priority_over_title() {
        let header = Some("attachment; filename=\"server.mp4\"");
        assert_eq!(derive_download_filename(header.map(String::from), Some("Title".into()), "mkv".into()), "server.mp4");
        assert_eq!(derive_download_filename(None, Some("Title".into()), "mkv".into()), "Title.mkv");
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let header = "attachment; filename*=UTF-8''a%20b.mp4";
        assert_eq!(derive_filename(Some(header), None, "mp4"), derive_filename(Some(header), None, "mp4"));
        assert_eq!(synthesize_filename(Some("Same"), "ogg"), synthesize_filename(Some("Same"), "ogg"));
    }
}

//! Locate fields in the full page text when their regions are unreliable.
//!
//! These patterns follow the labels printed on the layout-2 slip. Absence is
//! reported as an empty string, never as an error.

use regex::Regex;
use std::sync::LazyLock;

static DOCUMENT_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Nomor\s*Dokumen[ \t]*[:\-]?[ \t]*([^\n\r]*)").unwrap());

/// "NAMA PEMOTONG DAN/ATAU PEMUNGUT" with "PPh" on the following line.
static PAYER_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)NAMA\s*PEMOTONG.*?PEMUNGUT\s*\n\s*PPh\s*:*").unwrap());

static SECTION_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)C\.4").unwrap());

/// Labels of the fields that can follow the payer name block.
static NEXT_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:Nomor|No|DPP|Jenis|Tarif|PPh)").unwrap());

/// Text following the "Nomor Dokumen" label, up to the end of its line.
pub fn find_document_number(text: &str) -> String {
    DOCUMENT_NUMBER_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Payer/collector name printed under the "NAMA PEMOTONG ... PEMUNGUT PPh"
/// header. Wrapped lines are joined with single spaces.
pub fn find_payer_name(text: &str) -> String {
    let Some(header) = PAYER_HEADER_RE.find(text) else {
        return String::new();
    };

    let mut name_lines = Vec::new();
    for line in text[header.end()..].trim().split('\n') {
        let line = line.trim();
        if line.is_empty() || SECTION_MARKER_RE.is_match(line) || NEXT_LABEL_RE.is_match(line) {
            break;
        }
        name_lines.push(line);
    }

    name_lines.join(" ").trim().to_string()
}

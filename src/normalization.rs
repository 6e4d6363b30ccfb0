//! # OCR Text Normalization Module
//!
//! Cleans raw OCR output before ingredient matching:
//!
//! - Whitespace runs (including newlines) collapse to single spaces
//! - Text is lower-cased for matching
//! - A fixed table of known OCR confusions is applied in order
//!
//! It also builds the scan view used by the matcher: the normalized lines of the
//! input joined into one string, with footnotes removed and each line's span and
//! panel membership remembered.

use tracing::{debug, trace};

use crate::section_detection;

/// Known OCR confusions, applied in table order on lower-cased text.
///
/// A later rule sees the output of earlier ones. No rule's replacement contains
/// another rule's trigger, so the table converges after one pass.
pub const OCR_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("hing", "hips"),
    ("caning", "canina"),
    ("botavonci", "bioflavonoid"),
    ("perenne", "perennial"),
    ("estab", "established"),
];

/// Collapse whitespace, lower-case and apply the OCR substitution table.
///
/// Never fails; empty input yields an empty string.
pub fn normalize(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<&str>>().join(" ");
    apply_substitutions(&collapsed.to_lowercase())
}

/// Apply every substitution rule in order
pub fn apply_substitutions(text: &str) -> String {
    let mut corrected = text.to_string();
    for (from, to) in OCR_SUBSTITUTIONS {
        let before_len = corrected.len();
        corrected = substitute_literal(&corrected, from, to);
        if corrected.len() != before_len {
            trace!("OCR substitution: '{}' -> '{}'", from, to);
        }
    }
    corrected
}

/// Replace literal occurrences of `from` with `to`.
///
/// An occurrence that already sits inside an instance of `to` (aligned the way
/// `from` appears within `to`) is kept, so already-corrected text is unchanged.
fn substitute_literal(text: &str, from: &str, to: &str) -> String {
    if from.is_empty() || !text.contains(from) {
        return text.to_string();
    }

    let offsets_in_replacement: Vec<usize> = to.match_indices(from).map(|(i, _)| i).collect();
    let mut result = String::with_capacity(text.len());
    let mut last = 0;

    for (start, _) in text.match_indices(from) {
        if start < last {
            continue;
        }
        let already_corrected = offsets_in_replacement.iter().any(|&offset| {
            start >= offset
                && text.is_char_boundary(start - offset)
                && text[start - offset..].starts_with(to)
        });
        if already_corrected {
            continue;
        }
        result.push_str(&text[last..start]);
        result.push_str(to);
        last = start + from.len();
    }

    result.push_str(&text[last..]);
    result
}

/// Byte span of one retained input line within `NormalizedText::scan`
#[derive(Debug, Clone, PartialEq)]
pub struct ScanLine {
    pub start: usize,
    pub end: usize,
    /// Line lies after the "Supplement Facts" anchor and before the panel ends
    pub in_panel: bool,
    /// Panel header such as "serving size" or "amount per serving"
    pub is_header: bool,
}

/// The normalized scan view of one input
#[derive(Debug, Clone, Default)]
pub struct NormalizedText {
    /// Normalized non-footnote lines joined by single spaces
    pub scan: String,
    pub lines: Vec<ScanLine>,
}

impl NormalizedText {
    /// Build the scan view from raw OCR text
    pub fn from_raw(raw: &str) -> Self {
        let mut scan = String::with_capacity(raw.len());
        let mut lines = Vec::new();
        let mut panel_open = false;
        let mut footnotes = 0usize;

        for raw_line in raw.lines() {
            let normalized = normalize(raw_line);
            if normalized.is_empty() {
                continue;
            }
            if section_detection::is_footnote(raw_line, &normalized) {
                footnotes += 1;
                trace!("Excluding footnote line: '{}'", raw_line.trim());
                continue;
            }

            let is_anchor = section_detection::is_panel_anchor(&normalized);
            if section_detection::is_panel_end(&normalized) {
                panel_open = false;
            }

            if !scan.is_empty() {
                scan.push(' ');
            }
            let start = scan.len();
            scan.push_str(&normalized);
            lines.push(ScanLine {
                start,
                end: scan.len(),
                in_panel: panel_open && !is_anchor,
                is_header: is_anchor || section_detection::is_panel_header(&normalized),
            });

            if is_anchor {
                panel_open = true;
            }
        }

        debug!(
            "Normalized {} lines ({} footnotes excluded, {} panel lines)",
            lines.len(),
            footnotes,
            lines.iter().filter(|l| l.in_panel).count()
        );

        Self { scan, lines }
    }

    /// Text of a retained line
    pub fn line_text(&self, line: &ScanLine) -> &str {
        &self.scan[line.start..line.end]
    }

    /// The retained line containing a byte offset of the scan text
    pub fn line_at(&self, offset: usize) -> Option<&ScanLine> {
        let index = self.lines.partition_point(|line| line.end < offset);
        self.lines
            .get(index)
            .filter(|line| line.start <= offset && offset <= line.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_and_lowercases() {
        assert_eq!(normalize("  Vitamin C\n\n 500\tMG  "), "vitamin c 500 mg");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n\t "), "");
    }

    #[test]
    fn test_substitution_table() {
        assert_eq!(normalize("rose hing powder"), "rose hips powder");
        assert_eq!(normalize("(rosa caning)"), "(rosa canina)");
        assert_eq!(normalize("ts botavonci complex"), "ts bioflavonoid complex");
        assert_eq!(normalize("perenne"), "perennial");
        assert_eq!(normalize("not estab'lished"), "not established'lished");
    }

    #[test]
    fn test_substitution_is_idempotent() {
        let once = normalize("rose hing (rosa caning) botavonci perenne estab");
        assert_eq!(normalize(&once), once);
        assert_eq!(normalize("value not established"), "value not established");
    }

    #[test]
    fn test_no_replacement_triggers_another_rule() {
        for (_, to) in OCR_SUBSTITUTIONS {
            for (from, own) in OCR_SUBSTITUTIONS {
                if own == to {
                    continue;
                }
                assert!(!to.contains(from), "'{}' re-triggers '{}'", to, from);
            }
        }
    }

    #[test]
    fn test_substitute_literal_skips_existing_replacement() {
        assert_eq!(substitute_literal("estab established", "estab", "established"), "established established");
        assert_eq!(substitute_literal("abc", "", "x"), "abc");
    }

    #[test]
    fn test_scan_view_tracks_lines_and_panel() {
        let text = NormalizedText::from_raw(
            "Acme Vitamin C\nSupplement Facts\nServing Size 1 Tablet\nVitamin C 500 mg\n† Daily Value not established.\nOther Ingredients: cellulose 5 mg",
        );

        assert_eq!(text.lines.len(), 5);
        assert_eq!(text.line_text(&text.lines[0]), "acme vitamin c");
        assert!(!text.lines[0].in_panel);
        assert!(text.lines[1].is_header);
        assert!(!text.lines[1].in_panel);
        assert!(text.lines[2].in_panel && text.lines[2].is_header);
        assert!(text.lines[3].in_panel && !text.lines[3].is_header);
        assert!(!text.lines[4].in_panel);
        assert!(!text.scan.contains("established"));
    }

    #[test]
    fn test_line_at_offset() {
        let text = NormalizedText::from_raw("zinc 15 mg\niron 18 mg");
        let iron = text.scan.find("iron").unwrap();
        assert_eq!(text.line_at(iron), Some(&text.lines[1]));
        assert_eq!(text.line_at(0), Some(&text.lines[0]));
        assert_eq!(text.line_at(text.scan.len() + 5), None);
    }
}

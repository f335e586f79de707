//! Include-directive extraction from module text.
//!
//! A deliberately small grammar instead of regexes: a line classifier
//! (include / marker / other) over each source line, plus a delimiter parser
//! for the two header-name forms. Malformed directives are skipped, never
//! fatal.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// The exact line marking a module as embedding native code. Matched by
/// full-line equality against the raw source line — no trimming, no regex.
pub const INTEROP_MARKER: &str = "import \"C\"";

const INCLUDE_KEYWORD: &str = "#include";

/// How an include directive names its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStyle {
    /// `#include <x>` — an external header, satisfied by the toolchain's
    /// include path; the scanner records it but emits no edge.
    Angle,
    /// `#include "x"` — a header expected next to the module or under the
    /// project's fallback include root.
    Local,
}

/// One parsed include directive. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeDirective {
    /// The header name between the delimiters, e.g. `daos_srv/bio.h`.
    pub header_name: String,
    /// Which delimiter form was used.
    pub quote_style: QuoteStyle,
    /// Source line number (1-indexed).
    pub line: usize,
}

/// What a single source line means to the scanner.
enum LineKind<'a> {
    /// An include keyword with its unparsed remainder.
    Include(&'a str),
    /// The cgo interop marker.
    Marker,
    /// Anything else.
    Other,
}

fn classify(line: &str) -> LineKind<'_> {
    if line == INTEROP_MARKER {
        return LineKind::Marker;
    }
    let trimmed = line.trim_start();
    if let Some(rest) = trimmed.strip_prefix(INCLUDE_KEYWORD) {
        return LineKind::Include(rest);
    }
    LineKind::Other
}

/// Parse the remainder after `#include` into a header name and quote style.
/// Returns `None` for anything without a complete, non-empty delimiter pair.
fn parse_header(rest: &str) -> Option<(String, QuoteStyle)> {
    let rest = rest.trim_start();
    let mut chars = rest.chars();
    let (close, style) = match chars.next()? {
        '<' => ('>', QuoteStyle::Angle),
        '"' => ('"', QuoteStyle::Local),
        _ => return None,
    };
    let body = chars.as_str();
    let end = body.find(close)?;
    if end == 0 {
        return None;
    }
    Some((body[..end].to_string(), style))
}

/// Extract all include directives from module text, in source order.
///
/// Faithful and non-deduplicating: every well-formed occurrence yields one
/// record, nothing not textually present is invented. Lines that start with
/// the include keyword but fail to parse are logged and skipped.
pub fn extract_includes(content: &str) -> Vec<IncludeDirective> {
    let mut directives = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if let LineKind::Include(rest) = classify(line) {
            match parse_header(rest) {
                Some((header_name, quote_style)) => directives.push(IncludeDirective {
                    header_name,
                    quote_style,
                    line: idx + 1,
                }),
                None => {
                    debug!(line = idx + 1, text = line, "skipping malformed include");
                }
            }
        }
    }
    directives
}

/// True if the module text contains the interop marker line.
pub fn has_interop_marker(content: &str) -> bool {
    content.lines().any(|line| line == INTEROP_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_in_source_order() {
        let content = r#"
// #include "helper.h" in a cgo preamble comment block:
/*
#include <stdio.h>
#include "helper.h"
#include "proto/engine.h"
*/
import "C"
"#;
        let directives = extract_includes(content);
        assert_eq!(directives.len(), 3);
        assert_eq!(directives[0].header_name, "stdio.h");
        assert_eq!(directives[0].quote_style, QuoteStyle::Angle);
        assert_eq!(directives[1].header_name, "helper.h");
        assert_eq!(directives[1].quote_style, QuoteStyle::Local);
        assert_eq!(directives[2].header_name, "proto/engine.h");
        assert!(directives[0].line < directives[1].line);
    }

    #[test]
    fn test_well_formed_count_is_exact() {
        let content = "#include <a.h>\n#include \"b.h\"\n#include <c.h>\n";
        assert_eq!(extract_includes(content).len(), 3);
    }

    #[test]
    fn test_leading_whitespace_is_tolerated() {
        let directives = extract_includes("    #include \"indent.h\"\n\t#include <tab.h>\n");
        assert_eq!(directives.len(), 2);
        assert_eq!(directives[0].header_name, "indent.h");
        assert_eq!(directives[1].header_name, "tab.h");
    }

    #[test]
    fn test_malformed_lines_are_skipped_not_fatal() {
        let content = "#include <unterminated\n#include \"also_bad\n#include <>\n#include\n#include \"ok.h\"\n";
        let directives = extract_includes(content);
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].header_name, "ok.h");
        assert_eq!(directives[0].line, 5);
    }

    #[test]
    fn test_include_keyword_must_be_followed_by_delimiter() {
        assert!(extract_includes("#includefoo.h\n").is_empty());
        assert!(extract_includes("#included below\n").is_empty());
    }

    #[test]
    fn test_duplicates_are_kept_here() {
        // Deduplication is the aggregator's job, not the parser's.
        let content = "#include \"dup.h\"\n#include \"dup.h\"\n";
        assert_eq!(extract_includes(content).len(), 2);
    }

    #[test]
    fn test_marker_detection_is_exact_match() {
        assert!(has_interop_marker("package main\nimport \"C\"\nfunc main() {}\n"));
        // Indented, suffixed, or grouped forms are not the marker.
        assert!(!has_interop_marker("    import \"C\"\n"));
        assert!(!has_interop_marker("import \"C\" // cgo\n"));
        assert!(!has_interop_marker("import (\n\t\"C\"\n)\n"));
    }

    #[test]
    fn test_marker_is_not_an_include() {
        assert!(extract_includes("import \"C\"\n").is_empty());
    }

    #[test]
    fn test_empty_content() {
        assert!(extract_includes("").is_empty());
        assert!(!has_interop_marker(""));
    }
}

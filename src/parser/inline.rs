//! Inline span formatting.
//!
//! Splits one line of markup into styled runs using a fixed three-level
//! priority: bold (`**text**`) first, then italic (`*text*`) inside whatever
//! the bold pass produced, then citations (`[3]`, `[3,5]`, `[3-5]`, `[^3]`,
//! `$^3$`) inside whatever the italic pass produced. Each level only sees the
//! unwrapped content of the level above it, so a run's style is the union of
//! the markers that matched on the way down.
//!
//! Unpaired markers are left as literal text. Markers nested in any other
//! order (a bold marker inside italic, say) are not recognized: the inner
//! characters come through literally.

use crate::model::{TextRun, TextStyle};
use once_cell::sync::Lazy;
use regex::Regex;

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold pattern"));

// `regex` has no lookaround; the "not next to another `*`" rule is checked by hand.
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*[^*]+\*").expect("valid italic pattern"));

static CITATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\d+(?:[,\-–]\d+)*\]|\[\^[\d,\-–]+\]|\$\^[\d,\-–]+\$")
        .expect("valid citation pattern")
});

/// Convert a line of markup into styled runs.
///
/// Wrapper characters are removed and everything else is kept in order.
/// An empty line yields no runs.
pub fn format_inline(text: &str) -> Vec<TextRun> {
    let mut runs = Vec::new();
    for (segment, bold) in split_bold(text) {
        for (piece, italic) in split_italic(segment) {
            for (atom, superscript) in split_citations(piece) {
                runs.push(TextRun::styled(
                    atom,
                    TextStyle {
                        bold,
                        italic,
                        superscript,
                        ..Default::default()
                    },
                ));
            }
        }
    }
    runs
}

/// Text content of a line with all recognized markup removed.
pub fn strip_markup(text: &str) -> String {
    format_inline(text).into_iter().map(|r| r.text).collect()
}

fn split_bold(text: &str) -> Vec<(&str, bool)> {
    let mut out = Vec::new();
    let mut last = 0;
    for caps in BOLD.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_nonempty(&mut out, &text[last..whole.start()], false);
        push_nonempty(&mut out, inner.as_str(), true);
        last = whole.end();
    }
    push_nonempty(&mut out, &text[last..], false);
    out
}

fn split_italic(text: &str) -> Vec<(&str, bool)> {
    let mut out = Vec::new();
    let mut last = 0;
    let mut pos = 0;
    while let Some(m) = ITALIC.find_at(text, pos) {
        let touches_star = text[..m.start()].ends_with('*') || text[m.end()..].starts_with('*');
        if touches_star {
            // Retry from the character after the rejected opening marker.
            pos = m.start() + 1;
            continue;
        }
        push_nonempty(&mut out, &text[last..m.start()], false);
        push_nonempty(&mut out, &text[m.start() + 1..m.end() - 1], true);
        last = m.end();
        pos = m.end();
    }
    push_nonempty(&mut out, &text[last..], false);
    out
}

fn split_citations(text: &str) -> Vec<(&str, bool)> {
    let mut out = Vec::new();
    let mut last = 0;
    for m in CITATION.find_iter(text) {
        push_nonempty(&mut out, &text[last..m.start()], false);
        push_nonempty(&mut out, citation_text(m.as_str()), true);
        last = m.end();
    }
    push_nonempty(&mut out, &text[last..], false);
    out
}

/// Strip the brackets, carets and dollars around a citation.
fn citation_text(marker: &str) -> &str {
    let inner = match marker.strip_prefix("$^") {
        Some(rest) => rest.strip_suffix('$'),
        None => marker
            .strip_prefix('[')
            .and_then(|r| r.strip_suffix(']'))
            .map(|r| r.strip_prefix('^').unwrap_or(r)),
    };
    inner.unwrap_or(marker)
}

fn push_nonempty<'a>(out: &mut Vec<(&'a str, bool)>, text: &'a str, flag: bool) {
    if !text.is_empty() {
        out.push((text, flag));
    }
}

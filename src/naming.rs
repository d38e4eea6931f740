//! Natural ordering for entry names.
//!
//! Every directory level of the manifest is ordered by the same key: names are
//! split into alternating text and digit runs, digit runs compare by numeric
//! value and text runs compare case-insensitively. This keeps numbered content
//! in the order an author expects:
//!
//! - `item-1`, `item-2`, `item-10` (not `item-1`, `item-10`, `item-2`)
//! - `1-1 Intro`, `1-2 Explore`, `1-99 Legacy`
//! - `Readme.md` next to `readme.txt`, regardless of case
//!
//! Names that are equal under the natural key (`a01` vs `a1`, `Doc` vs `doc`)
//! fall back to a plain byte comparison so the order never depends on the
//! filesystem's listing order.

use std::cmp::Ordering;

/// One run of a name: either text or an ASCII digit sequence.
#[derive(Debug, Clone, PartialEq)]
enum Chunk<'a> {
    Text(&'a str),
    Digits(&'a str),
}

/// Split a name into alternating text and digit runs.
///
/// The first chunk is always text (possibly empty), so two chunk lists always
/// line up text-against-text and digits-against-digits.
fn chunks(name: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits = false;
    for (i, c) in name.char_indices() {
        let is_digit = c.is_ascii_digit();
        if is_digit != in_digits {
            out.push(if in_digits {
                Chunk::Digits(&name[start..i])
            } else {
                Chunk::Text(&name[start..i])
            });
            start = i;
            in_digits = is_digit;
        }
    }
    out.push(if in_digits {
        Chunk::Digits(&name[start..])
    } else {
        Chunk::Text(&name[start..])
    });
    out
}

/// Compare two digit runs by numeric value without parsing into an integer.
fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Compare two names by natural key only (no tie-break).
fn natural_key_cmp(a: &str, b: &str) -> Ordering {
    let ca = chunks(a);
    let cb = chunks(b);
    for (x, y) in ca.iter().zip(cb.iter()) {
        let ord = match (x, y) {
            (Chunk::Digits(x), Chunk::Digits(y)) => cmp_digits(x, y),
            (Chunk::Text(x), Chunk::Text(y)) => cmp_text(x, y),
            // Unreachable given the alternation, but keep a total order.
            (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    ca.len().cmp(&cb.len())
}

/// Total natural order over names, used for every sibling list in the manifest.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_key_cmp(a, b).then_with(|| a.cmp(b))
}

/// Sort names in place using [`natural_cmp`].
pub fn sort_natural<S: AsRef<str>>(names: &mut [S]) {
    names.sort_by(|a, b| natural_cmp(a.as_ref(), b.as_ref()));
}

//! Case-insensitive masking of sensitive substrings

/// Character used to mask redacted text
pub const MASK_CHAR: char = '*';

/// Mask every occurrence of every `blacklist` entry in `text`.
///
/// Entries are applied in order, each on the output of the previous one.
/// Matching is case-insensitive per character and non-overlapping, left to
/// right. A match is replaced by one [`MASK_CHAR`] per matched character.
pub fn redact<S: AsRef<str>>(text: &str, blacklist: &[S]) -> String {
    let mut current = text.to_string();
    for entry in blacklist {
        let entry = entry.as_ref();
        if entry.is_empty() {
            continue;
        }
        current = mask_entry(&current, entry);
    }
    current
}

fn mask_entry(text: &str, entry: &str) -> String {
    let needle: Vec<char> = entry.chars().collect();
    let haystack: Vec<char> = text.chars().collect();
    if needle.len() > haystack.len() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < haystack.len() {
        let matched = haystack.len() - i >= needle.len()
            && needle
                .iter()
                .zip(&haystack[i..])
                .all(|(a, b)| chars_eq_ignore_case(*a, *b));
        if matched {
            out.extend(std::iter::repeat(MASK_CHAR).take(needle.len()));
            i += needle.len();
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    out
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

//! Token scanning used by prefix/suffix trimming and keyword detection.

/// Split a `|`-separated override pattern into alternatives, longest first.
///
/// Longest-first keeps `OR` from shadowing `ORDER BY` when both are present.
pub(crate) fn split_overrides(pattern: &str) -> Vec<&str> {
    let mut alternatives: Vec<&str> = pattern
        .split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    alternatives.sort_by(|a, b| b.len().cmp(&a.len()));
    alternatives
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Match one of `alternatives` at the start of `text` (which must not start
/// with whitespace). Returns the byte length of the matched token.
pub(crate) fn match_leading(text: &str, alternatives: &[&str]) -> Option<usize> {
    alternatives.iter().find_map(|alt| {
        let head = text.get(..alt.len())?;
        if !head.eq_ignore_ascii_case(alt) {
            return None;
        }
        let token_end = alt.chars().next_back()?;
        let next = text[alt.len()..].chars().next();
        match next {
            Some(c) if is_word_char(token_end) && is_word_char(c) => None,
            _ => Some(alt.len()),
        }
    })
}

/// Match one of `alternatives` at the end of `text` (which must not end with
/// whitespace). Returns the byte length of the matched token.
pub(crate) fn match_trailing(text: &str, alternatives: &[&str]) -> Option<usize> {
    alternatives.iter().find_map(|alt| {
        let start = text.len().checked_sub(alt.len())?;
        let tail = text.get(start..)?;
        if !tail.eq_ignore_ascii_case(alt) {
            return None;
        }
        let token_start = alt.chars().next()?;
        let prev = text[..start].chars().next_back();
        match prev {
            Some(c) if is_word_char(token_start) && is_word_char(c) => None,
            _ => Some(alt.len()),
        }
    })
}

/// Whether `keyword` (words separated by single spaces, e.g. `ORDER BY`)
/// occurs in `sql` outside parentheses, quotes and comments.
pub(crate) fn contains_top_level_keyword(sql: &str, keyword: &str) -> bool {
    !top_level_keyword_positions(sql, keyword).is_empty()
}

/// Byte offsets of every top-level occurrence of `keyword` in `sql`.
pub(crate) fn top_level_keyword_positions(sql: &str, keyword: &str) -> Vec<usize> {
    let words: Vec<&str> = keyword.split_whitespace().collect();
    let mut found = Vec::new();
    if words.is_empty() {
        return found;
    }

    let bytes = sql.as_bytes();
    let mut depth: usize = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' | b'`' => {
                let quote = bytes[i];
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 1;
            }
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            _ if depth == 0 && sql.is_char_boundary(i) => {
                let before = sql[..i].chars().next_back();
                if before.is_none_or(|c| !is_word_char(c)) && words_match_at(&sql[i..], &words).is_some() {
                    found.push(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    found
}

/// Byte length of `words` matched at the start of `text`, separated by any
/// whitespace.
pub(crate) fn words_match_at(text: &str, words: &[&str]) -> Option<usize> {
    let mut rest = text;
    for (n, word) in words.iter().enumerate() {
        if n > 0 {
            let trimmed = rest.trim_start();
            if trimmed.len() == rest.len() {
                return None;
            }
            rest = trimmed;
        }
        let len = match_leading(rest, &[word])?;
        rest = &rest[len..];
    }
    Some(text.len() - rest.len())
}

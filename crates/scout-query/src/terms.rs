//! Keyword term rendering.

use scout_core::errors::QueryError;

/// Characters that force a term into quotes.
const QUOTE_TRIGGERS: &[char] = &['(', ')', ':', '#', '@'];

/// Render one keyword as a query term.
///
/// Inner double quotes are stripped. Multi-word terms and terms containing
/// operator characters are quoted so the API treats them as a phrase.
/// A leading `-` would negate the term, so those are quoted too.
pub fn render_term(keyword: &str) -> Result<String, QueryError> {
    let cleaned: String = keyword
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('"', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(QueryError::EmptyKeyword);
    }

    let needs_quotes = cleaned.contains(' ')
        || cleaned.starts_with('-')
        || cleaned.contains(QUOTE_TRIGGERS)
        || cleaned.eq_ignore_ascii_case("or")
        || cleaned.eq_ignore_ascii_case("and");

    if needs_quotes {
        Ok(format!("\"{cleaned}\""))
    } else {
        Ok(cleaned.to_string())
    }
}

/// Character length of an OR group of `count` terms whose rendered lengths sum
/// to `terms_len`. One term is emitted bare; two or more are parenthesized.
pub fn group_len(terms_len: usize, count: usize) -> usize {
    match count {
        0 => 0,
        1 => terms_len,
        n => terms_len + " OR ".len() * (n - 1) + 2,
    }
}

/// Join rendered terms into one OR group.
pub fn render_group(terms: &[String]) -> String {
    match terms.len() {
        0 => String::new(),
        1 => terms[0].clone(),
        _ => format!("({})", terms.join(" OR ")),
    }
}

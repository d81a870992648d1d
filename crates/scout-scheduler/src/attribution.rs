//! Which keywords of an OR-batched query surfaced an item.

/// Keywords from `keywords` that occur in `text`, case-insensitively.
/// An item matching none of them is attributed to every keyword of the
/// query, since the API matched it on something the text does not show.
pub fn attribute(text: &str, keywords: &[String]) -> Vec<String> {
    let haystack = text.to_lowercase();
    let matched: Vec<String> = keywords
        .iter()
        .filter(|k| haystack.contains(&k.to_lowercase()))
        .cloned()
        .collect();
    if matched.is_empty() {
        keywords.to_vec()
    } else {
        matched
    }
}

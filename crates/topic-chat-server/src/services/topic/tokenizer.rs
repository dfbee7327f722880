use std::collections::HashSet;

/// Characters removed before splitting into words
const STRIPPED_CHARS: &[char] = &[
    '.', ',', '/', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '-', '_', '`', '~',
    '(', ')',
];

/// Words of this many characters or fewer carry no topic signal
pub const MIN_TOKEN_CHARS: usize = 3;

/// Lowercase, strip punctuation, split on whitespace and keep words longer
/// than [`MIN_TOKEN_CHARS`].
pub fn normalize(text: &str) -> HashSet<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !STRIPPED_CHARS.contains(c))
        .collect();

    cleaned
        .split_whitespace()
        .filter(|word| word.chars().count() > MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}

/// Union of the normalized tokens of every text
pub fn normalize_all<'a, I>(texts: I) -> HashSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    texts.into_iter().flat_map(normalize).collect()
}

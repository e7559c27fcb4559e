//! Names for newly created requests.

use rand::Rng;

/// Lowercase consonants and digits. Vowels and look-alike characters are
/// left out so generated suffixes never spell words.
const SUFFIX_ALPHABET: &[u8] = b"bcdfghjklmnpqrstvwxz2456789";

/// Source of the random suffix appended to request names.
pub trait NameGenerator: Send + Sync {
    fn suffix(&self, len: usize) -> String;
}

/// Draws suffixes from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomNameGenerator;

impl NameGenerator for RandomNameGenerator {
    fn suffix(&self, len: usize) -> String {
        let mut rng = rand::rng();
        (0..len)
            .map(|_| SUFFIX_ALPHABET[rng.random_range(0..SUFFIX_ALPHABET.len())] as char)
            .collect()
    }
}

/// Always returns the same suffix. Used for deterministic names in tests.
#[derive(Debug, Clone)]
pub struct StaticNameGenerator(pub String);

impl StaticNameGenerator {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self(suffix.into())
    }
}

impl NameGenerator for StaticNameGenerator {
    fn suffix(&self, _len: usize) -> String {
        self.0.clone()
    }
}

/// Cut `name` to at most `max_len` bytes, then strip trailing characters
/// that may not end a DNS label.
pub fn dns_safe_shorten(name: &str, max_len: usize) -> &str {
    let mut end = name.len().min(max_len);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].trim_end_matches(|c: char| !c.is_ascii_alphanumeric())
}

/// `<base>-<suffix>`, with `base` shortened to `max_base_len`.
pub fn request_name(base: &str, max_base_len: usize, suffix: &str) -> String {
    format!("{}-{}", dns_safe_shorten(base, max_base_len), suffix)
}

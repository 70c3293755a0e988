// ✂️ Name Normalizer - strip punctuation from display names
// "Jane.Doe (iPhone)" → "Jane Doe  iPhone "

/// ASCII punctuation replaced by a single space each
pub const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Replace every punctuation character with a space.
///
/// Letters, digits and existing whitespace are left untouched, so the
/// character count never changes and normalizing twice is a no-op.
pub fn normalize_name(raw: &str) -> String {
    raw.chars()
        .map(|c| if PUNCTUATION.contains(c) { ' ' } else { c })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

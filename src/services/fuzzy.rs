//! Weighted fuzzy string similarity on a 0-100 scale.
//!
//! Combines plain, partial and token-based ratios and keeps the best one,
//! scaled down for the looser comparisons. The base similarity is the
//! normalized indel ratio from `rapidfuzz`.

use std::collections::BTreeSet;

const UNBASE_SCALE: f64 = 0.95;
const PARTIAL_SCALE: f64 = 0.9;
/// Partial scale once one string is over 8x longer than the other
const PARTIAL_SCALE_FAR: f64 = 0.6;

/// Lowercase, replace everything but letters and digits with spaces, trim
pub fn full_process(s: &str) -> String {
    s.chars()
        .flat_map(|c| {
            let c = if c.is_alphanumeric() { c } else { ' ' };
            c.to_lowercase()
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Normalized indel similarity (insertions and deletions only), 0-100
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    rapidfuzz::fuzz::ratio(a.chars(), b.chars()) * 100.0
}

/// Best [`ratio`] of the shorter string against every same-length window of
/// the longer one
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let (a_chars, b_chars): (Vec<char>, Vec<char>) = (a.chars().collect(), b.chars().collect());
    let (shorter, longer, short_str) = if a_chars.len() <= b_chars.len() {
        (a_chars, b_chars, a)
    } else {
        (b_chars, a_chars, b)
    };

    if shorter.is_empty() {
        return 0.0;
    }
    if shorter.len() == longer.len() {
        return ratio(a, b);
    }

    let mut best: f64 = 0.0;
    for window in longer.windows(shorter.len()) {
        let window: String = window.iter().collect();
        best = best.max(ratio(short_str, &window));
        if best >= 100.0 {
            break;
        }
    }
    best
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

pub fn partial_token_sort_ratio(a: &str, b: &str) -> f64 {
    partial_ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Compare the shared tokens against each side's full token set
fn token_set_with(a: &str, b: &str, scorer: fn(&str, &str) -> f64) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let join = |tokens: Vec<&str>| tokens.join(" ");
    let intersection = join(tokens_a.intersection(&tokens_b).copied().collect());
    let only_a = join(tokens_a.difference(&tokens_b).copied().collect());
    let only_b = join(tokens_b.difference(&tokens_a).copied().collect());

    let combined_a = format!("{} {}", intersection, only_a).trim().to_string();
    let combined_b = format!("{} {}", intersection, only_b).trim().to_string();

    scorer(&intersection, &combined_a)
        .max(scorer(&intersection, &combined_b))
        .max(scorer(&combined_a, &combined_b))
}

pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    token_set_with(a, b, ratio)
}

pub fn partial_token_set_ratio(a: &str, b: &str) -> f64 {
    token_set_with(a, b, partial_ratio)
}

/// Weighted similarity of two raw strings, 0-100.
///
/// Both sides go through [`full_process`]; an empty side scores 0. Strings of
/// similar length are compared whole and by tokens, otherwise the shorter
/// one is also compared against substrings of the longer.
pub fn wratio(a: &str, b: &str) -> u8 {
    let a = full_process(a);
    let b = full_process(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let (len_a, len_b) = (a.chars().count() as f64, b.chars().count() as f64);
    let len_ratio = len_a.max(len_b) / len_a.min(len_b);
    let base = ratio(&a, &b);

    let score = if len_ratio < 1.5 {
        let token = token_sort_ratio(&a, &b).max(token_set_ratio(&a, &b));
        base.max(token * UNBASE_SCALE)
    } else {
        let partial_scale = if len_ratio > 8.0 {
            PARTIAL_SCALE_FAR
        } else {
            PARTIAL_SCALE
        };
        let partial = partial_ratio(&a, &b) * partial_scale;
        let partial_token = partial_token_sort_ratio(&a, &b)
            .max(partial_token_set_ratio(&a, &b))
            * UNBASE_SCALE
            * partial_scale;
        base.max(partial).max(partial_token)
    };

    score.round().clamp(0.0, 100.0) as u8
}

//! Character-set Jaccard similarity.
//!
//! Each string is reduced to the set of distinct characters it contains; the score is
//! `|A ∩ B| / |A ∪ B|`. Two empty strings (empty union) score 0.0.

use std::collections::HashSet;

pub fn char_set(text: &str) -> HashSet<char> {
    text.chars().collect()
}

pub fn jaccard_sets(a: &HashSet<char>, b: &HashSet<char>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

pub fn jaccard(a: &str, b: &str) -> f64 {
    jaccard_sets(&char_set(a), &char_set(b))
}

/// Similarity of two optional texts. An absent text never matches anything.
pub fn compare_texts(a: Option<&str>, b: Option<&str>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => jaccard(a, b),
        _ => 0.0,
    }
}

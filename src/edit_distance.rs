//! Suggestions for misspelled field names.

/// Optimal string alignment distance: Levenshtein plus adjacent transpositions.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Three rolling rows are enough for the transposition lookback.
    let mut prev_prev = vec![0; b.len() + 1];
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                curr[j] = curr[j].min(prev_prev[j - 2] + 1);
            }
        }
        std::mem::swap(&mut prev_prev, &mut prev);
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Best candidate for `lookup`: a case-insensitive exact match if there is one, otherwise the
/// closest candidate within a third of the lookup's length.
pub fn find_best_match(lookup: &str, candidates: &[&'static str]) -> Option<&'static str> {
    if let Some(exact) = candidates
        .iter()
        .find(|candidate| candidate.eq_ignore_ascii_case(lookup))
    {
        return Some(*exact);
    }

    let threshold = (lookup.chars().count() / 3).max(1);
    candidates
        .iter()
        .map(|candidate| (edit_distance(lookup, candidate), *candidate))
        .filter(|(distance, _)| *distance <= threshold)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distances() {
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("titel", "title"), 1);
        assert_eq!(edit_distance("same", "same"), 0);
    }

    #[test]
    fn suggestions() {
        let keys = ["fillOpacity", "fill", "stroke"];
        assert_eq!(find_best_match("fillopacity", &keys), Some("fillOpacity"));
        assert_eq!(find_best_match("strok", &keys), Some("stroke"));
        assert_eq!(find_best_match("zzzzzz", &keys), None);
    }
}

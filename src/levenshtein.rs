//! Edit distance between words

/// Levenshtein distance (insertion, deletion and substitution each cost 1)
pub fn distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two rows of the DP matrix are enough
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb {
                previous[j]
            } else {
                1 + previous[j].min(previous[j + 1]).min(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Closest dictionary word within `max_distance` edits.
///
/// Candidates whose length differs by more than `max_distance` are skipped, an
/// exact match returns immediately, and on equal distance the first candidate wins.
pub fn find_closest_match<'a, I>(word: &str, dictionary: I, max_distance: usize) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let word_len = word.chars().count();
    let mut closest = None;
    let mut min_distance = usize::MAX;

    for candidate in dictionary {
        if candidate.chars().count().abs_diff(word_len) > max_distance {
            continue;
        }
        if candidate == word {
            return Some(candidate);
        }

        let d = distance(word, candidate);
        if d <= max_distance && d < min_distance {
            min_distance = d;
            closest = Some(candidate);
        }
    }

    closest
}

/// Render state of a single target character cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum CharClass {
    Correct,
    Incorrect,
    Current,
    Pending,
}

pub fn classify(target: &[char], typed: &[char], idx: usize) -> CharClass {
    if idx < typed.len() {
        match target.get(idx) {
            Some(expected) if *expected == typed[idx] => CharClass::Correct,
            _ => CharClass::Incorrect,
        }
    } else if idx == typed.len() && typed.len() < target.len() {
        CharClass::Current
    } else {
        CharClass::Pending
    }
}

/// Classes for every target cell starting at `from`; cells before it are unchanged.
pub fn classes_from(target: &[char], typed: &[char], from: usize) -> Vec<(usize, CharClass)> {
    (from..target.len())
        .map(|idx| (idx, classify(target, typed, idx)))
        .collect()
}

/// First position where the two inputs differ, or the shorter length when one is a prefix.
pub fn first_diff_index(previous: &[char], next: &[char]) -> usize {
    previous
        .iter()
        .zip(next.iter())
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| previous.len().min(next.len()))
}

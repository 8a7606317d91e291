//! Spoken-number captions shown under each balloon tally

use std::borrow::Cow;

const WORDS: [&str; 11] = [
    "cero", "uno", "dos", "tres", "cuatro", "cinco", "seis", "siete", "ocho", "nueve", "diez",
];

/// Spanish word for `n`; beyond ten the digits are used
pub fn number_to_words(n: u32) -> Cow<'static, str> {
    match WORDS.get(n as usize) {
        Some(word) => Cow::Borrowed(word),
        None => Cow::Owned(n.to_string()),
    }
}

/// Tally caption, e.g. `"3 - tres"`
pub fn tally_caption(n: u32) -> String {
    format!("{} - {}", n, number_to_words(n))
}

/// Subtraction caption, e.g. `"5 - cinco menos 2 - dos"`
pub fn subtraction_caption(total: u32, removed: u32) -> String {
    format!("{} menos {}", tally_caption(total), tally_caption(removed))
}

/// Multiplication caption, e.g. `"3 grupos de 4 globos"`
pub fn groups_caption(groups: u32, per_group: u32) -> String {
    format!("{} grupos de {} globos", groups, per_group)
}

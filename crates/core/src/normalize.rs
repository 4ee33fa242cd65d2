//! Allergen label cleaning.
//!
//! Source labels come from coded exports ("Allergy to eggs (substance)", "Modified cashew nut
//! allergenic extract injectable product") and from free text typed into the entry form. The
//! pipeline groups and counts records by label, so these variants must fold to one display form.

use regex::Regex;
use std::sync::LazyLock;

/// Qualifiers and terminology suffixes that carry no allergen information.
static BOILERPLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\((?:disorder|substance|product|edible)\)|\b(?:modified|allergenic\s+extract|injectable|allergy|to|product|containing)\b",
    )
    .expect("boilerplate pattern is valid")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Synonyms folded onto a single label. Applied to lower-cased text.
static SYNONYMS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\bgrass pollen\b", "pollen"),
        (r"\btree pollen\b", "pollen"),
        (r"\bpeanuts\b", "peanut"),
        (r"\beggs\b", "egg"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("synonym pattern is valid"),
            replacement,
        )
    })
    .collect()
});

/// Clean a raw allergen label for display and grouping.
///
/// Strips boilerplate qualifiers, collapses whitespace, folds known synonyms and capitalises the
/// first letter (the rest is lower-cased). Returns an empty string when nothing but boilerplate
/// was present.
///
/// Cleaning an already-clean label returns it unchanged.
pub fn clean_specific_reason(raw: &str) -> String {
    let stripped = BOILERPLATE.replace_all(raw, " ");
    let mut folded = WHITESPACE
        .replace_all(&stripped, " ")
        .trim()
        .to_lowercase();

    // A fold can expose another ("grass grass pollen"), so repeat until nothing changes.
    loop {
        let mut next = folded.clone();
        for (pattern, replacement) in SYNONYMS.iter() {
            next = pattern.replace_all(&next, *replacement).into_owned();
        }
        if next == folded {
            break;
        }
        folded = next;
    }

    capitalise_first(folded.trim())
}

/// Upper-case the first character when it has a single-character upper case. Characters that
/// expand (`ß` to `SS`) are left alone so a second pass gives the same text.
fn capitalise_first(text: &str) -> String {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    let mut upper = first.to_uppercase();
    let mut capitalised = match (upper.next(), upper.next()) {
        (Some(single), None) => String::from(single),
        _ => String::from(first),
    };
    capitalised.extend(chars);
    capitalised
}

//! Decimal digits in verse numbers.
//!
//! Verse text written in USX only uses Latin digits, but references typed by
//! users may use the decimal digits of other scripts (Devanagari, Gujarati,
//! Mongolian and so on). Only scripts with a contiguous run of ten decimal
//! digits in the Basic Multilingual Plane are recognized. Non-decimal
//! systems (Hebrew letters, CJK ideographs) are not numbers here.

/// The code point of the digit zero of every recognized decimal run.
const ZEROS: [u32; 37] = [
    0x0030, 0x0660, 0x06F0, 0x07C0, 0x0966, 0x09E6, 0x0A66, 0x0AE6, 0x0B66, 0x0BE6, 0x0C66,
    0x0CE6, 0x0D66, 0x0DE6, 0x0E50, 0x0ED0, 0x0F20, 0x1040, 0x1090, 0x17E0, 0x1810, 0x1946,
    0x19D0, 0x1A80, 0x1A90, 0x1B50, 0x1BB0, 0x1C40, 0x1C50, 0xA620, 0xA8D0, 0xA900, 0xA9D0,
    0xA9F0, 0xAA50, 0xABF0, 0xFF10,
];

/// Largest chapter or verse number a reference holds.
pub const MAX_VERSE: i32 = 999;

/// The value of a decimal digit in any recognized script.
#[must_use]
pub fn digit_value(c: char) -> Option<u32> {
    let code = u32::from(c);
    ZEROS
        .iter()
        .find(|&&zero| (zero..zero + 10).contains(&code))
        .map(|zero| code - zero)
}

/// Whether a character is a decimal digit in any recognized script.
#[must_use]
pub fn is_decimal_digit(c: char) -> bool {
    digit_value(c).is_some()
}

/// Reads the leading verse number of `text`.
///
/// Returns the number and whether the whole text was that number. Text that
/// does not start with a digit gives -1, as does a number above
/// [`MAX_VERSE`]. Empty text gives -1 and counts as a plain number.
pub(super) fn leading_verse_number(text: &str, latin_only: bool) -> (i32, bool) {
    if text.is_empty() {
        return (-1, true);
    }

    let mut number: i32 = 0;
    for (index, c) in text.chars().enumerate() {
        let value = if latin_only {
            c.to_digit(10)
        } else {
            digit_value(c)
        };
        let Some(value) = value else {
            return (if index == 0 { -1 } else { number }, false);
        };
        number = number * 10 + i32::try_from(value).unwrap_or_default();
        if number > MAX_VERSE {
            return (-1, false);
        }
    }
    (number, true)
}

/// Whether verse text has a shape a reference can hold: it starts with a
/// digit and does not end in a range or list separator.
///
/// ```
/// use scripture::domain::verse_ref::is_verse_parseable;
///
/// assert!(is_verse_parseable("1-3a"));
/// assert!(is_verse_parseable("\u{0967}"));
/// assert!(!is_verse_parseable("a1"));
/// assert!(!is_verse_parseable("1-"));
/// ```
#[must_use]
pub fn is_verse_parseable(verse: &str) -> bool {
    verse.chars().next().is_some_and(is_decimal_digit) && !verse.ends_with(['-', ','])
}

/// The numbers written in verse text, one per run of digits.
pub(super) fn digit_runs(text: &str) -> Vec<i32> {
    let mut runs = Vec::new();
    let mut current: Option<i32> = None;
    for c in text.chars() {
        match digit_value(c) {
            Some(value) => {
                let value = i32::try_from(value).unwrap_or_default();
                current = Some(current.unwrap_or(0).saturating_mul(10).saturating_add(value));
            }
            None => runs.extend(current.take()),
        }
    }
    runs.extend(current);
    runs
}

/// Splits a single verse number into its number and segment (`"1a"` gives
/// `(1, "a")`). Text without leading digits has number 0.
pub(super) fn split_segment(text: &str) -> (i32, &str) {
    let digits_end = text
        .char_indices()
        .find(|&(_, c)| !is_decimal_digit(c))
        .map_or(text.len(), |(index, _)| index);
    let (digits, segment) = text.split_at(digits_end);
    (digit_runs(digits).first().copied().unwrap_or(0), segment)
}

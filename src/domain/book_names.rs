//! Finds books by code, English name or a prefix of an English name.
//!
//! Matching ignores case, spaces and punctuation, so "2 Tim", "2Tim" and
//! "2 timothy" all name the same book.

use super::canon;

/// Finds the number of the book a piece of text names.
///
/// A book code wins over a name, and a whole name wins over a prefix. A
/// prefix names the first book in canonical order whose name starts with
/// it. Retired books are never matched by name.
///
/// ```
/// use scripture::domain::book_names;
///
/// assert_eq!(book_names::find("JUD"), Some(65));
/// assert_eq!(book_names::find("ju"), Some(7));
/// assert_eq!(book_names::find("2 Tim"), Some(55));
/// assert_eq!(book_names::find("Hezekiah"), None);
/// ```
#[must_use]
pub fn find(text: &str) -> Option<i32> {
    let wanted = normalize(text);
    if wanted.is_empty() {
        return None;
    }

    match canon::book_id_to_number(&wanted) {
        0 => {}
        number => return Some(number),
    }

    named_books()
        .find(|(_, name)| *name == wanted)
        .or_else(|| named_books().find(|(_, name)| name.starts_with(&wanted)))
        .map(|(number, _)| number)
}

/// Every book whose English name starts with `prefix`, in canonical order.
pub fn starting_with(prefix: &str) -> impl Iterator<Item = i32> {
    let wanted = normalize(prefix);
    named_books()
        .filter(move |(_, name)| name.starts_with(&wanted))
        .map(|(number, _)| number)
}

fn named_books() -> impl Iterator<Item = (i32, String)> {
    canon::all_book_numbers()
        .filter(|&number| !canon::is_obsolete(number))
        .filter_map(|number| canon::book_number_to_english_name(number).map(|name| (number, normalize(name))))
}

fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

use std::{fmt, str::FromStr};

use super::canon;

/// A set of book numbers, used to restrict navigation to the books a project
/// actually contains.
///
/// The textual form is a string of `0`/`1` flags, one per book in canonical
/// order (`"10101"` selects Genesis, Leviticus and Deuteronomy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BookSet {
    bits: u128,
}

impl BookSet {
    /// An empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Every book in the canon that is not obsolete.
    #[must_use]
    pub fn all_books() -> Self {
        canon::all_book_numbers()
            .filter(|&book| !canon::is_obsolete(book))
            .collect()
    }

    /// Every Scripture book: canonical and not obsolete.
    #[must_use]
    pub fn scripture_books() -> Self {
        canon::all_book_numbers()
            .filter(|&book| canon::is_canonical(book) && !canon::is_obsolete(book))
            .collect()
    }

    /// Parses a selection string of `0`/`1` flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the string contains anything other than `0` and `1`
    /// or is longer than the canon.
    pub fn from_selection(selection: &str) -> Result<Self, InvalidSelectionError> {
        if selection.chars().count() > canon::BOOK_IDS.len() {
            return Err(InvalidSelectionError(selection.to_string()));
        }
        let mut set = Self::empty();
        for (index, flag) in selection.chars().enumerate() {
            match flag {
                '1' => set.bits |= 1 << index,
                '0' => {}
                _ => return Err(InvalidSelectionError(selection.to_string())),
            }
        }
        Ok(set)
    }

    /// Adds a book. Numbers outside the canon are ignored.
    pub fn insert(&mut self, book: i32) {
        if let Some(bit) = Self::bit(book) {
            self.bits |= bit;
        }
    }

    /// Removes a book.
    pub fn remove(&mut self, book: i32) {
        if let Some(bit) = Self::bit(book) {
            self.bits &= !bit;
        }
    }

    /// Whether a book is in the set.
    #[must_use]
    pub fn contains(&self, book: i32) -> bool {
        Self::bit(book).is_some_and(|bit| self.bits & bit != 0)
    }

    /// Whether no book is selected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Number of selected books.
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.bits.count_ones()
    }

    /// The selected book numbers, in canonical order.
    pub fn books(&self) -> impl Iterator<Item = i32> + '_ {
        canon::all_book_numbers().filter(|&book| self.contains(book))
    }

    /// The first selected book after `book`, if any.
    #[must_use]
    pub fn next_selected(&self, book: i32) -> Option<i32> {
        (book.max(0) + 1..=canon::LAST_BOOK).find(|&candidate| self.contains(candidate))
    }

    /// The last selected book before `book`, if any.
    #[must_use]
    pub fn previous_selected(&self, book: i32) -> Option<i32> {
        (canon::FIRST_BOOK..book.min(canon::LAST_BOOK + 1))
            .rev()
            .find(|&candidate| self.contains(candidate))
    }

    /// The first selected book.
    #[must_use]
    pub fn first_selected(&self) -> Option<i32> {
        self.next_selected(0)
    }

    /// The last selected book.
    #[must_use]
    pub fn last_selected(&self) -> Option<i32> {
        self.previous_selected(canon::LAST_BOOK + 1)
    }

    fn bit(book: i32) -> Option<u128> {
        (canon::FIRST_BOOK..=canon::LAST_BOOK)
            .contains(&book)
            .then(|| 1 << (book - 1))
    }
}

impl FromIterator<i32> for BookSet {
    fn from_iter<T: IntoIterator<Item = i32>>(iter: T) -> Self {
        let mut set = Self::empty();
        for book in iter {
            set.insert(book);
        }
        set
    }
}

impl FromStr for BookSet {
    type Err = InvalidSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_selection(s)
    }
}

impl fmt::Display for BookSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let last = self.last_selected().unwrap_or(0);
        for book in canon::FIRST_BOOK..=last {
            f.write_str(if self.contains(book) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Error returned when a book selection string is malformed.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid book selection '{0}': expected one '0' or '1' flag per book")]
pub struct InvalidSelectionError(String);

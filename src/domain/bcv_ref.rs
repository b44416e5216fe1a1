//! Compact Scripture references.
//!
//! A [`BcvRef`] is a book, chapter, verse and segment number with no
//! versification attached. It packs into a `BBCCCVVV` integer and parses
//! leniently: text that does not make sense gives an invalid reference
//! rather than an error.

use std::{convert::Infallible, fmt, str::FromStr, sync::LazyLock};

use regex::Regex;

use super::{
    book_names,
    canon::{self, Canon},
    versification::Versification,
};

mod range;

pub use range::{ReferenceFormat, make_reference_string, parse_ref_range, verse_to_scr_ref};

const TITLE: &str = "Title";
const INTRO: &str = "Intro";
const RTL_MARK: char = '\u{200F}';
const MAX_NUMBER: i32 = 999;

const BOOK_SHIFT: i32 = 1_000_000;
const CHAPTER_SHIFT: i32 = 1_000;

/// Obadiah, Philemon, 2 John, 3 John and Jude, where a lone number is a verse.
const SINGLE_CHAPTER_BOOKS: [i32; 5] = [31, 57, 63, 64, 65];

static BOOK_NAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9]\s*\p{L}{2,}|\p{L}+)(?:\s+\p{L}+)*").ok());

static CHAPTER_VERSE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+)(?:(?:\s*[^\p{L}\p{N}\s]\s*|\s+)([0-9]+))?\p{L}*").ok()
});

/// How a [`BcvRef`] is written out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefStringFormat {
    /// Always `BOOK C:V`.
    #[default]
    General,
    /// `BOOK Title` for chapter 0 verse 0 and `BOOK Intro` for chapter 1
    /// verse 0, otherwise `BOOK C:V`.
    Exchange,
}

/// A book, chapter, verse and segment.
///
/// References order by book, then chapter, then verse, then segment, so a
/// verse sorts before any of its numbered segments.
///
/// ```
/// use scripture::{BcvRef, Canon};
///
/// let reference: BcvRef = "Gen 1:1".parse().unwrap();
/// assert_eq!(reference.bbcccvvv(), 1_001_001);
/// assert!(reference.is_valid(Canon::PROTESTANT));
/// assert_eq!(reference.to_string(), "GEN 1:1");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BcvRef {
    book: i32,
    chapter: i32,
    verse: i32,
    segment: i32,
}

impl BcvRef {
    /// A reference with no segment.
    #[must_use]
    pub const fn new(book: i32, chapter: i32, verse: i32) -> Self {
        Self::with_segment(book, chapter, verse, 0)
    }

    /// A reference to a numbered segment of a verse.
    #[must_use]
    pub const fn with_segment(book: i32, chapter: i32, verse: i32, segment: i32) -> Self {
        Self {
            book,
            chapter,
            verse,
            segment,
        }
    }

    /// Unpacks a `BBCCCVVV` integer.
    #[must_use]
    pub const fn from_packed(bbcccvvv: i32) -> Self {
        Self::new(
            bbcccvvv / BOOK_SHIFT,
            bbcccvvv % BOOK_SHIFT / CHAPTER_SHIFT,
            bbcccvvv % CHAPTER_SHIFT,
        )
    }

    /// Parses free text such as `GEN 1:1`, `Genesis 1.1`, `2 Tim 3`, `OBA 4`
    /// or `MRK Intro`.
    ///
    /// Missing chapter and verse numbers default to 1, except that a lone
    /// number after a single-chapter book is its verse. Any character that
    /// is not a letter or digit separates chapter from verse, and segment
    /// letters after the verse are dropped. Unknown books and trailing text
    /// give book 0, which is never valid. Seven or eight digits are read as
    /// a packed reference.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = strip_marks(text);
        let text = text.trim();
        if let Some(bbcccvvv) = packed_number(text) {
            return Self::from_packed(bbcccvvv);
        }

        let parts = Components::of(text);
        let book = parts.book.unwrap_or(0);
        let (chapter, verse) = parts.chapter_and_verse(book);
        Self::new(if parts.well_formed { book } else { 0 }, chapter, verse)
    }

    /// The book number.
    #[must_use]
    pub const fn book(&self) -> i32 {
        self.book
    }

    /// The chapter number.
    #[must_use]
    pub const fn chapter(&self) -> i32 {
        self.chapter
    }

    /// The verse number.
    #[must_use]
    pub const fn verse(&self) -> i32 {
        self.verse
    }

    /// The segment number, 0 for the whole verse.
    #[must_use]
    pub const fn segment(&self) -> i32 {
        self.segment
    }

    /// Sets the book number.
    pub const fn set_book(&mut self, book: i32) {
        self.book = book;
    }

    /// Sets the chapter number.
    pub const fn set_chapter(&mut self, chapter: i32) {
        self.chapter = chapter;
    }

    /// Sets the verse number.
    pub const fn set_verse(&mut self, verse: i32) {
        self.verse = verse;
    }

    /// Sets the segment number.
    pub const fn set_segment(&mut self, segment: i32) {
        self.segment = segment;
    }

    /// Packs into `BBCCCVVV`. Components too wide for their digits are
    /// truncated.
    #[must_use]
    pub const fn bbcccvvv(&self) -> i32 {
        self.book % 100 * BOOK_SHIFT + self.chapter % CHAPTER_SHIFT * CHAPTER_SHIFT + self.verse % CHAPTER_SHIFT
    }

    /// Whether every number is zero.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        self.book == 0 && self.chapter == 0 && self.verse == 0 && self.segment == 0
    }

    /// Whether the reference can exist in `canon`.
    ///
    /// Verse 0 is only allowed in chapter 1, where it stands for material
    /// before the first verse.
    #[must_use]
    pub const fn is_valid(&self, canon: Canon) -> bool {
        canon.contains(self.book)
            && self.chapter >= 1
            && self.chapter <= MAX_NUMBER
            && ((self.verse >= 1 && self.verse <= MAX_NUMBER) || (self.verse == 0 && self.chapter == 1))
    }

    /// Whether the chapter and verse exist in `versification`.
    #[must_use]
    pub fn is_valid_in_versification(&self, versification: &Versification) -> bool {
        self.book >= canon::FIRST_BOOK
            && (1..=versification.last_chapter(self.book)).contains(&self.chapter)
            && ((1..=versification.last_verse(self.book, self.chapter)).contains(&self.verse)
                || (self.verse == 0 && self.chapter == 1))
    }

    /// Writes the reference in the given format.
    #[must_use]
    pub fn to_string_in(&self, format: RefStringFormat) -> String {
        let book = book_code(self.book);
        match (format, self.chapter, self.verse) {
            (RefStringFormat::Exchange, 0, 0) => format!("{book} {TITLE}"),
            (RefStringFormat::Exchange, 1, 0) => format!("{book} {INTRO}"),
            _ => format!("{book} {}:{}", self.chapter, self.verse),
        }
    }

    const fn same_verse(&self, other: &Self) -> bool {
        self.book == other.book && self.chapter == other.chapter && self.verse == other.verse
    }
}

impl fmt::Display for BcvRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_in(RefStringFormat::General))
    }
}

impl FromStr for BcvRef {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// The pieces found in reference text, before defaults are applied.
#[derive(Debug, Default)]
struct Components {
    /// `None` when the text names no book, `Some(0)` for an unknown one.
    book: Option<i32>,
    first: Option<i32>,
    second: Option<i32>,
    well_formed: bool,
}

impl Components {
    fn of(text: &str) -> Self {
        let (book, rest) = split_book(text);
        let rest = rest.trim();
        let mut parts = Self {
            book,
            well_formed: true,
            ..Self::default()
        };

        if rest.is_empty() {
            return parts;
        }
        if rest.eq_ignore_ascii_case(TITLE) {
            parts.first = Some(0);
            parts.second = Some(0);
            return parts;
        }
        if rest.eq_ignore_ascii_case(INTRO) {
            parts.first = Some(1);
            parts.second = Some(0);
            return parts;
        }

        let Some(found) = CHAPTER_VERSE.as_ref().and_then(|pattern| pattern.captures(rest)) else {
            parts.well_formed = false;
            return parts;
        };
        parts.first = found.get(1).map(|digits| number(digits.as_str()));
        parts.second = found.get(2).map(|digits| number(digits.as_str()));
        parts.well_formed = found.get(0).is_some_and(|whole| whole.end() == rest.len());
        parts
    }

    fn chapter_and_verse(&self, book: i32) -> (i32, i32) {
        match (self.first, self.second) {
            (Some(chapter), Some(verse)) => (chapter, verse),
            (Some(verse), None) if SINGLE_CHAPTER_BOOKS.contains(&book) => (1, verse),
            (Some(chapter), None) => (chapter, 1),
            (None, _) => (1, 1),
        }
    }
}

/// Splits a leading book code or name from the rest of the text.
fn split_book(text: &str) -> (Option<i32>, &str) {
    if let Some((code, rest)) = text.split_at_checked(3) {
        let number = canon::book_id_to_number(code);
        if number > 0 && rest.chars().next().is_none_or(|c| !c.is_alphabetic()) {
            return (Some(compact_book(number)), rest);
        }
    }

    let Some(name) = BOOK_NAME.as_ref().and_then(|pattern| pattern.find(text)) else {
        return (None, text);
    };
    let mut name = name.as_str();
    if let Some((head, last)) = name.rsplit_once(char::is_whitespace) {
        if last.eq_ignore_ascii_case(TITLE) || last.eq_ignore_ascii_case(INTRO) {
            name = head;
        }
    }
    let book = book_names::find(name).map_or(0, compact_book);
    (Some(book), &text[name.len()..])
}

/// Books past the deuterocanon do not fit the two book digits.
const fn compact_book(number: i32) -> i32 {
    if number <= canon::LAST_DEUTEROCANON_BOOK {
        number
    } else {
        0
    }
}

fn number(digits: &str) -> i32 {
    digits.parse().unwrap_or(-1)
}

fn packed_number(text: &str) -> Option<i32> {
    if (7..=8).contains(&text.len()) && text.bytes().all(|b| b.is_ascii_digit()) {
        text.parse().ok()
    } else {
        None
    }
}

fn strip_marks(text: &str) -> String {
    text.chars().filter(|&c| c != RTL_MARK).collect()
}

fn book_code(book: i32) -> &'static str {
    canon::book_number_to_id(book).unwrap_or_default()
}

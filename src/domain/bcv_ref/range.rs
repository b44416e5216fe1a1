//! Reference ranges: parsing `MRK 1:8-2:15` into two references and writing
//! two references back out as text.

use super::{BcvRef, Components, book_code, packed_number, strip_marks};
use crate::domain::canon::Canon;

const RANGE_SEPARATOR: char = '-';

/// Parses a range of references into `start` and `end`.
///
/// The end inherits the book and chapter of the start when it leaves them
/// out. When the text names no book at all, the book (and, for a bare verse
/// number, the chapter) comes from the current `start` and `end`, which must
/// agree on it.
///
/// Returns `false`, leaving `start` and `end` unchanged, if the text holds
/// more than one range separator, if either end is unparsable or invalid in
/// `canon`, if the range spans books while `allow_multiple_books` is
/// `false`, or if the end comes before the start.
///
/// ```
/// use scripture::{BcvRef, Canon, domain::bcv_ref::parse_ref_range};
///
/// let mut start = BcvRef::default();
/// let mut end = BcvRef::default();
/// assert!(parse_ref_range("MRK 1:8-2:15", &mut start, &mut end, true, Canon::PROTESTANT));
/// assert_eq!(start, BcvRef::new(41, 1, 8));
/// assert_eq!(end, BcvRef::new(41, 2, 15));
///
/// // Chapters 1 and 2 differ, so a bare verse number has no chapter to join.
/// assert!(!parse_ref_range("7", &mut start, &mut end, true, Canon::PROTESTANT));
/// ```
pub fn parse_ref_range(
    text: &str,
    start: &mut BcvRef,
    end: &mut BcvRef,
    allow_multiple_books: bool,
    canon: Canon,
) -> bool {
    let text = strip_marks(text);
    let context = Context::between(start, end);
    let parsed = match text.split(RANGE_SEPARATOR).collect::<Vec<_>>().as_slice() {
        [single] => resolve(single, context).map(|reference| (reference, reference)),
        [first, last] => resolve(first, context).and_then(|first| {
            resolve(last, Context::after(&first)).map(|last| (first, last))
        }),
        _ => None,
    };

    let accepted = parsed.filter(|(first, last)| {
        first.is_valid(canon)
            && last.is_valid(canon)
            && (allow_multiple_books || first.book() == last.book())
            && first <= last
    });
    let Some((first, last)) = accepted else {
        tracing::trace!(text = %text, "Rejected reference range");
        return false;
    };

    *start = first;
    *end = last;
    true
}

/// What a half of a range may inherit when it leaves out its book or chapter.
#[derive(Debug, Clone, Copy)]
struct Context {
    book: Option<i32>,
    chapter: Option<i32>,
}

impl Context {
    fn between(start: &BcvRef, end: &BcvRef) -> Self {
        let same_book = start.book() == end.book();
        Self {
            book: same_book.then_some(start.book()),
            chapter: (same_book && start.chapter() == end.chapter()).then_some(start.chapter()),
        }
    }

    const fn after(first: &BcvRef) -> Self {
        Self {
            book: Some(first.book()),
            chapter: Some(first.chapter()),
        }
    }
}

fn resolve(text: &str, context: Context) -> Option<BcvRef> {
    let text = text.trim();
    if let Some(bbcccvvv) = packed_number(text) {
        return Some(BcvRef::from_packed(bbcccvvv));
    }

    let parts = Components::of(text);
    if !parts.well_formed {
        return None;
    }
    if let Some(book) = parts.book {
        let (chapter, verse) = parts.chapter_and_verse(book);
        return Some(BcvRef::new(book, chapter, verse));
    }

    let book = context.book?;
    let (chapter, verse) = match (parts.first, parts.second) {
        (Some(chapter), Some(verse)) => (chapter, verse),
        (Some(verse), None) => (context.chapter?, verse),
        (None, _) => return None,
    };
    Some(BcvRef::new(book, chapter, verse))
}

/// Reads the first and last verse numbers of a verse or verse bridge, such
/// as `5`, `2a-3b` or `12-`.
///
/// A side with no number takes the number of the other side. Segment
/// letters are ignored and right-to-left marks are stripped. Returns `None`
/// for text with no usable number, or a number too large for a verse.
///
/// ```
/// use scripture::domain::bcv_ref::verse_to_scr_ref;
///
/// assert_eq!(verse_to_scr_ref("2a-3b"), Some((2, 3)));
/// assert_eq!(verse_to_scr_ref("a3"), None);
/// ```
#[must_use]
pub fn verse_to_scr_ref(text: &str) -> Option<(i32, i32)> {
    let text = strip_marks(text);
    let (first, last) = match text.split_once(RANGE_SEPARATOR) {
        Some((first, last)) => (first.trim(), Some(last)),
        None => (text.trim(), None),
    };

    match (verse_number(first), last.and_then(verse_number)) {
        (Some(start), Some(end)) => Some((start, end)),
        (Some(start), None) => Some((start, start)),
        (None, Some(end)) if first.is_empty() => Some((end, end)),
        _ => None,
    }
}

fn verse_number(text: &str) -> Option<i32> {
    let text = text.trim();
    let digits_end = text.find(|c: char| !c.is_ascii_digit()).unwrap_or(text.len());
    let (digits, segment) = text.split_at(digits_end);
    if digits.is_empty() || !segment.chars().all(char::is_alphabetic) {
        return None;
    }
    digits.parse::<i16>().ok().map(i32::from)
}

/// Suffixes written in place of the chapter for title and introduction
/// references.
///
/// A title is chapter 0 verse 0 and an introduction is chapter 1 verse 0.
/// With no suffix set they are written with their chapter number. An empty
/// suffix writes the book code alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReferenceFormat<'a> {
    title: Option<&'a str>,
    intro: Option<&'a str>,
}

impl<'a> ReferenceFormat<'a> {
    /// Writes titles and introductions with their chapter number.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            title: None,
            intro: None,
        }
    }

    /// Writes titles as `BOOK suffix`.
    #[must_use]
    pub const fn title(mut self, suffix: &'a str) -> Self {
        self.title = Some(suffix);
        self
    }

    /// Writes introductions as `BOOK suffix`.
    #[must_use]
    pub const fn intro(mut self, suffix: &'a str) -> Self {
        self.intro = Some(suffix);
        self
    }

    /// Writes introductions as the book code alone.
    #[must_use]
    pub const fn suppress_intro(self) -> Self {
        self.intro("")
    }

    const fn suffix_for(&self, reference: &BcvRef) -> Option<&'a str> {
        match (reference.chapter(), reference.verse()) {
            (0, 0) => self.title,
            (1, 0) => self.intro,
            _ => None,
        }
    }
}

/// Writes a reference or a range of references.
///
/// The end is left out when it is `None`, all zero or the same verse as the
/// start. A bridge repeats only what differs: `MAT 5:7-9`,
/// `MRK 12:34-14:56`, `MRK 10:6-JHN 3:16`. Two references to verse 0 give
/// a chapter range such as `MRK 1-2`.
///
/// ```
/// use scripture::{BcvRef, domain::bcv_ref::{ReferenceFormat, make_reference_string}};
///
/// let text = make_reference_string(
///     &BcvRef::new(40, 5, 7),
///     Some(&BcvRef::new(40, 5, 9)),
///     ":",
///     "-",
///     ReferenceFormat::new(),
/// );
/// assert_eq!(text, "MAT 5:7-9");
/// ```
#[must_use]
pub fn make_reference_string(
    start: &BcvRef,
    end: Option<&BcvRef>,
    chapter_verse_separator: &str,
    bridge: &str,
    format: ReferenceFormat<'_>,
) -> String {
    let end = end.filter(|end| !end.is_default()).unwrap_or(start);
    let book = book_code(start.book());
    let (chapter, verse) = (start.chapter(), start.verse());

    if start.same_verse(end) {
        return match format.suffix_for(start) {
            Some("") => book.to_string(),
            Some(suffix) => format!("{book} {suffix}"),
            None if verse == 0 => format!("{book} {chapter}"),
            None => format!("{book} {chapter}{chapter_verse_separator}{verse}"),
        };
    }

    let end_book = book_code(end.book());
    let (end_chapter, end_verse) = (end.chapter(), end.verse());
    if verse == 0 && end_verse == 0 {
        return if start.book() == end.book() {
            format!("{book} {chapter}{bridge}{end_chapter}")
        } else {
            format!("{book} {chapter}{bridge}{end_book} {end_chapter}")
        };
    }

    let start_text = format!("{book} {chapter}{chapter_verse_separator}{verse}");
    if start.book() != end.book() {
        format!("{start_text}{bridge}{end_book} {end_chapter}{chapter_verse_separator}{end_verse}")
    } else if chapter != end_chapter {
        format!("{start_text}{bridge}{end_chapter}{chapter_verse_separator}{end_verse}")
    } else {
        format!("{start_text}{bridge}{end_verse}")
    }
}

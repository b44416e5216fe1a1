//! Rich Scripture references.
//!
//! A [`VerseRef`] names a book, a chapter and a verse within a
//! [`Versification`]. The verse is kept as text as well as a number, so a
//! reference can hold a bridge (`5-7`), a list (`1,3-5`) or a segment (`7a`).
//! Its validity always depends on the versification it is tagged with.

use std::{
    fmt,
    hash::{DefaultHasher, Hash, Hasher},
    str::FromStr,
    sync::Arc,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    domain::{
        canon,
        versification::{MappedVerse, Versification, VersificationType},
    },
    storage::registry::{Registry, RegistryError},
};

mod compare;
mod navigation;
mod numerals;

pub use compare::{CompareOptions, are_overlapping_verse_ranges};
pub use numerals::{MAX_VERSE, digit_value, is_decimal_digit, is_verse_parseable};

const RANGE_SEPARATOR: char = '-';
const SEQUENCE_SEPARATOR: char = ',';
const RTL_MARK: char = '\u{200F}';

const CHAPTER_SHIFT: i32 = 1000;
const BOOK_SHIFT: i32 = CHAPTER_SHIFT * CHAPTER_SHIFT;

/// Errors raised by the strict constructors of [`VerseRef`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The reference text could not be parsed.
    #[error("Invalid reference: {0}")]
    Syntax(String),

    /// A book, chapter or verse number was impossible.
    #[error("Invalid reference component: {0}")]
    Construction(String),

    /// The versification named by the reference could not be loaded.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// The validity of a reference within its versification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidStatus {
    /// Every verse exists in the versification.
    Valid,
    /// The reference has no versification.
    UnknownVersification,
    /// A book, chapter or verse is outside the versification, or excluded.
    OutOfRange,
    /// A bridge or list goes backwards.
    VerseOutOfOrder,
    /// A bridge or list names a verse twice.
    VerseRepeated,
}

/// A reference to a verse, verse bridge or list of verses.
///
/// ```
/// use scripture::{Registry, VerseRef, VersificationType};
///
/// let english = Registry::global().get(VersificationType::English).unwrap();
/// let vref = VerseRef::parse_with("NUM 5:1-5", &english).unwrap();
///
/// assert_eq!(vref.bbbcccvvv(), 4_005_001);
/// assert_eq!(vref.verse(), "1-5");
/// assert!(vref.is_valid());
/// assert_eq!(vref.to_string_with_versification(), "NUM 5:1-5/4");
/// ```
#[derive(Clone, Default)]
pub struct VerseRef {
    book: i32,
    chapter: i32,
    verse: i32,
    text: Option<String>,
    versification: Option<Arc<Versification>>,
}

impl VerseRef {
    /// A reference with no book, chapter or verse.
    #[must_use]
    pub const fn empty(versification: Option<Arc<Versification>>) -> Self {
        Self {
            book: 0,
            chapter: -1,
            verse: -1,
            text: None,
            versification,
        }
    }

    /// A reference to a single verse.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Construction`] if the book is not in the canon or the
    /// chapter or verse is negative.
    pub fn new(
        book: i32,
        chapter: i32,
        verse: i32,
        versification: &Arc<Versification>,
    ) -> Result<Self, Error> {
        let mut vref = Self::empty(Some(Arc::clone(versification)));
        vref.set_book_num(book)?;
        vref.set_chapter_num(chapter)?;
        vref.set_verse_num(verse)?;
        Ok(vref)
    }

    /// A reference from its packed `BBBCCCVVV` form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Construction`] if the packed book is not in the canon.
    pub fn from_packed(bbbcccvvv: i32, versification: &Arc<Versification>) -> Result<Self, Error> {
        let (book, chapter, verse) = Self::unpack(bbbcccvvv);
        Self::new(book, chapter, verse, versification)
    }

    /// A reference from a book code and chapter and verse text.
    ///
    /// The chapter and verse are read leniently: text that is not a number
    /// leaves them at -1.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Construction`] if the book code is unknown.
    pub fn from_parts(
        book: &str,
        chapter: &str,
        verse: &str,
        versification: &Arc<Versification>,
    ) -> Result<Self, Error> {
        let mut vref = Self::empty(Some(Arc::clone(versification)));
        vref.set_book_num(canon::book_id_to_number(book))
            .map_err(|_| Error::Construction(format!("Unknown book '{book}'")))?;
        vref.set_chapter(chapter);
        vref.set_verse(verse);
        Ok(vref)
    }

    /// Parses `BOOK C:V` in the English versification, or the versification
    /// named by a trailing `/N` code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Syntax`] for malformed text.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let english = Registry::global().get(VersificationType::English)?;
        Self::parse_with(text, &english)
    }

    /// Parses `BOOK C:V` in `versification`, unless a trailing `/N` code names
    /// another one.
    ///
    /// The book must be a known code, the chapter a non-negative number and
    /// the verse must start with a digit and not end with a separator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Syntax`] for malformed text.
    pub fn parse_with(text: &str, versification: &Arc<Versification>) -> Result<Self, Error> {
        Self::parse_tagged(text, Some(Arc::clone(versification)))
    }

    /// Parses `BOOK C:V` without tagging a versification.
    pub(crate) fn parse_unversified(text: &str) -> Result<Self, Error> {
        Self::parse_tagged(text, None)
    }

    fn parse_tagged(text: &str, versification: Option<Arc<Versification>>) -> Result<Self, Error> {
        let text: String = text.chars().filter(|&c| c != RTL_MARK).collect();
        let (reference, code) = match text.split_once('/') {
            Some((reference, rest)) => (reference, rest.split('/').next()),
            None => (text.as_str(), None),
        };
        let syntax = || Error::Syntax(reference.to_string());

        let versification = match code {
            Some(code) => {
                let kind = code
                    .trim()
                    .parse()
                    .ok()
                    .and_then(VersificationType::from_code)
                    .filter(|&kind| kind != VersificationType::Unknown)
                    .ok_or_else(syntax)?;
                Some(Registry::global().get(kind)?)
            }
            None => versification,
        };

        let mut parts = reference.trim().split(' ');
        let (Some(book), Some(chapter_verse), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(syntax());
        };
        let mut pieces = chapter_verse.split(':');
        let (Some(chapter), Some(verse), None) = (pieces.next(), pieces.next(), pieces.next())
        else {
            return Err(syntax());
        };

        let book = canon::book_id_to_number(book);
        if book == 0
            || !chapter.parse::<i32>().is_ok_and(|chapter| chapter >= 0)
            || !is_verse_parseable(verse)
        {
            return Err(syntax());
        }

        let mut vref = Self::empty(versification);
        vref.book = book;
        vref.set_chapter(chapter);
        vref.set_verse(verse);
        Ok(vref)
    }

    /// Packs a book, chapter and verse as `BBBCCCVVV`. Each part wraps at
    /// 999; negative chapters and verses count as 0.
    ///
    /// ```
    /// use scripture::VerseRef;
    ///
    /// assert_eq!(VerseRef::pack(1, 2, 3), 1_002_003);
    /// assert_eq!(VerseRef::pack(42, -1, -1), 42_000_000);
    /// ```
    #[must_use]
    pub const fn pack(book: i32, chapter: i32, verse: i32) -> i32 {
        let max = numerals::MAX_VERSE;
        let chapter = if chapter >= 0 { chapter % max } else { 0 };
        let verse = if verse >= 0 { verse % max } else { 0 };
        (book % max) * BOOK_SHIFT + chapter * CHAPTER_SHIFT + verse
    }

    /// Splits a packed `BBBCCCVVV` value into book, chapter and verse.
    #[must_use]
    pub const fn unpack(bbbcccvvv: i32) -> (i32, i32, i32) {
        (
            bbbcccvvv / BOOK_SHIFT,
            bbbcccvvv % BOOK_SHIFT / CHAPTER_SHIFT,
            bbbcccvvv % CHAPTER_SHIFT,
        )
    }

    /// Whether nothing has been set: no book, chapter, verse or
    /// versification.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        self.book == 0 && self.chapter == 0 && self.verse == 0 && self.versification.is_none()
    }

    /// Book number, 0 when unset.
    #[must_use]
    pub const fn book_num(&self) -> i32 {
        self.book
    }

    /// Chapter number, -1 when unset or unreadable.
    #[must_use]
    pub const fn chapter_num(&self) -> i32 {
        self.chapter
    }

    /// The first verse number, -1 when unset or unreadable.
    #[must_use]
    pub const fn verse_num(&self) -> i32 {
        self.verse
    }

    /// Book code, empty when unset.
    #[must_use]
    pub fn book(&self) -> &'static str {
        canon::book_number_to_id(self.book).unwrap_or_default()
    }

    /// Chapter as text, empty when unset.
    #[must_use]
    pub fn chapter(&self) -> String {
        if self.is_default() || self.chapter < 0 {
            String::new()
        } else {
            self.chapter.to_string()
        }
    }

    /// Verse as text: the bridge, list or segment if there is one.
    #[must_use]
    pub fn verse(&self) -> String {
        match &self.text {
            Some(text) => text.clone(),
            None if self.is_default() || self.verse < 0 => String::new(),
            None => self.verse.to_string(),
        }
    }

    /// Verse text when it is more than a plain number.
    #[must_use]
    pub fn verse_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// The versification this reference is in.
    #[must_use]
    pub const fn versification(&self) -> Option<&Arc<Versification>> {
        self.versification.as_ref()
    }

    /// Retags the reference without converting it. Use
    /// [`VerseRef::change_versification`] to convert.
    pub fn set_versification(&mut self, versification: Option<Arc<Versification>>) {
        self.versification = versification;
    }

    /// Sets the book number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Construction`] if the number is not in the canon.
    pub fn set_book_num(&mut self, book: i32) -> Result<(), Error> {
        if !(canon::FIRST_BOOK..=canon::LAST_BOOK).contains(&book) {
            return Err(Error::Construction(format!(
                "Book number {book} must be between {} and {}",
                canon::FIRST_BOOK,
                canon::LAST_BOOK
            )));
        }
        self.book = book;
        Ok(())
    }

    /// Sets the chapter number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Construction`] if the number is negative.
    pub fn set_chapter_num(&mut self, chapter: i32) -> Result<(), Error> {
        if chapter < 0 {
            return Err(Error::Construction(format!(
                "Chapter number {chapter} cannot be negative"
            )));
        }
        self.chapter = chapter;
        Ok(())
    }

    /// Sets a plain verse number, dropping any bridge, list or segment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Construction`] if the number is negative.
    pub fn set_verse_num(&mut self, verse: i32) -> Result<(), Error> {
        if verse < 0 {
            return Err(Error::Construction(format!(
                "Verse number {verse} cannot be negative"
            )));
        }
        self.verse = verse;
        self.text = None;
        Ok(())
    }

    /// Sets the book from its code. Unknown codes leave book 0.
    pub fn set_book(&mut self, code: &str) {
        self.book = canon::book_id_to_number(code);
    }

    /// Sets the chapter from text. Text that is not a number leaves -1.
    pub fn set_chapter(&mut self, chapter: &str) {
        self.chapter = chapter.trim().parse::<i16>().map_or(-1, i32::from);
        if self.chapter < 0 {
            tracing::debug!(chapter, "Failed to parse a chapter number");
        }
    }

    /// Sets the verse from text holding Latin digits only.
    ///
    /// Returns whether a verse number could be read. The text is kept either
    /// way, so `"4b-5a"` sets verse 4 and keeps the bridge.
    pub fn set_verse(&mut self, verse: &str) -> bool {
        self.set_verse_text(verse, true)
    }

    /// Sets the verse from text that may use the decimal digits of any
    /// script.
    ///
    /// ```
    /// use scripture::{Registry, VerseRef, VersificationType};
    ///
    /// let english = Registry::global().get(VersificationType::English).unwrap();
    /// let mut vref = VerseRef::new(40, 1, 1, &english).unwrap();
    ///
    /// assert!(vref.try_set_verse_unicode("\u{0967}\u{0968}"));
    /// assert_eq!(vref.verse_num(), 12);
    /// assert!(!vref.try_set_verse_unicode("\u{05D0}"));
    /// assert_eq!(vref.verse_num(), -1);
    /// ```
    pub fn try_set_verse_unicode(&mut self, verse: &str) -> bool {
        self.set_verse_text(verse, false)
    }

    fn set_verse_text(&mut self, verse: &str, latin_only: bool) -> bool {
        let (number, plain) = numerals::leading_verse_number(verse, latin_only);
        self.verse = number;
        self.text = (!plain).then(|| verse.replace(RTL_MARK, ""));
        if number >= 0 {
            return true;
        }

        tracing::debug!(verse, "Failed to parse a verse number");
        if let Some(text) = &self.text {
            self.verse = numerals::leading_verse_number(text, latin_only).0;
        }
        false
    }

    /// Moves the reference onto a mapped verse, keeping its versification.
    pub(crate) fn assign(&mut self, target: &MappedVerse) {
        self.book = target.book();
        self.chapter = target.chapter();
        self.verse = target.verse();
        self.text = target.text().map(str::to_string);
    }

    /// Whether the verse text holds a bridge or a list.
    #[must_use]
    pub fn has_multiple(&self) -> bool {
        self.text
            .as_deref()
            .is_some_and(|text| text.contains([RANGE_SEPARATOR, SEQUENCE_SEPARATOR]))
    }

    /// The reference packed as `BBBCCC000`.
    #[must_use]
    pub const fn bbbccc(&self) -> i32 {
        Self::pack(self.book, self.chapter, 0)
    }

    /// The reference packed as `BBBCCCVVV`, using the first verse.
    #[must_use]
    pub const fn bbbcccvvv(&self) -> i32 {
        Self::pack(self.book, self.chapter, self.verse)
    }

    /// The packed reference as nine digits followed by the segment.
    #[must_use]
    pub fn bbbcccvvvs(&self) -> String {
        format!("{:09}{}", self.bbbcccvvv(), self.segment())
    }

    /// A 64-bit key: the packed reference in the high half, a hash of the
    /// verse text in the low half.
    #[must_use]
    pub fn long_hash_code(&self) -> i64 {
        let text_hash = self
            .text
            .as_deref()
            .filter(|text| !text.is_empty())
            .map_or(0, |text| {
                let mut hasher = DefaultHasher::new();
                text.hash(&mut hasher);
                i64::try_from(hasher.finish() >> 32).unwrap_or_default()
            });
        (i64::from(self.bbbcccvvv()) << 32) + text_hash
    }

    /// Last chapter of the book in this versification.
    #[must_use]
    pub fn last_chapter(&self) -> Option<i32> {
        self.versification
            .as_ref()
            .map(|versification| versification.last_chapter(self.book))
    }

    /// Last verse of the chapter in this versification.
    #[must_use]
    pub fn last_verse(&self) -> Option<i32> {
        self.versification
            .as_ref()
            .map(|versification| versification.last_verse(self.book, self.chapter))
    }

    /// Whether the first verse is excluded from the versification.
    #[must_use]
    pub fn is_excluded(&self) -> bool {
        self.versification
            .as_ref()
            .is_some_and(|versification| versification.is_excluded(self.bbbcccvvv()))
    }

    /// Whether the versification declares segments for the first verse.
    #[must_use]
    pub fn has_segments_defined(&self) -> bool {
        self.declared_segments().is_some()
    }

    fn declared_segments(&self) -> Option<Vec<String>> {
        let versification = self.versification.as_ref()?;
        let segments = versification.verse_segments(self.bbbcccvvv())?;
        Some(segments.iter().cloned().collect())
    }

    /// The segments of this verse: those declared by the versification, else
    /// `defaults`.
    #[must_use]
    pub fn segments(&self, defaults: &[&str]) -> Vec<String> {
        self.declared_segments()
            .unwrap_or_else(|| defaults.iter().map(ToString::to_string).collect())
    }

    /// The segment letters of the first verse, unvalidated. Empty when the
    /// verse has no segment.
    #[must_use]
    pub fn segment(&self) -> String {
        let Some(text) = self.text.as_deref() else {
            return String::new();
        };
        if !text.chars().next().is_some_and(is_decimal_digit) {
            return String::new();
        }

        let mut segment = String::new();
        for c in text.chars() {
            if c == RANGE_SEPARATOR || c == SEQUENCE_SEPARATOR {
                break;
            }
            if !is_decimal_digit(c) {
                segment.push(c);
            } else if !segment.is_empty() {
                break;
            }
        }
        segment
    }

    /// The segment of the first verse if it is one of the
    /// [segments](Self::segments) of this verse; empty otherwise. With no
    /// known segments any segment is accepted.
    #[must_use]
    pub fn segment_from(&self, defaults: &[&str]) -> String {
        let segment = self.segment();
        if segment.is_empty() {
            return segment;
        }
        let valid = self.segments(defaults);
        if valid.is_empty() || valid.contains(&segment) {
            segment
        } else {
            String::new()
        }
    }

    /// The position of the segment of the first verse among the
    /// [segments](Self::segments) of this verse.
    #[must_use]
    pub fn segment_number(&self, defaults: &[&str]) -> Option<usize> {
        let segment = self.segment();
        if segment.is_empty() {
            return None;
        }
        self.segments(defaults)
            .iter()
            .position(|valid| *valid == segment)
    }

    /// Appends the last declared segment to the verse.
    pub fn advance_to_last_segment(&mut self) {
        if let Some(last) = self.declared_segments().and_then(|segments| segments.last().cloned()) {
            let verse = format!("{}{last}", self.verse());
            self.set_verse(&verse);
        }
    }

    /// Drops any bridge, list or segment, keeping the first verse number.
    pub fn simplify(&mut self) {
        self.text = None;
    }

    /// The first verse of a bridge or list, keeping its segment.
    #[must_use]
    pub fn unbridge(&self) -> Self {
        self.all_verses(false).next().unwrap_or_else(|| self.clone())
    }

    /// Every single verse in the reference.
    ///
    /// `GEN 1:1a-3b,5` gives `GEN 1:1a`, `GEN 1:2`, `GEN 1:3b` and `GEN 1:5`.
    /// With `specified_only` the verses inside a bridge are skipped.
    /// Excluded verses inside a bridge are always skipped.
    pub fn all_verses(&self, specified_only: bool) -> impl Iterator<Item = Self> + '_ {
        let listed = self.text.as_deref().filter(|_| self.chapter > 0);
        let whole = listed.is_none().then(|| self.clone());
        whole.into_iter().chain(
            listed
                .into_iter()
                .flat_map(|text| text.split(SEQUENCE_SEPARATOR))
                .flat_map(move |part| self.expand(part, specified_only)),
        )
    }

    fn expand(&self, part: &str, specified_only: bool) -> Vec<Self> {
        let mut pieces = part.split(RANGE_SEPARATOR);
        let mut first = self.clone();
        first.set_verse(pieces.next().unwrap_or_default());
        let start = first.verse;
        let mut verses = vec![first];

        if let Some(end) = pieces.next() {
            let mut last = self.clone();
            last.set_verse(end);
            if !specified_only {
                verses.extend(
                    (start + 1..last.verse)
                        .map(|verse| self.with_verse(verse))
                        .filter(|vref| !vref.is_excluded()),
                );
            }
            verses.push(last);
        }
        verses
    }

    fn with_verse(&self, verse: i32) -> Self {
        Self {
            verse,
            text: None,
            ..self.clone()
        }
    }

    /// The single verses and bridges of a list: `LUK 3:12-14,16` gives
    /// `LUK 3:12-14` and `LUK 3:16`.
    pub fn ranges(&self) -> impl Iterator<Item = Self> + '_ {
        let listed = self.text.as_deref().filter(|_| self.chapter > 0);
        let whole = listed.is_none().then(|| self.clone());
        whole.into_iter().chain(
            listed
                .into_iter()
                .flat_map(|text| text.split(SEQUENCE_SEPARATOR))
                .map(move |range| {
                    let mut vref = self.clone();
                    vref.set_verse(range);
                    vref
                }),
        )
    }

    /// Whether the reference exists in its versification and any bridge or
    /// list is in order.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid_status() == ValidStatus::Valid
    }

    /// The validity of the reference.
    ///
    /// For a bridge or list only the verses written out are checked, so
    /// `GEN 1:29-31` is valid even when `GEN 1:30` is excluded.
    #[must_use]
    pub fn valid_status(&self) -> ValidStatus {
        if self.text.as_deref().is_none_or(str::is_empty) {
            return self.single_status();
        }

        let mut previous = 0;
        for vref in self.all_verses(true) {
            let status = vref.single_status();
            if status != ValidStatus::Valid {
                return status;
            }
            let packed = vref.bbbcccvvv();
            if previous > packed {
                return ValidStatus::VerseOutOfOrder;
            }
            if previous == packed {
                return ValidStatus::VerseRepeated;
            }
            previous = packed;
        }
        ValidStatus::Valid
    }

    fn single_status(&self) -> ValidStatus {
        let Some(versification) = &self.versification else {
            return ValidStatus::UnknownVersification;
        };
        if !(canon::FIRST_BOOK..=canon::LAST_BOOK).contains(&self.book) {
            return ValidStatus::OutOfRange;
        }
        if !canon::is_canonical(self.book) {
            return ValidStatus::Valid;
        }
        if self.book > versification.last_book()
            || self.chapter <= 0
            || self.chapter > versification.last_chapter(self.book)
            || self.verse < 0
            || self.verse > versification.last_verse(self.book, self.chapter)
            || versification.is_excluded(self.bbbcccvvv())
        {
            return ValidStatus::OutOfRange;
        }
        ValidStatus::Valid
    }

    /// Converts the reference into `target`, mapping a bridge or list part by
    /// part.
    pub fn change_versification(&mut self, target: &Arc<Versification>) {
        if self.has_multiple() {
            self.change_versification_with_ranges(target);
        } else {
            target.change_versification(self);
        }
    }

    /// Converts a bridge or list into `target` part by part. Returns whether
    /// every part stayed in the same chapter.
    pub fn change_versification_with_ranges(&mut self, target: &Arc<Versification>) -> bool {
        let (converted, same_chapter) = target.change_versification_with_ranges(self);
        *self = converted;
        same_chapter
    }

    /// `BOOK C:V/N`, where `N` is the code of the versification type.
    #[must_use]
    pub fn to_string_with_versification(&self) -> String {
        match &self.versification {
            Some(versification) => format!("{self}/{}", versification.kind().code()),
            None => self.to_string(),
        }
    }

    fn versification_name(&self) -> Option<&str> {
        self.versification.as_deref().map(Versification::name)
    }
}

impl fmt::Display for VerseRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let book = self.book();
        if book.is_empty() {
            return Ok(());
        }
        write!(f, "{book} {}:{}", self.chapter(), self.verse())
    }
}

impl fmt::Debug for VerseRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("VerseRef")
            .field("book", &self.book)
            .field("chapter", &self.chapter)
            .field("verse", &self.verse)
            .field("text", &self.text)
            .field("versification", &self.versification_name())
            .finish()
    }
}

impl PartialEq for VerseRef {
    fn eq(&self, other: &Self) -> bool {
        self.book == other.book
            && self.chapter == other.chapter
            && self.verse == other.verse
            && self.text == other.text
            && self.versification_name() == other.versification_name()
    }
}

impl Eq for VerseRef {}

impl Hash for VerseRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bbbcccvvv().hash(state);
        self.text.hash(state);
        self.versification_name().hash(state);
    }
}

impl FromStr for VerseRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for VerseRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_with_versification())
    }
}

impl<'de> Deserialize<'de> for VerseRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text.is_empty() {
            return Ok(Self::default());
        }
        Self::parse_unversified(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use test_case::test_case;

    use super::*;
    use crate::storage::loader::Loader;

    fn scheme(kind: VersificationType) -> Arc<Versification> {
        Registry::global().get(kind).unwrap()
    }

    fn english() -> Arc<Versification> {
        scheme(VersificationType::English)
    }

    fn vref(text: &str) -> VerseRef {
        VerseRef::parse_with(text, &english()).unwrap()
    }

    fn custom(lines: &str) -> Arc<Versification> {
        Arc::new(
            Loader::new()
                .load_str(&format!(
                    "# Versification \"Custom\"\nGEN 1:31 2:25 3:24\n{lines}"
                ))
                .unwrap(),
        )
    }

    #[test]
    fn strict_constructor() {
        let septuagint = scheme(VersificationType::Septuagint);
        let vref = VerseRef::new(1, 2, 3, &septuagint).unwrap();
        assert!(vref.is_valid());
        assert_eq!(vref.bbbcccvvv(), 1_002_003);
        assert_eq!(vref.bbbcccvvvs(), "001002003");
        assert_eq!(vref.book(), "GEN");
        assert_eq!(vref.chapter(), "2");
        assert_eq!(vref.verse_num(), 3);
        assert_eq!(vref.versification().unwrap().name(), "Septuagint");
    }

    #[test]
    fn default_reference_is_empty() {
        let vref = VerseRef::default();
        assert!(vref.is_default());
        assert!(!vref.is_valid());
        assert_eq!(vref.bbbcccvvvs(), "000000000");
        assert_eq!(vref.book(), "");
        assert_eq!(vref.chapter(), "");
        assert_eq!(vref.verse(), "");
        assert_eq!(vref.to_string(), "");
    }

    #[test]
    fn bridge_with_segments() {
        let vulgate = scheme(VersificationType::Vulgate);
        let vref = VerseRef::from_parts("LUK", "3", "4b-5a", &vulgate).unwrap();
        assert!(vref.is_valid());
        assert_eq!(vref.bbbcccvvv(), 42_003_004);
        assert_eq!(vref.bbbcccvvvs(), "042003004b");
        assert_eq!(vref.verse(), "4b-5a");
        assert_eq!(vref.segment(), "b");
        assert_eq!(vref.all_verses(false).count(), 2);
    }

    #[test]
    fn from_packed() {
        let vref = VerseRef::from_packed(12_015_013, &english()).unwrap();
        assert_eq!(vref.book(), "2KI");
        assert_eq!(vref.chapter_num(), 15);
        assert_eq!(vref.verse(), "13");
    }

    #[test]
    fn every_packed_number_unpacks() {
        for book in canon::FIRST_BOOK..=canon::LAST_BOOK {
            for chapter in 0..numerals::MAX_VERSE {
                for verse in 0..numerals::MAX_VERSE {
                    assert_eq!(
                        VerseRef::unpack(VerseRef::pack(book, chapter, verse)),
                        (book, chapter, verse)
                    );
                }
            }
        }
    }

    #[test_case(1, 999, 1, (1, 0, 1) ; "chapter wraps")]
    #[test_case(1, 1, 999, (1, 1, 0) ; "verse wraps")]
    #[test_case(2, -1, -1, (2, 0, 0) ; "negative numbers become zero")]
    fn packing_wraps_at_the_verse_limit(book: i32, chapter: i32, verse: i32, expected: (i32, i32, i32)) {
        assert_eq!(VerseRef::unpack(VerseRef::pack(book, chapter, verse)), expected);
    }

    #[test]
    fn every_book_and_chapter_round_trips_through_from_packed() {
        let versification = english();
        for book in canon::FIRST_BOOK..=canon::LAST_BOOK {
            for chapter in 0..numerals::MAX_VERSE {
                for verse in [0, 1, numerals::MAX_VERSE - 1] {
                    let packed = VerseRef::pack(book, chapter, verse);
                    let vref = VerseRef::from_packed(packed, &versification).unwrap();
                    assert_eq!(
                        (vref.book_num(), vref.chapter_num(), vref.verse_num()),
                        (book, chapter, verse)
                    );
                    assert_eq!(vref.bbbcccvvv(), packed);
                }
            }
        }
    }

    #[test]
    fn empty_chapter_and_verse_text() {
        let vref = VerseRef::from_parts("LUK", "", "", &english()).unwrap();
        assert_eq!(vref.valid_status(), ValidStatus::OutOfRange);
        assert_eq!(vref.chapter_num(), -1);
        assert_eq!(vref.verse_num(), -1);
        assert_eq!(vref.chapter(), "");
        assert_eq!(vref.verse(), "");
    }

    #[test]
    fn rtl_marks_are_dropped() {
        let vref = vref("LUK 5:1\u{200F}-\u{200F}2");
        assert_eq!(vref.valid_status(), ValidStatus::Valid);
        assert_eq!(vref.verse(), "1-2");
        assert_eq!(vref.verse_num(), 1);
    }

    #[test]
    fn chapter_zero_is_out_of_range() {
        let english = english();
        assert_eq!(
            VerseRef::new(13, 0, 0, &english).unwrap().valid_status(),
            ValidStatus::OutOfRange
        );
        assert!(VerseRef::new(13, 1, 0, &english).unwrap().is_valid());
        assert!(VerseRef::new(13, 14, 15, &english).unwrap().is_valid());
    }

    #[test_case(-1, 1, 1 ; "negative book")]
    #[test_case(0, 1, 1 ; "book zero")]
    #[test_case(124, 1, 1 ; "past last book")]
    #[test_case(2, -42, 1 ; "negative chapter")]
    #[test_case(2, 1, -4 ; "negative verse")]
    fn impossible_numbers_are_rejected(book: i32, chapter: i32, verse: i32) {
        assert!(matches!(
            VerseRef::new(book, chapter, verse, &english()),
            Err(Error::Construction(_))
        ));
    }

    #[test_case("MAT 1:" ; "missing verse")]
    #[test_case("MAT 1:2-" ; "trailing range separator")]
    #[test_case("MAT 1:2," ; "trailing list separator")]
    #[test_case("BLA 1:1" ; "unknown book")]
    #[test_case("EXO 6:-18" ; "negative verse")]
    #[test_case("EXO -1:18" ; "negative chapter")]
    #[test_case("EXO F:18" ; "letter chapter")]
    #[test_case("EXO 1:F" ; "letter verse")]
    #[test_case("GEN  1:1" ; "double space")]
    #[test_case("GEN 1:1/9" ; "unknown versification code")]
    #[test_case("GEN 1:1/0" ; "unknown versification")]
    fn malformed_text_is_rejected(text: &str) {
        assert!(matches!(
            VerseRef::parse_with(text, &english()),
            Err(Error::Syntax(_))
        ));
    }

    #[test]
    fn unknown_book_code_is_rejected() {
        assert!(VerseRef::from_parts("BLA", "1", "1", &english()).is_err());
    }

    #[test]
    fn large_numbers_are_kept_but_invalid() {
        let vref = vref("GEN 1023:5051");
        assert_eq!(vref.valid_status(), ValidStatus::OutOfRange);
        assert_eq!(vref.chapter_num(), 1023);
        assert_eq!(vref.verse_num(), -1);
    }

    #[test]
    fn chapter_zero_text() {
        let vref = vref("EXO 0:18");
        assert!(!vref.is_valid());
        assert_eq!(vref.bbbcccvvv(), 2_000_018);
    }

    #[test]
    fn versification_suffix() {
        let vref = VerseRef::parse("NUM 5:1-5/2").unwrap();
        assert_eq!(vref.to_string(), "NUM 5:1-5");
        assert_eq!(vref.to_string_with_versification(), "NUM 5:1-5/2");
        assert_eq!(vref.versification().unwrap().kind(), VersificationType::Septuagint);
    }

    #[test_case("MAT 3:13", "040003013")]
    #[test_case("MAT 3:12a", "040003012a")]
    #[test_case("1KI 2:35a-35h", "011002035a")]
    #[test_case("ESG 8:8a", "069008008a")]
    #[test_case("MAT 12:1-3,5a,6c-9", "040012001")]
    #[test_case("MAT 3:13b-12a", "040003013b")]
    fn packed_with_segment(text: &str, expected: &str) {
        assert_eq!(vref(text).bbbcccvvvs(), expected);
    }

    #[test_case("GEN 1:1")]
    #[test_case("GEN 1:1-2")]
    #[test_case("GEN 1:1,3,7")]
    #[test_case("GEN 1:1,3-6")]
    #[test_case("PSA 119:1,3-6")]
    #[test_case("GEN 1:1b")]
    #[test_case("GEN 1:1c-2a")]
    #[test_case("GEN 1:1a,3c-6a")]
    fn valid_references(text: &str) {
        assert!(vref(text).is_valid());
    }

    #[test_case("GEN 1:2-1", ValidStatus::VerseOutOfOrder)]
    #[test_case("GEN 1:2,1", ValidStatus::VerseOutOfOrder)]
    #[test_case("GEN 1:5,2-3", ValidStatus::VerseOutOfOrder)]
    #[test_case("GEN 1:2,2", ValidStatus::VerseRepeated)]
    #[test_case("GEN 100:1", ValidStatus::OutOfRange)]
    #[test_case("PHM 2:1", ValidStatus::OutOfRange)]
    #[test_case("GEN 1:100", ValidStatus::OutOfRange)]
    #[test_case("GEN 1:1-200", ValidStatus::OutOfRange)]
    #[test_case("GEN 1:1,3,700", ValidStatus::OutOfRange)]
    #[test_case("GEN 1:1a,3c-600a", ValidStatus::OutOfRange)]
    fn invalid_references(text: &str, expected: ValidStatus) {
        assert_eq!(vref(text).valid_status(), expected);
    }

    #[test]
    fn unversified_reference_has_unknown_status() {
        let vref = VerseRef::parse_unversified("GEN 1:1").unwrap();
        assert_eq!(vref.valid_status(), ValidStatus::UnknownVersification);
    }

    #[test_case("GEN 1:29", true)]
    #[test_case("GEN 1:31", true)]
    #[test_case("GEN 1:29-31", true ; "bridge over excluded verse")]
    #[test_case("GEN 1:30", false)]
    #[test_case("GEN 1:30,31", false)]
    #[test_case("GEN 1:29-30", false)]
    #[test_case("GEN 1:30b", false)]
    #[test_case("GEN 1:29b-30a", false)]
    fn excluded_verses(text: &str, valid: bool) {
        let versification = custom("-GEN 1:30\n");
        let vref = VerseRef::parse_with(text, &versification).unwrap();
        assert_eq!(vref.is_valid(), valid);
    }

    #[test]
    fn all_verses_fill_bridges() {
        let versification = custom("-GEN 2:5\n");
        let vref = VerseRef::parse_with("GEN 2:4b-6a,9", &versification).unwrap();
        let verses: Vec<String> = vref.all_verses(false).map(|v| v.to_string()).collect();
        assert_eq!(verses, vec!["GEN 2:4b", "GEN 2:6a", "GEN 2:9"]);

        let vref = VerseRef::parse_with("GEN 2:1-3", &versification).unwrap();
        let verses: Vec<String> = vref.all_verses(false).map(|v| v.to_string()).collect();
        assert_eq!(verses, vec!["GEN 2:1", "GEN 2:2", "GEN 2:3"]);
        let specified: Vec<String> = vref.all_verses(true).map(|v| v.to_string()).collect();
        assert_eq!(specified, vec!["GEN 2:1", "GEN 2:3"]);
    }

    #[test]
    fn all_verses_of_a_single_verse() {
        for text in ["LUK 3:4", "LUK 3:4b"] {
            let vref = vref(text);
            assert_eq!(vref.all_verses(false).collect::<Vec<_>>(), vec![vref.clone()]);
        }
    }

    #[test]
    fn ranges_split_lists() {
        let original = scheme(VersificationType::Original);
        let vref = VerseRef::parse_with("LUK 3:12-14,16b-17a,18a,19,20", &original).unwrap();
        let ranges: Vec<String> = vref.ranges().map(|v| v.to_string()).collect();
        assert_eq!(
            ranges,
            vec!["LUK 3:12-14", "LUK 3:16b-17a", "LUK 3:18a", "LUK 3:19", "LUK 3:20"]
        );
        assert_eq!(VerseRef::parse_with("LUK 3:12", &original).unwrap().ranges().count(), 1);
    }

    #[test]
    fn simplify_and_unbridge() {
        let mut vref = vref("LUK 3:4b-6a");
        assert_eq!(vref.unbridge().verse(), "4b");
        vref.simplify();
        assert_eq!(vref.verse(), "4");
    }

    #[test]
    fn equality_includes_verse_text_and_versification() {
        let english = english();
        let gen_1_1 = VerseRef::new(1, 1, 1, &english).unwrap();
        let gen_1_1a = VerseRef::from_parts("GEN", "1", "1a", &english).unwrap();
        assert_eq!(gen_1_1, VerseRef::new(1, 1, 1, &english).unwrap());
        assert_eq!(gen_1_1a, VerseRef::from_parts("GEN", "1", "1a", &english).unwrap());
        assert_ne!(gen_1_1a, gen_1_1);
        assert_ne!(
            gen_1_1,
            VerseRef::new(1, 1, 1, &scheme(VersificationType::Original)).unwrap()
        );
    }

    #[test]
    fn long_hash_codes_are_distinct_for_close_verses() {
        let english = english();
        let mut codes = HashSet::new();
        for verse in ["1", "1a", "1b", "1c", "2", "1-2", "2a"] {
            let vref = VerseRef::from_parts("GEN", "1", verse, &english).unwrap();
            assert!(codes.insert(vref.long_hash_code()), "collision for {verse}");
        }
    }

    #[test]
    fn segments_from_versification() {
        let versification = custom("*GEN 1:5,-,a,b\n");
        let vref = VerseRef::parse_with("GEN 1:5b", &versification).unwrap();
        assert!(vref.has_segments_defined());
        assert_eq!(vref.segments(&[]), vec!["", "a", "b"]);
        assert_eq!(vref.segment_from(&["x"]), "b");
        assert_eq!(vref.segment_number(&[]), Some(2));

        let vref = VerseRef::parse_with("GEN 1:5c", &versification).unwrap();
        assert_eq!(vref.segment(), "c");
        assert_eq!(vref.segment_from(&[]), "");
        assert_eq!(vref.segment_number(&[]), None);
    }

    #[test]
    fn segments_from_defaults() {
        let vref = vref("GEN 1:6b");
        assert!(!vref.has_segments_defined());
        assert_eq!(vref.segment_from(&["a", "b"]), "b");
        assert_eq!(vref.segment_from(&["a"]), "");
        assert_eq!(vref.segment_from(&[]), "b");
        assert_eq!(vref.segment_number(&["a", "b"]), Some(1));
    }

    #[test]
    fn advance_to_last_segment() {
        let versification = custom("*GEN 1:5,-,a,b\n");
        let mut vref = VerseRef::parse_with("GEN 1:5", &versification).unwrap();
        vref.advance_to_last_segment();
        assert_eq!(vref.verse(), "5b");

        let mut plain = VerseRef::parse_with("GEN 1:6", &versification).unwrap();
        plain.advance_to_last_segment();
        assert_eq!(plain.verse(), "6");
    }

    #[test]
    fn change_versification() {
        let original = scheme(VersificationType::Original);
        let mut single = vref("GEN 31:55");
        single.change_versification(&original);
        assert_eq!(single, VerseRef::parse_with("GEN 32:1", &original).unwrap());

        let mut bridge = vref("GEN 31:54-55");
        assert!(!bridge.change_versification_with_ranges(&original));
        assert_eq!(bridge.to_string(), "GEN 31:54-1");
    }

    #[test]
    fn russian_orthodox_esg() {
        let septuagint = scheme(VersificationType::Septuagint);
        let russian = scheme(VersificationType::RussianOrthodox);
        let mut vref = VerseRef::parse_with("ESG 1:3", &russian).unwrap();
        vref.change_versification(&septuagint);
        assert_eq!(vref, VerseRef::parse_with("ESG 1:1c", &septuagint).unwrap());
        vref.change_versification(&russian);
        assert_eq!(vref, VerseRef::parse_with("ESG 1:3", &russian).unwrap());
    }

    #[test]
    fn last_chapter_and_verse() {
        let book = |book, kind| {
            VerseRef::new(book, 1, 1, &scheme(kind))
                .unwrap()
                .last_chapter()
        };
        assert_eq!(book(1, VersificationType::English), Some(50));
        assert_eq!(book(2, VersificationType::Vulgate), Some(40));
        assert_eq!(book(3, VersificationType::Septuagint), Some(27));
        assert_eq!(book(4, VersificationType::RussianProtestant), Some(36));

        let verse = |chapter, kind| {
            VerseRef::new(1, chapter, 1, &scheme(kind))
                .unwrap()
                .last_verse()
        };
        assert_eq!(verse(1, VersificationType::English), Some(31));
        assert_eq!(verse(31, VersificationType::English), Some(55));
        assert_eq!(verse(31, VersificationType::Original), Some(54));
        assert_eq!(VerseRef::default().last_verse(), None);
    }

    #[test]
    fn serde_uses_the_suffixed_string() {
        let vref = VerseRef::parse("NUM 5:1-5/2").unwrap();
        let json = serde_json::to_string(&vref).unwrap();
        assert_eq!(json, "\"NUM 5:1-5/2\"");

        let back: VerseRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vref);

        let default: VerseRef = serde_json::from_str("\"\"").unwrap();
        assert!(default.is_default());
        assert!(serde_json::from_str::<VerseRef>("\"GEN\"").is_err());
    }
}

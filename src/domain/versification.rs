//! Versification schemes.
//!
//! A [`Versification`] records how many chapters each book has, how many
//! verses each chapter has, which verses are excluded, which verses are split
//! into segments, and how its verses map onto the standard (`Original`)
//! scheme. Schemes are built by the [loader](crate::storage::loader) and
//! shared as `Arc<Versification>`.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::{Arc, LazyLock},
};

use non_empty_string::NonEmptyString;
use nonempty::NonEmpty;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{book_set::BookSet, canon, verse_ref::VerseRef};

mod mappings;

pub use mappings::{MappedVerse, MappingRange, Mappings};

/// Last chapter and last verse reported for books that hold no Scripture
/// text (front matter, glossaries and the like).
pub const NON_CANONICAL_LAST_CHAPTER_OR_VERSE: i32 = 998;

/// The well-known versification schemes.
///
/// The discriminants are the codes used by the `/N` suffix of a
/// [`VerseRef`] string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VersificationType {
    /// Any scheme that is not built in.
    #[default]
    Unknown = 0,
    /// Hebrew Old Testament and Greek New Testament. The standard scheme.
    Original = 1,
    /// Greek Old Testament.
    Septuagint = 2,
    /// Latin Vulgate.
    Vulgate = 3,
    /// Most modern English Bibles.
    English = 4,
    /// Russian Synodal, Protestant edition.
    RussianProtestant = 5,
    /// Russian Synodal, Orthodox edition.
    RussianOrthodox = 6,
}

impl VersificationType {
    /// The built-in schemes, in the order the registry lists them.
    pub const BUILT_IN: [Self; 6] = [
        Self::English,
        Self::Original,
        Self::Septuagint,
        Self::Vulgate,
        Self::RussianOrthodox,
        Self::RussianProtestant,
    ];

    /// The type named by `name`, or [`VersificationType::Unknown`].
    ///
    /// ```
    /// use scripture::VersificationType;
    ///
    /// assert_eq!(VersificationType::from_name("Septuagint"), VersificationType::Septuagint);
    /// assert_eq!(VersificationType::from_name("Monkey"), VersificationType::Unknown);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self::BUILT_IN
            .into_iter()
            .find(|kind| kind.name() == name)
            .unwrap_or_default()
    }

    /// The type with the given `/N` code.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Unknown),
            1 => Some(Self::Original),
            2 => Some(Self::Septuagint),
            3 => Some(Self::Vulgate),
            4 => Some(Self::English),
            5 => Some(Self::RussianProtestant),
            6 => Some(Self::RussianOrthodox),
            _ => None,
        }
    }

    /// The `/N` code.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// The scheme name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Original => "Original",
            Self::Septuagint => "Septuagint",
            Self::Vulgate => "Vulgate",
            Self::English => "English",
            Self::RussianProtestant => "RussianProtestant",
            Self::RussianOrthodox => "RussianOrthodox",
        }
    }
}

impl fmt::Display for VersificationType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A versification scheme.
#[derive(Debug, Clone)]
pub struct Versification {
    name: NonEmptyString,
    kind: VersificationType,
    base: Option<Arc<Self>>,
    books: Vec<Vec<i32>>,
    excluded: BTreeSet<i32>,
    segments: BTreeMap<i32, NonEmpty<String>>,
    mappings: Mappings,
}

impl Versification {
    /// An empty scheme. The type is derived from the name.
    pub(crate) fn new(name: NonEmptyString) -> Self {
        let kind = VersificationType::from_name(name.as_str());
        Self {
            name,
            kind,
            base: None,
            books: Vec::new(),
            excluded: BTreeSet::new(),
            segments: BTreeMap::new(),
            mappings: Mappings::default(),
        }
    }

    /// A copy of `base` under a new name, ready to be customized.
    pub(crate) fn customize(base: &Arc<Self>, name: NonEmptyString) -> Self {
        Self {
            name,
            kind: VersificationType::Unknown,
            base: Some(Arc::clone(base)),
            books: base.books.clone(),
            excluded: base.excluded.clone(),
            segments: base.segments.clone(),
            mappings: base.mappings.clone(),
        }
    }

    /// The scheme name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The built-in type, or [`VersificationType::Unknown`].
    #[must_use]
    pub const fn kind(&self) -> VersificationType {
        self.kind
    }

    /// The scheme this one customizes, if any.
    #[must_use]
    pub const fn base(&self) -> Option<&Arc<Self>> {
        self.base.as_ref()
    }

    /// Whether this scheme was layered over a base scheme.
    #[must_use]
    pub const fn is_customized(&self) -> bool {
        self.base.is_some()
    }

    /// Number of the last book with a chapter table.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn last_book(&self) -> i32 {
        self.books.len() as i32
    }

    /// Number of the last chapter of a book.
    ///
    /// Books without a chapter table have one chapter; non-canonical books
    /// have [`NON_CANONICAL_LAST_CHAPTER_OR_VERSE`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn last_chapter(&self, book: i32) -> i32 {
        if !canon::is_canonical(book) {
            return NON_CANONICAL_LAST_CHAPTER_OR_VERSE;
        }
        self.chapters(book).map_or(1, |chapters| chapters.len() as i32)
    }

    /// Number of the last verse of a chapter.
    ///
    /// Chapters outside the table have one verse; non-canonical books have
    /// [`NON_CANONICAL_LAST_CHAPTER_OR_VERSE`].
    #[must_use]
    pub fn last_verse(&self, book: i32, chapter: i32) -> i32 {
        if !canon::is_canonical(book) {
            return NON_CANONICAL_LAST_CHAPTER_OR_VERSE;
        }
        self.chapters(book)
            .and_then(|chapters| {
                usize::try_from(chapter)
                    .ok()
                    .and_then(|chapter| chapter.checked_sub(1))
                    .and_then(|index| chapters.get(index))
            })
            .copied()
            .unwrap_or(1)
    }

    /// Whether a packed `BBBCCCVVV` verse is excluded.
    #[must_use]
    pub fn is_excluded(&self, bbbcccvvv: i32) -> bool {
        self.excluded.contains(&bbbcccvvv)
    }

    /// The segments declared for a packed `BBBCCCVVV` verse. An empty label
    /// stands for the unmarked part of the verse.
    #[must_use]
    pub fn verse_segments(&self, bbbcccvvv: i32) -> Option<&NonEmpty<String>> {
        self.segments.get(&bbbcccvvv)
    }

    /// Whether any verse is split into segments.
    #[must_use]
    pub fn has_verse_segments(&self) -> bool {
        !self.segments.is_empty()
    }

    /// Per-book chapter tables, indexed by book number minus one. Each table
    /// holds the last verse of every chapter.
    #[must_use]
    pub fn books(&self) -> &[Vec<i32>] {
        &self.books
    }

    /// The excluded verses, packed as `BBBCCCVVV`.
    #[must_use]
    pub const fn excluded_verses(&self) -> &BTreeSet<i32> {
        &self.excluded
    }

    /// The segmented verses, keyed by packed `BBBCCCVVV`.
    #[must_use]
    pub const fn segments(&self) -> &BTreeMap<i32, NonEmpty<String>> {
        &self.segments
    }

    /// The mappings to the standard versification.
    #[must_use]
    pub const fn mappings(&self) -> &Mappings {
        &self.mappings
    }

    /// The Scripture books that have real content in this scheme, i.e.
    /// anything but the one-chapter, one-verse placeholder.
    #[must_use]
    pub fn scripture_books(&self) -> BookSet {
        BookSet::scripture_books()
            .books()
            .filter(|&book| self.last_chapter(book) != 1 || self.last_verse(book, 1) != 1)
            .collect()
    }

    /// The first verse at or after `chapter` that is not excluded, skipping
    /// chapters without verses.
    #[must_use]
    pub fn first_included_verse(self: &Arc<Self>, book: i32, chapter: i32) -> Option<VerseRef> {
        (chapter..=self.last_chapter(book)).find_map(|chapter| {
            let last_verse = self.last_verse(book, chapter);
            (1..=last_verse)
                .find(|&verse| !self.is_excluded(VerseRef::pack(book, chapter, verse)))
                .and_then(|verse| VerseRef::new(book, chapter, verse, self).ok())
        })
    }

    /// Moves a single reference into this scheme.
    ///
    /// The reference is mapped to the standard scheme through its own
    /// mappings, then from the standard scheme through this one's. A verse
    /// that both schemes map to the same standard verse, and that exists in
    /// this scheme, is only retagged.
    #[instrument(level = "trace", skip(self), fields(scheme = self.name()))]
    pub fn change_versification(self: &Arc<Self>, vref: &mut VerseRef) {
        let source = match vref.versification() {
            Some(source) if !vref.is_default() && !Arc::ptr_eq(source, self) => Arc::clone(source),
            _ => {
                vref.set_versification(Some(Arc::clone(self)));
                return;
            }
        };

        let original = MappedVerse::of(vref);
        let standard = source
            .mappings
            .standard(&original)
            .cloned()
            .unwrap_or_else(|| original.clone());
        let standard_here = self
            .mappings
            .standard(&original)
            .unwrap_or(&original);

        if vref.book() != "ESG" && &standard == standard_here && self.contains(vref) {
            vref.set_versification(Some(Arc::clone(self)));
            return;
        }

        let target = self
            .mappings
            .versification(&standard)
            .cloned()
            .unwrap_or(standard);
        if target != original {
            tracing::trace!(from = %original, to = %target, "mapped verse");
            vref.assign(&target);
        }
        vref.set_versification(Some(Arc::clone(self)));
    }

    /// Moves a reference that may hold a bridge or a list into this scheme,
    /// mapping each verse separately.
    ///
    /// Returns the new reference and whether every part landed in the same
    /// chapter as the first. When they do not, the new verse text mixes
    /// verse numbers from different chapters (`GEN 31:54-1`).
    #[must_use]
    pub fn change_versification_with_ranges(self: &Arc<Self>, vref: &VerseRef) -> (VerseRef, bool) {
        let text = vref.verse();
        let parts = split_keeping_separators(&text);

        let mut result = vref.clone();
        result.set_verse(&parts[0]);
        self.change_versification(&mut result);

        let mut all_same_chapter = true;
        let mut combined = result.verse();
        for pair in parts[1..].chunks(2) {
            let [separator, part] = pair else { break };
            let mut piece = vref.clone();
            piece.set_verse(part);
            self.change_versification(&mut piece);
            all_same_chapter &= result.chapter_num() == piece.chapter_num();
            combined.push_str(separator);
            combined.push_str(&piece.verse());
        }
        result.set_verse(&combined);
        (result, all_same_chapter)
    }

    fn contains(&self, vref: &VerseRef) -> bool {
        vref.book_num() <= self.last_book()
            && vref.chapter_num() <= self.last_chapter(vref.book_num())
            && vref.verse_num() <= self.last_verse(vref.book_num(), vref.chapter_num())
    }

    fn chapters(&self, book: i32) -> Option<&Vec<i32>> {
        usize::try_from(book)
            .ok()
            .and_then(|book| book.checked_sub(1))
            .and_then(|index| self.books.get(index))
    }

    /// The chapter table of a book, creating placeholder tables (one chapter
    /// of one verse) up to it.
    pub(crate) fn chapters_mut(&mut self, book: i32) -> &mut Vec<i32> {
        let index = usize::try_from(book.max(1) - 1).unwrap_or_default();
        while self.books.len() <= index {
            self.books.push(vec![1]);
        }
        &mut self.books[index]
    }

    /// Marks a verse excluded. Returns `false` if it already was.
    pub(crate) fn exclude(&mut self, bbbcccvvv: i32) -> bool {
        self.excluded.insert(bbbcccvvv)
    }

    /// Declares the segments of a verse, returning the previous declaration.
    pub(crate) fn set_segments(
        &mut self,
        bbbcccvvv: i32,
        segments: NonEmpty<String>,
    ) -> Option<NonEmpty<String>> {
        self.segments.insert(bbbcccvvv, segments)
    }

    /// Whether a verse already has segments.
    pub(crate) fn has_segments(&self, bbbcccvvv: i32) -> bool {
        self.segments.contains_key(&bbbcccvvv)
    }

    pub(crate) const fn mappings_mut(&mut self) -> &mut Mappings {
        &mut self.mappings
    }
}

impl PartialEq for Versification {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.books == other.books
            && self.excluded == other.excluded
            && self.segments == other.segments
            && self.mappings == other.mappings
    }
}

impl Eq for Versification {}

impl fmt::Display for Versification {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name.as_str())
    }
}

/// Splits verse text at `,` and `-`, keeping each separator as its own part.
fn split_keeping_separators(text: &str) -> Vec<String> {
    static SEPARATOR: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new("[,-]").ok());
    let Some(separator) = SEPARATOR.as_ref() else {
        return vec![text.to_string()];
    };

    let mut parts = Vec::new();
    let mut last = 0;
    for found in separator.find_iter(text) {
        parts.push(text[last..found.start()].to_string());
        parts.push(found.as_str().to_string());
        last = found.end();
    }
    parts.push(text[last..].to_string());
    parts
}

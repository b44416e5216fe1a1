//! Ordering and overlap of references.

use std::cmp::Ordering;

use super::{RANGE_SEPARATOR, SEQUENCE_SEPARATOR, VerseRef, numerals};
use crate::{domain::versification::VersificationType, storage::registry::Registry};

const RANGE_SEPARATORS: [char; 3] = [RANGE_SEPARATOR, '\u{2013}', '\u{2014}'];

/// How [`VerseRef::compare`] orders two references in the same chapter.
#[derive(Debug, Clone, Copy)]
pub struct CompareOptions<'a> {
    segment_order: Option<&'a [&'a str]>,
    compare_all_verses: bool,
    compare_segments: bool,
}

impl Default for CompareOptions<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CompareOptions<'a> {
    /// Compares the first verse of a bridge, then its segment in ordinal
    /// order.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            segment_order: None,
            compare_all_verses: false,
            compare_segments: true,
        }
    }

    /// Orders segments by their position in `order` instead of ordinally.
    #[must_use]
    pub const fn segment_order(mut self, order: &'a [&'a str]) -> Self {
        self.segment_order = Some(order);
        self
    }

    /// Compares every verse number of a bridge or list, ignoring segments.
    #[must_use]
    pub const fn compare_all_verses(mut self, compare_all_verses: bool) -> Self {
        self.compare_all_verses = compare_all_verses;
        self
    }

    /// Whether segments break ties between equal verse numbers.
    #[must_use]
    pub const fn compare_segments(mut self, compare_segments: bool) -> Self {
        self.compare_segments = compare_segments;
        self
    }
}

impl VerseRef {
    /// Orders two references.
    ///
    /// References in different versifications are both converted to the
    /// `Original` versification first. Within a verse an unsegmented verse
    /// sorts before its segments, and a bridge sorts after a shorter bridge
    /// or single verse with the same start.
    ///
    /// ```
    /// use std::cmp::Ordering;
    ///
    /// use scripture::{CompareOptions, VerseRef};
    ///
    /// let first = VerseRef::parse("GEN 1:1").unwrap();
    /// let segment = VerseRef::parse("GEN 1:1a").unwrap();
    ///
    /// assert_eq!(first.compare(&segment, CompareOptions::new()), Ordering::Less);
    /// assert_eq!(
    ///     first.compare(&segment, CompareOptions::new().compare_segments(false)),
    ///     Ordering::Equal
    /// );
    /// ```
    #[must_use]
    pub fn compare(&self, other: &Self, options: CompareOptions<'_>) -> Ordering {
        let translated = self.in_original_with(other);
        let (this, other) = match &translated {
            Some((this, other)) => (this, other),
            None => (self, other),
        };

        this.book
            .cmp(&other.book)
            .then(this.chapter.cmp(&other.chapter))
            .then_with(|| {
                if options.compare_all_verses {
                    this.all_verse_numbers().cmp(&other.all_verse_numbers())
                } else {
                    this.verse
                        .cmp(&other.verse)
                        .then_with(|| this.compare_segment(other, options))
                        .then_with(|| this.all_verse_numbers().cmp(&other.all_verse_numbers()))
                }
            })
    }

    /// Both references in the `Original` versification, when their
    /// versifications differ.
    fn in_original_with(&self, other: &Self) -> Option<(Self, Self)> {
        if self.versification.is_none()
            || other.versification.is_none()
            || self.versification_name() == other.versification_name()
        {
            return None;
        }
        let original = Registry::global()
            .get(VersificationType::Original)
            .inspect_err(|e| tracing::debug!(error = %e, "Comparing without translation"))
            .ok()?;
        let translate = |vref: &Self| {
            let mut translated = vref.clone();
            translated.change_versification(&original);
            translated
        };
        Some((translate(self), translate(other)))
    }

    fn compare_segment(&self, other: &Self, options: CompareOptions<'_>) -> Ordering {
        if !options.compare_segments {
            return Ordering::Equal;
        }

        let defaults = options.segment_order.unwrap_or_default();
        let mine = self.segment_from(defaults);
        let theirs = other.segment_from(defaults);
        match (mine.is_empty(), theirs.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => match options.segment_order {
                Some(order) => {
                    let order = self.segments(order);
                    let position = |segment: &str| order.iter().position(|label| label == segment);
                    position(&mine).cmp(&position(&theirs))
                }
                None => mine.cmp(&theirs),
            },
        }
    }

    fn all_verse_numbers(&self) -> Vec<i32> {
        match self.text.as_deref().filter(|text| !text.is_empty()) {
            Some(text) => numerals::digit_runs(text),
            None => vec![self.verse],
        }
    }

    /// Whether the two references share a verse. Both must be in the same
    /// chapter.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        if self.is_default() || other.is_default() {
            return false;
        }
        if self.book != other.book || self.chapter != other.chapter {
            return false;
        }
        if self.text.is_none() && other.text.is_none() {
            return self.verse == other.verse;
        }
        are_overlapping_verse_ranges(&self.verse(), &other.verse())
    }

    /// Whether any of `others` overlaps this reference.
    #[must_use]
    pub fn overlaps_any(&self, others: &[Self]) -> bool {
        others.iter().any(|other| self.overlaps(other))
    }

    /// Whether this reference falls between `start` and `end` inclusive.
    ///
    /// With `exact` a reference at either end must equal it; otherwise
    /// sharing the first verse or overlapping is enough.
    #[must_use]
    pub fn in_range(&self, start: &Self, end: &Self, exact: bool) -> bool {
        let options = CompareOptions::new();
        if start.compare(self, options).is_lt() && self.compare(end, options).is_lt() {
            return true;
        }
        if exact {
            return start == self || end == self;
        }
        self.bbbcccvvv() == start.bbbcccvvv()
            || self.bbbcccvvv() == end.bbbcccvvv()
            || self.overlaps_any(&[start.clone(), end.clone()])
    }
}

/// Orders by [`VerseRef::compare`] with the default options. References that
/// compare equal without being equal, such as the same verse in two
/// versifications, are unordered.
impl PartialOrd for VerseRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.compare(other, CompareOptions::default()) {
            Ordering::Equal if self != other => None,
            ordering => Some(ordering),
        }
    }
}

/// Whether two verse texts (`1`, `1a`, `1-2c`, `1,3-5`) share a verse.
///
/// An unsegmented verse overlaps each of its segments, but two different
/// segments of a verse do not overlap.
///
/// ```
/// use scripture::are_overlapping_verse_ranges;
///
/// assert!(are_overlapping_verse_ranges("1b", "1-2c"));
/// assert!(are_overlapping_verse_ranges("1-3", "2-4"));
/// assert!(!are_overlapping_verse_ranges("1a", "1b"));
/// ```
#[must_use]
pub fn are_overlapping_verse_ranges(first: &str, second: &str) -> bool {
    first.split(SEQUENCE_SEPARATOR).any(|first| {
        let first = VerseRange::parse(first);
        second
            .split(SEQUENCE_SEPARATOR)
            .any(|second| first.overlaps(&VerseRange::parse(second)))
    })
}

/// A verse number or bridge with optional segments at either end.
struct VerseRange<'a> {
    start: (i32, &'a str),
    end: (i32, &'a str),
}

impl<'a> VerseRange<'a> {
    fn parse(text: &'a str) -> Self {
        let mut parts = text.split(RANGE_SEPARATORS);
        let start = numerals::split_segment(parts.next().unwrap_or_default());
        let end = parts.next().map_or(start, numerals::split_segment);
        Self { start, end }
    }

    const fn is_single(&self) -> bool {
        self.start.0 == self.end.0
    }

    fn overlaps(&self, other: &Self) -> bool {
        if self.is_single()
            && other.is_single()
            && self.start.1 == self.end.1
            && other.start.1 == other.end.1
        {
            let (verse, segment) = self.start;
            let (other_verse, other_segment) = other.start;
            return verse == other_verse
                && (segment.is_empty() || other_segment.is_empty() || segment == other_segment);
        }

        other.contains(self.start)
            || other.contains(self.end)
            || self.contains(other.start)
            || self.contains(other.end)
    }

    fn contains(&self, (verse, segment): (i32, &str)) -> bool {
        let (first, first_segment) = self.start;
        let (last, last_segment) = self.end;
        if verse < first || verse > last {
            return false;
        }
        if verse == first && !segment.is_empty() && !first_segment.is_empty() && segment < first_segment
        {
            return false;
        }
        !(verse == last && !segment.is_empty() && !last_segment.is_empty() && segment > last_segment)
    }
}

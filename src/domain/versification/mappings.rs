use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use crate::domain::{canon, verse_ref::VerseRef};

/// A single verse as it appears on either side of a mapping.
///
/// Mappings ignore versification, so a key is just the book, chapter and
/// verse number plus the verse text when it carries more than a number
/// (`ESG 1:1b`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MappedVerse {
    book: i32,
    chapter: i32,
    verse: i32,
    text: Option<String>,
}

impl MappedVerse {
    /// A mapped verse with a plain verse number.
    #[must_use]
    pub const fn new(book: i32, chapter: i32, verse: i32) -> Self {
        Self {
            book,
            chapter,
            verse,
            text: None,
        }
    }

    /// The mapping key of a reference.
    #[must_use]
    pub fn of(vref: &VerseRef) -> Self {
        Self {
            book: vref.book_num(),
            chapter: vref.chapter_num(),
            verse: vref.verse_num(),
            text: vref.verse_text().map(str::to_string),
        }
    }

    /// Book number.
    #[must_use]
    pub const fn book(&self) -> i32 {
        self.book
    }

    /// Chapter number.
    #[must_use]
    pub const fn chapter(&self) -> i32 {
        self.chapter
    }

    /// Verse number.
    #[must_use]
    pub const fn verse(&self) -> i32 {
        self.verse
    }

    /// Verse text, if the verse is more than a plain number.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// The next verse number in the same chapter, dropping any verse text.
    #[must_use]
    pub(crate) const fn successor(&self) -> Self {
        Self::new(self.book, self.chapter, self.verse + 1)
    }

    fn verse_label(&self) -> String {
        self.text
            .clone()
            .unwrap_or_else(|| self.verse.to_string())
    }
}

impl fmt::Display for MappedVerse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {}:{}",
            canon::book_number_to_id(self.book).unwrap_or_default(),
            self.chapter,
            self.verse_label()
        )
    }
}

/// Verse mappings between a versification and the standard (`Original`)
/// versification, held in both directions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mappings {
    to_standard: BTreeMap<MappedVerse, MappedVerse>,
    from_standard: BTreeMap<MappedVerse, MappedVerse>,
}

impl Mappings {
    /// Maps a verse of this versification to a standard verse, replacing any
    /// earlier mapping in either direction.
    pub fn add(&mut self, vers: MappedVerse, standard: MappedVerse) {
        self.to_standard.insert(vers.clone(), standard.clone());
        self.from_standard.insert(standard, vers);
    }

    /// Maps every verse on one side to every verse on the other.
    ///
    /// Pairs are added last-to-first so that, for a one-to-many or
    /// many-to-one mapping, the first verse of the range wins the reverse
    /// lookup.
    pub fn add_many(&mut self, vers: &[MappedVerse], standard: &[MappedVerse]) {
        for v in vers.iter().rev() {
            for s in standard.iter().rev() {
                self.add(v.clone(), s.clone());
            }
        }
    }

    /// The standard verse a verse of this versification maps to.
    #[must_use]
    pub fn standard(&self, vers: &MappedVerse) -> Option<&MappedVerse> {
        self.to_standard.get(vers)
    }

    /// The verse of this versification a standard verse maps to.
    #[must_use]
    pub fn versification(&self, standard: &MappedVerse) -> Option<&MappedVerse> {
        self.from_standard.get(standard)
    }

    /// Whether no mapping has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_standard.is_empty() && self.from_standard.is_empty()
    }

    /// The versification-to-standard table.
    #[must_use]
    pub const fn to_standard(&self) -> &BTreeMap<MappedVerse, MappedVerse> {
        &self.to_standard
    }

    /// The standard-to-versification table.
    #[must_use]
    pub const fn from_standard(&self) -> &BTreeMap<MappedVerse, MappedVerse> {
        &self.from_standard
    }

    /// Collapses the mappings into range lines.
    ///
    /// Pairs only held in the forward table come first, then pairs only held
    /// in the reverse table, then pairs both tables agree on. Replaying the
    /// lines through [`Mappings::add`] in this order rebuilds both tables.
    #[must_use]
    pub fn mapping_ranges(&self) -> Vec<MappingRange> {
        let mut forward_only = BTreeSet::new();
        let mut reverse_only = BTreeSet::new();
        let mut agreed = BTreeSet::new();

        for (vers, standard) in &self.to_standard {
            if self.from_standard.get(standard) == Some(vers) {
                agreed.insert((vers.clone(), standard.clone()));
            } else {
                forward_only.insert((vers.clone(), standard.clone()));
            }
        }
        for (standard, vers) in &self.from_standard {
            if self.to_standard.get(vers) != Some(standard) {
                reverse_only.insert((vers.clone(), standard.clone()));
            }
        }

        let mut ranges = merge_contiguous(forward_only);
        ranges.extend(merge_contiguous(reverse_only));
        ranges.extend(merge_contiguous(agreed));
        ranges
    }
}

/// A run of consecutive verse mappings, written as one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRange {
    /// First verse of this versification.
    pub vers: MappedVerse,
    /// First standard verse.
    pub standard: MappedVerse,
    /// Number of verses in the run.
    pub len: i32,
}

impl fmt::Display for MappingRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.len <= 1 {
            return write!(f, "{} = {}", self.vers, self.standard);
        }
        let last = self.len - 1;
        write!(
            f,
            "{}-{} = {}-{}",
            self.vers,
            self.vers.verse + last,
            self.standard,
            self.standard.verse + last
        )
    }
}

fn merge_contiguous(pairs: BTreeSet<(MappedVerse, MappedVerse)>) -> Vec<MappingRange> {
    let mut ranges: Vec<MappingRange> = Vec::new();
    for (vers, standard) in pairs {
        if let Some(current) = ranges.last_mut() {
            let offset = current.len;
            let plain = vers.text.is_none()
                && standard.text.is_none()
                && current.vers.text.is_none()
                && current.standard.text.is_none();
            let next_vers = MappedVerse::new(
                current.vers.book,
                current.vers.chapter,
                current.vers.verse + offset,
            );
            let next_standard = MappedVerse::new(
                current.standard.book,
                current.standard.chapter,
                current.standard.verse + offset,
            );
            if plain && vers == next_vers && standard == next_standard {
                current.len += 1;
                continue;
            }
        }
        ranges.push(MappingRange {
            vers,
            standard,
            len: 1,
        });
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verse(book: i32, chapter: i32, verse: i32) -> MappedVerse {
        MappedVerse::new(book, chapter, verse)
    }

    #[test]
    fn contiguous_pairs_merge_into_one_range() {
        let mut mappings = Mappings::default();
        for offset in 0..4 {
            mappings.add(verse(2, 8, 1 + offset), verse(2, 7, 26 + offset));
        }
        mappings.add(verse(2, 8, 5), verse(2, 8, 1));

        let lines: Vec<String> = mappings
            .mapping_ranges()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(lines, vec!["EXO 8:1-4 = EXO 7:26-29", "EXO 8:5 = EXO 8:1"]);
    }

    #[test]
    fn many_to_one_keeps_first_verse_for_reverse_lookup() {
        let mut mappings = Mappings::default();
        mappings.add_many(
            &[verse(44, 19, 39), verse(44, 19, 40), verse(44, 19, 41)],
            &[verse(44, 19, 40)],
        );

        assert_eq!(
            mappings.versification(&verse(44, 19, 40)),
            Some(&verse(44, 19, 39))
        );
        assert_eq!(mappings.standard(&verse(44, 19, 41)), Some(&verse(44, 19, 40)));
    }

    #[test]
    fn one_directional_pairs_are_written_first() {
        let mut mappings = Mappings::default();
        mappings.add_many(&[verse(44, 19, 39), verse(44, 19, 40)], &[verse(44, 19, 38)]);

        let lines: Vec<String> = mappings
            .mapping_ranges()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            lines,
            vec!["ACT 19:40 = ACT 19:38", "ACT 19:39 = ACT 19:38"]
        );
    }

    #[test]
    fn replaying_ranges_rebuilds_both_tables() {
        let mut mappings = Mappings::default();
        mappings.add_many(
            &[verse(44, 19, 39)],
            &[verse(44, 19, 38), verse(44, 19, 39), verse(44, 19, 40)],
        );
        mappings.add(verse(19, 3, 1), verse(19, 3, 2));
        mappings.add(verse(19, 3, 2), verse(19, 3, 3));

        let mut replayed = Mappings::default();
        for range in mappings.mapping_ranges() {
            for offset in 0..range.len {
                let vers = MappedVerse {
                    verse: range.vers.verse + offset,
                    ..range.vers.clone()
                };
                let standard = MappedVerse {
                    verse: range.standard.verse + offset,
                    ..range.standard.clone()
                };
                replayed.add(vers, standard);
            }
        }
        assert_eq!(replayed, mappings);
    }

    #[test]
    fn verse_text_is_displayed_and_never_merged() {
        let mut mappings = Mappings::default();
        let segmented = MappedVerse {
            text: Some("1b".to_string()),
            ..verse(69, 1, 1)
        };
        mappings.add(segmented.clone(), verse(69, 1, 2));

        assert_eq!(segmented.to_string(), "ESG 1:1b");
        assert_eq!(
            mappings.mapping_ranges()[0].to_string(),
            "ESG 1:1b = ESG 1:2"
        );
    }
}

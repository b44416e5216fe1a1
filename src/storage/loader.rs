//! Reads versification schemes from the `.vrs` text format.
//!
//! ```text
//! # Versification "Name"
//! GEN 1:31 2:25 3:24            # last verse of each chapter
//! GEN 31:55 = GEN 32:1          # mapping to the standard versification
//! &ACT 19:39-41 = ACT 19:40     # many-to-one mapping
//! -GEN 1:30                     # excluded verse
//! *GEN 1:5,-,a,b                # verse segments, '-' is the unmarked part
//! ```
//!
//! A line starting with `#!` is read as content, which lets written files
//! keep exclusions and segments out of sight of older readers. The first
//! malformed line aborts the whole load.

use std::{
    fmt,
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
    sync::LazyLock,
};

use non_empty_string::NonEmptyString;
use nonempty::NonEmpty;
use regex::Regex;
use tracing::instrument;

use crate::domain::{
    canon,
    verse_ref::{MAX_VERSE, VerseRef},
    versification::{MappedVerse, Versification},
};

const COMMENT: char = '#';
const EXCLUDED: char = '-';
const SEGMENTS: char = '*';
const UNSPECIFIED_SEGMENT: &str = "-";
const SEGMENT_SEPARATOR: char = ',';
const MAPPING: char = '=';
const EXTENSION: char = '!';
const CHAPTER_VERSE_SEPARATOR: char = ':';

static NAME_HEADER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"^#\s*Versification\s+"(?P<name>[^"]+)"\s*$"#).ok()
});

/// Reads `.vrs` text into a [`Versification`].
///
/// ```
/// use scripture::storage::loader::Loader;
///
/// let text = "# Versification \"Short\"\nGEN 1:31 2:25\n";
/// let versification = Loader::new().load_str(text).unwrap();
/// assert_eq!(versification.name(), "Short");
/// assert_eq!(versification.last_verse(1, 2), 25);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Loader<'a> {
    source: Option<&'a str>,
    fallback_name: Option<&'a str>,
    strict: bool,
}

impl<'a> Loader<'a> {
    /// A loader with no source, no fallback name and overwriting segments.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            source: None,
            fallback_name: None,
            strict: false,
        }
    }

    /// Names where the text came from. Reported in errors.
    #[must_use]
    pub const fn source(mut self, source: &'a str) -> Self {
        self.source = Some(source);
        self
    }

    /// The scheme name to use when the text has no name header.
    #[must_use]
    pub const fn fallback_name(mut self, name: &'a str) -> Self {
        self.fallback_name = Some(name);
        self
    }

    /// Rejects a segment line for a verse that already has segments, instead
    /// of replacing them. Built-in data is loaded strictly.
    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Reads a scheme.
    ///
    /// # Errors
    ///
    /// Returns an error for the first malformed line, or if reading fails.
    pub fn load<R: BufRead>(&self, reader: &mut R) -> Result<Versification, LoadError> {
        self.read(None, reader.lines())
    }

    /// Reads a scheme from a string.
    ///
    /// # Errors
    ///
    /// Returns an error for the first malformed line.
    pub fn load_str(&self, text: &str) -> Result<Versification, LoadError> {
        self.read(None, text.lines().map(|line| Ok(line.to_string())))
    }

    /// Reads a scheme from a file. The path is the source unless one was set.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or holds a malformed line.
    pub fn load_path(&self, path: &Path) -> Result<Versification, LoadError> {
        let file = File::open(path)?;
        let display = path.display().to_string();
        let loader = Loader {
            source: self.source.or(Some(display.as_str())),
            fallback_name: self.fallback_name,
            strict: self.strict,
        };
        loader.read(None, BufReader::new(file).lines())
    }

    /// Reads lines on top of an existing scheme. The header name is ignored.
    pub(crate) fn load_onto<I>(
        &self,
        versification: Versification,
        lines: I,
    ) -> Result<Versification, LoadError>
    where
        I: IntoIterator<Item = io::Result<String>>,
    {
        self.read(Some(versification), lines)
    }

    #[instrument(level = "debug", skip(self, versification, lines), fields(source = self.source))]
    fn read<I>(
        &self,
        mut versification: Option<Versification>,
        lines: I,
    ) -> Result<Versification, LoadError>
    where
        I: IntoIterator<Item = io::Result<String>>,
    {
        for line in lines {
            self.process_line(&line?, &mut versification)?;
        }
        let versification = versification
            .or_else(|| self.fallback())
            .ok_or_else(|| self.error(LoadErrorKind::MissingName, ""))?;
        tracing::debug!(
            name = versification.name(),
            books = versification.last_book(),
            "Loaded versification"
        );
        Ok(versification)
    }

    fn process_line(
        &self,
        raw: &str,
        versification: &mut Option<Versification>,
    ) -> Result<(), LoadError> {
        if versification.is_none() {
            *versification = header_name(raw).map(Versification::new);
        }

        let parsed = parse_line(raw);
        if parsed.kind == LineKind::Comment {
            return Ok(());
        }

        if versification.is_none() {
            *versification = Some(
                self.fallback()
                    .ok_or_else(|| self.error(LoadErrorKind::MissingName, &parsed.line))?,
            );
        }
        let Some(versification) = versification.as_mut() else {
            return Err(self.error(LoadErrorKind::MissingName, &parsed.line));
        };

        tracing::trace!(kind = ?parsed.kind, line = %parsed.line, "Versification line");
        let line = parsed.line.as_str();
        let result = match parsed.kind {
            LineKind::Comment => Ok(()),
            LineKind::ChapterVerse => chapter_verse_line(versification, line),
            LineKind::StandardMapping => mapping_line(versification, line),
            LineKind::OneToManyMapping => many_mapping_line(versification, line),
            LineKind::ExcludedVerse => excluded_verse_line(versification, line),
            LineKind::VerseSegments if line.contains(COMMENT) => Err(LoadErrorKind::InvalidSyntax),
            LineKind::VerseSegments => segments_line(versification, line, self.strict),
        };
        result.map_err(|kind| self.error(kind, line))
    }

    fn fallback(&self) -> Option<Versification> {
        self.fallback_name
            .and_then(|name| NonEmptyString::new(name.to_string()).ok())
            .map(Versification::new)
    }

    fn error(&self, kind: LoadErrorKind, line: &str) -> LoadError {
        LoadError::Line {
            kind,
            line: line.to_string(),
            file: self.source.map(str::to_string),
        }
    }
}

fn header_name(line: &str) -> Option<NonEmptyString> {
    let captures = NAME_HEADER.as_ref()?.captures(line)?;
    NonEmptyString::new(captures.name("name")?.as_str().to_string()).ok()
}

/// The shape of a `.vrs` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Blank line or comment.
    Comment,
    /// Last verse of each chapter of a book.
    ChapterVerse,
    /// One-to-one mapping, possibly over a range.
    StandardMapping,
    /// Many-to-one or one-to-many mapping, starting with `&`.
    OneToManyMapping,
    /// Excluded verse, starting with `-`.
    ExcludedVerse,
    /// Verse segments, starting with `*`.
    VerseSegments,
}

/// A classified `.vrs` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// The shape of the line.
    pub kind: LineKind,
    /// The content, without its trailing comment.
    pub line: String,
    /// The trailing comment, without the `#`.
    pub comment: String,
}

impl fmt::Display for ParsedLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            LineKind::ChapterVerse => f.write_str(&self.line),
            LineKind::OneToManyMapping => write!(f, "#! {}", self.line),
            LineKind::Comment if self.comment.is_empty() => Ok(()),
            LineKind::Comment => write!(f, "# {}", self.comment),
            _ if self.comment.is_empty() => f.write_str(&self.line),
            _ => write!(f, "{} # {}", self.line, self.comment),
        }
    }
}

/// Classifies a line.
///
/// ```
/// use scripture::storage::loader::{parse_line, LineKind};
///
/// let parsed = parse_line("GEN 31:55 = GEN 32:1 # Hebrew numbering");
/// assert_eq!(parsed.kind, LineKind::StandardMapping);
/// assert_eq!(parsed.comment, "Hebrew numbering");
///
/// assert_eq!(parse_line("#! -GEN 1:30").kind, LineKind::ExcludedVerse);
/// ```
#[must_use]
pub fn parse_line(line: &str) -> ParsedLine {
    let trimmed = line.trim();
    let mut is_comment = trimmed.starts_with(COMMENT);
    let (content, comment) = trimmed
        .split_once(COMMENT)
        .map_or((trimmed, ""), |(content, comment)| (content.trim(), comment.trim()));

    let (content, comment) = match comment.strip_prefix(EXTENSION) {
        Some(extension) if content.is_empty() && comment.chars().count() > 2 => {
            is_comment = false;
            (extension.trim(), "")
        }
        _ => (content, comment),
    };

    let kind = if content.is_empty() || is_comment {
        LineKind::Comment
    } else if content.contains(MAPPING) {
        if content.starts_with('&') {
            LineKind::OneToManyMapping
        } else {
            LineKind::StandardMapping
        }
    } else if content.starts_with(EXCLUDED) {
        LineKind::ExcludedVerse
    } else if content.starts_with(SEGMENTS) {
        LineKind::VerseSegments
    } else {
        LineKind::ChapterVerse
    };

    ParsedLine {
        kind,
        line: content.to_string(),
        comment: comment.to_string(),
    }
}

fn chapter_verse_line(versification: &mut Versification, line: &str) -> Result<(), LoadErrorKind> {
    let mut parts = line.split(' ');
    let book = canon::book_id_to_number(parts.next().unwrap_or_default());
    if book == 0 {
        return Err(LoadErrorKind::InvalidSyntax);
    }

    let mut verses = versification.chapters_mut(book).clone();
    let mut chapter = 0;
    for part in parts {
        if part == "END" {
            verses.truncate(usize::try_from(chapter).unwrap_or_default());
            break;
        }
        let (chapter_text, count_text) = part
            .split_once(CHAPTER_VERSE_SEPARATOR)
            .ok_or(LoadErrorKind::InvalidSyntax)?;
        chapter = chapter_text
            .parse::<i32>()
            .ok()
            .filter(|&chapter| chapter > 0)
            .ok_or(LoadErrorKind::InvalidSyntax)?;
        let count = count_text
            .parse::<i32>()
            .ok()
            .filter(|&count| count >= 0)
            .ok_or(LoadErrorKind::InvalidSyntax)?;

        let index = usize::try_from(chapter - 1).map_err(|_| LoadErrorKind::InvalidSyntax)?;
        if verses.len() <= index {
            verses.resize(index + 1, 1);
        }
        verses[index] = count;
    }

    *versification.chapters_mut(book) = verses;
    Ok(())
}

fn mapping_line(versification: &mut Versification, line: &str) -> Result<(), LoadErrorKind> {
    let (left, right) = line.split_once(MAPPING).ok_or(LoadErrorKind::InvalidSyntax)?;
    let mut left_pieces = left.trim().split('-');
    let right_first = right.trim().split('-').next().unwrap_or_default();

    let mut vers = mapped_verse(left_pieces.next().unwrap_or_default())?;
    let limit = left_pieces.next().map(range_limit).transpose()?.unwrap_or(0);
    let mut standard = mapped_verse(right_first)?;

    loop {
        versification
            .mappings_mut()
            .add(vers.clone(), standard.clone());
        if vers.verse() >= limit {
            break;
        }
        vers = vers.successor();
        standard = standard.successor();
    }
    Ok(())
}

fn many_mapping_line(versification: &mut Versification, line: &str) -> Result<(), LoadErrorKind> {
    let line = line.strip_prefix('&').unwrap_or(line);
    let (left, right) = line.split_once(MAPPING).ok_or(LoadErrorKind::InvalidSyntax)?;
    let vers = expand_range(left)?;
    let standard = expand_range(right)?;

    if vers.len() > 1 && standard.len() > 1 {
        return Err(LoadErrorKind::InvalidManyToOneMap);
    }
    versification.mappings_mut().add_many(&vers, &standard);
    Ok(())
}

fn expand_range(side: &str) -> Result<Vec<MappedVerse>, LoadErrorKind> {
    let mut pieces = side.trim().split('-');
    let first = mapped_verse(pieces.next().unwrap_or_default())?;
    let Some(limit) = pieces.next() else {
        return Ok(vec![first]);
    };
    let limit = range_limit(limit)?;

    let mut verses = vec![first];
    while let Some(next) = verses
        .last()
        .filter(|last| last.verse() < limit)
        .map(MappedVerse::successor)
    {
        verses.push(next);
    }
    Ok(verses)
}

/// The last verse of a range, no larger than a reference can hold.
fn range_limit(text: &str) -> Result<i32, LoadErrorKind> {
    text.trim()
        .parse()
        .ok()
        .filter(|limit| *limit <= MAX_VERSE)
        .ok_or(LoadErrorKind::InvalidSyntax)
}

fn mapped_verse(text: &str) -> Result<MappedVerse, LoadErrorKind> {
    let vref = VerseRef::parse_unversified(text).map_err(|_| LoadErrorKind::InvalidSyntax)?;
    if vref.has_multiple() {
        return Err(LoadErrorKind::InvalidSyntax);
    }
    Ok(MappedVerse::of(&vref))
}

fn excluded_verse_line(versification: &mut Versification, line: &str) -> Result<(), LoadErrorKind> {
    if !has_reference_shape(line, EXCLUDED) {
        return Err(LoadErrorKind::InvalidSyntax);
    }
    let mut parts = line.split(' ');
    let (book, chapter, verse) = verse_reference(parts.next(), parts.next())?;

    if versification.exclude(VerseRef::pack(book, chapter, verse)) {
        Ok(())
    } else {
        Err(LoadErrorKind::DuplicateExcludedVerse)
    }
}

fn segments_line(
    versification: &mut Versification,
    line: &str,
    strict: bool,
) -> Result<(), LoadErrorKind> {
    if !has_reference_shape(line, SEGMENTS) || !line.contains(SEGMENT_SEPARATOR) {
        return Err(LoadErrorKind::InvalidSyntax);
    }

    // spaces after the chapter are insignificant
    let colon = line.find(CHAPTER_VERSE_SEPARATOR).ok_or(LoadErrorKind::InvalidSyntax)?;
    let (head, tail) = line.split_at(colon);
    let line = format!("{head}{}", tail.split_whitespace().collect::<String>());
    let mut parts = line.split_whitespace();
    let book = parts.next();
    let (reference, labels) = parts
        .next()
        .and_then(|part| part.split_once(SEGMENT_SEPARATOR))
        .ok_or(LoadErrorKind::InvalidSyntax)?;
    let (book, chapter, verse) = verse_reference(book, Some(reference))?;

    let mut segments = Vec::new();
    let mut labelled = false;
    for label in labels.split(SEGMENT_SEPARATOR).filter(|label| !label.is_empty()) {
        if label == UNSPECIFIED_SEGMENT {
            if labelled {
                return Err(LoadErrorKind::UnspecifiedSegmentLocation);
            }
            segments.push(String::new());
        } else {
            segments.push(label.to_string());
            labelled = true;
        }
    }
    let segments = NonEmpty::from_vec(segments)
        .filter(|segments| segments.len() > 1 || !segments.head.is_empty())
        .ok_or(LoadErrorKind::NoSegmentsDefined)?;

    let bbbcccvvv = VerseRef::pack(book, chapter, verse);
    if strict && versification.has_segments(bbbcccvvv) {
        return Err(LoadErrorKind::DuplicateSegment);
    }
    versification.set_segments(bbbcccvvv, segments);
    Ok(())
}

fn has_reference_shape(line: &str, marker: char) -> bool {
    line.chars().count() >= 8
        && line.starts_with(marker)
        && line.contains(CHAPTER_VERSE_SEPARATOR)
        && line.contains(' ')
}

/// Reads `*BOOK` or `-BOOK` and `C:V` into numbers.
fn verse_reference(
    book: Option<&str>,
    chapter_verse: Option<&str>,
) -> Result<(i32, i32, i32), LoadErrorKind> {
    let book = book
        .and_then(|book| book.get(1..))
        .map(canon::book_id_to_number)
        .filter(|&book| book != 0)
        .ok_or(LoadErrorKind::InvalidSyntax)?;
    let mut pieces = chapter_verse
        .ok_or(LoadErrorKind::InvalidSyntax)?
        .split(CHAPTER_VERSE_SEPARATOR);
    let mut number = || {
        pieces
            .next()
            .and_then(|piece| piece.parse::<i32>().ok())
            .ok_or(LoadErrorKind::InvalidSyntax)
    };
    let chapter = number()?;
    let verse = number()?;
    Ok((book, chapter, verse))
}

/// Why a versification line was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoadErrorKind {
    /// Content before any name was given.
    #[error("Versification has no name")]
    MissingName,
    /// The line could not be parsed.
    #[error("Invalid versification line")]
    InvalidSyntax,
    /// A verse was excluded twice.
    #[error("Duplicate excluded verse")]
    DuplicateExcludedVerse,
    /// The unmarked segment came after a labelled one.
    #[error("Unmarked segment must come first")]
    UnspecifiedSegmentLocation,
    /// A segment line held no labels.
    #[error("No segments defined")]
    NoSegmentsDefined,
    /// Segments were declared twice for one verse in built-in data.
    #[error("Duplicate segment definition")]
    DuplicateSegment,
    /// Both sides of a `&` mapping were ranges.
    #[error("Invalid many-to-one mapping")]
    InvalidManyToOneMap,
}

/// Errors that can occur when loading a versification.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A line was rejected.
    #[error("{kind}: '{line}'")]
    Line {
        /// Why the line was rejected.
        kind: LoadErrorKind,
        /// The offending line.
        line: String,
        /// Where the text came from, if known.
        file: Option<String>,
    },
    /// The text could not be read.
    #[error("Failed to read versification: {0}")]
    Io(#[from] io::Error),
}

impl LoadError {
    /// Why the line was rejected, if a line was to blame.
    #[must_use]
    pub const fn kind(&self) -> Option<LoadErrorKind> {
        match self {
            Self::Line { kind, .. } => Some(*kind),
            Self::Io(_) => None,
        }
    }

    /// The offending line, if a line was to blame.
    #[must_use]
    pub fn line(&self) -> Option<&str> {
        match self {
            Self::Line { line, .. } => Some(line),
            Self::Io(_) => None,
        }
    }

    /// Where the offending text came from, if known.
    #[must_use]
    pub fn file(&self) -> Option<&str> {
        match self {
            Self::Line { file, .. } => file.as_deref(),
            Self::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;
    use test_case::test_case;

    use super::*;

    const HEADER: &str = "# Versification \"Test\"\n";

    fn load(body: &str) -> Result<Versification, LoadError> {
        Loader::new().source("test.vrs").load_str(&format!("{HEADER}{body}"))
    }

    fn error_kind(body: &str) -> Option<LoadErrorKind> {
        load(body).err().and_then(|e| e.kind())
    }

    fn verse(book: &str, chapter: i32, verse: i32) -> MappedVerse {
        MappedVerse::new(canon::book_id_to_number(book), chapter, verse)
    }

    #[test]
    fn name_from_header() {
        let vers = load("GEN 1:31\n").unwrap();
        assert_eq!(vers.name(), "Test");
    }

    #[test]
    fn missing_name_is_an_error() {
        let error = Loader::new().load_str("GEN 1:31\n").unwrap_err();
        assert_eq!(error.kind(), Some(LoadErrorKind::MissingName));
        assert_eq!(error.line(), Some("GEN 1:31"));
    }

    #[test]
    fn fallback_name_is_used_without_header() {
        let vers = Loader::new()
            .fallback_name("Fallback")
            .load_str("# just a comment\nGEN 1:31\n")
            .unwrap();
        assert_eq!(vers.name(), "Fallback");
    }

    #[test]
    fn header_after_content_is_only_a_comment() {
        let vers = Loader::new()
            .fallback_name("First")
            .load_str("GEN 1:31\n# Versification \"Second\"\n")
            .unwrap();
        assert_eq!(vers.name(), "First");
    }

    #[test]
    fn chapter_verse_lines() {
        let vers = load("HAB 1:17 2:20 3:19\n").unwrap();
        let hab = canon::book_id_to_number("HAB");
        assert_eq!(vers.books()[usize::try_from(hab - 1).unwrap()], vec![17, 20, 19]);
        assert_eq!(vers.books()[0], vec![1], "earlier books get a placeholder");
    }

    #[test]
    fn later_lines_extend_and_override() {
        let vers = load("HAB 1:17 2:20 3:19\nHAB 2:55\nHAB 7:55\n").unwrap();
        let hab = usize::try_from(canon::book_id_to_number("HAB") - 1).unwrap();
        assert_eq!(vers.books()[hab], vec![17, 55, 19, 1, 1, 1, 55]);
    }

    #[test]
    fn end_truncates_chapters() {
        let vers = load("HAB 1:17 2:20 3:19\nHAB 1:15 END\n").unwrap();
        let hab = usize::try_from(canon::book_id_to_number("HAB") - 1).unwrap();
        assert_eq!(vers.books()[hab], vec![15]);
    }

    #[test]
    fn chapters_may_have_no_verses() {
        let vers = load("HAB 1:17 2:0\n").unwrap();
        assert_eq!(vers.last_verse(canon::book_id_to_number("HAB"), 2), 0);
    }

    #[test_case("BADBOOK 1:17 2:20 3:19" ; "unknown book")]
    #[test_case("HAB 1:BADVERSE" ; "bad verse count")]
    #[test_case("HAB 0:5" ; "chapter zero")]
    #[test_case("HAB 1:-5" ; "negative count")]
    #[test_case("HAB 1:2:3" ; "extra separator")]
    #[test_case("HAB  1:17" ; "double space")]
    #[test_case("NUM 17:1 NUM 17:16" ; "mapping without equals")]
    fn invalid_chapter_verse_lines(line: &str) {
        assert_eq!(error_kind(line), Some(LoadErrorKind::InvalidSyntax));
    }

    #[test]
    fn single_mapping() {
        let vers = load("NUM 17:1 = NUM 17:16\n").unwrap();
        assert_eq!(
            vers.mappings().standard(&verse("NUM", 17, 1)),
            Some(&verse("NUM", 17, 16))
        );
    }

    #[test]
    fn range_mapping() {
        let vers = load("NUM 17:1-13 = NUM 17:16-28\n").unwrap();
        for offset in 0..13 {
            assert_eq!(
                vers.mappings().standard(&verse("NUM", 17, 1 + offset)),
                Some(&verse("NUM", 17, 16 + offset))
            );
        }
        assert_eq!(vers.mappings().standard(&verse("NUM", 17, 14)), None);
    }

    #[test_case("NUM 17:1 = NUMBERS 17:16" ; "unknown book")]
    #[test_case("NUM 17:1-X = NUM 17:16" ; "bad limit")]
    #[test_case("NUM 17:1-1000 = NUM 17:16" ; "limit past last verse")]
    #[test_case("GEN 1:1-999999999 = GEN 1:2" ; "huge limit")]
    #[test_case("&GEN 1:1-1000 = GEN 1:2" ; "many to one limit past last verse")]
    #[test_case("&GEN 1:1 = GEN 1:2-99999999" ; "many to one huge standard limit")]
    #[test_case("NUM 17 = NUM 17:16" ; "missing verse")]
    #[test_case("NUM 17:1,3 = NUM 17:16" ; "verse list")]
    fn invalid_mappings(line: &str) {
        assert_eq!(error_kind(line), Some(LoadErrorKind::InvalidSyntax));
    }

    #[test]
    fn range_up_to_last_verse() {
        let vers = load("PSA 119:990-999 = PSA 119:990\n").unwrap();
        assert_eq!(
            vers.mappings().standard(&verse("PSA", 119, 999)),
            Some(&verse("PSA", 119, 999))
        );
    }

    #[test]
    fn many_to_one_mapping() {
        let vers = load("&ACT 19:39-41 = ACT 19:40\n").unwrap();
        for own in [39, 40, 41] {
            assert_eq!(
                vers.mappings().standard(&verse("ACT", 19, own)),
                Some(&verse("ACT", 19, 40))
            );
        }
        assert_eq!(
            vers.mappings().versification(&verse("ACT", 19, 40)),
            Some(&verse("ACT", 19, 39))
        );
    }

    #[test]
    fn one_to_many_mapping() {
        let vers = load("&ACT 19:39 = ACT 19:38-40\n").unwrap();
        assert_eq!(
            vers.mappings().standard(&verse("ACT", 19, 39)),
            Some(&verse("ACT", 19, 38))
        );
        for standard in [38, 39, 40] {
            assert_eq!(
                vers.mappings().versification(&verse("ACT", 19, standard)),
                Some(&verse("ACT", 19, 39))
            );
        }
    }

    #[test]
    fn many_to_many_mapping_is_rejected() {
        assert_eq!(
            error_kind("&ACT 19:39-40 = ACT 19:38-39"),
            Some(LoadErrorKind::InvalidManyToOneMap)
        );
        assert_eq!(
            error_kind("&ACT 19:39-40 = ACTS 19:38"),
            Some(LoadErrorKind::InvalidSyntax)
        );
    }

    #[test]
    fn mapped_verse_keeps_segment_text() {
        let vers = load("ESG 1:1b = ESG 1:2\n").unwrap();
        let standard = vers.mappings().to_standard().keys().next().unwrap();
        assert_eq!(standard.text(), Some("1b"));
        assert_eq!(standard.verse(), 1);
    }

    #[test]
    fn excluded_verses() {
        let vers = load("GEN 1:31\n-GEN 1:30\n#! -GEN 1:31\n").unwrap();
        assert!(vers.is_excluded(1_001_030));
        assert!(vers.is_excluded(1_001_031));
        assert!(!vers.is_excluded(1_001_029));
    }

    #[test]
    fn duplicate_excluded_verse() {
        assert_eq!(
            error_kind("-GEN 1:30\n-GEN 1:30\n"),
            Some(LoadErrorKind::DuplicateExcludedVerse)
        );
    }

    #[test_case("-BADBOOK 1:31" ; "unknown book")]
    #[test_case("-GEN 1:BADVERSE" ; "bad verse")]
    #[test_case("-GEN 1" ; "too short")]
    #[test_case("-GEN 12345" ; "no colon")]
    fn invalid_excluded_verses(line: &str) {
        assert_eq!(error_kind(line), Some(LoadErrorKind::InvalidSyntax));
    }

    #[test]
    fn segments_with_unmarked_first() {
        let vers = load("*GEN 1:5,-,a,b,c,d,e,f\n").unwrap();
        let segments: Vec<&str> = vers
            .verse_segments(1_001_005)
            .unwrap()
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(segments, vec!["", "a", "b", "c", "d", "e", "f"]);
    }

    #[test_case(" *GEN 1:5,a,b,c ", 1_001_005 ; "surrounding whitespace")]
    #[test_case("*GEN   1:6,a,b,c", 1_001_006 ; "spaces before chapter")]
    #[test_case("*GEN 1:7, a, b, c", 1_001_007 ; "spaces between labels")]
    fn segment_whitespace_is_ignored(line: &str, bbbcccvvv: i32) {
        let vers = load(line).unwrap();
        let segments: Vec<&str> = vers
            .verse_segments(bbbcccvvv)
            .unwrap()
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(segments, vec!["a", "b", "c"]);
    }

    #[test_case("*GEN 1:5,-", LoadErrorKind::NoSegmentsDefined ; "only unmarked")]
    #[test_case("*GEN 1:5,", LoadErrorKind::NoSegmentsDefined ; "no labels")]
    #[test_case("*HAG 1:5,a,b,c,-", LoadErrorKind::UnspecifiedSegmentLocation ; "unmarked last")]
    #[test_case("* GEN 1:5", LoadErrorKind::InvalidSyntax ; "no separator")]
    #[test_case("*GEN 1:5", LoadErrorKind::InvalidSyntax ; "too short")]
    #[test_case("*XYZ 1:5,a,b", LoadErrorKind::InvalidSyntax ; "unknown book")]
    #[test_case("#! *GEN 1:5,a#b", LoadErrorKind::InvalidSyntax ; "comment in segments")]
    fn invalid_segments(line: &str, expected: LoadErrorKind) {
        assert_eq!(error_kind(line), Some(expected));
    }

    #[test]
    fn later_segments_replace_earlier_ones() {
        let vers = load("*HAG 1:5,-,a,b,c\n*HAG 1:5,d,e,f\n").unwrap();
        let hag = VerseRef::pack(canon::book_id_to_number("HAG"), 1, 5);
        assert_eq!(vers.verse_segments(hag).unwrap().head, "d");
    }

    #[test]
    fn strict_load_rejects_duplicate_segments() {
        let error = Loader::new()
            .strict(true)
            .load_str(&format!("{HEADER}*HAG 1:5,-,a,b,c\n*HAG 1:5,d,e,f\n"))
            .unwrap_err();
        assert_eq!(error.kind(), Some(LoadErrorKind::DuplicateSegment));
        assert_eq!(error.file(), None);
    }

    #[test]
    fn errors_carry_line_and_source() {
        let error = load("GEN 1:31\nHAB 1:BADVERSE\n").unwrap_err();
        assert_eq!(error.line(), Some("HAB 1:BADVERSE"));
        assert_eq!(error.file(), Some("test.vrs"));
        assert_eq!(
            error.to_string(),
            "Invalid versification line: 'HAB 1:BADVERSE'"
        );
    }

    #[test]
    fn parsed_line_display() {
        assert_eq!(parse_line("GEN 1:31 2:25").to_string(), "GEN 1:31 2:25");
        assert_eq!(
            parse_line("&ACT 19:39 = ACT 19:38-40").to_string(),
            "#! &ACT 19:39 = ACT 19:38-40"
        );
        assert_eq!(parse_line("#   note ").to_string(), "# note");
        assert_eq!(parse_line("").to_string(), "");
        assert_eq!(
            parse_line("-GEN 1:30   # gone").to_string(),
            "-GEN 1:30 # gone"
        );
    }

    #[test]
    fn load_from_reader() {
        let mut reader = io::Cursor::new(format!("{HEADER}GEN 1:31 2:25\n"));
        let vers = Loader::new().load(&mut reader).unwrap();
        assert_eq!(vers.last_chapter(1), 2);
    }

    #[test]
    fn load_from_path_uses_path_as_source() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}GEN 1:31\nGEN 1:X").unwrap();

        let error = Loader::new().load_path(file.path()).unwrap_err();
        assert_eq!(
            error.file(),
            Some(file.path().display().to_string().as_str())
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let error = Loader::new()
            .load_path(Path::new("/definitely/not/here.vrs"))
            .unwrap_err();
        assert!(matches!(error, LoadError::Io(_)));
    }

    #[test]
    fn load_onto_keeps_existing_tables() {
        let base = load("GEN 1:31 2:25\n").unwrap();
        let layered = Loader::new()
            .load_onto(base, [Ok("GEN 3:24".to_string())])
            .unwrap();
        assert_eq!(layered.books()[0], vec![31, 25, 24]);
        assert_eq!(layered.name(), "Test");
    }
}

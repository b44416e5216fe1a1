//! Writes versification schemes in the `.vrs` text format.
//!
//! Exclusions and segments are written as `#!` lines. Reading the output
//! back with the [loader](super::loader) gives an equal scheme.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use crate::domain::{
    canon,
    versification::{MappedVerse, Versification},
};

const BANNER: &[&str] = &[
    "#",
    "# List of books, chapters, verses",
    "# One line per book.",
    "# One entry for each chapter.",
    "# Verse number is the maximum verse number for that chapter.",
];

const PACKED_BOOK: i32 = 1_000_000;
const PACKED_CHAPTER: i32 = 1_000;

/// Writes a scheme.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_versification<W: Write>(versification: &Versification, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "# Versification \"{}\"", versification.name())?;
    for line in BANNER {
        writeln!(writer, "{line}")?;
    }

    for (book, chapters) in (canon::FIRST_BOOK..).zip(versification.books()) {
        write!(writer, "{}", canon::book_number_to_id(book).unwrap_or_default())?;
        for (chapter, last_verse) in (1..).zip(chapters) {
            write!(writer, " {chapter}:{last_verse}")?;
        }
        writeln!(writer)?;
    }

    writeln!(writer, "#")?;
    writeln!(writer, "# Mappings from this versification to standard versification")?;
    for range in versification.mappings().mapping_ranges() {
        writeln!(writer, "{range}")?;
    }

    writeln!(writer, "#")?;
    writeln!(writer, "# Excluded verses")?;
    for &bbbcccvvv in versification.excluded_verses() {
        writeln!(writer, "#! -{}", unpack(bbbcccvvv))?;
    }

    writeln!(writer, "#")?;
    writeln!(writer, "# Verse segment information")?;
    for (&bbbcccvvv, segments) in versification.segments() {
        let labels: Vec<&str> = segments
            .iter()
            .map(|label| if label.is_empty() { "-" } else { label.as_str() })
            .collect();
        writeln!(writer, "#! *{},{}", unpack(bbbcccvvv), labels.join(","))?;
    }

    Ok(())
}

/// Writes a scheme to a file, replacing it if it exists.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_path(versification: &Versification, path: &Path) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_versification(versification, &mut writer)?;
    writer.flush()?;
    tracing::debug!(name = versification.name(), path = %path.display(), "Wrote versification");
    Ok(())
}

const fn unpack(bbbcccvvv: i32) -> MappedVerse {
    MappedVerse::new(
        bbbcccvvv / PACKED_BOOK,
        bbbcccvvv % PACKED_BOOK / PACKED_CHAPTER,
        bbbcccvvv % PACKED_CHAPTER,
    )
}

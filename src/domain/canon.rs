//! Book codes, numbers and English names for the Scripture canon.
//!
//! Book numbers are 1-based and follow the order of [`BOOK_IDS`]: the
//! Protestant Old Testament (1-39), the New Testament (40-66), the
//! deuterocanon (67-92), then extra material and later additions.
//!
//! The free functions describe the full canon. [`Canon`] carries the
//! deuterocanon switch used by the compact [`BcvRef`](crate::BcvRef), which
//! only knows the first 66 books unless the deuterocanon is enabled.

/// Number of the first book.
pub const FIRST_BOOK: i32 = 1;

/// Number of the last book in the full canon.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub const LAST_BOOK: i32 = BOOK_IDS.len() as i32;

/// Number of the last book of the Protestant Old and New Testaments.
pub const LAST_OT_NT_BOOK: i32 = 66;

/// Number of the last deuterocanonical book.
pub const LAST_DEUTEROCANON_BOOK: i32 = 92;

/// Every book code, in canonical order.
pub const BOOK_IDS: [&str; 123] = [
    "GEN", "EXO", "LEV", "NUM", "DEU", "JOS", "JDG", "RUT", "1SA", "2SA", // 10
    "1KI", "2KI", "1CH", "2CH", "EZR", "NEH", "EST", "JOB", "PSA", "PRO", // 20
    "ECC", "SNG", "ISA", "JER", "LAM", "EZK", "DAN", "HOS", "JOL", "AMO", // 30
    "OBA", "JON", "MIC", "NAM", "HAB", "ZEP", "HAG", "ZEC", "MAL", "MAT", // 40
    "MRK", "LUK", "JHN", "ACT", "ROM", "1CO", "2CO", "GAL", "EPH", "PHP", // 50
    "COL", "1TH", "2TH", "1TI", "2TI", "TIT", "PHM", "HEB", "JAS", "1PE", // 60
    "2PE", "1JN", "2JN", "3JN", "JUD", "REV", "TOB", "JDT", "ESG", "WIS", // 70
    "SIR", "BAR", "LJE", "S3Y", "SUS", "BEL", "1MA", "2MA", "3MA", "4MA", // 80
    "1ES", "2ES", "MAN", "PS2", "ODA", "PSS", "JSA", "JDB", "TBS", "SST", // 90
    "DNT", "BLT", "XXA", "XXB", "XXC", "XXD", "XXE", "XXF", "XXG", "FRT", // 100
    "BAK", "OTH", "3ES", "EZA", "5EZ", "6EZ", "INT", "CNC", "GLO", "TDX", // 110
    "NDX", "DAG", "PS3", "2BA", "LBA", "JUB", "ENO", "1MQ", "2MQ", "3MQ", // 120
    "REP", "4BA", "LAO",
];

/// Codes of books that hold extra material rather than Scripture text.
const NON_CANONICAL_IDS: [&str; 15] = [
    "XXA", "XXB", "XXC", "XXD", "XXE", "XXF", "XXG", "FRT", "BAK", "OTH", "INT", "CNC", "GLO",
    "TDX", "NDX",
];

const OBSOLETE_MARKER: &str = "*obsolete*";

const ENGLISH_NAMES: [&str; 123] = [
    "Genesis",
    "Exodus",
    "Leviticus",
    "Numbers",
    "Deuteronomy",
    "Joshua",
    "Judges",
    "Ruth",
    "1 Samuel",
    "2 Samuel",
    "1 Kings",
    "2 Kings",
    "1 Chronicles",
    "2 Chronicles",
    "Ezra",
    "Nehemiah",
    "Esther (Hebrew)",
    "Job",
    "Psalms",
    "Proverbs",
    "Ecclesiastes",
    "Song of Songs",
    "Isaiah",
    "Jeremiah",
    "Lamentations",
    "Ezekiel",
    "Daniel (Hebrew)",
    "Hosea",
    "Joel",
    "Amos",
    "Obadiah",
    "Jonah",
    "Micah",
    "Nahum",
    "Habakkuk",
    "Zephaniah",
    "Haggai",
    "Zechariah",
    "Malachi",
    "Matthew",
    "Mark",
    "Luke",
    "John",
    "Acts",
    "Romans",
    "1 Corinthians",
    "2 Corinthians",
    "Galatians",
    "Ephesians",
    "Philippians",
    "Colossians",
    "1 Thessalonians",
    "2 Thessalonians",
    "1 Timothy",
    "2 Timothy",
    "Titus",
    "Philemon",
    "Hebrews",
    "James",
    "1 Peter",
    "2 Peter",
    "1 John",
    "2 John",
    "3 John",
    "Jude",
    "Revelation",
    "Tobit",
    "Judith",
    "Esther Greek",
    "Wisdom of Solomon",
    "Sirach (Ecclesiasticus)",
    "Baruch",
    "Letter of Jeremiah",
    "Song of 3 Young Men",
    "Susanna",
    "Bel and the Dragon",
    "1 Maccabees",
    "2 Maccabees",
    "3 Maccabees",
    "4 Maccabees",
    "1 Esdras (Greek)",
    "2 Esdras (Latin)",
    "Prayer of Manasseh",
    "Psalm 151",
    "Odes",
    "Psalms of Solomon",
    "Joshua A. *obsolete*",
    "Judges B. *obsolete*",
    "Tobit S. *obsolete*",
    "Susanna Th. *obsolete*",
    "Daniel Th. *obsolete*",
    "Bel Th. *obsolete*",
    "Extra A",
    "Extra B",
    "Extra C",
    "Extra D",
    "Extra E",
    "Extra F",
    "Extra G",
    "Front Matter",
    "Back Matter",
    "Other Matter",
    "3 Ezra *obsolete*",
    "Apocalypse of Ezra",
    "5 Ezra (Latin Prologue)",
    "6 Ezra (Latin Epilogue)",
    "Introduction",
    "Concordance",
    "Glossary",
    "Topical Index",
    "Names Index",
    "Daniel Greek",
    "Psalms 152-155",
    "2 Baruch (Apocalypse)",
    "Letter of Baruch",
    "Jubilees",
    "Enoch",
    "1 Meqabyan",
    "2 Meqabyan",
    "3 Meqabyan",
    "Reproof (Proverbs 25-31)",
    "4 Baruch (Rest of Baruch)",
    "Laodiceans",
];

/// Returns the 1-based number of a book code, ignoring case.
///
/// Returns 0 if the code is not a known book.
///
/// ```
/// use scripture::domain::canon;
///
/// assert_eq!(canon::book_id_to_number("GEN"), 1);
/// assert_eq!(canon::book_id_to_number("rev"), 66);
/// assert_eq!(canon::book_id_to_number("XYZ"), 0);
/// ```
#[must_use]
pub fn book_id_to_number(id: &str) -> i32 {
    BOOK_IDS
        .iter()
        .position(|book| book.eq_ignore_ascii_case(id))
        .map_or(0, |index| index_to_number(index))
}

/// Returns the code of a book number, or `None` if the number is out of range.
#[must_use]
pub fn book_number_to_id(number: i32) -> Option<&'static str> {
    number_to_index(number).map(|index| BOOK_IDS[index])
}

/// Returns the English name of a book number, or `None` if the number is out
/// of range.
#[must_use]
pub fn book_number_to_english_name(number: i32) -> Option<&'static str> {
    number_to_index(number).map(|index| ENGLISH_NAMES[index])
}

/// Whether a code names a known book.
#[must_use]
pub fn is_book_id_valid(id: &str) -> bool {
    book_id_to_number(id) > 0
}

/// Whether a book number holds Scripture text, as opposed to front matter,
/// glossaries and the like.
#[must_use]
pub fn is_canonical(number: i32) -> bool {
    book_number_to_id(number).is_some_and(|id| !NON_CANONICAL_IDS.contains(&id))
}

/// Whether a book number holds extra material (front matter, indexes, ...).
#[must_use]
pub fn is_extra_material(number: i32) -> bool {
    book_number_to_id(number).is_some_and(|id| NON_CANONICAL_IDS.contains(&id))
}

/// Whether a book code is retired.
#[must_use]
pub fn is_obsolete(number: i32) -> bool {
    book_number_to_english_name(number).is_some_and(|name| name.contains(OBSOLETE_MARKER))
}

/// Whether a book number is in the western New Testament.
#[must_use]
pub const fn is_book_nt(number: i32) -> bool {
    number >= 40 && number <= LAST_OT_NT_BOOK
}

/// Whether a book number is in the Protestant Old Testament.
#[must_use]
pub const fn is_book_ot(number: i32) -> bool {
    number <= 39
}

/// Whether a book number is in the Protestant Old or New Testament.
#[must_use]
pub const fn is_book_ot_nt(number: i32) -> bool {
    number <= LAST_OT_NT_BOOK
}

/// Whether a book number is deuterocanonical (canonical, but outside the
/// Protestant Old and New Testaments).
#[must_use]
pub fn is_book_dc(number: i32) -> bool {
    is_canonical(number) && !is_book_ot_nt(number)
}

/// Iterates over every book number in the full canon.
pub fn all_book_numbers() -> impl Iterator<Item = i32> {
    FIRST_BOOK..=LAST_BOOK
}

fn number_to_index(number: i32) -> Option<usize> {
    usize::try_from(number)
        .ok()
        .and_then(|n| n.checked_sub(1))
        .filter(|&index| index < BOOK_IDS.len())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const fn index_to_number(index: usize) -> i32 {
    index as i32 + 1
}

/// The deuterocanon switch for the compact reference type.
///
/// When disabled (the default) only the 66 books of the Protestant canon are
/// addressable; deuterocanonical codes are recognised but rejected with a
/// negative sentinel so callers can tell "disabled" from "unknown".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Canon {
    deuterocanon: bool,
}

impl Canon {
    /// The Protestant canon (books 1-66).
    pub const PROTESTANT: Self = Self {
        deuterocanon: false,
    };

    /// The canon including the deuterocanon (books 1-92).
    pub const WITH_DEUTEROCANON: Self = Self { deuterocanon: true };

    /// Creates a canon with the deuterocanon switch set as given.
    #[must_use]
    pub const fn new(deuterocanon: bool) -> Self {
        Self { deuterocanon }
    }

    /// Whether deuterocanonical books are addressable.
    #[must_use]
    pub const fn supports_deuterocanon(self) -> bool {
        self.deuterocanon
    }

    /// Number of the last addressable book.
    #[must_use]
    pub const fn last_book(self) -> i32 {
        if self.deuterocanon {
            LAST_DEUTEROCANON_BOOK
        } else {
            LAST_OT_NT_BOOK
        }
    }

    /// Returns the number of a book code.
    ///
    /// Returns 0 for an unknown code and -1 for a deuterocanonical code while
    /// the deuterocanon is disabled.
    ///
    /// ```
    /// use scripture::domain::canon::Canon;
    ///
    /// assert_eq!(Canon::PROTESTANT.book_to_number("REV"), 66);
    /// assert_eq!(Canon::PROTESTANT.book_to_number("TOB"), -1);
    /// assert_eq!(Canon::WITH_DEUTEROCANON.book_to_number("TOB"), 67);
    /// assert_eq!(Canon::PROTESTANT.book_to_number("XYZ"), 0);
    /// ```
    #[must_use]
    pub fn book_to_number(self, code: &str) -> i32 {
        match book_id_to_number(code) {
            0 => 0,
            number if number <= self.last_book() => number,
            number if number <= LAST_DEUTEROCANON_BOOK => -1,
            _ => 0,
        }
    }

    /// Returns the code for a book number, or an empty string if the number
    /// is out of range for this canon.
    #[must_use]
    pub fn number_to_book_code(self, number: i32) -> &'static str {
        if number < FIRST_BOOK || number > self.last_book() {
            return "";
        }
        book_number_to_id(number).unwrap_or("")
    }

    /// Whether a book number is addressable in this canon.
    #[must_use]
    pub const fn contains(self, number: i32) -> bool {
        number >= FIRST_BOOK && number <= self.last_book()
    }
}

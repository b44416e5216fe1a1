//! Moving a reference through books, chapters, verses and segments.
//!
//! Every step takes the set of books to move through; `None` means every
//! book of the canon that is not obsolete. A step that fails leaves the
//! reference where it was.

use super::VerseRef;
use crate::domain::{book_set::BookSet, versification::NON_CANONICAL_LAST_CHAPTER_OR_VERSE};

fn selection(present: Option<&BookSet>) -> BookSet {
    present.copied().unwrap_or_else(BookSet::all_books)
}

impl VerseRef {
    /// Moves to verse 0 of chapter 1 of the next present book.
    pub fn next_book(&mut self, present: Option<&BookSet>) -> bool {
        let Some(book) = selection(present).next_selected(self.book) else {
            return false;
        };
        self.go_to(book, 1, 0);
        true
    }

    /// Moves to verse 1 of chapter 1 of the previous present book.
    pub fn previous_book(&mut self, present: Option<&BookSet>) -> bool {
        let Some(book) = selection(present).previous_selected(self.book) else {
            return false;
        };
        self.go_to(book, 1, 1);
        true
    }

    /// Moves to the first verse of the next chapter, or to the next present
    /// book after the last chapter.
    ///
    /// With `skip_excluded` the move lands on the first verse that is not
    /// excluded, skipping chapters that have none.
    pub fn next_chapter(&mut self, present: Option<&BookSet>, skip_excluded: bool) -> bool {
        let books = selection(present);
        if !books.contains(self.book) {
            return self.next_book(Some(&books));
        }

        let chapter = self.chapter + 1;
        if chapter > self.last_chapter().unwrap_or(0) {
            return self.next_book(Some(&books));
        }

        if skip_excluded {
            let first = self
                .versification
                .as_ref()
                .and_then(|versification| versification.first_included_verse(self.book, chapter));
            return match first {
                Some(first) => {
                    *self = first;
                    true
                }
                None => self.next_book(Some(&books)),
            };
        }

        self.go_to(self.book, chapter, 1);
        true
    }

    /// Moves to the first verse of the previous chapter, or to the last
    /// chapter of the previous present book.
    ///
    /// With `skip_excluded` the move lands on the first verse that is not
    /// excluded, going further back past chapters that have none.
    pub fn previous_chapter(&mut self, present: Option<&BookSet>, skip_excluded: bool) -> bool {
        let books = selection(present);
        let mut previous = self.clone();
        loop {
            if !previous.step_back_chapter(&books) {
                return false;
            }
            if !skip_excluded {
                break;
            }
            if let Some(first) = previous.first_included_in_chapter() {
                previous = first;
                break;
            }
        }
        *self = previous;
        true
    }

    /// Moves to the next verse, or the next segment when the versification
    /// splits this verse.
    pub fn next_verse(&mut self, present: Option<&BookSet>, skip_excluded: bool) -> bool {
        let mut next = self.clone();
        let moved = next.step_forward(&selection(present), skip_excluded);
        if moved {
            *self = next;
        }
        moved
    }

    /// Moves to the previous verse, or the previous segment when the
    /// versification splits this verse. From verse 1 of chapter 1 the move
    /// goes to the introduction, verse 0.
    ///
    /// With `skip_excluded` excluded verses are stepped over.
    pub fn previous_verse(&mut self, present: Option<&BookSet>, skip_excluded: bool) -> bool {
        let mut previous = self.clone();
        let moved = previous.step_back(&selection(present), skip_excluded);
        if moved {
            *self = previous;
        }
        moved
    }

    fn step_forward(&mut self, books: &BookSet, skip_excluded: bool) -> bool {
        if !books.contains(self.book) {
            return self.next_book(Some(books));
        }

        if let Some(segments) = self.declared_segments() {
            let next = self
                .segment_index(&segments)
                .and_then(|index| Some((segments.get(index)?, segments.get(index + 1)?)));
            // identical labels fall through to the next verse
            if let Some((_, next)) = next.filter(|(current, next)| current != next) {
                let verse = format!("{}{next}", self.verse);
                self.set_verse(&verse);
                return true;
            }
        }

        loop {
            if self.verse >= self.last_verse().unwrap_or(0) {
                if self.next_chapter(Some(books), skip_excluded) {
                    self.apply_segment(true);
                    return true;
                }
                return false;
            }

            self.verse += 1;
            self.text = None;
            self.apply_segment(true);
            if !(skip_excluded && self.is_excluded()) {
                return true;
            }
        }
    }

    fn step_back(&mut self, books: &BookSet, skip_excluded: bool) -> bool {
        loop {
            if !self.step_back_once(books) {
                return false;
            }
            if !(skip_excluded && self.is_excluded()) {
                return true;
            }
        }
    }

    fn step_back_once(&mut self, books: &BookSet) -> bool {
        if !books.contains(self.book) {
            return self.previous_chapter_last_verse(books);
        }

        if let Some(segments) = self.declared_segments() {
            let previous = self
                .segment_index(&segments)
                .and_then(|index| index.checked_sub(1))
                .and_then(|index| segments.get(index));
            if let Some(previous) = previous {
                let verse = format!("{}{previous}", self.verse);
                self.set_verse(&verse);
                return true;
            }
        }

        if self.verse == 1 && self.chapter == 1 {
            self.verse = 0;
            self.text = None;
            return true;
        }
        if self.verse <= 1 {
            return self.previous_chapter_last_verse(books);
        }

        self.verse -= 1;
        self.text = None;
        self.apply_segment(false);
        true
    }

    fn step_back_chapter(&mut self, books: &BookSet) -> bool {
        if !books.contains(self.book) || self.chapter <= 1 {
            return self.previous_book_last_chapter(books);
        }
        self.go_to(self.book, self.chapter - 1, 1);
        true
    }

    /// The first verse of this chapter that is not excluded.
    fn first_included_in_chapter(&self) -> Option<Self> {
        self.versification
            .as_ref()?
            .first_included_verse(self.book, self.chapter)
            .filter(|first| first.chapter == self.chapter)
    }

    fn previous_book_last_chapter(&mut self, books: &BookSet) -> bool {
        if !self.previous_book(Some(books)) {
            return false;
        }
        self.chapter = self
            .last_chapter()
            .filter(|&last| last != NON_CANONICAL_LAST_CHAPTER_OR_VERSE)
            .unwrap_or(1);
        true
    }

    fn previous_chapter_last_verse(&mut self, books: &BookSet) -> bool {
        let moved = if !books.contains(self.book) || self.chapter <= 1 {
            self.previous_book_last_chapter(books)
        } else {
            self.chapter -= 1;
            true
        };
        if moved {
            self.verse = self.last_verse().unwrap_or(1);
            self.text = None;
            self.apply_segment(false);
        }
        moved
    }

    /// Labels the verse with its first (moving forward) or last segment.
    fn apply_segment(&mut self, forward: bool) {
        let label = self.declared_segments().and_then(|segments| {
            if forward {
                segments.first().cloned()
            } else {
                segments.last().cloned()
            }
        });
        match label {
            Some(label) => {
                let verse = format!("{}{label}", self.verse);
                self.set_verse(&verse);
            }
            None => self.text = None,
        }
    }

    fn segment_index(&self, segments: &[String]) -> Option<usize> {
        let segment = self.segment();
        segments.iter().position(|label| *label == segment)
    }

    fn go_to(&mut self, book: i32, chapter: i32, verse: i32) {
        self.book = book;
        self.chapter = chapter;
        self.verse = verse;
        self.text = None;
    }
}

//! Domain models for Scripture references.
//!
//! This module contains the canon of books, versification schemes and the
//! two reference types built on them.

/// Book codes, numbers and names.
pub mod canon;
pub use canon::Canon;

/// Book lookup by English name.
pub mod book_names;

/// Sets of books.
pub mod book_set;
pub use book_set::BookSet;

mod config;
pub use config::Config;

/// Versification schemes and the mapping between them.
pub mod versification;
pub use versification::{Versification, VersificationType};

/// Compact packed references.
pub mod bcv_ref;
pub use bcv_ref::BcvRef;

/// Rich references tied to a versification.
pub mod verse_ref;
pub use verse_ref::{Error as VerseRefError, ValidStatus, VerseRef};

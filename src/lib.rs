//! Scripture references and versification.
//!
//! Versification schemes describe where chapters and verses begin in a
//! Bible tradition. References can be parsed, validated, navigated and
//! translated between schemes.

pub mod domain;
pub use domain::{
    BcvRef, BookSet, Canon, Config, ValidStatus, VerseRef, VerseRefError, Versification,
    VersificationType,
    verse_ref::{CompareOptions, are_overlapping_verse_ranges},
};

/// Loading, writing and registering versification schemes.
pub mod storage;
pub use storage::{LoadError, Loader, Registry, RegistryError};

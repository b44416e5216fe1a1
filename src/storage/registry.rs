//! The process-wide table of versification schemes.
//!
//! Built-in schemes are parsed from embedded `.vrs` data the first time they
//! are asked for and shared from then on. Schemes with other names are
//! registered by [`Registry::get_by_name`] and
//! [`Registry::load_customized`] and stay until
//! [`Registry::remove_all_unknown`].

use std::{
    collections::HashMap,
    io::BufRead,
    sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError},
};

use non_empty_string::NonEmptyString;
use tracing::instrument;

use super::loader::{LoadError, Loader};
use crate::domain::versification::{Versification, VersificationType};

const ENGLISH: &str = include_str!("builtin/eng.vrs");
const ORIGINAL: &str = include_str!("builtin/org.vrs");
const SEPTUAGINT: &str = include_str!("builtin/lxx.vrs");
const VULGATE: &str = include_str!("builtin/vul.vrs");
const RUSSIAN_ORTHODOX: &str = include_str!("builtin/rso.vrs");
const RUSSIAN_PROTESTANT: &str = include_str!("builtin/rsc.vrs");

/// The embedded file name and text of a built-in scheme.
const fn built_in_data(kind: VersificationType) -> Option<(&'static str, &'static str)> {
    match kind {
        VersificationType::Unknown => None,
        VersificationType::Original => Some(("org.vrs", ORIGINAL)),
        VersificationType::Septuagint => Some(("lxx.vrs", SEPTUAGINT)),
        VersificationType::Vulgate => Some(("vul.vrs", VULGATE)),
        VersificationType::English => Some(("eng.vrs", ENGLISH)),
        VersificationType::RussianProtestant => Some(("rsc.vrs", RUSSIAN_PROTESTANT)),
        VersificationType::RussianOrthodox => Some(("rso.vrs", RUSSIAN_ORTHODOX)),
    }
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// A table of versification schemes.
///
/// Most callers use [`Registry::global`]. A registry made with
/// [`Registry::new`] shares nothing with it.
#[derive(Debug, Default)]
pub struct Registry {
    tables: Mutex<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    built_in: HashMap<VersificationType, Arc<Versification>>,
    unknown: Vec<Arc<Versification>>,
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by the whole process.
    #[must_use]
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(Self::new)
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A built-in scheme. Every call returns the same shared scheme.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownType`] for
    /// [`VersificationType::Unknown`].
    pub fn get(&self, kind: VersificationType) -> Result<Arc<Versification>, RegistryError> {
        let (file, data) = built_in_data(kind).ok_or(RegistryError::UnknownType)?;
        let mut tables = self.lock();
        if let Some(versification) = tables.built_in.get(&kind) {
            return Ok(Arc::clone(versification));
        }

        let versification = Arc::new(Loader::new().source(file).strict(true).load_str(data)?);
        tracing::debug!(name = versification.name(), "Cached built-in versification");
        tables.built_in.insert(kind, Arc::clone(&versification));
        Ok(versification)
    }

    /// The scheme with the given name.
    ///
    /// Built-in names give the built-in schemes. Any other name gives a
    /// registered scheme of that name, which is created from the English
    /// data the first time it is asked for.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EmptyName`] for an empty name.
    #[instrument(level = "debug", skip(self))]
    pub fn get_by_name(&self, name: &str) -> Result<Arc<Versification>, RegistryError> {
        let kind = VersificationType::from_name(name);
        if kind != VersificationType::Unknown {
            return self.get(kind);
        }
        let scheme_name = NonEmptyString::new(name.to_string()).map_err(|_| RegistryError::EmptyName)?;

        let mut tables = self.lock();
        if let Some(versification) = tables.find(name) {
            return Ok(versification);
        }

        let lines = ENGLISH.lines().map(|line| Ok(line.to_string()));
        let versification = Arc::new(
            Loader::new()
                .source("eng.vrs")
                .load_onto(Versification::new(scheme_name), lines)?,
        );
        tracing::info!(name, "Registered versification from English data");
        tables.unknown.push(Arc::clone(&versification));
        Ok(versification)
    }

    /// Reads customizations on top of `base` and registers the result under
    /// `name`, replacing any scheme registered with that name.
    ///
    /// # Errors
    ///
    /// Returns an error if `base` is itself customized, if `name` is empty,
    /// or if the text holds a malformed line.
    pub fn load_customized<R: BufRead>(
        &self,
        reader: &mut R,
        base: &Arc<Versification>,
        name: &str,
    ) -> Result<Arc<Versification>, RegistryError> {
        if base.is_customized() {
            return Err(RegistryError::CustomizedBase(base.name().to_string()));
        }
        let scheme_name = NonEmptyString::new(name.to_string()).map_err(|_| RegistryError::EmptyName)?;

        let customized = Loader::new()
            .source(name)
            .load_onto(Versification::customize(base, scheme_name), reader.lines())?;
        let customized = Arc::new(customized);

        let mut tables = self.lock();
        tables.unknown.retain(|versification| versification.name() != name);
        tables.unknown.push(Arc::clone(&customized));
        tracing::info!(name, base = base.name(), "Registered customized versification");
        Ok(customized)
    }

    /// Whether `name` is a built-in scheme or a registered one.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        VersificationType::from_name(name) != VersificationType::Unknown
            || self.lock().find(name).is_some()
    }

    /// Every scheme: the built-in ones first, then the registered ones in
    /// the order they were registered.
    ///
    /// # Errors
    ///
    /// Returns an error if built-in data fails to load.
    pub fn tables(&self) -> Result<Vec<Arc<Versification>>, RegistryError> {
        let mut tables = VersificationType::BUILT_IN
            .into_iter()
            .map(|kind| self.get(kind))
            .collect::<Result<Vec<_>, _>>()?;
        tables.extend(self.lock().unknown.iter().cloned());
        Ok(tables)
    }

    /// Forgets every scheme that is not built in.
    pub fn remove_all_unknown(&self) {
        let mut tables = self.lock();
        for versification in tables.unknown.drain(..) {
            tracing::info!(name = versification.name(), "Removed versification");
        }
    }
}

impl Tables {
    fn find(&self, name: &str) -> Option<Arc<Versification>> {
        self.unknown
            .iter()
            .find(|versification| versification.name() == name)
            .cloned()
    }
}

/// Errors from [`Registry`].
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The unknown type has no built-in data.
    #[error("No built-in versification exists for the unknown type")]
    UnknownType,

    /// A scheme name was empty.
    #[error("Versification name cannot be empty")]
    EmptyName,

    /// The base of a customization was already customized.
    #[error("Cannot customize '{0}', which is already customized")]
    CustomizedBase(String),

    /// The scheme text could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),
}

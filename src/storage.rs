/// Reading the `.vrs` text format.
pub mod loader;
/// Writing the `.vrs` text format.
pub mod writer;
/// The process-wide table of versification schemes.
pub mod registry;

pub use loader::{LoadError, LoadErrorKind, Loader};
pub use registry::{Registry, RegistryError};
pub use writer::{write_path, write_versification};

//! Per-folder album bindings.
//!
//! Each synced folder carries a small marker file holding the id of the
//! Immich album created for it. The marker is what makes repeated runs append
//! to the same album instead of creating a new one.

pub mod error;
pub mod marker;

pub use error::StateError;
pub use marker::{AlbumStateStore, MarkerFileStore, MARKER_FILE_NAME};

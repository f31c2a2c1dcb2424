//! # Caché de Resúmenes
//!
//! - `store`: entradas en disco (resumen, error, texto extraído)
//! - `resolver`: decisión cache-hit / error-hit / pendiente

pub mod resolver;
pub mod store;

pub use resolver::{CacheResolver, Resolution};
pub use store::{CacheError, CacheStore, EntryKind};

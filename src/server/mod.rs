//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! - `tcp`: escucha en un puerto y acepta conexiones
//! - `connection`: lee el request, consulta la caché y responde

pub mod connection;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use connection::ConnectionHandler;
pub use tcp::{Server, ServerError};

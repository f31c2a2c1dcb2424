//! # Caché de Resultados en Disco
//! src/cache/store.rs
//!
//! Layout bajo el directorio raíz:
//!
//! ```text
//! summaries/<key>.txt   resumen en markdown (ArtifactEntry)
//! errors/<key>.txt      diagnóstico del fallo (ErrorEntry)
//! txts/<key>.txt        texto extraído (intermedio)
//! ```
//!
//! No hay índice en memoria: la existencia de una entrada se consulta
//! directamente en disco. Las escrituras usan archivo temporal + rename,
//! así que un lector nunca ve una entrada a medio escribir.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errores de I/O sobre la caché
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to render summary for {key}: {source}")]
    Render {
        key: String,
        #[source]
        source: crate::pipeline::PipelineError,
    },
}

impl CacheError {
    fn io(path: &Path, source: io::Error) -> Self {
        CacheError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Tipo de entrada de la caché
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Resumen terminado
    Artifact,
    /// Fallo registrado
    Error,
    /// Texto extraído
    Text,
}

impl EntryKind {
    /// Subdirectorio de cada tipo
    pub fn dir_name(&self) -> &'static str {
        match self {
            EntryKind::Artifact => "summaries",
            EntryKind::Error => "errors",
            EntryKind::Text => "txts",
        }
    }

    const ALL: [EntryKind; 3] = [EntryKind::Artifact, EntryKind::Error, EntryKind::Text];
}

/// Caché de archivos indexada por key
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Crea un store sin tocar el disco
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Crea un store y asegura que existan los subdirectorios
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let store = Self::new(root);
        store.ensure_layout()?;
        Ok(store)
    }

    /// Crea `summaries/`, `errors/` y `txts/` si no existen
    pub fn ensure_layout(&self) -> Result<(), CacheError> {
        for kind in EntryKind::ALL {
            let dir = self.root.join(kind.dir_name());
            fs::create_dir_all(&dir).map_err(|e| CacheError::io(&dir, e))?;
        }
        Ok(())
    }

    /// Path de una entrada: `<root>/<dir>/<key>.txt`
    pub fn entry_path(&self, kind: EntryKind, key: &str) -> PathBuf {
        self.root
            .join(kind.dir_name())
            .join(format!("{}.txt", key))
    }

    pub fn artifact_path(&self, key: &str) -> PathBuf {
        self.entry_path(EntryKind::Artifact, key)
    }

    pub fn has_artifact(&self, key: &str) -> bool {
        self.artifact_path(key).is_file()
    }

    pub fn has_error(&self, key: &str) -> bool {
        self.entry_path(EntryKind::Error, key).is_file()
    }

    /// Lee el mensaje de error guardado, si existe
    pub fn read_error(&self, key: &str) -> Result<Option<String>, CacheError> {
        read_optional(&self.entry_path(EntryKind::Error, key))
    }

    /// Lee el texto extraído guardado, si existe
    pub fn read_text(&self, key: &str) -> Result<Option<String>, CacheError> {
        read_optional(&self.entry_path(EntryKind::Text, key))
    }

    /// Lee el resumen guardado (markdown), si existe
    pub fn read_artifact(&self, key: &str) -> Result<Option<String>, CacheError> {
        read_optional(&self.artifact_path(key))
    }

    /// Guarda un resumen y elimina un error previo de la misma key
    pub fn write_artifact(&self, key: &str, content: &str) -> Result<(), CacheError> {
        write_atomic(&self.artifact_path(key), content)?;
        remove_if_exists(&self.entry_path(EntryKind::Error, key))
    }

    /// Guarda un error y elimina un resumen previo de la misma key
    pub fn write_error(&self, key: &str, message: &str) -> Result<(), CacheError> {
        write_atomic(&self.entry_path(EntryKind::Error, key), message)?;
        remove_if_exists(&self.artifact_path(key))
    }

    /// Guarda el texto extraído
    pub fn write_text(&self, key: &str, text: &str) -> Result<(), CacheError> {
        write_atomic(&self.entry_path(EntryKind::Text, key), text)
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, CacheError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CacheError::io(path, e)),
    }
}

/// Escribe en `<path>.tmp` y renombra (atómico en sistemas Unix)
fn write_atomic(path: &Path, content: &str) -> Result<(), CacheError> {
    let mut temp_path = path.as_os_str().to_owned();
    temp_path.push(".tmp");
    let temp_path = PathBuf::from(temp_path);

    fs::write(&temp_path, content).map_err(|e| CacheError::io(&temp_path, e))?;
    fs::rename(&temp_path, path).map_err(|e| CacheError::io(path, e))?;

    debug!(path = %path.display(), bytes = content.len(), "entrada de caché escrita");
    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<(), CacheError> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "entrada anterior eliminada");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CacheError::io(path, e)),
    }
}

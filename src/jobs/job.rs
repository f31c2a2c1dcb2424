//! # Estructura de Job
//!
//! Un job es una unidad de trabajo diferido: resumir el documento en
//! `source_path`. Se identifica por su `key`, el nombre de archivo final
//! del path (sin directorios), que también indexa la caché.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errores al construir un job
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// El path no tiene componente final (ej: "", "/", "..")
    #[error("Path has no file name: {0:?}")]
    NoFileName(String),
}

/// Body JSON que envía el cliente
///
/// Formato: `{"path": "/docs/report.pdf"}`. Otros campos se ignoran.
#[derive(Debug, Clone, Deserialize)]
pub struct JobRequest {
    pub path: String,
}

/// Representa un job individual
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Path completo tal como lo envió el cliente
    source_path: String,

    /// Nombre de archivo final, usado para la caché
    key: String,
}

impl Job {
    /// Crea un job derivando la key del último componente del path
    ///
    /// # Ejemplo
    /// ```
    /// use summary_server::jobs::Job;
    ///
    /// let job = Job::from_path("/docs/report.pdf").unwrap();
    /// assert_eq!(job.key(), "report.pdf");
    /// ```
    pub fn from_path(source_path: &str) -> Result<Self, JobError> {
        let key = Path::new(source_path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| JobError::NoFileName(source_path.to_string()))?;

        Ok(Self {
            source_path: source_path.to_string(),
            key,
        })
    }

    /// Path original
    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    /// Key de caché
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl TryFrom<JobRequest> for Job {
    type Error = JobError;

    fn try_from(request: JobRequest) -> Result<Self, Self::Error> {
        Job::from_path(&request.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_final_component() {
        let job = Job::from_path("/docs/2024/report.pdf").unwrap();
        assert_eq!(job.key(), "report.pdf");
        assert_eq!(job.source_path(), "/docs/2024/report.pdf");
    }

    #[test]
    fn test_relative_path() {
        let job = Job::from_path("report.pdf").unwrap();
        assert_eq!(job.key(), "report.pdf");
    }

    #[test]
    fn test_trailing_slash_uses_last_directory() {
        let job = Job::from_path("/docs/archive/").unwrap();
        assert_eq!(job.key(), "archive");
    }

    #[test]
    fn test_path_without_file_name() {
        for path in ["", "/", ".."] {
            assert_eq!(
                Job::from_path(path),
                Err(JobError::NoFileName(path.to_string()))
            );
        }
    }

    #[test]
    fn test_request_deserialization_ignores_extra_fields() {
        let request: JobRequest =
            serde_json::from_str(r#"{"path": "/a/b.pdf", "title": "B"}"#).unwrap();
        assert_eq!(request.path, "/a/b.pdf");
    }

    #[test]
    fn test_request_requires_path() {
        let result = serde_json::from_str::<JobRequest>(r#"{"file": "/a/b.pdf"}"#);
        assert!(result.is_err());
    }
}

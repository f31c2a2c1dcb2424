//! # Contexto de Planificación
//! src/jobs/scheduler.rs
//!
//! El `Scheduler` es dueño de la cola y se inyecta tanto en el servidor
//! (productor) como en el worker (consumidor). No hay estado global.
//!
//! Opcionalmente registra las keys en curso para colapsar requests
//! duplicados que llegan mientras el primer job todavía no terminó.

use crate::jobs::job::Job;
use crate::jobs::queue::JobQueue;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Contexto compartido entre servidor y worker
#[derive(Debug, Clone)]
pub struct Scheduler {
    queue: JobQueue,

    /// Keys encoladas o en ejecución (solo si se colapsan duplicados)
    claims: Option<Arc<Mutex<HashSet<String>>>>,
}

impl Scheduler {
    /// Crea un scheduler
    ///
    /// Con `collapse_duplicates = false` cada request pendiente genera un job,
    /// aunque la key ya esté en la cola.
    pub fn new(collapse_duplicates: bool) -> Self {
        Self {
            queue: JobQueue::new(),
            claims: collapse_duplicates.then(|| Arc::new(Mutex::new(HashSet::new()))),
        }
    }

    /// Encola un job
    ///
    /// Retorna false si la key ya estaba reclamada y el job se descartó.
    pub fn submit(&self, job: Job) -> bool {
        if let Some(claims) = &self.claims {
            let mut claims = claims.lock().unwrap_or_else(PoisonError::into_inner);
            if !claims.insert(job.key().to_string()) {
                debug!(key = job.key(), "job ya en curso, no se encola de nuevo");
                return false;
            }
        }

        self.queue.push(job);
        true
    }

    /// Espera el siguiente job hasta `timeout`
    pub fn next(&self, timeout: Duration) -> Option<Job> {
        self.queue.pop(timeout)
    }

    /// Libera la key de un job terminado (con o sin éxito)
    pub fn complete(&self, job: &Job) {
        if let Some(claims) = &self.claims {
            let mut claims = claims.lock().unwrap_or_else(PoisonError::into_inner);
            claims.remove(job.key());
        }
    }

    /// Jobs esperando en la cola
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(false)
    }
}

//! # Cola FIFO de Jobs
//! src/jobs/queue.rs
//!
//! Cola thread-safe y sin límite de capacidad, construida sobre un canal
//! MPMC. Los productores son las conexiones; el consumidor es un único worker.
//!
//! No hay prioridades ni deduplicación: dos requests por la misma key
//! producen dos jobs.

use crate::jobs::job::Job;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::time::Duration;

/// Cola de jobs compartida
///
/// Clonar la cola comparte el mismo canal.
#[derive(Debug, Clone)]
pub struct JobQueue {
    sender: Sender<Job>,
    receiver: Receiver<Job>,
}

impl JobQueue {
    /// Crea una cola vacía
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Encola un job sin bloquear
    pub fn push(&self, job: Job) {
        // La cola conserva su propio receiver, el canal nunca queda desconectado
        let _ = self.sender.send(job);
    }

    /// Desencola el job más antiguo
    ///
    /// Bloquea hasta `timeout`; retorna None si no llegó nada.
    pub fn pop(&self, timeout: Duration) -> Option<Job> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Intenta desencolar sin bloquear
    pub fn try_pop(&self) -> Option<Job> {
        self.receiver.try_recv().ok()
    }

    /// Retorna el tamaño actual de la cola
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Verifica si la cola está vacía
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

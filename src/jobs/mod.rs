//! # Sistema de Jobs
//!
//! Los requests nunca esperan al modelo: si no hay entrada en caché se
//! encola un job y se responde de inmediato. Un worker en segundo plano
//! drena la cola.
//!
//! - `job`: descriptor del trabajo (path + key)
//! - `queue`: cola FIFO multi-productor
//! - `scheduler`: cola + colapso opcional de duplicados
//! - `worker`: loop que extrae, resume y escribe la caché

pub mod job;
pub mod queue;
pub mod scheduler;
pub mod worker;

pub use job::{Job, JobError, JobRequest};
pub use queue::JobQueue;
pub use scheduler::Scheduler;
pub use worker::{Outcome, Worker, WorkerConfig};

//! # Servidor TCP
//! src/server/tcp.rs
//!
//! Loop de aceptación. Por defecto las conexiones se atienden en serie,
//! una tras otra en el mismo thread; con `--concurrent` cada conexión
//! se procesa en su propio thread.
//!
//! Errores de `accept` transitorios (conexión abortada o reseteada,
//! interrupción) se loguean y se ignoran. Cualquier otro detiene el
//! servidor y se devuelve al llamador; el worker sigue corriendo.

use crate::cache::CacheResolver;
use crate::config::Config;
use crate::jobs::Scheduler;
use crate::server::connection::ConnectionHandler;
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errores fatales del servidor
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("accept failed: {0}")]
    Accept(#[source] io::Error),
}

/// Servidor de resúmenes
pub struct Server {
    config: Config,
    handler: Arc<ConnectionHandler>,
}

impl Server {
    pub fn new(config: Config, resolver: CacheResolver, scheduler: Scheduler) -> Self {
        let handler = ConnectionHandler::new(resolver, scheduler, config.read_timeout());
        Self {
            config,
            handler: Arc::new(handler),
        }
    }

    /// Hace bind en la dirección configurada y atiende conexiones
    ///
    /// Solo retorna ante un error fatal.
    pub fn run(&self) -> Result<(), ServerError> {
        let address = self.config.address();
        info!("[*] Iniciando servidor en {}", address);

        let listener = TcpListener::bind(&address).map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;

        self.serve(listener)
    }

    /// Atiende conexiones sobre un listener ya creado
    pub fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        let local = listener
            .local_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        let mode = if self.config.concurrent {
            "un thread por conexión"
        } else {
            "conexiones en serie"
        };
        info!("[+] Servidor escuchando en {} ({})", local, mode);

        loop {
            match listener.accept() {
                Ok((stream, peer)) => self.dispatch(stream, peer),
                Err(e) if is_transient(&e) => {
                    warn!(error = %e, "error transitorio al aceptar conexión");
                }
                Err(e) => {
                    error!(error = %e, "❌ error fatal al aceptar conexiones");
                    return Err(ServerError::Accept(e));
                }
            }
        }
    }

    fn dispatch(&self, stream: TcpStream, peer: SocketAddr) {
        debug!(%peer, "nueva conexión");

        if !self.config.concurrent {
            if let Err(e) = self.handler.handle(stream) {
                warn!(%peer, error = %e, "error en la conexión");
            }
            return;
        }

        let handler = Arc::clone(&self.handler);
        let spawned = thread::Builder::new()
            .name(format!("conn-{}", peer))
            .spawn(move || {
                if let Err(e) = handler.handle(stream) {
                    warn!(%peer, error = %e, "error en la conexión");
                }
            });

        if let Err(e) = spawned {
            error!(%peer, error = %e, "no se pudo crear el thread de la conexión");
        }
    }
}

fn is_transient(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
    )
}

use log::{error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, Semaphore};

use crate::auth::TokenRegistry;
use crate::config::ServerConfig;
use crate::error::ProtocolError;
use crate::middleware::logging::{log_connection, log_request};
use crate::protocol::{HandlerContext, Response, handle_request, read_request};

/// Slack on top of the upload cap for headers and multipart framing
const BODY_OVERHEAD_BYTES: u64 = 1024 * 1024;

pub struct Server {
    listener: TcpListener,
    context: Arc<HandlerContext>,
    permits: Arc<Semaphore>,
}

impl Server {
    /// Bind the listener and prepare shared state. Panics when the socket
    /// or the library root is unusable, matching a failed startup.
    pub async fn bind(config: ServerConfig) -> Self {
        let (startup, runtime) = config.split();
        let socket = startup.listen_socket();

        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => {
                info!("Server bound to {}", socket);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                panic!("Server startup failed on socket {}: {}", socket, e);
            }
        };

        if let Err(e) = std::fs::create_dir_all(startup.library_root_path()) {
            error!("Failed to create library root: {}", e);
            panic!("Library root {} is unusable: {}", startup.library_root, e);
        }
        info!("Library root: {}", startup.library_root);

        let max_clients = runtime.read().await.max_clients;

        Self {
            listener,
            context: Arc::new(HandlerContext {
                startup: Arc::new(startup),
                runtime,
                tokens: Arc::new(Mutex::new(TokenRegistry::default())),
            }),
            permits: Arc::new(Semaphore::new(max_clients)),
        }
    }

    /// Address the listener actually bound (port 0 resolves here)
    pub fn local_addr(&self) -> SocketAddr {
        self.listener
            .local_addr()
            .expect("listener has a local address")
    }

    /// Accept loop. Each connection is served by its own task; the
    /// semaphore keeps concurrent connections at max_clients.
    pub async fn start(&self) {
        info!("Starting library server on {}", self.local_addr());

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let permit = match Arc::clone(&self.permits).acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => break,
                    };
                    let context = Arc::clone(&self.context);

                    tokio::spawn(async move {
                        let _permit = permit;
                        handle_connection(stream, addr, context).await;
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

/// Serve one request on one connection, then close
async fn handle_connection(stream: TcpStream, addr: SocketAddr, context: Arc<HandlerContext>) {
    log_connection(&addr);

    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let max_body = context.runtime.read().await.max_file_size_bytes() + BODY_OVERHEAD_BYTES;

    let response = match read_request(&mut reader, max_body).await {
        Ok(request) => {
            let response = handle_request(&request, &context).await;
            log_request(&addr, &request.method.to_string(), &request.path, response.status);
            response
        }
        Err(ProtocolError::BodyTooLarge(_)) => {
            let limit = context.runtime.read().await.max_file_size_mb;
            warn!("Rejected oversized request from {}", addr);
            Response::error(400, &format!("File too large. Maximum size is {}MB.", limit))
        }
        Err(e) => {
            warn!("Bad request from {}: {}", addr, e);
            Response::error(400, &e.to_string())
        }
    };

    if let Err(e) = write_half.write_all(&response.into_bytes()).await {
        warn!("Failed to write response to {}: {}", addr, e);
        return;
    }
    let _ = write_half.flush().await;
}

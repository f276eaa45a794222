//! `CardroomServer` builder and accept loop.
//!
//! This is the entry point for running a Cardroom lobby server. It ties
//! the layers together: transport → protocol → session → lobby.

use std::sync::Arc;
use std::time::Duration;

use cardroom_lobby::{Hub, LobbyConfig};
use cardroom_protocol::JsonCodec;
use cardroom_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::CardroomError;
use crate::handler::handle_connection;

/// Default listen address.
pub const DEFAULT_BIND: &str = "0.0.0.0:3001";

/// How long a connection may stay silent before it is dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Shared server state passed to each connection handler task.
///
/// Every lobby mutation happens under the one `hub` lock, so each inbound
/// message is applied against a consistent view of every lobby.
pub(crate) struct ServerState {
    pub(crate) hub: Mutex<Hub>,
    pub(crate) codec: JsonCodec,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a Cardroom server.
///
/// # Example
///
/// ```rust,no_run
/// use cardroom::prelude::*;
///
/// # async fn demo() -> Result<(), CardroomError> {
/// let server = CardroomServer::builder()
///     .bind("127.0.0.1:3001")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct CardroomServerBuilder {
    bind_addr: String,
    idle_timeout: Duration,
    lobby_config: LobbyConfig,
}

impl CardroomServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND.to_string(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            lobby_config: LobbyConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets how long a connection may go without sending anything.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Sets the defaults applied to newly created lobbies.
    pub fn lobby_config(mut self, config: LobbyConfig) -> Self {
        self.lobby_config = config;
        self
    }

    /// Binds the listener and builds the server.
    pub async fn build(self) -> Result<CardroomServer, CardroomError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            hub: Mutex::new(Hub::new(self.lobby_config)),
            codec: JsonCodec,
            idle_timeout: self.idle_timeout,
        });

        Ok(CardroomServer { transport, state })
    }
}

impl Default for CardroomServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Cardroom server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct CardroomServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl CardroomServer {
    /// Creates a new builder.
    pub fn builder() -> CardroomServerBuilder {
        CardroomServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop, spawning one handler task per connection.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), CardroomError> {
        tracing::info!(addr = ?self.local_addr().ok(), "cardroom server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

//! Shared request state

use std::sync::Arc;

use tabletop_core::{ApplicationServices, SharedBroker};
use tokio_util::sync::CancellationToken;

/// State handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub services: ApplicationServices,
    token_secret: Arc<[u8]>,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        services: ApplicationServices,
        token_secret: Vec<u8>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            services,
            token_secret: token_secret.into(),
            shutdown,
        }
    }

    pub fn broker(&self) -> SharedBroker {
        self.services.broker.clone()
    }

    pub fn token_secret(&self) -> &[u8] {
        &self.token_secret
    }

    /// Token cancelled on server shutdown; sessions derive child tokens from it
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}

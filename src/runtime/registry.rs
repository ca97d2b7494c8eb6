//! Explicit device-context registry
//!
//! Clients are opened once per device ordinal and handed out by value
//! (clients are cheap `Clone` handles). Nothing here is global: callers own
//! the registry and pass the clients it returns into every operation.

use super::{Runtime, RuntimeClient};
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Registry of live clients for one runtime, keyed by device ordinal
pub struct ContextRegistry<R: Runtime> {
    clients: Mutex<HashMap<usize, R::Client>>,
}

impl<R: Runtime> ContextRegistry<R> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Open device `index` and register a client for it
    ///
    /// Initializing an ordinal that is already live returns the existing client.
    pub fn init(&self, index: usize) -> Result<R::Client> {
        let mut clients = self.clients.lock();
        if let Some(client) = clients.get(&index) {
            return Ok(client.clone());
        }

        let device = R::open_device(index)?;
        let client = R::create_client(&device)?;
        log::debug!("{}: initialized context for device {}", R::name(), index);
        clients.insert(index, client.clone());
        Ok(client)
    }

    /// Client for an initialized device
    pub fn client(&self, index: usize) -> Result<R::Client> {
        self.clients.lock().get(&index).cloned().ok_or_else(|| {
            Error::Backend(format!(
                "{}: device {} has not been initialized",
                R::name(),
                index
            ))
        })
    }

    /// Whether a client is registered for `index`
    pub fn is_initialized(&self, index: usize) -> bool {
        self.clients.lock().contains_key(&index)
    }

    /// Synchronize and drop the client for `index`
    ///
    /// Returns `false` if nothing was registered. Clones of the client handed
    /// out earlier stay usable; the registry only forgets it.
    pub fn teardown(&self, index: usize) -> Result<bool> {
        let client = self.clients.lock().remove(&index);
        match client {
            Some(client) => {
                client.synchronize()?;
                log::debug!("{}: tore down context for device {}", R::name(), index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Tear down every registered client
    ///
    /// All clients are removed even if one fails to synchronize; the first
    /// failure is returned.
    pub fn teardown_all(&self) -> Result<()> {
        let drained: Vec<(usize, R::Client)> = self.clients.lock().drain().collect();
        let mut first_err = None;
        for (index, client) in drained {
            if let Err(e) = client.synchronize() {
                log::warn!("{}: synchronize failed on device {}: {}", R::name(), index, e);
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Number of registered clients
    pub fn len(&self) -> usize {
        self.clients.lock().len()
    }

    /// Whether no client is registered
    pub fn is_empty(&self) -> bool {
        self.clients.lock().is_empty()
    }
}

impl<R: Runtime> Default for ContextRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

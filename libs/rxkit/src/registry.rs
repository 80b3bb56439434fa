//! Type-keyed handler registry.
//!
//! Key = `type_name::<R>()` of the request type; value = `Arc<dyn
//! RequestHandler<R>>` stored as `Box<dyn Any + Send + Sync>` and downcast on
//! read. Registering twice replaces the earlier handler.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::handler::RequestHandler;
use crate::request::Request;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("no handler registered for {request}")]
    NotFound { request: &'static str },

    #[error("handler type mismatch for {request}")]
    TypeMismatch { request: &'static str },
}

type Boxed = Box<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct HandlerRegistry {
    map: RwLock<HashMap<&'static str, Boxed>>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let map = self.map.read();
        let mut keys: Vec<_> = map.keys().copied().collect();
        keys.sort_unstable();
        f.debug_struct("HandlerRegistry")
            .field("handlers", &keys)
            .finish()
    }
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<R: Request>(&self, handler: Arc<dyn RequestHandler<R>>) {
        let key = type_name::<R>();
        let previous = self.map.write().insert(key, Box::new(handler));
        if previous.is_some() {
            tracing::debug!(request = key, "replaced request handler");
        }
    }

    /// # Errors
    /// [`RegistryError::NotFound`] when nothing is registered for `R`.
    pub fn resolve<R: Request>(&self) -> Result<Arc<dyn RequestHandler<R>>, RegistryError> {
        let key = type_name::<R>();
        let map = self.map.read();
        let boxed = map.get(key).ok_or(RegistryError::NotFound { request: key })?;
        boxed
            .downcast_ref::<Arc<dyn RequestHandler<R>>>()
            .cloned()
            .ok_or(RegistryError::TypeMismatch { request: key })
    }

    #[must_use]
    pub fn contains<R: Request>(&self) -> bool {
        self.map.read().contains_key(type_name::<R>())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}

//! Handler Registry
//!
//! Method name to handler mapping. Built once through [`RegistryBuilder`];
//! the resulting [`Registry`] is immutable and shared by all workers.

use crate::error::HandlerError;
use crate::types::Params;
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use webrpc_core::port::Gateway;

/// Boxed handler output
pub type HandlerFuture = BoxFuture<'static, Result<Value, HandlerError>>;

/// Type-erased method handler
pub type HandlerFn = Arc<dyn Fn(Params, Arc<dyn Gateway>) -> HandlerFuture + Send + Sync>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("method '{0}' is already registered")]
    Duplicate(String),

    #[error("method name must not be empty")]
    EmptyMethod,
}

#[derive(Default)]
pub struct RegistryBuilder {
    handlers: HashMap<String, HandlerFn>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `method` to `handler`. Binding a name twice is an error.
    pub fn register<F, Fut>(
        &mut self,
        method: impl Into<String>,
        handler: F,
    ) -> Result<&mut Self, RegistryError>
    where
        F: Fn(Params, Arc<dyn Gateway>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        let method = method.into();
        if method.is_empty() {
            return Err(RegistryError::EmptyMethod);
        }
        if self.handlers.contains_key(&method) {
            return Err(RegistryError::Duplicate(method));
        }

        let handler: HandlerFn =
            Arc::new(move |params: Params, gateway: Arc<dyn Gateway>| -> HandlerFuture {
                Box::pin(handler(params, gateway))
            });
        self.handlers.insert(method, handler);
        Ok(self)
    }

    pub fn build(self) -> Registry {
        Registry {
            handlers: self.handlers,
        }
    }
}

/// Immutable method table
pub struct Registry {
    handlers: HashMap<String, HandlerFn>,
}

impl Registry {
    pub fn lookup(&self, method: &str) -> Option<&HandlerFn> {
        self.handlers.get(method)
    }

    pub fn contains(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Registered method names, sorted
    pub fn methods(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("methods", &self.methods())
            .finish()
    }
}

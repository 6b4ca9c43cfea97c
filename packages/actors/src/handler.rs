//! Job body trait and registry.

use publish_core::Job;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Result type for job bodies.
pub type HandlerResult = Result<(), String>;

/// Future type for async job bodies.
pub type HandlerFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send>>;

/// Trait for job bodies.
///
/// Implement this trait to define how jobs of a specific category are executed.
pub trait JobHandler: Send + Sync + 'static {
    /// The job category this handler executes.
    fn category(&self) -> &str;

    /// Execute a job.
    fn handle(&self, job: &Job) -> HandlerFuture;
}

/// Registry for job bodies.
///
/// Maps categories to their handlers for dynamic dispatch. Lookups ignore case.
#[derive(Default)]
pub struct JobHandlerRegistry {
    handlers: HashMap<String, Arc<dyn JobHandler>>,
}

impl JobHandlerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for a category.
    pub fn register<H: JobHandler>(&mut self, handler: H) {
        let category = handler.category().to_lowercase();
        self.handlers.insert(category, Arc::new(handler));
    }

    /// Get the handler for a category.
    pub fn get(&self, category: &str) -> Option<Arc<dyn JobHandler>> {
        self.handlers.get(&category.to_lowercase()).cloned()
    }

    /// Check if a handler exists for a category.
    pub fn has_handler(&self, category: &str) -> bool {
        self.handlers.contains_key(&category.to_lowercase())
    }
}

/// A simple function-based job handler.
pub struct FnHandler<F>
where
    F: Fn(&Job) -> HandlerFuture + Send + Sync + 'static,
{
    category: String,
    handler: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&Job) -> HandlerFuture + Send + Sync + 'static,
{
    /// Create a new function-based handler.
    pub fn new(category: impl Into<String>, handler: F) -> Self {
        Self {
            category: category.into(),
            handler,
        }
    }
}

impl<F> JobHandler for FnHandler<F>
where
    F: Fn(&Job) -> HandlerFuture + Send + Sync + 'static,
{
    fn category(&self) -> &str {
        &self.category
    }

    fn handle(&self, job: &Job) -> HandlerFuture {
        (self.handler)(job)
    }
}

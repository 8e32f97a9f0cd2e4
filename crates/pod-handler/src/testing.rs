//! Test doubles shared by the unit tests in this crate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use pod_types::{HttpError, HttpResult};

use crate::AsyncHandler;

/// Accepts or rejects every input, counting calls.
pub struct StaticHandler {
    name: String,
    rejection: Option<HttpError>,
    checks: AtomicUsize,
    handled: AtomicUsize,
}

impl StaticHandler {
    pub fn accepting(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            rejection: None,
            checks: AtomicUsize::new(0),
            handled: AtomicUsize::new(0),
        })
    }

    pub fn rejecting(name: &str, error: HttpError) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            rejection: Some(error),
            checks: AtomicUsize::new(0),
            handled: AtomicUsize::new(0),
        })
    }

    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    pub fn handled(&self) -> usize {
        self.handled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AsyncHandler<u32, String> for StaticHandler {
    fn name(&self) -> &str {
        &self.name
    }

    async fn can_handle(&self, _input: &u32) -> HttpResult<()> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        match &self.rejection {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn handle(&self, input: u32) -> HttpResult<String> {
        self.handled.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{}:{input}", self.name))
    }
}

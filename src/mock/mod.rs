//! Mock API server
//!
//! An in-process [`Transport`] for tests: scripted expectations go in, canned
//! responses come out. Expectations are matched strictly in FIFO order of
//! registration, so a test script reads top to bottom:
//!
//! ```ignore
//! let server = MockApiServer::new();
//! server
//!     .expect()
//!     .post()
//!     .path("/apis/policy.skiff.dev/v1/sandboxpolicies")
//!     .and_return(200, &policy)
//!     .once();
//! ```
//!
//! A `once` expectation is consumed by its first match; an `always`
//! expectation answers any number of times. A request nothing matches fails
//! the calling operation with [`Error::UnexpectedRequest`] instead of
//! inventing a default response, so a test never silently drifts past a
//! scripting mistake. Every request is also kept in a log for call-count
//! assertions.

use crate::client::{ApiRequest, ApiResponse, Method, Transport};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, Mutex};

type BodyPredicate = Box<dyn Fn(&Value) -> bool + Send + Sync>;

struct Expectation {
    method: Option<Method>,
    path: Option<String>,
    body_matches: Option<BodyPredicate>,
    status: u16,
    body: Value,
    persistent: bool,
}

impl Expectation {
    fn matches(&self, request: &ApiRequest) -> bool {
        if let Some(method) = self.method {
            if method != request.method {
                return false;
            }
        }
        if let Some(path) = &self.path {
            if path != &request.path {
                return false;
            }
        }
        if let Some(predicate) = &self.body_matches {
            match &request.body {
                Some(body) => {
                    if !predicate(body) {
                        return false;
                    }
                }
                None => return false,
            }
        }
        true
    }

    fn response(&self) -> ApiResponse {
        ApiResponse {
            status: self.status,
            body: Some(self.body.clone()),
        }
    }
}

#[derive(Default)]
struct MockState {
    expectations: Vec<Expectation>,
    received: Vec<ApiRequest>,
}

/// Scripted in-process API server. Clones share the same expectation queue
/// and request log.
#[derive(Clone, Default)]
pub struct MockApiServer {
    state: Arc<Mutex<MockState>>,
}

impl MockApiServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start scripting one expectation. Matchers left unset match any
    /// request; the expectation only arms once `once()` or `always()` is
    /// called on the result.
    pub fn expect(&self) -> ExpectationBuilder {
        ExpectationBuilder {
            server: self.clone(),
            method: None,
            path: None,
            body_matches: None,
        }
    }

    /// Snapshot of every request seen so far, in arrival order.
    pub fn received(&self) -> Vec<ApiRequest> {
        self.lock().received.clone()
    }

    pub fn received_count(&self) -> usize {
        self.lock().received.len()
    }

    /// Unconsumed expectations left in the queue. A test that scripted only
    /// `once` expectations can assert this reaches zero.
    pub fn pending_count(&self) -> usize {
        self.lock().expectations.len()
    }

    /// Drop all expectations and the request log.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.expectations.clear();
        state.received.clear();
    }

    fn push(&self, expectation: Expectation) {
        self.lock().expectations.push(expectation);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock server state poisoned")
    }
}

#[async_trait]
impl Transport for MockApiServer {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut state = self.lock();
        state.received.push(request.clone());

        let index = state.expectations.iter().position(|e| e.matches(&request));
        match index {
            Some(i) => {
                let response = state.expectations[i].response();
                tracing::debug!(
                    "{} {} matched expectation {i} ({})",
                    request.method,
                    request.path,
                    response.status
                );
                if !state.expectations[i].persistent {
                    state.expectations.remove(i);
                }
                Ok(response)
            }
            None => {
                tracing::warn!("unexpected request: {} {}", request.method, request.path);
                Err(Error::UnexpectedRequest {
                    method: request.method.to_string(),
                    path: request.path,
                })
            }
        }
    }
}

/// Matcher half of an expectation under construction.
#[must_use = "an expectation does nothing until once() or always() is called"]
pub struct ExpectationBuilder {
    server: MockApiServer,
    method: Option<Method>,
    path: Option<String>,
    body_matches: Option<BodyPredicate>,
}

impl ExpectationBuilder {
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn get(self) -> Self {
        self.method(Method::Get)
    }

    pub fn post(self) -> Self {
        self.method(Method::Post)
    }

    pub fn put(self) -> Self {
        self.method(Method::Put)
    }

    pub fn patch(self) -> Self {
        self.method(Method::Patch)
    }

    pub fn delete(self) -> Self {
        self.method(Method::Delete)
    }

    /// Match the request path exactly, query string included.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Match only requests whose JSON body satisfies the predicate. A
    /// request without a body never matches.
    pub fn body_matches<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.body_matches = Some(Box::new(predicate));
        self
    }

    /// Fix the canned response. Panics if `body` cannot serialize to JSON,
    /// since a broken script should fail where it was written.
    pub fn and_return<B: Serialize>(self, status: u16, body: &B) -> ArmedExpectation {
        let body = serde_json::to_value(body).expect("canned response must serialize");
        ArmedExpectation {
            server: self.server,
            expectation: Expectation {
                method: self.method,
                path: self.path,
                body_matches: self.body_matches,
                status,
                body,
                persistent: false,
            },
        }
    }
}

/// Fully scripted expectation awaiting its lifetime.
#[must_use = "an expectation does nothing until once() or always() is called"]
pub struct ArmedExpectation {
    server: MockApiServer,
    expectation: Expectation,
}

impl ArmedExpectation {
    /// Arm for a single match; the expectation is consumed by it.
    pub fn once(self) {
        self.server.push(self.expectation);
    }

    /// Arm persistently; the expectation answers every match.
    pub fn always(mut self) {
        self.expectation.persistent = true;
        self.server.push(self.expectation);
    }
}

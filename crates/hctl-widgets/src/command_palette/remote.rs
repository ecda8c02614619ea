#![forbid(unsafe_code)]

//! Asynchronous command resolution with request tokens.
//!
//! The palette never spawns work. [`CommandPalette::resolve_remote`] hands
//! the host a [`RemoteRequest`]; the host drives its future on whatever
//! executor it owns and passes the [`RemoteOutcome`] back through
//! [`CommandPalette::complete_remote`]. Outcomes carrying a superseded token
//! are dropped, so only the latest query's results ever land.
//!
//! [`CommandPalette::resolve_remote`]: super::CommandPalette::resolve_remote
//! [`CommandPalette::complete_remote`]: super::CommandPalette::complete_remote

use std::fmt;

use futures::future::BoxFuture;
use hctl_core::RequestToken;

use super::CommandItem;

/// Failure reported by a resolver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("command resolution failed: {message}")]
pub struct ResolveError {
    /// Human-readable reason.
    pub message: String,
}

impl ResolveError {
    /// Create an error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Future produced by a resolver.
pub type ResolveFuture = BoxFuture<'static, Result<Vec<CommandItem>, ResolveError>>;

/// Supplies extra commands for a query.
pub trait Resolver: Send + Sync {
    /// Begin resolving `query`.
    fn resolve(&self, query: &str) -> ResolveFuture;
}

impl<F> Resolver for F
where
    F: Fn(&str) -> ResolveFuture + Send + Sync,
{
    fn resolve(&self, query: &str) -> ResolveFuture {
        self(query)
    }
}

/// An in-flight resolution handed to the host.
#[must_use = "a remote request does nothing until its future is driven"]
pub struct RemoteRequest {
    token: RequestToken,
    query: String,
    future: ResolveFuture,
}

impl fmt::Debug for RemoteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteRequest")
            .field("token", &self.token)
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

impl RemoteRequest {
    pub(crate) fn new(token: RequestToken, query: String, future: ResolveFuture) -> Self {
        Self {
            token,
            query,
            future,
        }
    }

    /// Token this request was issued with.
    #[must_use]
    pub fn token(&self) -> RequestToken {
        self.token
    }

    /// Query this request resolves.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Drive the resolver to completion.
    pub async fn run(self) -> RemoteOutcome {
        let result = self.future.await;
        RemoteOutcome {
            token: self.token,
            query: self.query,
            result,
        }
    }
}

/// A finished resolution, ready for `complete_remote`.
#[derive(Debug, Clone)]
pub struct RemoteOutcome {
    /// Token the request was issued with.
    pub token: RequestToken,
    /// Query that was resolved.
    pub query: String,
    /// Resolver result.
    pub result: Result<Vec<CommandItem>, ResolveError>,
}

impl RemoteOutcome {
    /// Build an outcome directly (hosts resolving out of band, tests).
    #[must_use]
    pub fn new(
        token: RequestToken,
        query: impl Into<String>,
        result: Result<Vec<CommandItem>, ResolveError>,
    ) -> Self {
        Self {
            token,
            query: query.into(),
            result,
        }
    }
}

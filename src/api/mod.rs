//! Request/completion protocol with the kata server.
//!
//! Services never call back into components. They run each request off the
//! UI thread and hand the outcome to a [`Deliver`] sink, which enqueues it on
//! the app's event channel; the app then applies completions one at a time.

#[cfg(feature = "network")]
pub mod http;
pub mod offline;
pub mod recording;

use std::sync::Arc;

use thiserror::Error;

use crate::kata::{ExecutionResult, KataDetail, PhaseGroup};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned HTTP {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("kata not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Unavailable(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    List,
    Detail(String),
    Run { ticket: u64, code: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    List(Result<Vec<PhaseGroup>, FetchError>),
    Detail {
        id: String,
        result: Result<KataDetail, FetchError>,
    },
    Run {
        ticket: u64,
        result: Result<ExecutionResult, FetchError>,
    },
}

pub type Deliver = Arc<dyn Fn(Completion) + Send + Sync>;

pub trait KataService {
    /// Start `request`. Must not block; the outcome arrives later as a
    /// [`Completion`].
    fn send(&self, request: Request);
}

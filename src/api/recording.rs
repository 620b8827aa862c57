use std::cell::RefCell;

use crate::api::{KataService, Request};

/// Service that only records what it was asked to do. Used by tests to
/// resolve requests by hand, in any order.
#[derive(Default)]
pub struct RecordingService {
    requests: RefCell<Vec<Request>>,
}

impl RecordingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }

    pub fn run_count(&self) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|r| matches!(r, Request::Run { .. }))
            .count()
    }

    pub fn detail_requests(&self) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .filter_map(|r| match r {
                Request::Detail(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Ticket of the most recent run request.
    pub fn last_run_ticket(&self) -> Option<u64> {
        self.requests.borrow().iter().rev().find_map(|r| match r {
            Request::Run { ticket, .. } => Some(*ticket),
            _ => None,
        })
    }
}

impl KataService for RecordingService {
    fn send(&self, request: Request) {
        self.requests.borrow_mut().push(request);
    }
}

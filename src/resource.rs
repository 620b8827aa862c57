//! Cached fetches of the kata list and the selected kata's detail.

use std::cell::Cell;
use std::rc::Rc;

use crate::api::{FetchError, KataService, Request};
use crate::kata::{self, KataDetail, PhaseGroup};
use crate::reactive::{Signal, Subscription};

#[derive(Clone, Debug, PartialEq)]
pub enum ListState {
    Loading,
    Ready(Rc<Vec<PhaseGroup>>),
    Failed(FetchError),
}

#[derive(Clone, Debug, PartialEq)]
pub enum DetailState {
    Empty,
    Loading(String),
    Ready(Rc<KataDetail>),
    Failed { id: String, error: FetchError },
}

impl DetailState {
    pub fn detail(&self) -> Option<&Rc<KataDetail>> {
        match self {
            DetailState::Ready(detail) => Some(detail),
            _ => None,
        }
    }
}

pub struct KataResource {
    list: Signal<ListState>,
    detail: Signal<DetailState>,
    current: Signal<Option<String>>,
    service: Rc<dyn KataService>,
    list_requested: Cell<bool>,
    _current_sub: Subscription,
}

impl KataResource {
    /// Watches `current` and issues a detail fetch for every new id.
    pub fn new(current: Signal<Option<String>>, service: Rc<dyn KataService>) -> Self {
        let detail = Signal::new(DetailState::Empty);

        let sub = {
            let detail = detail.clone();
            let service = Rc::clone(&service);
            current.subscribe(move |id| request_detail(&detail, service.as_ref(), id.as_deref()))
        };
        request_detail(&detail, service.as_ref(), current.get().as_deref());

        Self {
            list: Signal::new(ListState::Loading),
            detail,
            current,
            service,
            list_requested: Cell::new(false),
            _current_sub: sub,
        }
    }

    /// Issue the list fetch. Only the first call does anything.
    pub fn start(&self) {
        if self.list_requested.replace(true) {
            return;
        }
        self.service.send(Request::List);
    }

    pub fn list(&self) -> &Signal<ListState> {
        &self.list
    }

    pub fn detail(&self) -> &Signal<DetailState> {
        &self.detail
    }

    pub fn apply_list(&self, result: Result<Vec<PhaseGroup>, FetchError>) {
        match result {
            Ok(phases) => {
                tracing::info!(phases = phases.len(), "kata list loaded");
                self.list.set(ListState::Ready(Rc::new(phases)));
            }
            Err(error) => {
                tracing::warn!(%error, "kata list failed to load");
                self.list.set(ListState::Failed(error));
            }
        }
    }

    /// Apply a detail response if `id` is still the selected kata. Responses
    /// for any other id are stale and dropped.
    pub fn apply_detail(&self, id: &str, result: Result<KataDetail, FetchError>) -> bool {
        let live = self.current.with(|current| current.as_deref() == Some(id));
        if !live {
            tracing::debug!(kata = id, "dropping stale detail response");
            return false;
        }
        match result {
            Ok(detail) => {
                tracing::debug!(kata = id, "detail loaded");
                self.detail.set(DetailState::Ready(Rc::new(detail)));
            }
            Err(error) => {
                tracing::warn!(kata = id, %error, "detail failed to load");
                self.detail.set(DetailState::Failed {
                    id: id.to_string(),
                    error,
                });
            }
        }
        true
    }

    pub fn phase_of(&self, id: &str) -> Option<u32> {
        self.list.with(|list| match list {
            ListState::Ready(phases) => kata::phase_of(phases, id),
            _ => None,
        })
    }
}

fn request_detail(detail: &Signal<DetailState>, service: &dyn KataService, id: Option<&str>) {
    match id {
        Some(id) => {
            detail.set(DetailState::Loading(id.to_string()));
            service.send(Request::Detail(id.to_string()));
        }
        None => {
            detail.set(DetailState::Empty);
        }
    }
}

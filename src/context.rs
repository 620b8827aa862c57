use std::collections::BTreeSet;
use std::rc::Rc;

use crate::api::KataService;
use crate::nav::route::{History, RouteKataBinding};
use crate::reactive::Signal;
use crate::resource::KataResource;
use crate::theme_store::ThemeStore;

/// Process-wide state, built once at startup and handed to components.
/// Tests build a fresh one per case.
pub struct AppContext {
    pub theme: ThemeStore,
    pub route: RouteKataBinding,
    pub resource: KataResource,
    pub expanded_phases: Signal<BTreeSet<u32>>,
    pub service: Rc<dyn KataService>,
}

impl AppContext {
    pub fn new(history: History, service: Rc<dyn KataService>, theme: ThemeStore) -> Self {
        let route = RouteKataBinding::new(history);
        let resource = KataResource::new(route.current_signal().clone(), Rc::clone(&service));
        Self {
            theme,
            route,
            resource,
            expanded_phases: Signal::new(BTreeSet::from([0])),
            service,
        }
    }
}

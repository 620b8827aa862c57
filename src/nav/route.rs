use std::cell::RefCell;

use crate::reactive::Signal;

const KATA_PREFIX: &str = "#/katas/";

/// Id encoded by a location fragment. Anything other than `#/katas/<id>`
/// means no lesson is selected.
pub fn parse_fragment(fragment: &str) -> Option<String> {
    let normalized = if fragment.starts_with('#') {
        fragment.to_string()
    } else {
        format!("#{fragment}")
    };
    let id = normalized.strip_prefix(KATA_PREFIX)?;
    if id.is_empty() || id.contains('/') {
        return None;
    }
    Some(id.to_string())
}

pub fn format_fragment(id: &str) -> String {
    format!("{KATA_PREFIX}{id}")
}

pub trait Location {
    fn fragment(&self) -> String;

    /// Record `fragment` as a new entry. Implementations fire their change
    /// notification afterwards, as a browser fires `hashchange`.
    fn push_fragment(&mut self, fragment: &str);
}

/// In-process location with browser-style back/forward stacks.
pub struct History {
    entries: Vec<String>,
    cursor: usize,
    on_change: Option<Box<dyn Fn()>>,
}

impl History {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: vec![initial.to_string()],
            cursor: 0,
            on_change: None,
        }
    }

    pub fn on_change(&mut self, notify: impl Fn() + 'static) {
        self.on_change = Some(Box::new(notify));
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn back(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        self.cursor -= 1;
        self.fire();
        true
    }

    pub fn forward(&mut self) -> bool {
        if !self.can_go_forward() {
            return false;
        }
        self.cursor += 1;
        self.fire();
        true
    }

    fn fire(&self) {
        if let Some(notify) = &self.on_change {
            notify();
        }
    }
}

impl Location for History {
    fn fragment(&self) -> String {
        self.entries[self.cursor].clone()
    }

    fn push_fragment(&mut self, fragment: &str) {
        if self.entries[self.cursor] == fragment {
            return;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(fragment.to_string());
        self.cursor += 1;
        self.fire();
    }
}

/// Keeps the current kata id in step with the location fragment.
///
/// Edges run one way each: [`select_kata`](Self::select_kata) is the only
/// writer of the fragment, and fragment changes only ever write the id.
pub struct RouteKataBinding {
    current: Signal<Option<String>>,
    history: RefCell<History>,
}

impl RouteKataBinding {
    /// Parses the initial fragment so the id is known before any event runs.
    pub fn new(history: History) -> Self {
        let initial = parse_fragment(&history.fragment());
        tracing::debug!(?initial, "initial route");
        Self {
            current: Signal::new(initial),
            history: RefCell::new(history),
        }
    }

    pub fn current_kata_id(&self) -> Option<String> {
        self.current.get()
    }

    pub fn current_signal(&self) -> &Signal<Option<String>> {
        &self.current
    }

    pub fn fragment(&self) -> String {
        self.history.borrow().fragment()
    }

    pub fn select_kata(&self, id: &str) {
        self.current.set(Some(id.to_string()));
        // The borrow ends before notifying; the notifier only enqueues.
        self.history.borrow_mut().push_fragment(&format_fragment(id));
    }

    /// React to a fragment change. Writes the id only when it differs, so the
    /// notification caused by `select_kata`'s own write is a no-op.
    pub fn handle_fragment_change(&self) -> bool {
        let parsed = parse_fragment(&self.fragment());
        if self.current.with(|current| *current == parsed) {
            return false;
        }
        tracing::info!(kata = ?parsed, "navigated via location");
        self.current.set(parsed)
    }

    pub fn back(&self) -> bool {
        self.history.borrow_mut().back()
    }

    pub fn forward(&self) -> bool {
        self.history.borrow_mut().forward()
    }
}

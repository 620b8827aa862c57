use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};

use crossterm::event::KeyEvent;

use crate::api::{FetchError, KataService, Request};
use crate::kata::{ExecutionResult, KataDetail};
use crate::reactive::{Signal, Subscription};
use crate::resource::DetailState;
use crate::workspace::code_buffer::{CodeBuffer, EditOutcome};

/// Which stored variant the buffer holds verbatim, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveView {
    Broken,
    Correct,
    None,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed(ExecutionResult),
    Failed(ExecutionResult),
}

impl RunState {
    pub fn result(&self) -> Option<&ExecutionResult> {
        match self {
            RunState::Completed(r) | RunState::Failed(r) => Some(r),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Disclosures {
    pub explanation: bool,
    pub interpretation: bool,
    pub hints_revealed: usize,
}

pub struct WorkspaceState {
    pub buffer: CodeBuffer,
    pub active_view: ActiveView,
    pub run_state: RunState,
    pub disclosures: Disclosures,
    detail: Option<Rc<KataDetail>>,
    loaded_id: Option<String>,
    run_ticket: u64,
}

impl WorkspaceState {
    fn new() -> Self {
        Self {
            buffer: CodeBuffer::default(),
            active_view: ActiveView::None,
            run_state: RunState::Idle,
            disclosures: Disclosures::default(),
            detail: None,
            loaded_id: None,
            run_ticket: 0,
        }
    }

    pub fn detail(&self) -> Option<&Rc<KataDetail>> {
        self.detail.as_ref()
    }

    pub fn loaded_id(&self) -> Option<&str> {
        self.loaded_id.as_deref()
    }

    /// Reset to the broken variant when a detail with a new id resolves.
    /// Navigating to another id drops the held detail right away, so nothing
    /// acts on the previous kata while the next one loads or fails.
    fn sync_detail(&mut self, state: &DetailState) {
        let detail = match state {
            DetailState::Ready(detail) => detail,
            DetailState::Loading(id) | DetailState::Failed { id, .. } => {
                if self.loaded_id.as_deref() != Some(id.as_str()) {
                    self.detail = None;
                }
                return;
            }
            DetailState::Empty => {
                self.detail = None;
                return;
            }
        };
        let changed = self.loaded_id.as_deref() != Some(detail.id.as_str());
        self.detail = Some(Rc::clone(detail));
        if !changed {
            return;
        }
        tracing::debug!(kata = %detail.id, "workspace reset for new kata");
        self.loaded_id = Some(detail.id.clone());
        self.buffer.reset(&detail.broken_code);
        self.active_view = ActiveView::Broken;
        self.run_state = RunState::Idle;
        self.disclosures = Disclosures::default();
    }
}

/// Owns the code buffer, the loaded-variant flag and the run lifecycle.
pub struct WorkspaceController {
    state: Rc<RefCell<WorkspaceState>>,
    service: Rc<dyn KataService>,
    _detail_sub: Subscription,
}

impl WorkspaceController {
    pub fn new(detail: &Signal<DetailState>, service: Rc<dyn KataService>) -> Self {
        let state = Rc::new(RefCell::new(WorkspaceState::new()));
        state.borrow_mut().sync_detail(&detail.get());

        let weak: Weak<RefCell<WorkspaceState>> = Rc::downgrade(&state);
        let sub = detail.subscribe(move |d| {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().sync_detail(d);
            }
        });

        Self {
            state,
            service,
            _detail_sub: sub,
        }
    }

    pub fn state(&self) -> Ref<'_, WorkspaceState> {
        self.state.borrow()
    }

    pub fn code(&self) -> String {
        self.state.borrow().buffer.text().to_string()
    }

    pub fn active_view(&self) -> ActiveView {
        self.state.borrow().active_view
    }

    pub fn run_state(&self) -> RunState {
        self.state.borrow().run_state.clone()
    }

    /// Replace the buffer with hand-edited text.
    pub fn edit_code(&self, text: &str) {
        let mut st = self.state.borrow_mut();
        st.buffer.replace(text);
        st.active_view = ActiveView::None;
    }

    /// Route a key to the buffer. Any text change counts as a manual edit.
    pub fn edit_with_key(&self, key: KeyEvent) -> EditOutcome {
        let mut st = self.state.borrow_mut();
        let outcome = st.buffer.handle(key);
        if outcome == EditOutcome::Edited {
            st.active_view = ActiveView::None;
        }
        outcome
    }

    pub fn load_broken(&self) -> bool {
        self.load_variant(ActiveView::Broken)
    }

    pub fn load_correct(&self) -> bool {
        self.load_variant(ActiveView::Correct)
    }

    fn load_variant(&self, view: ActiveView) -> bool {
        let mut st = self.state.borrow_mut();
        let Some(detail) = st.detail.clone() else {
            return false;
        };
        let code = match view {
            ActiveView::Broken => &detail.broken_code,
            ActiveView::Correct => &detail.correct_code,
            ActiveView::None => return false,
        };
        st.buffer.reset(code);
        st.active_view = view;
        st.run_state = RunState::Idle;
        true
    }

    /// Submit the buffer for execution. Dropped while a run is in flight or
    /// while no kata is loaded.
    pub fn run(&self) -> bool {
        let (ticket, code) = {
            let mut st = self.state.borrow_mut();
            if st.run_state == RunState::Running {
                tracing::debug!("run already in flight; ignoring");
                return false;
            }
            if st.detail.is_none() {
                tracing::debug!("no kata loaded; ignoring run");
                return false;
            }
            st.run_ticket += 1;
            st.run_state = RunState::Running;
            (st.run_ticket, st.buffer.text().to_string())
        };
        tracing::info!(ticket, bytes = code.len(), "run requested");
        self.service.send(Request::Run { ticket, code });
        true
    }

    /// Apply a run outcome. Only the in-flight ticket is accepted; results
    /// for runs that were reset or superseded are dropped.
    pub fn apply_run(&self, ticket: u64, result: Result<ExecutionResult, FetchError>) -> bool {
        let mut st = self.state.borrow_mut();
        if st.run_state != RunState::Running || st.run_ticket != ticket {
            tracing::debug!(ticket, "dropping stale run result");
            return false;
        }
        st.run_state = match result {
            Ok(result) => {
                tracing::info!(
                    ticket,
                    success = result.success,
                    ms = result.execution_time_ms,
                    "run finished"
                );
                RunState::Completed(result)
            }
            Err(error) => {
                tracing::warn!(ticket, %error, "run request failed");
                RunState::Failed(ExecutionResult::from_failure(error.to_string()))
            }
        };
        true
    }

    pub fn toggle_explanation(&self) {
        let mut st = self.state.borrow_mut();
        st.disclosures.explanation = !st.disclosures.explanation;
    }

    pub fn toggle_interpretation(&self) {
        let mut st = self.state.borrow_mut();
        st.disclosures.interpretation = !st.disclosures.interpretation;
    }

    /// Reveal the next hint. Returns false once every hint is showing.
    pub fn reveal_hint(&self) -> bool {
        let mut st = self.state.borrow_mut();
        let total = st.detail.as_ref().map_or(0, |d| d.hints.len());
        if st.disclosures.hints_revealed >= total {
            return false;
        }
        st.disclosures.hints_revealed += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::recording::RecordingService;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn detail(id: &str) -> KataDetail {
        KataDetail {
            id: id.into(),
            title: id.into(),
            description: String::new(),
            broken_code: format!("// broken {id}"),
            correct_code: format!("// correct {id}"),
            explanation: String::new(),
            compiler_error_interpretation: String::new(),
            hints: vec!["one".into(), "two".into()],
            phase: None,
            phase_title: None,
            sequence: None,
        }
    }

    fn setup() -> (Signal<DetailState>, Rc<RecordingService>, WorkspaceController) {
        let signal = Signal::new(DetailState::Empty);
        let service = Rc::new(RecordingService::new());
        let controller = WorkspaceController::new(&signal, service.clone());
        (signal, service, controller)
    }

    fn ready(signal: &Signal<DetailState>, id: &str) {
        signal.set(DetailState::Ready(Rc::new(detail(id))));
    }

    #[test]
    fn test_new_detail_resets_workspace() {
        let (signal, _service, ctl) = setup();
        ready(&signal, "a");
        assert_eq!(ctl.code(), "// broken a");
        assert_eq!(ctl.active_view(), ActiveView::Broken);

        ctl.edit_code("changed");
        ctl.toggle_explanation();
        ready(&signal, "b");
        assert_eq!(ctl.code(), "// broken b");
        assert_eq!(ctl.active_view(), ActiveView::Broken);
        assert_eq!(ctl.run_state(), RunState::Idle);
        assert!(!ctl.state().disclosures.explanation);
    }

    #[test]
    fn test_same_id_refetch_keeps_edits() {
        let (signal, _service, ctl) = setup();
        ready(&signal, "a");
        ctl.edit_code("my work");
        signal.set(DetailState::Loading("a".into()));
        ready(&signal, "a");
        assert_eq!(ctl.code(), "my work");
        assert_eq!(ctl.active_view(), ActiveView::None);
    }

    #[test]
    fn test_edit_then_load_broken() {
        let (signal, _service, ctl) = setup();
        ready(&signal, "a");
        ctl.load_broken();
        ctl.edit_code("fn main(){}");
        assert_eq!(ctl.active_view(), ActiveView::None);

        ctl.load_broken();
        assert_eq!(ctl.code(), "// broken a");
        assert_eq!(ctl.active_view(), ActiveView::Broken);
    }

    #[test]
    fn test_edit_matching_variant_still_clears_view() {
        let (signal, _service, ctl) = setup();
        ready(&signal, "a");
        ctl.edit_code("// broken a");
        assert_eq!(ctl.active_view(), ActiveView::None);
    }

    #[test]
    fn test_buffer_is_a_copy() {
        let (signal, _service, ctl) = setup();
        ready(&signal, "a");
        ctl.edit_code("x");
        let shown = signal.get();
        assert_eq!(shown.detail().unwrap().broken_code, "// broken a");
    }

    #[test]
    fn test_key_edit_clears_view_but_cursor_move_does_not() {
        let (signal, _service, ctl) = setup();
        ready(&signal, "a");
        ctl.edit_with_key(KeyEvent::new(KeyCode::Right, KeyModifiers::NONE));
        assert_eq!(ctl.active_view(), ActiveView::Broken);
        ctl.edit_with_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        assert_eq!(ctl.active_view(), ActiveView::None);
    }

    #[test]
    fn test_load_correct_discards_result() {
        let (signal, service, ctl) = setup();
        ready(&signal, "a");
        ctl.run();
        let ticket = service.last_run_ticket().unwrap();
        ctl.load_correct();
        assert_eq!(ctl.code(), "// correct a");
        assert_eq!(ctl.active_view(), ActiveView::Correct);
        assert_eq!(ctl.run_state(), RunState::Idle);

        let late = ExecutionResult {
            stdout: "late".into(),
            stderr: String::new(),
            success: true,
            execution_time_ms: 1,
            error: None,
        };
        assert!(!ctl.apply_run(ticket, Ok(late)));
        assert_eq!(ctl.run_state(), RunState::Idle);
    }

    #[test]
    fn test_run_while_running_is_dropped() {
        let (signal, service, ctl) = setup();
        ready(&signal, "a");
        assert!(ctl.run());
        assert!(!ctl.run());
        assert!(!ctl.run());
        assert_eq!(service.run_count(), 1);
        assert_eq!(
            service.requests().last(),
            Some(&Request::Run {
                ticket: 1,
                code: "// broken a".into()
            })
        );
    }

    #[test]
    fn test_run_success_then_rerun_clears_result() {
        let (signal, service, ctl) = setup();
        ready(&signal, "a");
        ctl.run();
        let result = ExecutionResult {
            stdout: "6".into(),
            stderr: String::new(),
            success: true,
            execution_time_ms: 12,
            error: None,
        };
        assert!(ctl.apply_run(service.last_run_ticket().unwrap(), Ok(result.clone())));
        assert_eq!(ctl.run_state(), RunState::Completed(result));

        assert!(ctl.run());
        assert_eq!(ctl.run_state(), RunState::Running);
        assert_eq!(service.run_count(), 2);
    }

    #[test]
    fn test_run_failure_is_reshaped() {
        let (signal, service, ctl) = setup();
        ready(&signal, "a");
        ctl.run();
        ctl.apply_run(
            service.last_run_ticket().unwrap(),
            Err(FetchError::Network("connection refused".into())),
        );
        match ctl.run_state() {
            RunState::Failed(r) => {
                assert!(!r.success);
                assert_eq!(r.stdout, "");
                assert_eq!(r.execution_time_ms, 0);
                assert_eq!(r.error.as_deref(), Some("network error: connection refused"));
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn test_load_without_detail_is_noop() {
        let (_signal, _service, ctl) = setup();
        assert!(!ctl.load_broken());
        assert_eq!(ctl.active_view(), ActiveView::None);
    }

    #[test]
    fn test_navigating_away_drops_previous_detail() {
        let (signal, service, ctl) = setup();
        ready(&signal, "k1");
        signal.set(DetailState::Loading("k2".into()));
        signal.set(DetailState::Failed {
            id: "k2".into(),
            error: FetchError::Status(404),
        });

        assert!(ctl.state().detail().is_none());
        assert!(!ctl.load_correct());
        assert_eq!(ctl.code(), "// broken k1");
        assert_eq!(ctl.active_view(), ActiveView::Broken);
        assert!(!ctl.reveal_hint());
        assert!(!ctl.run());
        assert_eq!(service.run_count(), 0);

        ready(&signal, "k2");
        assert_eq!(ctl.code(), "// broken k2");
        assert!(ctl.load_correct());
        assert_eq!(ctl.code(), "// correct k2");
    }

    #[test]
    fn test_empty_selection_drops_detail() {
        let (signal, _service, ctl) = setup();
        ready(&signal, "a");
        signal.set(DetailState::Empty);
        assert!(ctl.state().detail().is_none());
        assert!(!ctl.load_broken());
    }

    #[test]
    fn test_run_without_detail_is_dropped() {
        let (_signal, service, ctl) = setup();
        assert!(!ctl.run());
        assert_eq!(ctl.run_state(), RunState::Idle);
        assert_eq!(service.run_count(), 0);
    }

    #[test]
    fn test_reveal_hints_stops_at_total() {
        let (signal, _service, ctl) = setup();
        ready(&signal, "a");
        assert!(ctl.reveal_hint());
        assert!(ctl.reveal_hint());
        assert!(!ctl.reveal_hint());
        assert_eq!(ctl.state().disclosures.hints_revealed, 2);
    }

    #[test]
    fn test_teardown_unsubscribes() {
        let (signal, _service, ctl) = setup();
        assert_eq!(signal.subscriber_count(), 1);
        drop(ctl);
        assert_eq!(signal.subscriber_count(), 0);
    }
}

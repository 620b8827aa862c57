use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::api::Completion;
use crate::config::Config;
use crate::context::AppContext;
use crate::event::AppEvent;
use crate::nav::sidebar::SidebarTree;
use crate::reactive::Subscriptions;
use crate::ui::components::sidebar_tree;
use crate::ui::theme::Theme;
use crate::workspace::controller::WorkspaceController;
use crate::workspace::split::{NUDGE_STEP, Panel, PointerCapture, SplitPaneLayout};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Editor,
    Output,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Sidebar => Focus::Editor,
            Focus::Editor => Focus::Output,
            Focus::Output => Focus::Sidebar,
        }
    }
}

pub struct App {
    pub ctx: AppContext,
    pub sidebar: SidebarTree,
    pub workspace: WorkspaceController,
    pub layout: SplitPaneLayout,
    pub theme: Rc<RefCell<Theme>>,
    pub config: Config,
    pub focus: Focus,
    pub output_scroll: u16,
    pub should_quit: bool,
    /// Sidebar rect from the last frame, for mouse hit testing.
    pub sidebar_area: Cell<Option<Rect>>,
    _subs: Subscriptions,
}

impl App {
    pub fn new(config: Config, ctx: AppContext, capture: Rc<dyn PointerCapture>) -> Self {
        let sidebar = SidebarTree::new(
            ctx.expanded_phases.clone(),
            ctx.resource.list().clone(),
            ctx.route.current_signal().clone(),
        );
        let workspace = WorkspaceController::new(ctx.resource.detail(), Rc::clone(&ctx.service));
        let layout = SplitPaneLayout::with_ratio(config.split_ratio, capture);

        // Apply the palette now and on every preference change.
        let theme = Rc::new(RefCell::new(Theme::for_preference(ctx.theme.get())));
        let mut subs = Subscriptions::new();
        {
            let theme = Rc::clone(&theme);
            subs.push(ctx.theme.signal().subscribe(move |pref| {
                *theme.borrow_mut() = Theme::for_preference(*pref);
            }));
        }

        let focus = if ctx.route.current_kata_id().is_some() {
            Focus::Editor
        } else {
            Focus::Sidebar
        };

        Self {
            ctx,
            sidebar,
            workspace,
            layout,
            theme,
            config,
            focus,
            output_scroll: 0,
            should_quit: false,
            sidebar_area: Cell::new(None),
            _subs: subs,
        }
    }

    /// Kick off the startup fetches.
    pub fn start(&self) {
        self.ctx.resource.start();
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Mouse(mouse) => self.handle_mouse(mouse),
            AppEvent::FragmentChanged => {
                if self.ctx.route.handle_fragment_change() {
                    self.sidebar.focus_current();
                }
            }
            AppEvent::Completed(completion) => self.apply_completion(completion),
            AppEvent::Tick | AppEvent::Resize(_, _) => {}
        }
    }

    pub fn apply_completion(&mut self, completion: Completion) {
        match completion {
            Completion::List(result) => {
                self.ctx.resource.apply_list(result);
                self.sidebar.focus_current();
            }
            Completion::Detail { id, result } => {
                if self.ctx.resource.apply_detail(&id, result) {
                    self.output_scroll = 0;
                }
            }
            Completion::Run { ticket, result } => {
                if self.workspace.apply_run(ticket, result) {
                    self.output_scroll = 0;
                }
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if self.handle_global_key(key) {
            return;
        }
        match self.focus {
            Focus::Sidebar => self.handle_sidebar_key(key),
            Focus::Editor => self.handle_editor_key(key),
            Focus::Output => self.handle_output_key(key),
        }
    }

    fn handle_global_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => self.should_quit = true,
            KeyCode::Char('t') if ctrl => {
                self.ctx.theme.toggle();
            }
            KeyCode::Char('r') if ctrl => self.run(),
            KeyCode::F(5) => self.run(),
            KeyCode::F(2) => {
                self.workspace.load_broken();
            }
            KeyCode::F(3) => {
                self.workspace.load_correct();
            }
            KeyCode::F(4) => {
                self.workspace.reveal_hint();
            }
            KeyCode::F(6) => self.layout.toggle_maximize(Panel::Code),
            KeyCode::F(7) => self.layout.toggle_maximize(Panel::Output),
            KeyCode::F(8) => self.workspace.toggle_explanation(),
            KeyCode::F(9) => self.workspace.toggle_interpretation(),
            KeyCode::Left if alt => {
                self.ctx.route.back();
            }
            KeyCode::Right if alt => {
                self.ctx.route.forward();
            }
            KeyCode::Left if ctrl => self.layout.nudge(-NUDGE_STEP),
            KeyCode::Right if ctrl => self.layout.nudge(NUDGE_STEP),
            KeyCode::BackTab => self.focus = self.focus.next(),
            KeyCode::Tab if self.focus != Focus::Editor => self.focus = self.focus.next(),
            KeyCode::Esc if self.focus == Focus::Editor => self.focus = Focus::Sidebar,
            _ => return false,
        }
        true
    }

    fn handle_sidebar_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.sidebar.move_up(),
            KeyCode::Down | KeyCode::Char('j') => self.sidebar.move_down(),
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('l') => {
                self.sidebar.activate(&self.ctx.route);
            }
            _ => {}
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        self.workspace.edit_with_key(key);
    }

    fn handle_output_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.output_scroll = self.output_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.output_scroll = self.output_scroll.saturating_add(1);
            }
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn run(&mut self) {
        if self.workspace.run() {
            self.output_scroll = 0;
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        // While dragging, every pointer event belongs to the layout.
        if self.layout.is_dragging() {
            match mouse.kind {
                MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                    self.layout.drag_to(mouse.column);
                }
                MouseEventKind::Up(_) => self.layout.end_drag(),
                _ => {}
            }
            return;
        }

        let MouseEventKind::Down(MouseButton::Left) = mouse.kind else {
            return;
        };
        // The sidebar is tested first; a divider cached from an older frame
        // must never shadow it.
        if let Some(area) = self.sidebar_area.get() {
            let in_sidebar = mouse.column >= area.x
                && mouse.column < area.x + area.width
                && mouse.row >= area.y
                && mouse.row < area.y + area.height;
            if in_sidebar {
                let in_rows = mouse.row > area.y && mouse.row < area.y + area.height - 1;
                if in_rows {
                    self.focus = Focus::Sidebar;
                    let visible = area.height.saturating_sub(2) as usize;
                    let index = sidebar_tree::scroll_offset(self.sidebar.cursor(), visible)
                        + (mouse.row - area.y - 1) as usize;
                    self.sidebar.activate_row(index, &self.ctx.route);
                }
                return;
            }
        }
        if self.layout.divider_hit(mouse.column, mouse.row) {
            self.layout.begin_drag_at_last_container();
        }
    }
}

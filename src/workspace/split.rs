//! Two-pane split with a draggable divider and maximize/restore.

use std::cell::Cell;
use std::io;
use std::rc::Rc;

use crossterm::{cursor, execute};
use ratatui::layout::Rect;

pub const MIN_RATIO: f64 = 0.2;
pub const MAX_RATIO: f64 = 0.8;
pub const DEFAULT_RATIO: f64 = 0.5;
pub const NUDGE_STEP: f64 = 0.05;
const DIVIDER_WIDTH: u16 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Panel {
    Code,
    Output,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaximizedPanel {
    None,
    Code,
    Output,
}

impl From<Panel> for MaximizedPanel {
    fn from(panel: Panel) -> Self {
        match panel {
            Panel::Code => MaximizedPanel::Code,
            Panel::Output => MaximizedPanel::Output,
        }
    }
}

/// Host-side effects of a drag session: route every pointer event to the
/// layout and override cursor styling while held.
pub trait PointerCapture {
    fn acquire(&self);
    fn release(&self);
}

/// Hides the terminal cursor for the duration of a drag.
pub struct TerminalPointerCapture;

impl PointerCapture for TerminalPointerCapture {
    fn acquire(&self) {
        let _ = execute!(io::stdout(), cursor::Hide);
    }

    fn release(&self) {
        let _ = execute!(io::stdout(), cursor::Show);
    }
}

/// Held capture; released exactly once when dropped.
struct CaptureGuard {
    capture: Rc<dyn PointerCapture>,
}

impl CaptureGuard {
    fn acquire(capture: Rc<dyn PointerCapture>) -> Self {
        capture.acquire();
        Self { capture }
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.capture.release();
    }
}

struct DragSession {
    container: Rect,
    _guard: CaptureGuard,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaneAreas {
    pub code: Rect,
    pub divider: Option<Rect>,
    pub output: Rect,
}

pub struct SplitPaneLayout {
    split_ratio: f64,
    maximized: MaximizedPanel,
    drag: Option<DragSession>,
    capture: Rc<dyn PointerCapture>,
    last_container: Cell<Option<Rect>>,
    last_divider: Cell<Option<Rect>>,
}

impl SplitPaneLayout {
    pub fn new(capture: Rc<dyn PointerCapture>) -> Self {
        Self::with_ratio(DEFAULT_RATIO, capture)
    }

    pub fn with_ratio(ratio: f64, capture: Rc<dyn PointerCapture>) -> Self {
        Self {
            split_ratio: clamp_ratio(ratio),
            maximized: MaximizedPanel::None,
            drag: None,
            capture,
            last_container: Cell::new(None),
            last_divider: Cell::new(None),
        }
    }

    pub fn split_ratio(&self) -> f64 {
        self.split_ratio
    }

    pub fn maximized(&self) -> MaximizedPanel {
        self.maximized
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Start an exclusive drag within `container`. Ignored while a drag is
    /// active or a pane is maximized.
    pub fn begin_drag(&mut self, container: Rect) -> bool {
        if self.drag.is_some() || self.maximized != MaximizedPanel::None {
            return false;
        }
        tracing::trace!(?container, "divider drag started");
        self.drag = Some(DragSession {
            container,
            _guard: CaptureGuard::acquire(Rc::clone(&self.capture)),
        });
        true
    }

    /// Start a drag using the container from the last layout pass.
    pub fn begin_drag_at_last_container(&mut self) -> bool {
        match self.last_container.get() {
            Some(container) => self.begin_drag(container),
            None => false,
        }
    }

    /// Follow the pointer to `column` during a drag.
    pub fn drag_to(&mut self, column: u16) {
        let Some(session) = &self.drag else {
            return;
        };
        let container = session.container;
        if container.width == 0 {
            return;
        }
        let offset = column.saturating_sub(container.x) as f64;
        self.split_ratio = clamp_ratio(offset / container.width as f64);
    }

    pub fn end_drag(&mut self) {
        if self.drag.take().is_some() {
            tracing::trace!(ratio = self.split_ratio, "divider drag ended");
        }
    }

    pub fn toggle_maximize(&mut self, panel: Panel) {
        let target = MaximizedPanel::from(panel);
        self.maximized = if self.maximized == target {
            MaximizedPanel::None
        } else {
            target
        };
        // The divider disappears while maximized.
        self.end_drag();
    }

    pub fn nudge(&mut self, delta: f64) {
        self.split_ratio = clamp_ratio(self.split_ratio + delta);
    }

    pub fn divider_hit(&self, column: u16, row: u16) -> bool {
        self.last_divider.get().is_some_and(|d| {
            column >= d.x && column < d.x + d.width && row >= d.y && row < d.y + d.height
        })
    }

    /// Forget the last layout pass. Called when the panes are not drawn, so
    /// a divider from an earlier frame cannot be hit.
    pub fn clear_areas(&self) {
        self.last_container.set(None);
        self.last_divider.set(None);
    }

    /// Split `area` into the code pane, divider and output pane, and
    /// remember the result for hit testing.
    pub fn areas(&self, area: Rect) -> PaneAreas {
        self.last_container.set(Some(area));
        let empty = |x: u16| Rect::new(x, area.y, 0, area.height);

        let panes = match self.maximized {
            MaximizedPanel::Code => PaneAreas {
                code: area,
                divider: None,
                output: empty(area.x + area.width),
            },
            MaximizedPanel::Output => PaneAreas {
                code: empty(area.x),
                divider: None,
                output: area,
            },
            MaximizedPanel::None => {
                let usable = area.width.saturating_sub(DIVIDER_WIDTH);
                let code_w = ((usable as f64) * self.split_ratio).round() as u16;
                let output_w = usable - code_w;
                let divider_w = area.width.min(DIVIDER_WIDTH);
                PaneAreas {
                    code: Rect::new(area.x, area.y, code_w, area.height),
                    divider: Some(Rect::new(area.x + code_w, area.y, divider_w, area.height)),
                    output: Rect::new(area.x + code_w + divider_w, area.y, output_w, area.height),
                }
            }
        };
        self.last_divider.set(panes.divider);
        panes
    }
}

fn clamp_ratio(ratio: f64) -> f64 {
    if ratio.is_nan() {
        return DEFAULT_RATIO;
    }
    ratio.clamp(MIN_RATIO, MAX_RATIO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingCapture {
        acquired: Cell<u32>,
        released: Cell<u32>,
    }

    impl PointerCapture for CountingCapture {
        fn acquire(&self) {
            self.acquired.set(self.acquired.get() + 1);
        }
        fn release(&self) {
            self.released.set(self.released.get() + 1);
        }
    }

    fn layout() -> (Rc<CountingCapture>, SplitPaneLayout) {
        let capture = Rc::new(CountingCapture::default());
        let layout = SplitPaneLayout::new(capture.clone());
        (capture, layout)
    }

    const CONTAINER: Rect = Rect {
        x: 10,
        y: 0,
        width: 100,
        height: 20,
    };

    #[test]
    fn test_drag_clamps_every_update() {
        let (_capture, mut layout) = layout();
        layout.begin_drag(CONTAINER);
        for column in [0, 10, 15, 30, 60, 95, 109, 200, u16::MAX] {
            layout.drag_to(column);
            let r = layout.split_ratio();
            assert!((MIN_RATIO..=MAX_RATIO).contains(&r), "ratio {r} at {column}");
        }
        layout.drag_to(40);
        assert!((layout.split_ratio() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_drag_outside_divider_still_tracked() {
        let (_capture, mut layout) = layout();
        layout.begin_drag(CONTAINER);
        layout.drag_to(80);
        assert!((layout.split_ratio() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_move_without_drag_is_ignored() {
        let (_capture, mut layout) = layout();
        layout.drag_to(20);
        assert_eq!(layout.split_ratio(), DEFAULT_RATIO);
    }

    #[test]
    fn test_capture_paired_on_pointer_up() {
        let (capture, mut layout) = layout();
        assert!(layout.begin_drag(CONTAINER));
        assert!(!layout.begin_drag(CONTAINER));
        assert_eq!(capture.acquired.get(), 1);
        layout.end_drag();
        layout.end_drag();
        assert_eq!(capture.released.get(), 1);
    }

    #[test]
    fn test_capture_released_on_teardown_mid_drag() {
        let (capture, mut layout) = layout();
        layout.begin_drag(CONTAINER);
        drop(layout);
        assert_eq!(capture.acquired.get(), 1);
        assert_eq!(capture.released.get(), 1);
    }

    #[test]
    fn test_toggle_maximize_twice_restores() {
        let (_capture, mut layout) = layout();
        layout.toggle_maximize(Panel::Code);
        assert_eq!(layout.maximized(), MaximizedPanel::Code);
        layout.toggle_maximize(Panel::Code);
        assert_eq!(layout.maximized(), MaximizedPanel::None);

        layout.toggle_maximize(Panel::Output);
        layout.toggle_maximize(Panel::Code);
        assert_eq!(layout.maximized(), MaximizedPanel::Code);
    }

    #[test]
    fn test_maximize_ends_drag_and_blocks_new_ones() {
        let (capture, mut layout) = layout();
        layout.begin_drag(CONTAINER);
        layout.toggle_maximize(Panel::Output);
        assert!(!layout.is_dragging());
        assert_eq!(capture.released.get(), 1);
        assert!(!layout.begin_drag(CONTAINER));
    }

    #[test]
    fn test_maximized_areas_hide_other_pane() {
        let (_capture, mut layout) = layout();
        layout.toggle_maximize(Panel::Output);
        let areas = layout.areas(CONTAINER);
        assert_eq!(areas.output, CONTAINER);
        assert_eq!(areas.code.width, 0);
        assert!(areas.divider.is_none());
        assert!(!layout.divider_hit(60, 5));
    }

    #[test]
    fn test_split_areas_cover_container() {
        let (_capture, layout) = layout();
        let areas = layout.areas(CONTAINER);
        let divider = areas.divider.unwrap();
        assert_eq!(areas.code.width + divider.width + areas.output.width, CONTAINER.width);
        assert_eq!(areas.code.x, CONTAINER.x);
        assert_eq!(divider.x, areas.code.x + areas.code.width);
        assert!(layout.divider_hit(divider.x, 3));
        assert!(!layout.divider_hit(divider.x + 1, 3));
    }

    #[test]
    fn test_cleared_areas_are_not_hit() {
        let (capture, mut layout) = layout();
        let divider = layout.areas(CONTAINER).divider.unwrap();
        layout.clear_areas();
        assert!(!layout.divider_hit(divider.x, 3));
        assert!(!layout.begin_drag_at_last_container());
        assert_eq!(capture.acquired.get(), 0);
    }

    #[test]
    fn test_nudge_and_initial_ratio_clamped() {
        let capture: Rc<dyn PointerCapture> = Rc::new(CountingCapture::default());
        let mut layout = SplitPaneLayout::with_ratio(0.95, capture);
        assert_eq!(layout.split_ratio(), MAX_RATIO);
        for _ in 0..20 {
            layout.nudge(-NUDGE_STEP);
        }
        assert_eq!(layout.split_ratio(), MIN_RATIO);
    }
}

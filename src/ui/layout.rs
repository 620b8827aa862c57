use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutTier {
    Wide,   // ≥90 cols: sidebar beside the workspace
    Narrow, // <90 cols: sidebar only while it has focus
}

impl LayoutTier {
    pub fn from_area(area: Rect) -> Self {
        if area.width >= 90 {
            LayoutTier::Wide
        } else {
            LayoutTier::Narrow
        }
    }

    pub fn lesson_height(&self, height: u16) -> u16 {
        if height >= 30 {
            9
        } else if height >= 20 {
            6
        } else {
            3
        }
    }
}

pub struct AppLayout {
    pub header: Rect,
    pub sidebar: Option<Rect>,
    pub lesson: Rect,
    pub panes: Rect,
    pub footer: Rect,
    pub tier: LayoutTier,
}

impl AppLayout {
    pub fn new(area: Rect, sidebar_width: u16, sidebar_focused: bool) -> Self {
        let tier = LayoutTier::from_area(area);

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(6),
                Constraint::Length(1),
            ])
            .split(area);

        let (sidebar, main) = match (tier, sidebar_focused) {
            (LayoutTier::Wide, _) => {
                let horizontal = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Length(sidebar_width), Constraint::Min(20)])
                    .split(vertical[1]);
                (Some(horizontal[0]), horizontal[1])
            }
            (LayoutTier::Narrow, true) => {
                (Some(vertical[1]), Rect::new(vertical[1].x, vertical[1].y, 0, 0))
            }
            (LayoutTier::Narrow, false) => (None, vertical[1]),
        };

        let main_split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(tier.lesson_height(main.height)),
                Constraint::Min(3),
            ])
            .split(main);

        Self {
            header: vertical[0],
            sidebar,
            lesson: main_split[0],
            panes: main_split[1],
            footer: vertical[2],
            tier,
        }
    }
}

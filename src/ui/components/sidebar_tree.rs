use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::nav::sidebar::SidebarRow;
use crate::resource::ListState;
use crate::ui::theme::Theme;

pub struct SidebarTreeWidget<'a> {
    rows: &'a [SidebarRow],
    list: &'a ListState,
    cursor: usize,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> SidebarTreeWidget<'a> {
    pub fn new(
        rows: &'a [SidebarRow],
        list: &'a ListState,
        cursor: usize,
        focused: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            rows,
            list,
            cursor,
            focused,
            theme,
        }
    }
}

/// First visible row index so that `cursor` stays on screen.
pub fn scroll_offset(cursor: usize, visible: usize) -> usize {
    if visible == 0 {
        return cursor;
    }
    cursor.saturating_sub(visible - 1)
}

fn row_label(row: &SidebarRow) -> String {
    match row {
        SidebarRow::Phase {
            phase,
            title,
            expanded,
        } => {
            let marker = if *expanded { "\u{25be}" } else { "\u{25b8}" }; // ▾ ▸
            format!("{marker} Phase {phase}: {title}")
        }
        SidebarRow::Kata {
            sequence,
            title,
            current,
            ..
        } => {
            let marker = if *current { "\u{25cf}" } else { " " }; // ●
            format!("  {marker} {sequence:>2}. {title}")
        }
    }
}

impl Widget for SidebarTreeWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let border = if self.focused {
            colors.border_focused()
        } else {
            colors.border()
        };
        let block = Block::bordered()
            .title(" Katas ")
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let lines: Vec<Line> = match self.list {
            ListState::Loading => vec![Line::from(Span::styled(
                "Loading katas...",
                Style::default().fg(colors.text_dim()),
            ))],
            ListState::Failed(err) => vec![
                Line::from(Span::styled(
                    "Could not load katas",
                    Style::default().fg(colors.error()),
                )),
                Line::from(Span::styled(
                    err.to_string(),
                    Style::default().fg(colors.text_dim()),
                )),
            ],
            ListState::Ready(_) if self.rows.is_empty() => vec![Line::from(Span::styled(
                "No katas available",
                Style::default().fg(colors.text_dim()),
            ))],
            ListState::Ready(_) => {
                let visible = inner.height as usize;
                let offset = scroll_offset(self.cursor, visible);
                self.rows
                    .iter()
                    .enumerate()
                    .skip(offset)
                    .take(visible)
                    .map(|(i, row)| {
                        let mut style = match row {
                            SidebarRow::Phase { .. } => Style::default()
                                .fg(colors.accent())
                                .add_modifier(Modifier::BOLD),
                            SidebarRow::Kata { current: true, .. } => Style::default()
                                .fg(colors.fg())
                                .add_modifier(Modifier::BOLD),
                            SidebarRow::Kata { .. } => Style::default().fg(colors.fg()),
                        };
                        if i == self.cursor && self.focused {
                            style = style.bg(colors.selection_bg());
                        }
                        Line::from(Span::styled(row_label(row), style))
                    })
                    .collect()
            }
        };

        Paragraph::new(lines).render(inner, buf);
    }
}

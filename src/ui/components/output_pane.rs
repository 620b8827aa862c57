use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::kata::ExecutionResult;
use crate::ui::theme::{Theme, ThemeColors};
use crate::workspace::controller::RunState;

pub struct OutputPane<'a> {
    run_state: &'a RunState,
    scroll: u16,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> OutputPane<'a> {
    pub fn new(run_state: &'a RunState, scroll: u16, focused: bool, theme: &'a Theme) -> Self {
        Self {
            run_state,
            scroll,
            focused,
            theme,
        }
    }
}

/// Completed and failed runs share this path; a failed request only
/// differs by carrying `error`.
fn result_lines<'a>(result: &'a ExecutionResult, colors: &ThemeColors) -> Vec<Line<'a>> {
    let mut lines = Vec::new();

    let (status, color) = if result.success {
        ("\u{2713} Success", colors.success()) // ✓
    } else {
        ("\u{2717} Failed", colors.error()) // ✗
    };
    lines.push(Line::from(vec![
        Span::styled(status, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("  {} ms", result.execution_time_ms),
            Style::default().fg(colors.text_dim()),
        ),
    ]));

    if let Some(error) = &result.error {
        lines.push(Line::from(Span::styled(
            format!("Error: {error}"),
            Style::default().fg(colors.error()),
        )));
    }

    for (label, body, style) in [
        ("stdout", &result.stdout, Style::default().fg(colors.fg())),
        ("stderr", &result.stderr, Style::default().fg(colors.warning())),
    ] {
        if body.is_empty() {
            continue;
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(colors.accent()),
        )));
        lines.extend(body.lines().map(|l| Line::from(Span::styled(l, style))));
    }

    lines
}

impl Widget for OutputPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let border = if self.focused {
            colors.border_focused()
        } else {
            colors.border()
        };
        let block = Block::bordered()
            .title(" Output ")
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));

        let dim = Style::default().fg(colors.text_dim());
        let lines = match self.run_state {
            RunState::Idle => vec![Line::from(Span::styled("Press Ctrl+R to run the code", dim))],
            RunState::Running => vec![Line::from(Span::styled(
                "Running...",
                Style::default().fg(colors.accent()),
            ))],
            RunState::Completed(result) | RunState::Failed(result) => result_lines(result, colors),
        };

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .render(area, buf);
    }
}

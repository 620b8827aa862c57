use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;
use crate::workspace::code_buffer::CodeBuffer;
use crate::workspace::controller::ActiveView;

pub struct CodePane<'a> {
    buffer: &'a CodeBuffer,
    view: ActiveView,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> CodePane<'a> {
    pub fn new(buffer: &'a CodeBuffer, view: ActiveView, focused: bool, theme: &'a Theme) -> Self {
        Self {
            buffer,
            view,
            focused,
            theme,
        }
    }
}

pub fn view_label(view: ActiveView) -> &'static str {
    match view {
        ActiveView::Broken => "broken",
        ActiveView::Correct => "solution",
        ActiveView::None => "edited",
    }
}

/// First visible line so that the cursor line stays on screen.
fn first_visible_line(cursor_line: usize, height: usize) -> usize {
    if height == 0 {
        return cursor_line;
    }
    cursor_line.saturating_sub(height - 1)
}

impl Widget for CodePane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let (cursor_line, cursor_col) = self.buffer.cursor_line_col();

        let border = if self.focused {
            colors.border_focused()
        } else {
            colors.border()
        };
        let title = format!(
            " Code ({}) {}:{} ",
            view_label(self.view),
            cursor_line + 1,
            cursor_col + 1
        );
        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let text = self.buffer.text();
        let total = text.split('\n').count();
        let gutter = total.to_string().len();
        let height = inner.height as usize;
        let first = first_visible_line(cursor_line, height);

        let cursor_style = Style::default()
            .fg(colors.cursor_fg())
            .bg(colors.cursor_bg());
        let text_style = Style::default().fg(colors.fg());
        let gutter_style = Style::default().fg(colors.text_dim());

        let lines: Vec<Line> = text
            .split('\n')
            .enumerate()
            .skip(first)
            .take(height)
            .map(|(n, line)| {
                let mut spans = vec![Span::styled(
                    format!("{:>gutter$} ", n + 1),
                    gutter_style,
                )];
                if n == cursor_line && self.focused {
                    let chars: Vec<char> = line.chars().collect();
                    let before: String = chars[..cursor_col.min(chars.len())].iter().collect();
                    let at = chars.get(cursor_col).map_or(" ".to_string(), |c| c.to_string());
                    let after: String = chars.iter().skip(cursor_col + 1).collect();
                    spans.push(Span::styled(before, text_style));
                    spans.push(Span::styled(at, cursor_style));
                    spans.push(Span::styled(after, text_style));
                } else {
                    spans.push(Span::styled(line.to_string(), text_style));
                }
                Line::from(spans)
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

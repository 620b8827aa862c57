use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::kata::KataDetail;
use crate::resource::DetailState;
use crate::ui::theme::{Theme, ThemeColors};
use crate::workspace::controller::Disclosures;

/// Kata title, description, revealed hints and the two disclosures.
pub struct LessonPanel<'a> {
    detail: &'a DetailState,
    disclosures: &'a Disclosures,
    theme: &'a Theme,
}

impl<'a> LessonPanel<'a> {
    pub fn new(detail: &'a DetailState, disclosures: &'a Disclosures, theme: &'a Theme) -> Self {
        Self {
            detail,
            disclosures,
            theme,
        }
    }
}

fn heading(detail: &KataDetail) -> String {
    match (detail.phase, detail.sequence) {
        (Some(phase), Some(seq)) => format!(" {phase}.{seq} {} ", detail.title),
        _ => format!(" {} ", detail.title),
    }
}

fn section<'a>(
    lines: &mut Vec<Line<'a>>,
    key: &'a str,
    label: &'a str,
    open: bool,
    body: &'a str,
    colors: &ThemeColors,
) {
    let marker = if open { "\u{25be}" } else { "\u{25b8}" };
    lines.push(Line::from(vec![
        Span::styled(
            format!("{marker} {label} "),
            Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("[{key}]"), Style::default().fg(colors.text_dim())),
    ]));
    if open {
        lines.extend(
            body.lines()
                .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.fg())))),
        );
    }
}

fn detail_lines<'a>(
    detail: &'a KataDetail,
    disclosures: &Disclosures,
    colors: &ThemeColors,
) -> Vec<Line<'a>> {
    let mut lines: Vec<Line> = detail
        .description
        .lines()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.fg()))))
        .collect();

    if !detail.hints.is_empty() {
        lines.push(Line::from(""));
        for (i, hint) in detail.hints.iter().take(disclosures.hints_revealed).enumerate() {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("Hint {}: ", i + 1),
                    Style::default().fg(colors.warning()),
                ),
                Span::styled(hint.as_str(), Style::default().fg(colors.fg())),
            ]));
        }
        if disclosures.hints_revealed < detail.hints.len() {
            lines.push(Line::from(Span::styled(
                format!(
                    "[F4] reveal hint ({}/{})",
                    disclosures.hints_revealed,
                    detail.hints.len()
                ),
                Style::default().fg(colors.text_dim()),
            )));
        }
    }

    lines.push(Line::from(""));
    section(
        &mut lines,
        "F8",
        "Explanation",
        disclosures.explanation,
        &detail.explanation,
        colors,
    );
    section(
        &mut lines,
        "F9",
        "Compiler error",
        disclosures.interpretation,
        &detail.compiler_error_interpretation,
        colors,
    );
    lines
}

impl Widget for LessonPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let dim = Style::default().fg(colors.text_dim());

        let (title, lines) = match self.detail {
            DetailState::Empty => (
                " Kata ".to_string(),
                vec![Line::from(Span::styled(
                    "Select a kata from the sidebar to begin.",
                    dim,
                ))],
            ),
            DetailState::Loading(id) => (
                format!(" {id} "),
                vec![Line::from(Span::styled("Loading kata...", dim))],
            ),
            DetailState::Failed { id, error } => (
                format!(" {id} "),
                vec![
                    Line::from(Span::styled(
                        "Could not load this kata",
                        Style::default().fg(colors.error()),
                    )),
                    Line::from(Span::styled(error.to_string(), dim)),
                ],
            ),
            DetailState::Ready(detail) => {
                (heading(detail), detail_lines(detail, self.disclosures, colors))
            }
        };

        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme_store::ThemePreference;

    fn detail() -> KataDetail {
        KataDetail {
            id: "move-semantics".into(),
            title: "Move semantics".into(),
            description: "Fix the use after move.".into(),
            broken_code: String::new(),
            correct_code: String::new(),
            explanation: "Clone or borrow.".into(),
            compiler_error_interpretation: "E0382 means the value moved.".into(),
            hints: vec!["Look at line 3".into(), "Try &".into()],
            phase: Some(1),
            phase_title: Some("Ownership".into()),
            sequence: Some(2),
        }
    }

    fn texts(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_heading_includes_phase_and_sequence() {
        assert_eq!(heading(&detail()), " 1.2 Move semantics ");
        let mut bare = detail();
        bare.sequence = None;
        assert_eq!(heading(&bare), " Move semantics ");
    }

    #[test]
    fn test_closed_disclosures_hide_bodies() {
        let theme = Theme::for_preference(ThemePreference::Dark);
        let d = detail();
        let lines = texts(&detail_lines(&d, &Disclosures::default(), &theme.colors));
        assert!(lines.contains(&"[F4] reveal hint (0/2)".to_string()));
        assert!(!lines.iter().any(|l| l.contains("Clone or borrow")));
        assert!(!lines.iter().any(|l| l.starts_with("Hint")));
    }

    #[test]
    fn test_open_disclosures_show_bodies() {
        let theme = Theme::for_preference(ThemePreference::Dark);
        let d = detail();
        let disclosures = Disclosures {
            explanation: true,
            interpretation: true,
            hints_revealed: 2,
        };
        let lines = texts(&detail_lines(&d, &disclosures, &theme.colors));
        assert!(lines.contains(&"Hint 2: Try &".to_string()));
        assert!(lines.contains(&"Clone or borrow.".to_string()));
        assert!(lines.contains(&"E0382 means the value moved.".to_string()));
        assert!(!lines.iter().any(|l| l.contains("reveal hint")));
    }
}

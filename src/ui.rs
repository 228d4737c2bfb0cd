use crate::App;
use pausa::engine::{Phase, BREAK_MESSAGE};
use pausa::util::format_clock;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

const HORIZONTAL_MARGIN: u16 = 5;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let now = self.now;
        let phase = self.engine.phase_at(now);

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let toast_style = Style::default().patch(bold_style).fg(Color::Magenta);

        let (dot_color, status_label) = match phase {
            Phase::Stopped => (Color::Cyan, "Let's start"),
            Phase::Running => (Color::Yellow, "Working..."),
            Phase::Overdue => (Color::Red, "Should have taken a break..."),
        };

        let clock = match phase {
            Phase::Stopped => String::from("Not started"),
            Phase::Running => format_clock(self.engine.elapsed_at(now).unwrap_or_default()),
            Phase::Overdue => format!(
                "{} ago",
                format_clock(self.engine.overdue_at(now).unwrap_or_default())
            ),
        };

        let content_height = 8;
        let top_pad = (area.height.saturating_sub(content_height)) / 2;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints(
                [
                    Constraint::Length(top_pad),
                    Constraint::Length(1), // status dot + label
                    Constraint::Length(2), // clock
                    Constraint::Length(1), // toast
                    Constraint::Length(1), // work info / entry field
                    Constraint::Length(1), // padding
                    Constraint::Length(2), // key hints
                    Constraint::Min(0),
                ]
                .as_ref(),
            )
            .split(area);

        let status = Paragraph::new(Line::from(vec![
            Span::styled("● ", Style::default().fg(dot_color)),
            Span::raw(status_label),
        ]))
        .alignment(Alignment::Center);
        status.render(chunks[1], buf);

        Paragraph::new(Span::styled(clock, bold_style))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        if self.toast_ticks > 0 {
            Paragraph::new(Span::styled(BREAK_MESSAGE, toast_style))
                .alignment(Alignment::Center)
                .render(chunks[3], buf);
        }

        let info_line = match phase {
            // Configuration entry is only revealed while stopped.
            Phase::Stopped => {
                let pending = if self.work_input.is_empty() {
                    self.engine.work_minutes().to_string()
                } else {
                    format!("{}_", self.work_input)
                };
                Line::from(vec![
                    Span::raw("Work minutes: "),
                    Span::styled(pending, bold_style),
                ])
            }
            Phase::Running => Line::from(vec![
                Span::raw("Timer set at "),
                Span::styled(format!("{} minutes", self.engine.work_minutes()), bold_style),
            ]),
            Phase::Overdue => Line::default(),
        };
        Paragraph::new(info_line)
            .alignment(Alignment::Center)
            .render(chunks[4], buf);

        let hints = match phase {
            Phase::Stopped => "(s)tart · type digits + enter to set work minutes · q/esc quit",
            Phase::Running => "(s)top · q/esc quit",
            Phase::Overdue => "(s) take a break · q/esc quit",
        };
        Paragraph::new(Span::styled(hints, dim_style))
            .alignment(Alignment::Center)
            .render(chunks[6], buf);
    }
}

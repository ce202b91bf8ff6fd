use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use overscroll_core::PullPhase;

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let status_text = match &app.status_message {
            Some(msg) => format!(" {} | {}", msg, Self::summary(app)),
            None => format!(" {}", Self::summary(app)),
        };

        let help_hint = " q:quit r:refresh m:more e:toggle more j/k:scroll ";
        let padding_len = area
            .width
            .saturating_sub(status_text.chars().count() as u16 + help_hint.len() as u16)
            as usize;

        let style = Style::default().bg(theme.status_bg);
        let line = Line::from(vec![
            Span::styled(status_text, style.fg(theme.status_fg)),
            Span::styled(" ".repeat(padding_len), style),
            Span::styled(help_hint, style.fg(theme.muted)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }

    /// Offset, header reveal and zone phases at a glance
    pub fn summary(app: &App) -> String {
        let controller = &app.controller;
        format!(
            "offset {} | header {}/{} {} | footer {}",
            controller.offset(),
            controller.header_reveal_height(),
            controller.header_rest_height(),
            phase_name(controller.header_phase()),
            if controller.is_loading_more_enabled() {
                phase_name(controller.footer_phase())
            } else {
                "off"
            },
        )
    }
}

fn phase_name(phase: Option<PullPhase>) -> &'static str {
    match phase {
        None => "-",
        Some(PullPhase::Idle) => "idle",
        Some(PullPhase::Pulling) => "pulling",
        Some(PullPhase::AboveThreshold) => "armed",
        Some(PullPhase::Activating) => "pending",
        Some(PullPhase::Active) => "active",
        Some(PullPhase::Settling) => "settling",
    }
}

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::list::ScreenRow;

pub struct ListViewWidget;

impl ListViewWidget {
    /// Draw the list with its over-scroll applied
    ///
    /// The caller must have reported the inner area through
    /// [`App::set_viewport`] so that the controller sees the same rows.
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let title = format!(" Items: {} ", app.list().items().len());
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border))
            .style(Style::default().bg(theme.bg));

        let rows = app.list().screen_rows(app.list_rows());
        let mut header_drawn = false;
        let lines: Vec<Line> = rows
            .iter()
            .map(|row| {
                let line = Self::row_line(app, *row, !header_drawn);
                header_drawn |= *row == ScreenRow::Header;
                line
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn row_line(app: &App, row: ScreenRow, first_header_row: bool) -> Line<'static> {
        let theme = &app.theme;
        match row {
            ScreenRow::Gap => Line::from(Span::styled("", Style::default().bg(theme.gap))),
            ScreenRow::Header => {
                let text = if first_header_row {
                    header_text(app)
                } else {
                    String::new()
                };
                let header = app.header.borrow();
                let color = if header.armed { theme.armed } else { theme.header };
                Line::from(Span::styled(
                    text,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ))
                .centered()
            }
            ScreenRow::Item(index) => {
                let text = app
                    .list()
                    .items()
                    .get(index)
                    .cloned()
                    .unwrap_or_default();
                Line::from(Span::styled(format!(" {}", text), Style::default().fg(theme.fg)))
            }
            ScreenRow::Footer => {
                let footer = app.footer.borrow();
                let color = if footer.loading { theme.busy } else { theme.footer };
                Line::from(Span::styled(footer_text(app), Style::default().fg(color))).centered()
            }
        }
    }
}

/// Header label with its arrow or spinner
pub fn header_text(app: &App) -> String {
    let header = app.header.borrow();
    let icon = if header.refreshing {
        app.spinner()
    } else if header.armed {
        '↑'
    } else {
        '↓'
    };
    format!("{} {}", icon, header.label)
}

pub fn footer_text(app: &App) -> String {
    let footer = app.footer.borrow();
    if footer.loading {
        format!("{} {}", app.spinner(), footer.label)
    } else {
        footer.label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use overscroll_core::AppConfig;

    use crate::input::Action;
    use crate::theme::Theme;

    fn app() -> App {
        let mut app = App::new(Arc::new(AppConfig::default()), Theme::default()).unwrap();
        app.set_viewport(1, 10);
        app
    }

    #[test]
    fn test_header_text_follows_state() {
        let mut app = app();
        assert_eq!(header_text(&app), "↓ Pull To Refresh");

        app.handle_action(Action::Refresh);
        assert_eq!(header_text(&app), "| Loading...");
    }

    #[test]
    fn test_footer_text_shows_spinner_while_loading() {
        let mut app = app();
        assert_eq!(footer_text(&app), "Click to load more");

        app.handle_action(Action::LoadMore);
        assert_eq!(footer_text(&app), "| Loading...");
    }
}

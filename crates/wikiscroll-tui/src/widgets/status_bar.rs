use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let store = app.feed.store();

        let (status_text, status_fg) = if let Some(msg) = &app.status_message {
            (format!(" {}", msg), theme.fg0)
        } else if let Some(err) = app.feed.last_error() {
            (format!(" Fetch failed: {}", err), theme.error)
        } else {
            (
                format!(
                    " {} | {} | Items: {} | Live: {}",
                    app.feed.active_source().label(),
                    app.state_label(),
                    store.len(),
                    store.mounted_count()
                ),
                theme.fg0,
            )
        };

        let help_hint = " q:quit j/k:scroll 1-3/Tab:source e:expand o:open ";
        let padding_len = usize::from(area.width)
            .saturating_sub(status_text.chars().count() + help_hint.len());

        let line = Line::from(vec![
            Span::styled(status_text, Style::default().fg(status_fg).bg(theme.bg2)),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(help_hint, Style::default().fg(theme.grey2).bg(theme.bg2)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}

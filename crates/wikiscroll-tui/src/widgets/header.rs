use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::Tabs,
    Frame,
};
use wikiscroll_core::Source;

use crate::app::App;

/// Source selector shown above the feed
pub struct HeaderWidget;

impl HeaderWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let titles: Vec<Line> = Source::ALL
            .iter()
            .enumerate()
            .map(|(i, source)| Line::from(format!("{} {}", i + 1, source.label())))
            .collect();
        let selected = Source::ALL
            .iter()
            .position(|s| *s == app.feed.active_source())
            .unwrap_or(0);

        let tabs = Tabs::new(titles)
            .select(selected)
            .style(Style::default().fg(app.theme.grey1).bg(app.theme.bg1))
            .highlight_style(
                Style::default()
                    .fg(app.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )
            .divider("│");

        frame.render_widget(tabs, area);
    }
}

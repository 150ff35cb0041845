use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use wikiscroll_core::expand::expand_label;
use wikiscroll_core::{FeedItem, ItemContent};

use crate::app::App;
use crate::embed::{ArticleEmbed, Preview};

/// Rows drawn above each item's frame: title and expand affordance
const HEADER_ROWS: u64 = 2;

/// Draws the part of the feed inside the viewport.
///
/// Each item occupies the rows its layout box covers, so a placeholder takes
/// exactly the space of the preview it replaced.
pub struct FeedViewWidget;

impl FeedViewWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let block = Block::default().style(Style::default().bg(app.theme.bg0));
        let inner_width = usize::from(area.width.saturating_sub(2));

        let first_row = app.units_to_rows(app.feed.viewport().scroll_top);
        let last_row = first_row + u64::from(area.height);
        let layout = app.feed.layout();
        let focused = app.feed.focused();

        let mut lines: Vec<Line> = Vec::with_capacity(usize::from(area.height));
        for item_box in &layout.boxes {
            let start = app.units_to_rows(item_box.top);
            let end = app.units_to_rows(item_box.bottom());
            if end <= first_row || start >= last_row {
                continue;
            }
            let Some(item) = app.feed.store().get(item_box.key) else {
                continue;
            };

            let is_focused = focused == Some(item_box.key);
            let body = body_lines(item, inner_width);
            let rows = end - start;
            for row in start.max(first_row)..end.min(last_row) {
                lines.push(item_row(app, item, &body, row - start, rows, is_focused, inner_width));
            }
        }

        if app.feed.store().is_empty() {
            lines.push(Line::from(Span::styled(
                " Waiting for the first page…",
                Style::default().fg(app.theme.grey1),
            )));
        }

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// Preview text of a mounted item, wrapped to the frame width
fn body_lines(item: &FeedItem<ArticleEmbed>, width: usize) -> Vec<String> {
    match item.content() {
        ItemContent::Embed(embed) => match embed.preview() {
            Preview::Loading => vec!["Loading…".to_string()],
            Preview::Ready(text) if text.trim().is_empty() => vec!["(no introduction)".to_string()],
            Preview::Ready(text) => wrap_text(&text, width),
            Preview::Failed(err) => vec![format!("Preview unavailable: {}", err)],
        },
        ItemContent::Placeholder(_) => Vec::new(),
    }
}

fn item_row(
    app: &App,
    item: &FeedItem<ArticleEmbed>,
    body: &[String],
    row: u64,
    rows: u64,
    is_focused: bool,
    width: usize,
) -> Line<'static> {
    let theme = &app.theme;

    match row {
        0 => {
            let marker = if is_focused { "▶ " } else { "  " };
            let title_style = if is_focused {
                Style::default().fg(theme.focused).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.title).add_modifier(Modifier::BOLD)
            };
            Line::from(vec![
                Span::styled(marker, Style::default().fg(theme.focused)),
                Span::styled(item.title().to_string(), title_style),
                Span::styled(format!("  #{}", item.page_id()), Style::default().fg(theme.grey0)),
            ])
        }
        1 => Line::from(vec![
            Span::raw("  "),
            Span::styled(
                format!("[{}]", expand_label(item.expand_count())),
                Style::default().fg(theme.info),
            ),
        ]),
        _ if row + 1 == rows => Line::from(Span::styled(
            "─".repeat(width + 2),
            Style::default().fg(theme.bg2),
        )),
        _ => {
            let body_row = (row - HEADER_ROWS) as usize;
            if item.is_mounted() {
                let text = body.get(body_row).cloned().unwrap_or_default();
                Line::from(vec![
                    Span::styled("│ ", Style::default().fg(theme.accent)),
                    Span::styled(text, Style::default().fg(theme.fg0)),
                ])
            } else {
                Line::from(Span::styled("┊ ", Style::default().fg(theme.placeholder)))
            }
        }
    }
}

/// Word-wrap `text` to `width` display columns, breaking words longer than a
/// whole line
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut line = String::new();
        let mut line_width = 0;
        for word in paragraph.split_whitespace() {
            let word_width = word.width();
            if line_width > 0 && line_width + 1 + word_width > width {
                lines.push(std::mem::take(&mut line));
                line_width = 0;
            }

            if word_width > width {
                if line_width > 0 {
                    line.push(' ');
                    line_width += 1;
                }
                for ch in word.chars() {
                    let ch_width = ch.width().unwrap_or(0);
                    if line_width > 0 && line_width + ch_width > width {
                        lines.push(std::mem::take(&mut line));
                        line_width = 0;
                    }
                    line.push(ch);
                    line_width += ch_width;
                }
                continue;
            }

            if line_width > 0 {
                line.push(' ');
                line_width += 1;
            }
            line.push_str(word);
            line_width += word_width;
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ratatui::{backend::TestBackend, Terminal};
    use tokio::runtime::Handle;
    use wikiscroll_core::source::Endpoints;
    use wikiscroll_core::{
        AppConfig, ArticleRef, FeedController, FetchError, Page, PageId, PaginationCursor,
    };

    use crate::embed::{ExtractLoader, PreviewFactory};

    struct NoopLoader;

    #[async_trait::async_trait]
    impl ExtractLoader for NoopLoader {
        async fn load_extract(&self, _page_id: PageId) -> Result<String, FetchError> {
            Ok(String::new())
        }
    }

    fn screen(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|frame| FeedViewWidget::render(frame, frame.area(), app))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[tokio::test]
    async fn test_renders_items_and_placeholders() {
        let config = Arc::new(AppConfig::default());
        let factory = PreviewFactory::new(Arc::new(NoopLoader), Handle::current());
        let feed = FeedController::from_config(&config, factory);
        let endpoints = Endpoints::new(&config.source).unwrap();
        let mut app = App::new(config, feed, endpoints);
        app.resize(100, 22);

        let request = app.feed.begin_fetch().unwrap();
        let items = (1..=3)
            .map(|n| ArticleRef {
                page_id: PageId(n),
                title: format!("Article {}", n),
            })
            .collect();
        let page = Page {
            items,
            next_cursor: PaginationCursor::default(),
        };
        app.feed.complete_fetch(request.ticket, Ok(page));
        app.feed.sync_visibility();

        let text = screen(&app, 100, 20);
        assert!(text.contains("Article 1"));
        assert!(text.contains("[Expand]"));
        assert!(!text.contains("┊"));

        // Scroll to item 2 without syncing: it is still parked behind a placeholder
        assert!(!app.feed.store().all()[1].is_mounted());
        app.feed.scroll_to(884);
        let text = screen(&app, 100, 20);
        assert!(text.contains("Article 2"));
        assert!(!text.contains("Article 1"));
        assert!(text.contains("┊"));
    }

    #[test]
    fn test_wrap_on_word_boundaries() {
        assert_eq!(
            wrap_text("the quick brown fox", 10),
            vec!["the quick", "brown fox"]
        );
    }

    #[test]
    fn test_wrap_keeps_paragraph_breaks() {
        assert_eq!(wrap_text("one\n\ntwo", 10), vec!["one", "", "two"]);
    }

    #[test]
    fn test_wrap_breaks_wide_words_by_display_width() {
        assert_eq!(
            wrap_text("日本語テキスト", 6),
            vec!["日本語", "テキス", "ト"]
        );
    }
}

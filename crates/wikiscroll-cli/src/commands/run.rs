use std::io;
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use wikiscroll_core::{AppConfig, FeedController, FetchOutcome, FetchRequest, Source, SourceClient, WikipediaClient};
use wikiscroll_tui::{
    app::App,
    embed::PreviewFactory,
    event::{AppEvent, EventHandler, FetchCompleted},
    input::{handle_key_event, Action},
    keymap::Keymap,
    widgets::{FeedViewWidget, HeaderWidget, StatusBarWidget},
};

type Backend = CrosstermBackend<io::Stdout>;

pub async fn run(config: Arc<AppConfig>, source: Option<Source>) -> Result<()> {
    let config = match source {
        Some(source) => {
            let mut config = (*config).clone();
            config.general.initial_source = source;
            Arc::new(config)
        }
        None => config,
    };

    let keymap = Keymap::from_config(&config.keymap);
    let client = Arc::new(WikipediaClient::new(&config)?);
    let factory = PreviewFactory::new(client.clone(), Handle::current());
    let feed = FeedController::from_config(&config, factory);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, SetTitle("wikiscroll"))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config.clone(), feed, client.endpoints().clone());
    let result = event_loop(&mut terminal, &mut app, &keymap, client).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<Backend>,
    app: &mut App,
    keymap: &Keymap,
    client: Arc<WikipediaClient>,
) -> Result<()> {
    let size = terminal.size()?;
    app.resize(size.width, size.height);

    let event_handler = EventHandler::with_animation_fps(
        app.config.ui.tick_rate_ms,
        app.config.ui.animation_fps,
    );

    // Page fetches run on the runtime and report back through this channel
    let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel::<FetchCompleted>();

    if let Some(request) = app.feed.init() {
        spawn_fetch(request, client.clone(), fetch_tx.clone());
    }

    loop {
        // Process any completed fetches (non-blocking)
        while let Ok(done) = fetch_rx.try_recv() {
            if let Some(request) = handle_fetch_result(app, done) {
                spawn_fetch(request, client.clone(), fetch_tx.clone());
            }
        }

        // Once per frame: bottom check, then preview mounting
        if let Some(request) = app.feed.on_frame() {
            spawn_fetch(request, client.clone(), fetch_tx.clone());
        }
        app.feed.sync_visibility();

        terminal.draw(|frame| {
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(1),
                    Constraint::Min(1),
                    Constraint::Length(1),
                ])
                .split(frame.area());

            HeaderWidget::render(frame, layout[0], app);
            FeedViewWidget::render(frame, layout[1], app);
            StatusBarWidget::render(frame, layout[2], app);
        })?;

        // Poll at frame rate while a fetch is in flight
        let event = if app.needs_fast_update() {
            event_handler.next_animation()?
        } else {
            event_handler.next()?
        };
        if let Some(event) = event {
            match event {
                AppEvent::Key(key) => {
                    let action = handle_key_event(key, app, keymap);
                    if let Some(request) = handle_action(app, action) {
                        spawn_fetch(request, client.clone(), fetch_tx.clone());
                    }
                }
                AppEvent::Resize(width, height) => {
                    app.resize(width, height);
                }
                AppEvent::Tick => {
                    app.tick_spinner();
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Spawn a page fetch; its result comes back through `tx`
fn spawn_fetch(request: FetchRequest, client: Arc<WikipediaClient>, tx: mpsc::UnboundedSender<FetchCompleted>) {
    tokio::spawn(async move {
        let result = client.fetch_page(request.source, &request.cursor).await;
        let _ = tx.send(FetchCompleted {
            ticket: request.ticket,
            result,
        });
    });
}

/// Apply a finished fetch; returns the reload to spawn after a stale result
fn handle_fetch_result(app: &mut App, done: FetchCompleted) -> Option<FetchRequest> {
    match app.feed.complete_fetch(done.ticket, done.result) {
        FetchOutcome::Appended { count } => {
            if count == 0 {
                app.set_status(format!("{}: empty page", app.feed.active_source().label()));
            } else {
                app.clear_status();
            }
            None
        }
        FetchOutcome::Failed(e) => {
            app.set_status(format!("Fetch failed: {}", e));
            None
        }
        FetchOutcome::Stale => app.feed.take_pending_request(),
    }
}

fn handle_action(app: &mut App, action: Action) -> Option<FetchRequest> {
    // Clear pending key on any action except PendingG
    if action != Action::PendingG {
        app.clear_pending_key();
    }

    match action {
        Action::Quit => {
            app.should_quit = true;
        }
        Action::ScrollDown => app.scroll_down(),
        Action::ScrollUp => app.scroll_up(),
        Action::ScrollHalfPageDown => app.scroll_half_page_down(),
        Action::ScrollHalfPageUp => app.scroll_half_page_up(),
        Action::ScrollPageDown => app.scroll_page_down(),
        Action::ScrollPageUp => app.scroll_page_up(),
        Action::JumpToTop => app.jump_to_top(),
        Action::JumpToBottom => app.jump_to_bottom(),
        Action::PendingG => {
            app.pending_key = Some('g');
        }
        Action::SelectSource(source) => return app.select_source(source),
        Action::NextSource => return app.next_source(),
        Action::Expand => {
            if app.expand_focused().is_none() {
                app.set_status("Nothing to expand");
            }
        }
        Action::OpenInBrowser => {
            if let Some(url) = app.focused_url() {
                if let Err(e) = open::that(&url) {
                    tracing::warn!(%url, error = %e, "Failed to open browser");
                    app.set_status(format!("Failed to open browser: {}", e));
                } else {
                    app.set_status(format!("Opened {}", url));
                }
            }
        }
        Action::None => {}
    }

    None
}

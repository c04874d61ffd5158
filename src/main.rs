mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::{App, FeedPoller};
use crate::keys::KeyOutcome;
use crate::state::app_settings::AppSettings;
use crate::state::messages::UiEvent;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::{LevelFilter, warn};
use match_feed::client::MatchSource;
use match_feed::poller::{MatchFeedPoller, RefreshOutcome};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use match_feed::Snapshot;
use match_feed::poller::PollerStatus;
use tokio::sync::{Mutex, mpsc, watch};
use tui::{Terminal, backend::CrosstermBackend};

enum Command {
    Run,
    Dump,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Some(command) = handle_cli_args() else {
        return Ok(());
    };

    let settings = AppSettings::load();
    if let Command::Dump = command {
        return dump(settings).await;
    }

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    let level = settings.log_level.unwrap_or(LevelFilter::Info);
    tui_logger::init_logger(level)?;
    tui_logger::set_default_level(level);

    let (source, notice) = settings.build_source();
    for problem in settings.warnings.iter().chain(notice.as_ref()) {
        warn!("{problem}");
    }

    let refresh_interval = settings.refresh_interval;
    let poller = Arc::new(MatchFeedPoller::new(source));
    let mut app = App::new(settings, poller.source().describe());
    let (snapshots, statuses) = app.attach(&poller);
    let app = Arc::new(Mutex::new(app));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Periodic feed refresh; the first fetch happens immediately.
    poller.start(refresh_interval);

    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    let feed = FeedUpdates { snapshots, statuses };
    main_ui_loop(terminal, app, Arc::clone(&poller), feed, ui_event_rx).await;

    poller.stop();
    input_handler.abort();
    cleanup_terminal()?;

    Ok(())
}

fn handle_cli_args() -> Option<Command> {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return Some(Command::Run);
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            None
        }
        "-V" | "--version" => {
            println!("betfeed {}", env!("CARGO_PKG_VERSION"));
            None
        }
        "--dump" => Some(Command::Dump),
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "betfeed - live and upcoming match odds in the terminal

Usage:
  betfeed
  betfeed --dump
  betfeed --help
  betfeed --version

Options:
  --dump   Fetch the feed once and print the live and upcoming matches as JSON

Environment:
  BETFEED_SOURCE        remote | sample | odds-api (default remote)
  BETFEED_FEED_URL      Match feed endpoint (default http://127.0.0.1:8000/sports-api)
  BETFEED_SAMPLE_JSON   Local feed file for the sample source
  BETFEED_REFRESH_SECS  Refresh interval in seconds (default 30)
  BETFEED_LOG           Log level: error, warn, info, debug, trace
  ODDS_API_KEY          The Odds API key (odds-api source)
  ODDS_SPORT            The Odds API sport key (default soccer_epl)"
}

/// One refresh, printed to stdout. Exits non-zero when the feed could not be read.
async fn dump(settings: AppSettings) -> anyhow::Result<()> {
    let (source, notice) = settings.build_source();
    for problem in settings.warnings.iter().chain(notice.as_ref()) {
        eprintln!("warning: {problem}");
    }

    let poller = MatchFeedPoller::new(source);
    match poller.refresh().await {
        RefreshOutcome::Updated { count } => {
            eprintln!("{count} matches from {}", poller.source().describe());
        }
        _ => {
            let reason = poller.status().last_error.unwrap_or_default();
            anyhow::bail!("could not read {}: {reason}", poller.source().describe());
        }
    }

    let (live, upcoming) = poller.views();
    let output = serde_json::json!({
        "source": poller.source().describe(),
        "live": live,
        "upcoming": upcoming,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Receivers taken before the poller starts, so no refresh goes unseen.
struct FeedUpdates {
    snapshots: watch::Receiver<Snapshot>,
    statuses: watch::Receiver<PollerStatus>,
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    poller: Arc<FeedPoller>,
    feed: FeedUpdates,
    mut ui_events: mpsc::Receiver<UiEvent>,
) {
    let FeedUpdates { mut snapshots, mut statuses } = feed;

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                if handle_ui_event(ui_event, &app, &poller).await == KeyOutcome::Quit {
                    break;
                }
            }

            Ok(()) = snapshots.changed() => {
                let snapshot = snapshots.borrow_and_update().clone();
                app.lock().await.on_snapshot(snapshot);
            }

            Ok(()) = statuses.changed() => {
                let status = statuses.borrow_and_update().clone();
                app.lock().await.on_status(status);
            }

            else => break,
        }

        let mut app_guard = app.lock().await;
        draw::draw(&mut terminal, &mut app_guard);
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    poller: &Arc<FeedPoller>,
) -> KeyOutcome {
    match ui_event {
        UiEvent::KeyPressed(key_event) => keys::handle_key_bindings(key_event, app, poller).await,
        UiEvent::AppStarted | UiEvent::Resize => KeyOutcome::Continue,
    }
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

pub fn cleanup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::MoveTo(0, 0))?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    execute!(stdout, terminal::LeaveAlternateScreen)?;
    execute!(stdout, cursor::Show)?;
    terminal::disable_raw_mode()
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        let _ = cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}

//! Counter - minimal slice-dispatch demo
//!
//! One component instance, one slice:
//! - Slice: initial state + named handlers
//! - Hook: `use_bound_state` gives state, bound actions, raw dispatch
//! - Main loop: key -> bound action -> scheduled render
//!
//! Keys: k/Up = +1, j/Down = -1, 5 = +5 (raw dispatch), + = +10, 0 = reset, q = quit

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Flex, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use slice_dispatch::prelude::*;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "counter", about = "Terminal counter driven by a local slice")]
struct Args {
    /// Initial count
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    start: i64,

    /// Write debug logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

// ============================================================================
// Slice - What the component knows and how it changes
// ============================================================================

#[derive(Clone, Debug, Default)]
struct CounterState {
    count: i64,
}

#[derive(ActionKind, Clone, Copy, Debug)]
#[action(rename_all = "camelCase")]
enum Counter {
    Increment,
    Decrement,
    #[action(payload)]
    IncrementBy,
    Reset,
}

fn counter_slice(start: i64) -> SliceConfig<CounterState, i64> {
    SliceConfig::new(CounterState { count: start })
        .name("counter")
        .handler(Counter::Increment, |state: &mut CounterState, _: &Message<i64>| {
            state.count += 1
        })
        .handler(Counter::Decrement, |state: &mut CounterState, _: &Message<i64>| {
            state.count -= 1
        })
        .handler(Counter::IncrementBy, |state: &mut CounterState, msg: &Message<i64>| {
            state.count += msg.payload().copied().unwrap_or_default()
        })
        .handler(Counter::Reset, move |_: &mut CounterState, _: &Message<i64>| {
            Replace(CounterState { count: start })
        })
}

// ============================================================================
// Main - Setup terminal, run render loop, cleanup
// ============================================================================

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_tracing(path)?;
    }

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, counter_slice(args.start)).await;

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn init_tracing(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();
    Ok(())
}

/// Map a key to a counter update. Returns `false` when the app should quit.
fn handle_key(code: KeyCode, actions: &BoundActions<i64>, dispatch: &Dispatcher<i64>) -> bool {
    match code {
        KeyCode::Char('k') | KeyCode::Up => actions.increment(),
        KeyCode::Char('j') | KeyCode::Down => actions.decrement(),
        KeyCode::Char('0') => actions.reset(),
        // Hand-built message through the raw dispatcher
        KeyCode::Char('5') => dispatch.dispatch(Counter::IncrementBy.message(Some(5))),
        KeyCode::Char('+') => actions.increment_by(10),
        KeyCode::Char('q') | KeyCode::Esc => return false,
        _ => {}
    }
    true
}

/// Forward key presses from a blocking poll loop
fn spawn_key_poller(
    tx: mpsc::UnboundedSender<KeyEvent>,
    cancel_token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        while !cancel_token.is_cancelled() {
            if !event::poll(Duration::from_millis(16)).unwrap_or(false) {
                continue;
            }
            if let Ok(Event::Key(key)) = event::read() {
                if key.kind == KeyEventKind::Press && tx.send(key).is_err() {
                    tracing::debug!("Key channel closed, stopping poller");
                    return;
                }
            }
        }
    })
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    config: SliceConfig<CounterState, i64>,
) -> io::Result<()> {
    let mut instance = Instance::new();

    let (key_tx, mut key_rx) = mpsc::unbounded_channel::<KeyEvent>();
    let cancel_token = CancellationToken::new();
    let poller = spawn_key_poller(key_tx, cancel_token.clone());

    let mut should_render = true;

    loop {
        should_render |= instance.has_pending();

        // Render pass: queued dispatches are applied here
        let (state, actions, dispatch) = instance.render(|cx| use_bound_state(cx, &config));

        if should_render {
            terminal.draw(|frame| {
                let area = frame.area();

                let [_, center, _] = Layout::vertical([
                    Constraint::Fill(1),
                    Constraint::Length(5),
                    Constraint::Fill(1),
                ])
                .areas(area);

                let [_, center, _] = Layout::horizontal([
                    Constraint::Fill(1),
                    Constraint::Length(30),
                    Constraint::Fill(1),
                ])
                .flex(Flex::Center)
                .areas(center);

                let block = Block::default()
                    .title(" Counter ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan));

                let paragraph = Paragraph::new(state.count.to_string())
                    .alignment(Alignment::Center)
                    .block(block);
                frame.render_widget(paragraph, center);

                let [_, help_area] =
                    Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);
                let help = Paragraph::new("k/Up: +1  j/Down: -1  5: +5  +: +10  0: reset  q: quit")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::DarkGray));
                frame.render_widget(help, help_area);
            })?;
            should_render = false;
        }

        tokio::select! {
            Some(key) = key_rx.recv() => {
                if !handle_key(key.code, &actions, &dispatch) {
                    break;
                }
            }

            _ = instance.scheduled() => {}
        }
    }

    cancel_token.cancel();
    let _ = poller.await;
    Ok(())
}

// src/main.rs

use colloquy::app::App;
use colloquy::chat_view;
use colloquy::config::{get_config, initialize_config};
use colloquy::key_handlers::handle_chat_input;
use colloquy::logging::init_logging;
use colloquy::session::Transition;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyEventKind,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dotenv::dotenv;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;
use std::error::Error;
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Events fed to the main loop by the input pump.
enum Event {
    Input(CEvent),
    Tick,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    initialize_config()?;
    let config = get_config();
    let _logger = init_logging(&config)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (transition_tx, transition_rx) = mpsc::channel::<Transition>(100);
    let app = App::new(&config, transition_tx);
    let res = run_app(&mut terminal, app, transition_rx).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{:?}", err);
    }

    Ok(())
}

/// Main loop of the application.
async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    mut transition_rx: mpsc::Receiver<Transition>,
) -> Result<(), Box<dyn Error>> {
    let (tx, mut rx) = mpsc::channel::<Event>(100);

    // Input pump: polls the terminal and keeps a steady tick going.
    tokio::spawn(async move {
        let mut last_tick = Instant::now();
        loop {
            let timeout = Duration::from_millis(100);
            if event::poll(timeout).unwrap_or(false) {
                if let Ok(event) = event::read() {
                    if tx.send(Event::Input(event)).await.is_err() {
                        return;
                    }
                }
            }

            if last_tick.elapsed() >= Duration::from_millis(50) {
                if tx.send(Event::Tick).await.is_err() {
                    return;
                }
                last_tick = Instant::now();
            }
        }
    });

    loop {
        terminal.draw(|f| chat_view::draw_chat(f, &mut app))?;

        tokio::select! {
            Some(event) = rx.recv() => {
                match event {
                    Event::Input(CEvent::Key(key)) => {
                        if key.kind == KeyEventKind::Press {
                            handle_chat_input(key, &mut app);
                        }
                    }
                    Event::Input(CEvent::Mouse(mouse)) => match mouse.kind {
                        MouseEventKind::ScrollUp => app.scroll_up(1),
                        MouseEventKind::ScrollDown => app.scroll_down(1),
                        _ => {}
                    },
                    Event::Input(_) => {}
                    Event::Tick => app.on_tick(),
                }
            }
            Some(transition) = transition_rx.recv() => {
                app.on_transition(transition);
            }
            else => {
                break;
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

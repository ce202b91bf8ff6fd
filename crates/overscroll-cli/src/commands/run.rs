use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tokio::sync::mpsc;

use overscroll_core::AppConfig;
use overscroll_tui::{
    app::{App, PendingLoad},
    event::{AppEvent, EventHandler, LoadResult},
    input::handle_key_event,
    widgets::{ListViewWidget, StatusBarWidget},
    Theme,
};

pub async fn run(config: Arc<AppConfig>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle("overscroll"))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, config).await;

    // Restore terminal even when the loop failed
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, config: Arc<AppConfig>) -> Result<()> {
    let theme = Theme::by_name(&config.general.theme);
    let mut app = App::new(config.clone(), theme)?;
    app.refresh_on_startup();

    let event_handler = EventHandler::new(
        config.demo.tick_rate_ms,
        config.physics.animation_tick_duration(),
    );

    // Simulated loads report back through this channel
    let (load_tx, mut load_rx) = mpsc::unbounded_channel::<LoadResult>();

    let mut needs_fast_update = false;

    loop {
        while let Ok(result) = load_rx.try_recv() {
            app.apply_result(result);
        }

        let now = app.now_ms();
        app.on_tick(now);

        terminal.draw(|frame| {
            let size = frame.area();
            let main_layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(3), Constraint::Length(1)])
                .split(size);

            // inside the list border
            let list_area = main_layout[0];
            app.set_viewport(list_area.y + 1, list_area.height.saturating_sub(2));

            ListViewWidget::render(frame, list_area, &app);
            StatusBarWidget::render(frame, main_layout[1], &app);
        })?;
        dispatch_jobs(&mut app, &load_tx);

        let event = if needs_fast_update {
            event_handler.next_animation()?
        } else {
            event_handler.next()?
        };
        if let Some(event) = event {
            match event {
                AppEvent::Key(key) => app.handle_action(handle_key_event(key)),
                AppEvent::Mouse(mouse) => {
                    let now = app.now_ms();
                    app.handle_mouse(mouse, now);
                }
                // the next draw picks up the new size
                AppEvent::Resize(_, _) => {}
                AppEvent::Tick => {}
            }
        }
        dispatch_jobs(&mut app, &load_tx);

        needs_fast_update = app.needs_fast_update();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Start a background task for every load the listeners asked for
fn dispatch_jobs(app: &mut App, load_tx: &mpsc::UnboundedSender<LoadResult>) {
    for job in app.take_jobs() {
        if let Some(load) = app.plan(job) {
            spawn_load(load, load_tx.clone());
        }
    }
}

fn spawn_load(load: PendingLoad, load_tx: mpsc::UnboundedSender<LoadResult>) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(load.delay_ms)).await;
        if load_tx.send(load.result).is_err() {
            tracing::debug!("UI closed before the load finished");
        }
    });
}

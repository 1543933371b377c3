use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::layout::{Rect, Size};
use ratatui::DefaultTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use speech_atlas::app::App;
use speech_atlas::client::MetricClient;
use speech_atlas::data;
use speech_atlas::models::Metric;
use speech_atlas::slider::{self, YearBounds};
use speech_atlas::ui;

/// Interactive choropleth world map of per-country speech metrics by year.
#[derive(Debug, Parser)]
#[command(name = "speech-atlas", version, about)]
struct Args {
    /// Metric to display
    #[arg(long, value_enum, default_value_t = Metric::Sentiment)]
    metric: Metric,

    /// Base URL of the metric server
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    server: String,

    /// Path to the world boundaries GeoJSON
    #[arg(long, default_value = "data/world_with_country_names.geojson")]
    world: PathBuf,

    /// First selectable year
    #[arg(long, default_value_t = 1946)]
    min_year: i32,

    /// Last selectable year
    #[arg(long, default_value_t = 2023)]
    max_year: i32,

    /// Directory for the log file
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(&args.log_dir)?;
    ensure!(
        args.min_year <= args.max_year,
        "--min-year must not exceed --max-year"
    );

    // Everything that can fail loads before the terminal enters raw mode,
    // so errors print normally.
    let world = data::load_world(&args.world)?;
    let client = MetricClient::new(&args.server)?;
    let bounds = YearBounds::new(args.min_year, args.max_year);
    tracing::info!(
        countries = world.len(),
        server = %args.server,
        metric = ?args.metric,
        "world loaded"
    );

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, world, client, args.metric, bounds);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Logging goes to a file only; the TUI owns stderr.
fn setup_logging(log_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("create log directory {}", log_dir.display()))?;
    let appender = tracing_appender::rolling::never(log_dir, "speech-atlas.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();

    // Keep the writer alive for the whole run
    std::mem::forget(guard);
    Ok(())
}

fn run(
    terminal: &mut DefaultTerminal,
    world: data::World,
    client: MetricClient,
    metric: Metric,
    bounds: YearBounds,
) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(world, metric, client, bounds, size.width, size.height);

    // Main loop
    loop {
        // Apply any fetches that completed since the last frame
        app.poll_fetches();

        // Draw
        terminal.draw(|frame| ui::render(frame, &app))?;

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                            // Step the year slider
                            KeyCode::Left | KeyCode::Char('h') => app.step_year(-1),
                            KeyCode::Right | KeyCode::Char('l') => app.step_year(1),
                            KeyCode::Home => app.set_year(app.bounds.min),
                            KeyCode::End => app.set_year(app.bounds.max),

                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    handle_mouse(&mut app, mouse, size);
                }
                Event::Resize(width, height) => {
                    app.resize(width, height);
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Mouse press or drag on the slider track selects a year; the wheel steps it.
fn handle_mouse(app: &mut App, mouse: MouseEvent, size: Size) {
    let area = Rect::new(0, 0, size.width, size.height);
    let track = ui::slider_track_rect(area);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let on_track = mouse.row == track.y
                && mouse.column >= track.x
                && mouse.column < track.x + track.width;
            if on_track {
                app.slider_drag = true;
                let year = slider::year_for_column(app.bounds, track.width, mouse.column - track.x);
                app.set_year(year);
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if app.slider_drag && track.width > 0 {
                let max_x = track.x + track.width - 1;
                let column = mouse.column.clamp(track.x, max_x) - track.x;
                app.set_year(slider::year_for_column(app.bounds, track.width, column));
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.slider_drag = false;
        }
        MouseEventKind::ScrollUp => app.step_year(1),
        MouseEventKind::ScrollDown => app.step_year(-1),
        _ => {}
    }
}

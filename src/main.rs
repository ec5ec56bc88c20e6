use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{info, warn};
use ratatui::{backend::CrosstermBackend, prelude::*};
use simplelog::{Config, LevelFilter, WriteLogger};

use table_editor::app::App;
use table_editor::generator;
use table_editor::model::Dataset;
use table_editor::pagination::PageSize;
use table_editor::table::TableController;
use table_editor::ui;

#[derive(Parser, Debug)]
#[command(author, version, about = "Paginated, editable table in the terminal")]
struct Args {
    /// JSON dataset to open instead of generating one
    #[arg(long, value_name = "PATH")]
    data: Option<PathBuf>,

    /// Number of synthetic rows to generate
    #[arg(short = 'r', long, default_value_t = 10_000)]
    rows: usize,

    /// Seed for the synthetic data, for a reproducible table
    #[arg(long)]
    seed: Option<u64>,

    /// Rows per page: 10, 25, 50, 100 or 500
    #[arg(short = 'n', long, default_value = "10")]
    page_size: PageSize,

    /// Write the dataset as JSON to PATH and exit
    #[arg(long, value_name = "PATH")]
    dump: Option<PathBuf>,

    /// Log file (the terminal is busy drawing the table)
    #[arg(long, default_value = "table-editor.log")]
    log_file: PathBuf,

    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn load_dataset(args: &Args) -> Result<Dataset> {
    match &args.data {
        Some(path) => Dataset::from_path(path)
            .with_context(|| format!("failed to load dataset {}", path.display())),
        None => Ok(generator::generate(args.rows, args.seed)),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = File::create(&args.log_file)
        .with_context(|| format!("failed to create log file {}", args.log_file.display()))?;
    WriteLogger::init(args.log_level, Config::default(), log_file)?;

    let dataset = load_dataset(&args)?;
    info!(
        "dataset ready: {} columns, {} rows",
        dataset.columns.len(),
        dataset.data.len()
    );

    if let Some(path) = &args.dump {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let mut w = BufWriter::new(file);
        dataset.to_writer(&mut w)?;
        w.flush()?;
        info!("wrote dataset to {}", path.display());
        return Ok(());
    }

    let mut app = App::new(TableController::new(dataset, args.page_size));
    let mut terminal = setup_terminal()?;

    let tick_rate = Duration::from_millis(250);
    let res = run_app(&mut terminal, &mut app, tick_rate);

    restore_terminal(terminal)?;
    if let Err(e) = res {
        warn!("exited with error: {e:?}");
        eprintln!("Error: {e:?}");
    }
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();
    // Redraw only when state changes or on tick
    let mut dirty = true;
    loop {
        let tick_due = last_tick.elapsed() >= tick_rate;
        if dirty || tick_due {
            app.set_viewport_rows(ui::data_viewport_rows(terminal.size()?));
            terminal.draw(|f| ui::draw(f, app))?;
            dirty = false;
            if tick_due {
                last_tick = Instant::now();
            }
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::from_secs(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key);
                    dirty = true;
                }
                Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                    let area = terminal.size()?;
                    if app.handle_click(area, mouse.column, mouse.row) {
                        dirty = true;
                    }
                }
                Event::Resize(..) => dirty = true,
                _ => {}
            }
        }

        if app.should_quit {
            info!("quit");
            return Ok(());
        }
    }
}

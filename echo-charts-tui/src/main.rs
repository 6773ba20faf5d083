mod tui;

use clap::{CommandFactory, Parser, Subcommand};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use echo_charts_common::Config;
use echo_charts_core::{
    build_chart_data, export_csv, export_json, load_log, locate, print_summary, AggregateOptions,
    ChartView, CsvSource, LoadedLog, LoaderOptions, SeriesKind,
};
use notify::{RecursiveMode, Watcher};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, path::PathBuf, sync::Mutex, time::Duration};
use tracing_subscriber::EnvFilter;
use tui::app::App;
use tui::events::{handle_key, handle_mouse};
use tui::session::Session;
use tui::ui::render;

#[derive(Parser)]
#[command(name = "echo-charts", version, about = "Charts for echo bot logs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive daily / hourly / weekday charts
    View {
        source: String,
        #[arg(long)] view: Option<ChartView>,
        #[arg(long)] series: Option<SeriesKind>,
        #[arg(long)] watch: bool,
    },
    /// Print the per-view tables
    Summary { source: String, #[arg(long)] save: bool },
    Export {
        source: String,
        #[arg(long)] format: Option<String>,
        #[arg(long)] output: Option<String>,
    },
    /// Nearest bucket to an axis position (number, YYYY-MM-DD or weekday)
    Locate {
        source: String,
        #[arg(long, default_value = "hourly")] view: ChartView,
        #[arg(long)] at: String,
        #[arg(long, default_value = "expls")] series: SeriesKind,
    },
    Completions { shell: clap_complete::Shell },
}

/// block_in_place wrapper to drive the async loader from sync code
fn load(input: &str, config: &Config) -> anyhow::Result<LoadedLog> {
    let opts = LoaderOptions::from(&config.data);
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(load_log(input, &opts)))
        .map_err(|e| anyhow::anyhow!("{e}"))
}

fn env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_env("ECHO_CHARTS_LOG").unwrap_or_else(|_| EnvFilter::new(&config.logging.level))
}

fn init_stderr_logging(config: &Config) {
    tracing_subscriber::fmt().with_env_filter(env_filter(config)).with_writer(io::stderr).init();
}

/// the TUI owns the terminal, so its log goes to a file in the cache dir
fn init_file_logging(config: &Config) -> anyhow::Result<PathBuf> {
    let dir = dirs::cache_dir().unwrap_or_else(|| PathBuf::from(".")).join("echo-charts");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("echo-charts.log");
    let file = std::fs::OpenOptions::new().create(true).append(true).open(&path)?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(path)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load().unwrap_or_default();
    match cli.command {
        Commands::View { source, view, series, watch } => {
            if let Err(e) = init_file_logging(&config) {
                eprintln!("logging disabled: {e}");
            }
            run_tui(source, config, view, series, watch)?
        }
        Commands::Summary { source, save } => {
            init_stderr_logging(&config);
            run_summary(source, save, &config)?
        }
        Commands::Export { source, format, output } => {
            init_stderr_logging(&config);
            run_export(source, format, output, &config)?
        }
        Commands::Locate { source, view, at, series } => {
            init_stderr_logging(&config);
            run_locate(source, view, &at, series, &config)?
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "echo-charts", &mut io::stdout());
        }
    }
    Ok(())
}

fn spawn_watcher(sources: &[CsvSource]) -> anyhow::Result<(notify::RecommendedWatcher, std::sync::mpsc::Receiver<()>)> {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(ev) = res {
            if ev.kind.is_modify() || ev.kind.is_create() {
                let _ = tx.send(());
            }
        }
    })?;
    let mut watched = 0;
    for source in sources {
        if let CsvSource::Local(path) = source {
            watcher.watch(path, RecursiveMode::NonRecursive)?;
            watched += 1;
        }
    }
    if watched == 0 {
        anyhow::bail!("--watch needs at least one local file");
    }
    Ok((watcher, rx))
}

fn reload(app: &mut App) {
    match load(&app.input_path, &app.config) {
        Ok(log) => {
            app.set_log(log);
            app.status_msg = format!("Loaded {} rows", app.stats.rows_read);
        }
        Err(e) => {
            tracing::warn!(error = %e, "reload failed");
            app.status_msg = format!("error: reload failed: {e}");
        }
    }
}

fn run_tui(
    input_path: String,
    config: Config,
    view: Option<ChartView>,
    series: Option<SeriesKind>,
    watch: bool,
) -> anyhow::Result<()> {
    let log = load(&input_path, &config)?;
    let tick = Duration::from_millis(config.display.tick_rate_ms.max(1));
    let mut app = App::new(input_path, config);
    if let Some(s) = Session::load() { app.restore_from_session(&s); }
    // explicit flags win over the restored session
    if let Some(v) = view { app.set_view(v); }
    if let Some(k) = series { app.select(k); }
    app.set_log(log);
    app.status_msg = format!("Loaded {} rows", app.stats.rows_read);

    let _watcher = if watch {
        let (watcher, rx) = spawn_watcher(&app.sources)?;
        app.watch_rx = Some(rx);
        app.status_msg.push_str(" | watching");
        Some(watcher)
    } else {
        None
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        let size = terminal.size()?;
        app.refresh(size.width);
        terminal.draw(|f| render(f, &app))?;
        // drain watcher events; one reload covers a burst of writes
        let changed = app.watch_rx.as_ref().is_some_and(|rx| rx.try_iter().count() > 0);
        if changed || app.pending_reload {
            app.pending_reload = false;
            reload(&mut app);
        }
        if event::poll(tick)? {
            match event::read()? {
                Event::Key(key) => handle_key(&mut app, key),
                Event::Mouse(mouse) => {
                    let area = ratatui::layout::Rect::new(0, 0, size.width, size.height);
                    handle_mouse(&mut app, mouse, area);
                }
                Event::Resize(..) => app.redraw.invalidate(),
                _ => {}
            }
        }
        if app.should_quit { break; }
    }
    if let Err(e) = app.to_session().save() {
        tracing::warn!(error = %e, "could not save session");
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_summary(input_path: String, save: bool, config: &Config) -> anyhow::Result<()> {
    let log = load(&input_path, config)?;
    let data = build_chart_data(&log.records, &AggregateOptions::from(&config.data));
    print_summary(&log.sources, &log.stats, &data);
    if save {
        let out_dir = std::path::Path::new(&config.export.output_dir);
        std::fs::create_dir_all(out_dir)?;
        let out_path = out_dir.join("summary.json");
        export_json(&out_path, &log.sources, &log.stats, &data).map_err(|e| anyhow::anyhow!("{e}"))?;
        println!("Summary saved to {}", out_path.display());
    }
    Ok(())
}

fn run_export(input_path: String, format: Option<String>, output: Option<String>, config: &Config) -> anyhow::Result<()> {
    let format = format.unwrap_or_else(|| config.export.format.clone());
    let log = load(&input_path, config)?;
    let data = build_chart_data(&log.records, &AggregateOptions::from(&config.data));
    let out_path: PathBuf = match output {
        Some(o) => PathBuf::from(o),
        None => std::path::Path::new(&config.export.output_dir).join(format!("echo-charts.{format}")),
    };
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() { std::fs::create_dir_all(parent)?; }
    }
    match format.as_str() {
        "json" => export_json(&out_path, &log.sources, &log.stats, &data).map_err(|e| anyhow::anyhow!("{e}"))?,
        "csv" => export_csv(&out_path, &data).map_err(|e| anyhow::anyhow!("{e}"))?,
        _ => anyhow::bail!("Unknown format: {format} (use json or csv)"),
    }
    println!("Exported to {}", out_path.display());
    Ok(())
}

fn run_locate(input_path: String, view: ChartView, at: &str, series: SeriesKind, config: &Config) -> anyhow::Result<()> {
    let query = view
        .granularity()
        .parse_axis(at)
        .ok_or_else(|| anyhow::anyhow!("cannot read {at:?} as a {view} position"))?;
    let log = load(&input_path, config)?;
    let data = build_chart_data(&log.records, &AggregateOptions::from(&config.data));
    let point = locate(data.view(view).get(series), query).map_err(|e| anyhow::anyhow!("{e}"))?;
    match point.average {
        Some(avg) => println!("{}\t{}\t{avg:.2}", point.position, point.count),
        None => println!("{}\t{}", point.position, point.count),
    }
    Ok(())
}

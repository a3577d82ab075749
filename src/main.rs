use anyhow::{Context, Result as AnyhowResult};
use clap::Parser;
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use std::io::stdout;
use std::path::PathBuf;
use teditor::app::App;
use teditor::config::Config;
use teditor::controller::BufferController;
use teditor::input::keybindings::KeybindingResolver;
use teditor::persistence::{DocumentMirror, JsonFileStore, PersistedDocument};
use teditor::services::clipboard::SystemClipboard;
use teditor::services::fs::StdFileSystem;
use teditor::services::preview::SystemBrowser;
use teditor::services::rich_text::MarkupSurface;
use teditor::services::tracing_setup;

/// A terminal editor for plain text and HTML
#[derive(Parser, Debug)]
#[command(name = "teditor")]
#[command(about = "A terminal editor for plain text and HTML with a rich editing mode", long_about = None)]
#[command(version)]
struct Args {
    /// File to open
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Path to log file for editor diagnostics (default: system temp dir)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Don't restore the previous document (start with an empty one)
    #[arg(long)]
    no_restore: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,

    /// Print the JSON Schema of the configuration file and exit
    #[arg(long)]
    config_schema: bool,
}

fn load_config(args: &Args) -> AnyhowResult<Config> {
    match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(Config::load_or_default()),
    }
}

fn attach_store(controller: &mut BufferController, store: JsonFileStore, no_restore: bool) {
    if !no_restore {
        let persisted = PersistedDocument::load(&store);
        if !persisted.is_empty() {
            controller.restore(persisted);
        }
    }
    controller.subscribe(Box::new(DocumentMirror::new(store)));
}

fn build_controller(args: &Args, config: &Config) -> AnyhowResult<BufferController> {
    let fs = StdFileSystem::new(config.files.direct_write, config.download_dir());
    let mut controller = BufferController::new(
        config,
        Box::new(fs),
        Box::new(SystemClipboard::new()),
        Box::new(MarkupSurface::new()),
    );

    if let Some(store_path) = config.storage_path() {
        match JsonFileStore::open(&store_path) {
            Ok(store) => attach_store(&mut controller, store, args.no_restore),
            Err(e) => tracing::warn!(
                "Failed to open store {}, running without persistence: {}",
                store_path.display(),
                e
            ),
        }
    }

    if let Some(path) = &args.file {
        if !controller.open_path(path) {
            anyhow::bail!("Failed to open {}", path.display());
        }
    }

    Ok(controller)
}

fn main() -> AnyhowResult<()> {
    let args = Args::parse();

    // Handle --config-schema early (no terminal setup needed)
    if args.config_schema {
        let schema = serde_json::to_string_pretty(&Config::json_schema())
            .context("Failed to serialize config schema")?;
        println!("{}", schema);
        return Ok(());
    }

    // Handle --dump-config early (no terminal setup needed)
    if args.dump_config {
        let config = load_config(&args)?;
        let json = serde_json::to_string_pretty(&config).context("Failed to serialize config")?;
        println!("{}", json);
        return Ok(());
    }

    let log_file = args
        .log_file
        .clone()
        .unwrap_or_else(tracing_setup::default_log_path);
    tracing_setup::init_global(&log_file);
    tracing::info!("Editor starting");

    let config = load_config(&args)?;
    let controller = build_controller(&args, &config).context("Failed to initialize editor")?;
    let base_dir = std::env::current_dir().unwrap_or_default();

    let mut app = App::new(
        controller,
        KeybindingResolver::new(&config),
        Box::new(SystemBrowser::new()),
        config.files.open_extensions.clone(),
        base_dir,
    );

    let mut terminal = ratatui::init();
    // Bracketed paste lets terminal pastes arrive as one event
    let _ = execute!(stdout(), EnableBracketedPaste);
    let result = app.run(&mut terminal);
    let _ = execute!(stdout(), DisableBracketedPaste);
    ratatui::restore();

    tracing::info!("Editor exiting");
    result.context("Editor loop returned an error")
}

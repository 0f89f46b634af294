// Soundkeys CLI
// Loads settings and a binding config, then drives the soundboard from stdin

#[path = "../console/mod.rs"]
mod console;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use soundkeys_core::{locate_config, load_path, HeadlessAudio, Settings, Soundboard};

use console::Console;

/// Key-combination soundboard
#[derive(Parser, Debug)]
#[command(name = "soundkeys")]
#[command(version)]
#[command(about = "Play sounds bound to key combinations", long_about = None)]
struct Args {
    /// JSON binding config
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// TOML settings file (default: ~/.config/soundkeys/settings.toml)
    #[arg(short, long, value_name = "SETTINGS")]
    settings: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Validate config and exit
    #[arg(long)]
    check_config: bool,

    /// Accept any sound path without reading files
    #[arg(long)]
    dry_run: bool,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let settings = match path {
        Some(path) => Settings::load_or_default(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::load_default().context("failed to load settings")?,
    };
    Ok(settings)
}

/// Resolve the config path, persisting the choice if settings picked one
fn resolve_config(args: &Args, settings: &mut Settings) -> Result<PathBuf> {
    let before = settings.last_used_config().map(str::to_string);
    let path = locate_config(args.config.as_deref(), settings)?;

    if settings.last_used_config().map(str::to_string) != before {
        if let Err(e) = settings.save_to_source() {
            log::warn!("Could not record last used config: {}", e);
        }
    }
    Ok(path)
}

fn check_config(path: &Path) -> Result<()> {
    let table = load_path(path).with_context(|| format!("invalid config {}", path.display()))?;
    println!(
        "Configuration is valid: {} keys, {} bindings",
        table.len(),
        table.binding_count()
    );
    Ok(())
}

fn spawn_signal_handler(running: Arc<AtomicBool>) {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    std::thread::spawn(move || {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM]) {
            if let Some(signal) = signals.forever().next() {
                log::info!("Received signal {}, shutting down", signal);
                running.store(false, Ordering::SeqCst);
            }
        }
    });
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut settings = load_settings(args.settings.as_deref())?;
    let config_path = resolve_config(&args, &mut settings)?;

    if args.check_config {
        return check_config(&config_path);
    }

    let audio = if args.dry_run {
        HeadlessAudio::dry_run()
    } else {
        HeadlessAudio::new()
    };
    let board = Soundboard::load(&config_path, settings, audio)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    log::info!(
        "Loaded {} ({} keys); type :help for commands",
        config_path.display(),
        board.table().len()
    );

    let running = Arc::new(AtomicBool::new(true));
    spawn_signal_handler(Arc::clone(&running));

    let console = Console::new(board, std::io::stdout());
    console::run(console, running)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["soundkeys", "--config", "/tmp/pads.json"]);

        assert_eq!(args.config, Some(PathBuf::from("/tmp/pads.json")));
        assert!(args.settings.is_none());
        assert!(!args.verbose);
        assert!(!args.check_config);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_args_with_options() {
        let args = Args::parse_from([
            "soundkeys",
            "-c",
            "/tmp/pads.json",
            "--settings",
            "/tmp/settings.toml",
            "--verbose",
            "--dry-run",
            "--check-config",
        ]);

        assert_eq!(args.settings, Some(PathBuf::from("/tmp/settings.toml")));
        assert!(args.verbose);
        assert!(args.dry_run);
        assert!(args.check_config);
    }

    #[test]
    fn test_resolve_config_records_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let settings_path = dir.path().join("settings.toml");
        std::fs::create_dir(dir.path().join("configs")).unwrap();
        std::fs::write(dir.path().join("configs").join("pads.json"), "[]").unwrap();

        let mut settings = Settings::load_or_default(&settings_path).unwrap();
        let args = Args::parse_from(["soundkeys"]);
        let path = resolve_config(&args, &mut settings).unwrap();
        assert_eq!(path, dir.path().join("configs").join("pads.json"));

        let saved = Settings::from_file(&settings_path).unwrap();
        assert_eq!(saved.last_used_config(), Some("pads.json"));
    }

    #[test]
    fn test_check_config_rejects_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"[{"key": "a"}]"#).unwrap();
        assert!(check_config(&path).is_err());
    }
}

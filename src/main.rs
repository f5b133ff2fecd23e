use bootseq::app::BootApp;
use bootseq::assets::Assets;
use bootseq::cli::Args;
use bootseq::config::{self, PathConfig, Settings};

use clap::Parser;
use eframe::egui;
use log::{debug, info};

fn init_logging(args: &Args, path_config: &PathConfig) -> Result<(), Box<dyn std::error::Error>> {
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let (log_level, default_level) = match args.verbosity {
        0 => (log::LevelFilter::Warn, "warn"),
        1 => (log::LevelFilter::Info, "info"),
        2 => (log::LevelFilter::Debug, "debug"),
        _ => (log::LevelFilter::Trace, "trace"),
    };

    if let Some(log_path_opt) = &args.log_file {
        let log_path = log_path_opt
            .clone()
            .unwrap_or_else(|| config::data_file(config::LOG_FILE, path_config));
        let file = std::fs::File::create(&log_path)?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .filter_module("egui", log::LevelFilter::Info) // Suppress egui DEBUG spam
            .filter_module("gilrs", log::LevelFilter::Warn)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        // Console logging, respects RUST_LOG if set
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .filter_module("egui", log::LevelFilter::Info)
            .filter_module("gilrs", log::LevelFilter::Warn)
            .format_timestamp_millis()
            .init();
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let path_config = PathConfig::from_env_and_cli(args.config_dir.clone());
    if let Err(e) = config::ensure_dirs(&path_config) {
        eprintln!("Warning: Failed to create application directories: {}", e);
    }

    init_logging(&args, &path_config)?;
    info!("bootseq starting...");
    debug!("Command-line args: {:?}", args);

    let settings_path = config::config_file(config::SETTINGS_FILE, &path_config);
    let mut settings = Settings::load(&settings_path);
    settings.apply_args(&args);
    info!(
        "Assets: {}, audio: {}, gamepad: {}, fullscreen: {}",
        settings.asset_dir.display(),
        settings.audio_enabled,
        settings.gamepad_enabled,
        settings.fullscreen
    );

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("bootseq")
            .with_inner_size(settings.window_size)
            .with_fullscreen(settings.fullscreen),
        ..Default::default()
    };

    eframe::run_native(
        "bootseq",
        native_options,
        Box::new(move |_cc| {
            let assets = Assets::load(&settings.asset_dir);
            Ok(Box::new(BootApp::new(&settings, assets)))
        }),
    )?;

    info!("Application exiting");
    Ok(())
}

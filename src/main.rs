use bevy::prelude::*;

use bevy::window::{PresentMode, WindowResolution};

use tilecast::game::config::{InitialConfig, INITIAL_CONFIG_PATH, MAX_SCREEN_SIDE};
use tilecast::game::GamePlugin;

use anyhow::Context;
use bevy::log::LogPlugin;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use std::fs;
use std::path::Path;

const LOG_DIR: &str = "logs";
const KEEP_LOG_FILES: usize = 25;

fn setup_file_logging() -> anyhow::Result<String> {
    let log_dir = Path::new(LOG_DIR);
    fs::create_dir_all(log_dir).context("failed to create logs directory")?;

    // Clean up old log files, keeping only the most recent ones
    cleanup_old_logs(log_dir, KEEP_LOG_FILES);

    // Generate timestamped filename
    let now = chrono::Local::now();
    let log_filename = format!("tilecast_{}.log", now.format("%Y%m%d_%H%M%S"));
    let log_path_str = log_dir.join(&log_filename).to_string_lossy().to_string();

    // One file per run, never rotated
    let file_appender = RollingFileAppender::new(Rotation::NEVER, log_dir, &log_filename);

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            EnvFilter::new("wgpu=error,bevy_render=info,bevy_ecs=info,tilecast=info")
        });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(log_path_str)
}

fn cleanup_old_logs(log_dir: &Path, keep_count: usize) {
    let Ok(entries) = fs::read_dir(log_dir) else { return };
    let mut log_files: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .file_name()
                .and_then(|n| n.to_str())
                .map(|s| s.starts_with("tilecast") && s.ends_with(".log"))
                .unwrap_or(false)
        })
        .collect();

    // Oldest first
    log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

    if log_files.len() > keep_count {
        for file in log_files.iter().take(log_files.len() - keep_count) {
            let _ = fs::remove_file(file.path());
        }
    }
}

fn main() -> AppExit {
    let log_file = match setup_file_logging() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{:#}", e);
            return AppExit::error();
        }
    };
    info!("Logging to {}", log_file);

    // Loaded here as well so the window can be sized before startup runs.
    // GameConfigPlugin keeps a pre-inserted config as is.
    let initial = InitialConfig::load(INITIAL_CONFIG_PATH).unwrap_or_else(|e| {
        error!("{:#}", e);
        error!("Using default InitialConfig");
        InitialConfig::default()
    });
    let (window_width, window_height) = initial.window_size().unwrap_or_else(|| {
        // Startup validation rejects this config and exits
        error!("Window size {}x{} at {}x scale overflows", initial.screen_width, initial.screen_height, initial.display_scale);
        (initial.screen_width.min(MAX_SCREEN_SIDE), initial.screen_height.min(MAX_SCREEN_SIDE))
    });

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "tilecast".into(),
                resolution: WindowResolution::new(window_width, window_height),
                present_mode: PresentMode::AutoVsync,
                resizable: false,
                ..default()
            }),
            ..default()
        }).build().disable::<LogPlugin>()) // Disable Bevy's default logging since we set up our own
        .insert_resource(ClearColor(Color::BLACK))
        .insert_resource(initial)
        .add_plugins(GamePlugin)
        .run()
}

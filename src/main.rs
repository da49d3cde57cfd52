use bevy::prelude::*;

use bevy::window::WindowResolution;

use spacegame::game::control::ControlPlugin;
use spacegame::game::debug_draw::DebugDrawPlugin;
use spacegame::game::GamePlugin;

use bevy::log::LogPlugin;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_PREFIX: &str = "spacegame";
const KEEP_LOGS: usize = 25;

/// Install stdout + per-run file logging. Returns the log file path, or
/// `None` when the file could not be created (stdout still works).
fn setup_file_logging() -> Option<String> {
    let log_dir = PathBuf::from("logs");
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Could not create {}: {}", log_dir.display(), e);
    }
    cleanup_old_logs(&log_dir, KEEP_LOGS);

    let now = chrono::Local::now();
    let log_filename = format!("{}_{}.log", LOG_PREFIX, now.format("%Y%m%d_%H%M%S"));

    // One file per run, never rotated.
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(&log_filename)
        .build(&log_dir)
        .map_err(|e| eprintln!("File logging disabled: {}", e))
        .ok();
    let log_path = file_appender
        .as_ref()
        .map(|_| log_dir.join(&log_filename).to_string_lossy().to_string());

    let file_layer = file_appender.map(|appender| fmt::layer().with_writer(appender).with_ansi(false));
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wgpu=error,bevy_render=info,spacegame=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    log_path
}

fn cleanup_old_logs(log_dir: &Path, keep_count: usize) {
    let Ok(entries) = fs::read_dir(log_dir) else {
        return;
    };
    let mut log_files: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|s| s.starts_with(LOG_PREFIX) && s.ends_with(".log"))
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

fn main() {
    let log_file = setup_file_logging();

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║  Space Game - Logging to file                            ║");
    println!("╠══════════════════════════════════════════════════════════╣");
    println!("║  Log file: {:<45} ║", log_file.as_deref().unwrap_or("(stdout only)"));
    println!("╚══════════════════════════════════════════════════════════╝");

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Space Game".into(),
                        resolution: WindowResolution::new(1280, 720),
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .build()
                .disable::<LogPlugin>(), // our own subscriber is installed above
        )
        .add_plugins((GamePlugin, ControlPlugin, DebugDrawPlugin))
        .run();
}

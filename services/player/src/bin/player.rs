//! services/player/src/bin/player.rs
//!
//! Runs a lesson player against the simulated media element. Host commands are
//! read as JSON lines from stdin; host updates are written as JSON lines to stdout.

use lesson_player_core::ports::{CourseRepository, LessonProgressService};
use player_lib::{
    adapters::{InMemoryProgressLog, JsonCourseRepository, SimulatedMedia},
    config::Config,
    engine::{EngineInput, HostCommand, HostUpdate, PlayerSession},
    error::PlayerError,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), PlayerError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded. Starting player...");

    // --- 2. Load the Course ---
    let repository = JsonCourseRepository::new(&config.course_path);
    let course = repository.load_course().await?;

    // --- 3. Initialize Adapters ---
    let media = course
        .lessons
        .iter()
        .fold(SimulatedMedia::new(), |media, lesson| {
            media.with_source(lesson.video_url.clone(), f64::from(lesson.duration))
        });
    let progress = Arc::new(InMemoryProgressLog::new());

    // --- 4. Build the Session ---
    let (input_tx, input_rx) = mpsc::unbounded_channel::<EngineInput>();
    let (update_tx, mut update_rx) = mpsc::unbounded_channel::<HostUpdate>();
    let session = PlayerSession::new(
        course,
        media.clone(),
        config.engine_settings(),
        progress.clone(),
        input_tx.clone(),
        update_tx,
    )?;

    let clock_token = CancellationToken::new();
    let clock = media.spawn_clock(config.sim_tick, clock_token.clone());

    // --- 5. Host I/O Tasks ---
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(update) = update_rx.recv().await {
            match serde_json::to_string(&update) {
                Ok(mut line) => {
                    line.push('\n');
                    if stdout.write_all(line.as_bytes()).await.is_err() {
                        error!("Failed to write host update to stdout.");
                        break;
                    }
                }
                Err(e) => error!("Failed to serialize host update: {}", e),
            }
        }
        let _ = stdout.flush().await;
    });

    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<HostCommand>(line) {
                        Ok(command) => {
                            if input_tx.send(EngineInput::Host(command)).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Failed to parse host command: {}", e),
                    }
                }
                Ok(None) => {
                    info!("stdin closed.");
                    let _ = input_tx.send(EngineInput::Host(HostCommand::Shutdown));
                    break;
                }
                Err(e) => {
                    error!("Failed to read stdin: {}", e);
                    let _ = input_tx.send(EngineInput::Host(HostCommand::Shutdown));
                    break;
                }
            }
        }
    });

    // --- 6. Run Until Shutdown ---
    let course = session.run(input_rx).await;
    clock_token.cancel();
    reader.abort();
    let _ = clock.await;
    if let Err(e) = writer.await {
        return Err(PlayerError::Internal(format!("host writer task failed: {}", e)));
    }

    let completions = progress.completions_for_course(course.id).await?;
    info!(
        "Session finished: {} completion(s) recorded for '{}'.",
        completions.len(),
        course.title
    );

    Ok(())
}

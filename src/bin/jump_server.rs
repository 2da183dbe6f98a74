//! Jump server: receives ankle frames from a pose-estimation client over TCP,
//! runs the jump engine and streams heights, jumps and session summaries back.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::net::{TcpListener, TcpStream};

use jump_meter::clock::{FrameClock, SystemClock};
use jump_meter::config::Config;
use jump_meter::jump::{JumpEngine, SkipReason, TickOutcome};
use jump_meter::log;
use jump_meter::logging::{open_log_file, LogFile};
use jump_meter::protocol::{self, ClientMessage, MessageOutbox, ServerMessage};

const CONFIG_PATH: &str = "jump.toml";

#[derive(Default)]
struct FpsCounters {
    processed: u32,
    throttled: u32,
    missing: u32,
}

async fn handle_client(socket: TcpStream, config: &Config, logfile: &LogFile) -> Result<()> {
    let mut stream = protocol::message_stream(socket);
    let mut engine = JumpEngine::start(config.engine.clone())?;
    // エンジンの間引きはサーバー側の単調時計で行う（クライアントの時刻は信用しない）
    let clock = SystemClock::new(0.0);
    let mut outbox = MessageOutbox::new();
    let verbose = config.server.verbose;

    protocol::send_message(&mut stream, &ServerMessage::Ready).await?;

    let mut fps = FpsCounters::default();
    let mut fps_timer = Instant::now();

    while let Some(msg) = protocol::recv_message::<ClientMessage>(&mut stream).await? {
        match msg {
            ClientMessage::StartSession => {
                engine.restart();
                log!(logfile, "[session] started");
                protocol::send_message(&mut stream, &ServerMessage::Ready).await?;
            }
            ClientMessage::Frame { frame } => {
                let outcome = engine.process_frame(&frame, clock.now_ms(), &mut outbox);
                match outcome {
                    TickOutcome::Processed(report) => {
                        fps.processed += 1;
                        if let (Some(event), Some(stats)) = (report.jump, report.stats) {
                            log!(logfile,
                                "[jump] #{} flight={:.3}s peak={:.1}px best={:.1}px@#{}",
                                event.jump_index, event.flight_time_seconds, event.peak_height_px,
                                stats.best_height_px, stats.best_height_jump_index);
                        }
                    }
                    TickOutcome::Skipped(SkipReason::Throttled) => fps.throttled += 1,
                    TickOutcome::Skipped(SkipReason::MissingKeypoint) => fps.missing += 1,
                }
                for out in outbox.drain() {
                    protocol::send_message(&mut stream, &out).await?;
                }
            }
            ClientMessage::StopSession => {
                let summary = engine.stop();
                log!(logfile,
                    "[session] stopped: {} jumps, {} processed, {} throttled, {} skipped",
                    summary.stats.jump_count, summary.processed_samples,
                    summary.throttled_samples, summary.skipped_frames);
                protocol::send_message(&mut stream, &ServerMessage::SessionSummary { summary }).await?;
            }
        }

        if fps_timer.elapsed() >= Duration::from_secs(1) {
            if verbose {
                log!(logfile, "[fps] processed={} throttled={} missing={} ground={:?} state={:?}",
                    fps.processed, fps.throttled, fps.missing,
                    engine.ground_level(), engine.airborne_state());
            }
            fps = FpsCounters::default();
            fps_timer = Instant::now();
        }
    }

    let summary = engine.stop();
    log!(logfile, "[session] client closed: {} jumps", summary.stats.jump_count);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_or_default(CONFIG_PATH);
    config.engine.validate().context("invalid [engine] section")?;

    let (logfile, _) = open_log_file(&config.log.dir, "jump_server")?;
    log!(logfile, "Jump Server ({})", env!("GIT_VERSION"));
    log!(logfile,
        "Engine: threshold={}px tolerance={}px min_flight={}s interval={}ms buffer={}/{} persist_best={}",
        config.engine.jump_threshold_px, config.engine.ground_tolerance_band_px,
        config.engine.min_flight_time_seconds, config.engine.min_sample_interval_ms,
        config.engine.peak_lookback, config.engine.buffer_capacity,
        config.engine.persist_best_stats_across_sessions);

    let listener = TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    log!(logfile, "[tcp] listening on {}", config.server.bind_addr);

    // 1クライアントずつ処理する
    loop {
        let (socket, peer) = listener.accept().await?;
        log!(logfile, "[tcp] client connected: {}", peer);
        if let Err(e) = handle_client(socket, &config, &logfile).await {
            log!(logfile, "[tcp] session error: {e:#}");
        }
        log!(logfile, "[tcp] client disconnected: {}", peer);
    }
}

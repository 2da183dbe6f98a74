//! Replays a recorded ankle-frame stream through the jump engine.

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use jump_meter::config::Config;
use jump_meter::jump::{AirborneState, FinalStats, FootHeightSample, JumpEngine, JumpEvent, JumpSink, RunningStats};
use jump_meter::log;
use jump_meter::logging::{open_log_file, LogFile};
use jump_meter::recording::load_recording;
use jump_meter::runner;

const CONFIG_PATH: &str = "jump.toml";
const USAGE: &str = "Usage: jump-meter [--config <jump.toml>] [--summary <out.json>] [--verbose] <recording.jsonl>";

struct ReplayOptions {
    recording: PathBuf,
    config: Option<PathBuf>,
    summary: Option<PathBuf>,
    verbose: bool,
}

fn parse_args() -> Result<ReplayOptions> {
    let mut recording: Option<PathBuf> = None;
    let mut config = None;
    let mut summary = None;
    let mut verbose = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(PathBuf::from(args.next().ok_or_else(|| anyhow!(USAGE))?)),
            "--summary" => summary = Some(PathBuf::from(args.next().ok_or_else(|| anyhow!(USAGE))?)),
            "--verbose" | "-v" => verbose = true,
            _ => {
                if recording.is_some() {
                    bail!(USAGE);
                }
                recording = Some(PathBuf::from(arg));
            }
        }
    }

    Ok(ReplayOptions {
        recording: recording.ok_or_else(|| anyhow!(USAGE))?,
        config,
        summary,
        verbose,
    })
}

/// ジャンプをログに流し、verbose なら毎フレームの高さも出す
struct LogSink {
    logfile: LogFile,
    verbose: bool,
    last_state: AirborneState,
}

impl JumpSink for LogSink {
    fn on_heights(&mut self, heights: &FootHeightSample, airborne: AirborneState, ground_level_px: Option<f32>) {
        if self.verbose {
            log!(self.logfile,
                "[frame] t={:.0}ms L={:.1} R={:.1} ground={} {:?}{}",
                heights.timestamp_ms, heights.left_height_px, heights.right_height_px,
                ground_level_px.map_or("-".to_string(), |g| format!("{:.1}", g)),
                airborne,
                if heights.low_confidence { " (low confidence)" } else { "" });
        } else if airborne != self.last_state && airborne == AirborneState::Airborne {
            log!(self.logfile, "[takeoff] t={:.0}ms", heights.timestamp_ms);
        }
        self.last_state = airborne;
    }

    fn on_jump(&mut self, event: &JumpEvent, stats: &RunningStats) {
        log!(self.logfile,
            "[jump] #{} flight={:.3}s peak={:.1}px (best height {:.1}px @#{}, best flight {:.3}s @#{})",
            event.jump_index, event.flight_time_seconds, event.peak_height_px,
            stats.best_height_px, stats.best_height_jump_index,
            stats.best_flight_time_seconds, stats.best_flight_time_jump_index);
    }
}

fn print_summary(summary: &FinalStats) {
    let s = &summary.stats;
    println!();
    println!("=== Session ===");
    println!("Duration:      {:.2}s", summary.duration_seconds());
    println!("Frames:        {} processed, {} throttled, {} skipped",
        summary.processed_samples, summary.throttled_samples, summary.skipped_frames);
    println!("Jumps:         {}", s.jump_count);
    if s.jump_count > 0 {
        println!("Last jump:     {:.1}px, {:.3}s", s.last_jump_height_px, s.last_flight_time_seconds);
        println!("Max height:    {:.1}px", s.max_height_ever_px);
        println!("Best height:   {:.1}px (jump #{})", s.best_height_px, s.best_height_jump_index);
        println!("Best flight:   {:.3}s (jump #{})", s.best_flight_time_seconds, s.best_flight_time_jump_index);
    }
}

fn main() -> Result<()> {
    let opts = parse_args()?;
    let config = match &opts.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(CONFIG_PATH),
    };

    let (logfile, _) = open_log_file(&config.log.dir, "replay")?;
    log!(logfile, "Jump Meter replay ({})", env!("GIT_VERSION"));
    log!(logfile, "Recording: {}", opts.recording.display());
    log!(logfile,
        "Engine: threshold={}px tolerance={}px min_flight={}s interval={}ms combine={:?}",
        config.engine.jump_threshold_px, config.engine.ground_tolerance_band_px,
        config.engine.min_flight_time_seconds, config.engine.min_sample_interval_ms,
        config.engine.foot_combine);

    let frames = load_recording(&opts.recording)?;
    log!(logfile, "Loaded {} frames", frames.len());

    let mut engine = JumpEngine::start(config.engine.clone())?;
    let mut sink = LogSink {
        logfile: logfile.clone(),
        verbose: opts.verbose,
        last_state: AirborneState::Grounded,
    };
    let run = runner::replay(&mut engine, &frames, &mut sink);
    log!(logfile, "[replay] {} frames, {} jumps", run.frames, run.jumps);

    let summary = engine.stop();
    print_summary(&summary);

    if let Some(path) = &opts.summary {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json).with_context(|| format!("failed to write summary {}", path.display()))?;
        log!(logfile, "Summary written to {}", path.display());
    }

    Ok(())
}

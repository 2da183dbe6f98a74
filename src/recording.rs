//! Recorded ankle-frame streams, one JSON object per line.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::pose::AnkleFrame;

/// Load a JSON Lines recording. Blank lines are ignored.
pub fn load_recording<P: AsRef<Path>>(path: P) -> Result<Vec<AnkleFrame>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open recording {}", path.display()))?;

    let mut frames = Vec::new();
    for (line_idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {} of {}", line_idx + 1, path.display()))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let frame: AnkleFrame = serde_json::from_str(line)
            .with_context(|| format!("invalid frame on line {} of {}", line_idx + 1, path.display()))?;
        frames.push(frame);
    }

    if frames.is_empty() {
        bail!("recording {} contains no frames", path.display());
    }
    Ok(frames)
}

pub fn save_recording<P: AsRef<Path>>(path: P, frames: &[AnkleFrame]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("failed to create recording {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for frame in frames {
        serde_json::to_writer(&mut writer, frame)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

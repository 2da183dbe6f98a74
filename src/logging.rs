//! Timestamped log files shared between threads.
//!
//! `log!` echoes every line to stderr and appends it to the session log.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};

pub type LogFile = Arc<Mutex<BufWriter<File>>>;

/// Create `<dir>/<prefix>_<YYYYmmdd_HHMMSS>.log`.
pub fn open_log_file<P: AsRef<Path>>(dir: P, prefix: &str) -> Result<(LogFile, PathBuf)> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("failed to create log dir {}", dir.display()))?;
    let ts = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("{}_{}.log", prefix, ts));
    let file = File::create(&path).with_context(|| format!("failed to create log {}", path.display()))?;
    eprintln!("Log: {}", path.display());
    Ok((Arc::new(Mutex::new(BufWriter::new(file))), path))
}

#[macro_export]
macro_rules! log {
    ($logfile:expr, $($arg:tt)*) => {{
        use std::io::Write as _;
        let msg = format!($($arg)*);
        eprintln!("{}", msg);
        if let Ok(mut f) = $logfile.lock() {
            let _ = writeln!(f, "{}", msg);
            let _ = f.flush();
        }
    }};
}

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: JumpConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// 左右の足の高さを1つの値にまとめる方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FootCombine {
    /// 低い方の足（接地している足）を採用
    Min,
    /// 左右の平均
    Average,
}

impl Default for FootCombine {
    fn default() -> Self {
        Self::Min
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JumpConfig {
    /// サンプル処理の最小間隔（ミリ秒）
    #[serde(default = "default_min_sample_interval_ms")]
    pub min_sample_interval_ms: f64,
    /// 接地レベルからこの高さを超えたら空中判定（ピクセル）
    #[serde(default = "default_jump_threshold_px")]
    pub jump_threshold_px: f32,
    /// 1回の更新で接地レベルが下がってよい最大幅（ピクセル）
    #[serde(default = "default_ground_tolerance_band_px")]
    pub ground_tolerance_band_px: f32,
    /// これ以下の滞空時間はノイズとして捨てる（秒）
    #[serde(default = "default_min_flight_time_seconds")]
    pub min_flight_time_seconds: f64,
    /// スライディングバッファの容量
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
    /// 着地時にピークを探すサンプル数
    #[serde(default = "default_peak_lookback")]
    pub peak_lookback: usize,
    /// 左右の信頼度の合計がこれ未満なら高さを0にする
    #[serde(default = "default_low_confidence_sum_threshold")]
    pub low_confidence_sum_threshold: f32,
    /// ベスト記録をセッションをまたいで保持するか
    #[serde(default)]
    pub persist_best_stats_across_sessions: bool,
    #[serde(default)]
    pub foot_combine: FootCombine,
}

fn default_min_sample_interval_ms() -> f64 { 30.0 }
fn default_jump_threshold_px() -> f32 { 20.0 }
fn default_ground_tolerance_band_px() -> f32 { 100.0 }
fn default_min_flight_time_seconds() -> f64 { 0.1 }
fn default_buffer_capacity() -> usize { 30 }
fn default_peak_lookback() -> usize { 15 }
fn default_low_confidence_sum_threshold() -> f32 { 0.6 }

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            min_sample_interval_ms: default_min_sample_interval_ms(),
            jump_threshold_px: default_jump_threshold_px(),
            ground_tolerance_band_px: default_ground_tolerance_band_px(),
            min_flight_time_seconds: default_min_flight_time_seconds(),
            buffer_capacity: default_buffer_capacity(),
            peak_lookback: default_peak_lookback(),
            low_confidence_sum_threshold: default_low_confidence_sum_threshold(),
            persist_best_stats_across_sessions: false,
            foot_combine: FootCombine::default(),
        }
    }
}

impl JumpConfig {
    /// 設定値の整合性チェック
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.min_sample_interval_ms.is_finite() && self.min_sample_interval_ms >= 0.0,
            "min_sample_interval_ms must be a non-negative number (got {})",
            self.min_sample_interval_ms
        );
        ensure!(
            self.jump_threshold_px.is_finite() && self.jump_threshold_px >= 0.0,
            "jump_threshold_px must be a non-negative number (got {})",
            self.jump_threshold_px
        );
        ensure!(
            self.ground_tolerance_band_px.is_finite() && self.ground_tolerance_band_px >= 0.0,
            "ground_tolerance_band_px must be a non-negative number (got {})",
            self.ground_tolerance_band_px
        );
        ensure!(
            self.min_flight_time_seconds.is_finite() && self.min_flight_time_seconds >= 0.0,
            "min_flight_time_seconds must be a non-negative number (got {})",
            self.min_flight_time_seconds
        );
        ensure!(
            self.low_confidence_sum_threshold.is_finite(),
            "low_confidence_sum_threshold must be finite"
        );
        ensure!(self.buffer_capacity > 0, "buffer_capacity must be at least 1");
        ensure!(self.peak_lookback > 0, "peak_lookback must be at least 1");
        ensure!(
            self.peak_lookback <= self.buffer_capacity,
            "peak_lookback ({}) cannot exceed buffer_capacity ({})",
            self.peak_lookback,
            self.buffer_capacity
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 姿勢推定クライアントを待ち受けるアドレス
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default)]
    pub verbose: bool,
}

fn default_bind_addr() -> String { "127.0.0.1:39580".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// ログファイルの出力先ディレクトリ
    #[serde(default = "default_log_dir")]
    pub dir: String,
}

fn default_log_dir() -> String { "logs".to_string() }

impl Default for LogConfig {
    fn default() -> Self {
        Self { dir: default_log_dir() }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// 読み込みに失敗した場合はデフォルト設定を使う
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("[config] {e:#}, using defaults");
                Self::default()
            }
        }
    }
}

use crate::error::{GapError, Result};
use catalog_gap_common::gap::{MatchConfig, DEFAULT_RELEVANCE_THRESHOLD};
use catalog_gap_common::similarity::DEFAULT_SPEC_TOLERANCE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 市場スキャンを勧める類似スコアの上限
pub const DEFAULT_SCAN_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 市場スキャンAPIのベースURL
    pub scraper_url: String,
    pub timeout_seconds: u64,
    pub relevance_threshold: f64,
    pub spec_tolerance: f64,
    pub scan_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scraper_url: "http://127.0.0.1:8000".into(),
            timeout_seconds: 30,
            relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
            spec_tolerance: DEFAULT_SPEC_TOLERANCE,
            scan_threshold: DEFAULT_SCAN_THRESHOLD,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &std::path::Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &std::path::Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| GapError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("catalog-gap").join("config.json"))
    }

    /// 照合の調整値（引数で閾値を上書き可能）
    ///
    /// 閾値・許容誤差ともに 0.0〜1.0 の範囲外ならエラー。
    pub fn match_config(&self, threshold_override: Option<f64>) -> Result<MatchConfig> {
        let relevance_threshold = threshold_override.unwrap_or(self.relevance_threshold);
        validate_ratio("閾値", relevance_threshold)?;
        validate_ratio("許容誤差", self.spec_tolerance)?;
        Ok(MatchConfig {
            spec_tolerance: self.spec_tolerance,
            relevance_threshold,
        })
    }

    pub fn set_scraper_url(&mut self, url: String) -> Result<()> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(GapError::Config(format!("URLが不正です: {}", url)));
        }
        self.scraper_url = url.trim_end_matches('/').to_string();
        Ok(())
    }

    pub fn set_relevance_threshold(&mut self, value: f64) -> Result<()> {
        validate_ratio("閾値", value)?;
        self.relevance_threshold = value;
        Ok(())
    }

    pub fn set_spec_tolerance(&mut self, value: f64) -> Result<()> {
        validate_ratio("許容誤差", value)?;
        self.spec_tolerance = value;
        Ok(())
    }
}

fn validate_ratio(label: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GapError::Config(format!("{}は0.0〜1.0で指定してください: {}", label, value)))
    }
}

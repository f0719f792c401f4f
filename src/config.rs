//! 计时器配置：可选时长、动画与提示音，从 JSON 文件读取

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 配置文件名（放在应用配置目录下）
pub const CONFIG_FILENAME: &str = "config.json";

/// 应用配置目录
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("circular-timer")
}

pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILENAME)
}

/// 计时器配置（所有字段可省略）
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// 下拉框中的可选时长（分钟），保持给定顺序
    pub duration_choices_minutes: Vec<u32>,
    /// 未选择时的默认时长（分钟）
    pub default_duration_minutes: u32,
    /// 每秒之间是否平滑过渡
    pub smooth_animation: bool,
    /// 循环播放的滴答声文件
    pub tick_sound: PathBuf,
    /// 0.0..=1.0
    pub tick_volume: f32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            duration_choices_minutes: vec![1, 2, 5, 10, 15, 20, 30, 45, 60],
            default_duration_minutes: 1,
            smooth_animation: true,
            tick_sound: PathBuf::from("sound").join("tick_sound_small.wav"),
            tick_volume: 1.0,
        }
    }
}

impl TimerConfig {
    /// 解析 JSON 并整理：去掉 0 与重复的时长，音量夹到 0..=1
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(json)?;
        config.normalize();
        Ok(config)
    }

    /// 读取配置文件；文件不存在时返回默认配置
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("配置文件 {:?} 不存在，使用默认配置", path);
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// 读取默认位置的配置；出错时记录警告并回退到默认配置
    pub fn load_or_default() -> Self {
        let path = config_path();
        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("已加载配置 {:?}", path);
                config
            }
            Err(e) => {
                tracing::warn!("{}，使用默认配置", e);
                Self::default()
            }
        }
    }

    fn normalize(&mut self) {
        let mut seen = Vec::with_capacity(self.duration_choices_minutes.len());
        self.duration_choices_minutes.retain(|&m| {
            if m == 0 || seen.contains(&m) {
                false
            } else {
                seen.push(m);
                true
            }
        });
        self.tick_volume = self.tick_volume.clamp(0.0, 1.0);
    }

    /// 默认时长（秒）
    pub fn default_duration_secs(&self) -> i64 {
        i64::from(self.default_duration_minutes) * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        let config = TimerConfig::from_json("{}").unwrap();
        assert_eq!(config, TimerConfig::default());
        assert_eq!(config.default_duration_secs(), 60);
    }

    #[test]
    fn test_partial_config() {
        let config =
            TimerConfig::from_json(r#"{"duration_choices_minutes": [25, 5], "smooth_animation": false}"#)
                .unwrap();
        assert_eq!(config.duration_choices_minutes, vec![25, 5]);
        assert!(!config.smooth_animation);
        assert_eq!(config.default_duration_minutes, 1);
    }

    #[test]
    fn test_choices_drop_zero_and_duplicates() {
        let config =
            TimerConfig::from_json(r#"{"duration_choices_minutes": [5, 0, 1, 5, 2, 1], "tick_volume": 3.0}"#)
                .unwrap();
        assert_eq!(config.duration_choices_minutes, vec![5, 1, 2]);
        assert_eq!(config.tick_volume, 1.0);
    }

    #[test]
    fn test_invalid_json() {
        let err = TimerConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join("circular-timer-missing").join(CONFIG_FILENAME);
        assert_eq!(TimerConfig::load_from(&path).unwrap(), TimerConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("circular-timer-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILENAME);
        std::fs::write(&path, r#"{"default_duration_minutes": 10}"#).unwrap();
        let config = TimerConfig::load_from(&path).unwrap();
        assert_eq!(config.default_duration_secs(), 600);
        let _ = std::fs::remove_dir_all(&dir);
    }
}

//! 配置与提示音的错误类型

use std::path::PathBuf;

/// 读取配置文件失败
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("无法读取配置文件 {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("配置文件格式错误: {0}")]
    Json(#[from] serde_json::Error),
}

/// 提示音播放失败
#[derive(Debug, thiserror::Error)]
pub enum SoundError {
    #[error("无法打开音频文件 {path:?}: {source}")]
    File {
        path: PathBuf,
        source: std::io::Error,
    },
    #[cfg(feature = "sound")]
    #[error("音频输出设备不可用: {0}")]
    Stream(#[from] rodio::StreamError),
    #[cfg(feature = "sound")]
    #[error("无法创建播放队列: {0}")]
    Play(#[from] rodio::PlayError),
    #[cfg(feature = "sound")]
    #[error("无法解码音频: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
}

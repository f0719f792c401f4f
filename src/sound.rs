//! 计时期间循环播放的滴答声

use crate::config::TimerConfig;
use crate::error::SoundError;

/// 计时开始时循环播放，结束时停止
pub trait TickSound {
    fn play_looping(&mut self) -> Result<(), SoundError>;
    fn stop(&mut self);
}

/// 不发声（未启用 `sound` 特性或音频设备不可用时使用）
#[derive(Debug, Default)]
pub struct SilentTick {
    playing: bool,
}

impl SilentTick {
    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

impl TickSound for SilentTick {
    fn play_looping(&mut self) -> Result<(), SoundError> {
        self.playing = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.playing = false;
    }
}

#[cfg(feature = "sound")]
mod rodio_tick {
    use std::fs::File;
    use std::io::BufReader;
    use std::path::PathBuf;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

    use super::TickSound;
    use crate::error::SoundError;

    /// 用 rodio 循环播放音频文件
    pub struct RodioTick {
        _stream: OutputStream,
        stream_handle: OutputStreamHandle,
        sink: Option<Sink>,
        path: PathBuf,
        volume: f32,
    }

    impl RodioTick {
        pub fn new(path: PathBuf, volume: f32) -> Result<Self, SoundError> {
            let (stream, stream_handle) = OutputStream::try_default()?;
            Ok(Self {
                _stream: stream,
                stream_handle,
                sink: None,
                path,
                volume: volume.clamp(0.0, 1.0),
            })
        }
    }

    impl TickSound for RodioTick {
        fn play_looping(&mut self) -> Result<(), SoundError> {
            self.stop();
            let file = File::open(&self.path).map_err(|source| SoundError::File {
                path: self.path.clone(),
                source,
            })?;
            let source = Decoder::new(BufReader::new(file))?;
            let sink = Sink::try_new(&self.stream_handle)?;
            sink.set_volume(self.volume);
            sink.append(source.repeat_infinite());
            self.sink = Some(sink);
            tracing::debug!("开始循环播放 {:?}", self.path);
            Ok(())
        }

        fn stop(&mut self) {
            if let Some(sink) = self.sink.take() {
                sink.stop();
            }
        }
    }
}

#[cfg(feature = "sound")]
pub use rodio_tick::RodioTick;

/// 按配置创建提示音；音频不可用时退回静音
pub fn from_config(config: &TimerConfig) -> Box<dyn TickSound> {
    #[cfg(feature = "sound")]
    {
        match RodioTick::new(config.tick_sound.clone(), config.tick_volume) {
            Ok(tick) => return Box::new(tick),
            Err(e) => tracing::warn!("{}，滴答声已禁用", e),
        }
    }
    #[cfg(not(feature = "sound"))]
    tracing::debug!("未启用 sound 特性，忽略 {:?}", config.tick_sound);
    Box::new(SilentTick::default())
}

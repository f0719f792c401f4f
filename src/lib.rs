//! 圆形进度条倒计时：控件、计时状态机与 egui 界面

pub mod app;
pub mod config;
pub mod error;
pub mod gradient;
pub mod progress;
pub mod sound;
pub mod timer;

//! Circular Timer — 圆形进度条倒计时（Rust + egui）

use circular_timer::{app::TimerApp, config::TimerConfig};
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    // RUST_LOG 控制日志级别，例如 RUST_LOG=debug
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = TimerConfig::load_or_default();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([560.0, 560.0])
            .with_title("Circular Timer"),
        ..Default::default()
    };
    eframe::run_native(
        "Circular Timer",
        options,
        Box::new(|cc| Ok(Box::new(TimerApp::new(cc, config)))),
    )
}

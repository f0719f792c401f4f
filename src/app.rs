//! egui 主界面：时长选择、圆形进度条、开始按钮

use chrono::Utc;
use eframe::egui;

use crate::config::TimerConfig;
use crate::progress::{BarStyle, CircularProgress};
use crate::sound::{self, TickSound};
use crate::timer::{Countdown, TimerState};

/// 界面配色
mod theme {
    use eframe::egui::Color32;

    /// 深色背景
    pub const BG: Color32 = Color32::from_rgb(18, 18, 24);
    /// 顶部时长选择区
    pub const FRAME_TOP: Color32 = Color32::from_rgb(34, 44, 58);
    /// 进度渐变：浅红 → 红 → 暗红
    pub const GRADIENT: [(f32, Color32); 3] = [
        (0.0, Color32::from_rgb(255, 51, 51)),
        (0.5, Color32::from_rgb(204, 0, 0)),
        (1.0, Color32::from_rgb(92, 7, 7)),
    ];
}

/// 进度条边长（逻辑像素）
const PROGRESS_SIZE: f32 = 300.0;

/// 带文字居中显示的按钮，返回 Response（与 egui::Button 一致便于 .clicked()）
fn centered_button(ui: &mut egui::Ui, text: impl Into<egui::WidgetText>, size: egui::Vec2) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());
    let visuals = ui.style().interact(&response);
    ui.painter().rect_filled(rect.expand(visuals.expansion), visuals.corner_radius, visuals.bg_fill);
    let widget_text: egui::WidgetText = text.into();
    let galley = widget_text.into_galley(ui, None, rect.width() - 8.0, egui::TextStyle::Button);
    let text_color = if ui.is_enabled() {
        ui.visuals().text_color()
    } else {
        ui.visuals().gray_out(ui.visuals().text_color())
    };
    ui.painter().galley(rect.center() - galley.size() / 2.0, galley, text_color);
    response
}

pub struct TimerApp {
    pub timer: Countdown,
    pub progress: CircularProgress,
    sound: Box<dyn TickSound>,
    /// 下拉框可选时长（分钟）
    choices: Vec<u32>,
    /// 当前选中的下标；None 表示使用默认时长
    selected: Option<usize>,
}

impl TimerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: TimerConfig) -> Self {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = theme::BG;
        cc.egui_ctx.set_visuals(visuals);
        Self::with_sound(config.clone(), sound::from_config(&config))
    }

    fn with_sound(config: TimerConfig, sound: Box<dyn TickSound>) -> Self {
        let mut progress = CircularProgress::new();
        progress.set_size(PROGRESS_SIZE);
        progress.set_data_pen_width(3.0);
        progress.set_outline_pen_width(3.0);
        progress.set_donut_thickness_ratio(0.85);
        progress.set_decimals(1);
        progress.set_format("%p");
        progress.set_null_position(CircularProgress::POSITION_TOP);
        progress.set_bar_style(BarStyle::Pie);
        progress.set_data_colors(theme::GRADIENT.to_vec());
        progress.set_info_trail(" seconds");

        Self {
            timer: Countdown::new(config.default_duration_secs(), config.smooth_animation),
            progress,
            sound,
            choices: config.duration_choices_minutes,
            selected: None,
        }
    }

    fn start(&mut self) {
        if self.timer.start(Utc::now(), &mut self.progress) {
            if let Err(e) = self.sound.play_looping() {
                tracing::warn!("无法播放滴答声: {}", e);
            }
        }
    }

    fn select_duration(&mut self, index: usize) {
        if let Some(&minutes) = self.choices.get(index) {
            self.selected = Some(index);
            self.timer.set_duration_minutes(minutes);
            tracing::debug!("时长设为 {} 分钟", minutes);
        }
    }

    fn selected_label(&self) -> String {
        match self.selected.and_then(|i| self.choices.get(i)) {
            Some(m) => format!("{} minutes", m),
            None => format!("{} seconds", self.timer.max_duration_secs()),
        }
    }

    /// 推进计时与动画；结束时停止滴答声
    fn step(&mut self) {
        let now = Utc::now();
        self.timer.tick(now, &mut self.progress);
        self.timer.animate(now, &mut self.progress);
        if self.timer.take_finished() {
            self.sound.stop();
        }
    }
}

impl eframe::App for TimerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.step();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                let enabled = self.timer.controls_enabled();

                // 顶部：时长选择（计时中禁用）
                ui.add_enabled_ui(enabled, |ui| {
                    egui::Frame::NONE
                        .fill(theme::FRAME_TOP)
                        .corner_radius(15.0)
                        .inner_margin(egui::Margin::same(12))
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.label("Select Timer duration");
                                let mut picked = self.selected;
                                egui::ComboBox::from_id_salt("timer_duration")
                                    .selected_text(self.selected_label())
                                    .width(120.0)
                                    .show_ui(ui, |ui| {
                                        for (i, m) in self.choices.iter().enumerate() {
                                            ui.selectable_value(&mut picked, Some(i), format!("{} minutes", m));
                                        }
                                    });
                                if picked != self.selected {
                                    if let Some(i) = picked {
                                        self.select_duration(i);
                                    }
                                }
                            });
                        });
                });
                ui.add_space(16.0);

                ui.add(&mut self.progress);
                ui.add_space(8.0);

                ui.label(
                    egui::RichText::new(self.timer.remaining_display())
                        .size(18.0)
                        .monospace(),
                );
                ui.add_space(12.0);

                let clicked = ui
                    .add_enabled_ui(enabled, |ui| {
                        centered_button(ui, "start", egui::vec2(120.0, 36.0))
                    })
                    .inner
                    .on_hover_text("开始计时")
                    .clicked();
                if clicked {
                    self.start();
                }
            });
        });

        let repaint = self.progress.take_repaint_request();
        if self.timer.state() == TimerState::Running || repaint {
            ctx.request_repaint();
        }
    }
}

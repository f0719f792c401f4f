//! 圆形进度条控件：环形 / 饼形 / 线形三种样式，中心显示格式化数值，底部显示剩余时间

use egui::{Align2, Color32, FontFamily, FontId, Painter, Pos2, Rect, Shape, Stroke};

use crate::gradient::{ConicalBrush, GradientStop};

/// 完整一圈的分段数（弧线按比例取段）
const ARC_SEGMENTS: f32 = 128.0;
/// 剩余时间信息区高度
const INFO_RECT_HEIGHT: f32 = 50.0;
/// 剩余时间信息字号
const INFO_FONT_SIZE: f32 = 20.0;
/// 未开始时的占位文字
pub const NOT_STARTED_TEXT: &str = "--:--";
/// 计时结束文字
pub const TIMES_UP_TEXT: &str = "Time's up!";

/// 进度条样式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BarStyle {
    /// 圆环：扇形 + 中心挖空
    #[default]
    Donut,
    /// 实心扇形
    Pie,
    /// 仅描边的圆弧
    Line,
}

/// 格式串中出现的占位符
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct TokenFlags {
    value: bool,
    percent: bool,
    max: bool,
}

impl TokenFlags {
    fn scan(format: &str) -> Self {
        Self {
            value: format.contains("%v"),
            percent: format.contains("%p"),
            max: format.contains("%m"),
        }
    }
}

/// 剩余比例对应的提示色调
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemainingTone {
    /// 剩余 > 58%
    Warning,
    /// 剩余 > 40%
    Neutral,
    /// 其余
    Inverse,
}

impl RemainingTone {
    pub fn for_fraction(fraction: f64) -> Self {
        if fraction > 0.58 {
            Self::Warning
        } else if fraction > 0.40 {
            Self::Neutral
        } else {
            Self::Inverse
        }
    }
}

/// 剩余时间信息文字
#[derive(Clone, Debug, PartialEq)]
pub struct InfoText {
    pub text: String,
    pub tone: RemainingTone,
    pub bold: bool,
}

/// 绘制所需的环境色，取自当前 egui 主题
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub window: Color32,
    pub base: Color32,
    pub shadow: Color32,
    pub alternate_base: Color32,
    pub text: Color32,
    pub highlight: Color32,
    pub warning: Color32,
    pub neutral: Color32,
    pub inverse: Color32,
}

impl Palette {
    pub fn from_visuals(visuals: &egui::Visuals) -> Self {
        let window = visuals.panel_fill;
        Self {
            window,
            base: visuals.extreme_bg_color,
            shadow: visuals.widgets.noninteractive.bg_stroke.color,
            alternate_base: visuals.faint_bg_color,
            text: visuals.text_color(),
            highlight: visuals.selection.bg_fill,
            warning: visuals.error_fg_color,
            neutral: visuals.text_color(),
            inverse: Color32::from_rgb(255 - window.r(), 255 - window.g(), 255 - window.b()),
        }
    }

    pub fn tone(&self, tone: RemainingTone) -> Color32 {
        match tone {
            RemainingTone::Warning => self.warning,
            RemainingTone::Neutral => self.neutral,
            RemainingTone::Inverse => self.inverse,
        }
    }
}

/// 一帧的几何与文字，由 [`CircularProgress::layout`] 计算
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressFrame {
    /// 正方形绘制区域（边长 = 外径）
    pub rect: Rect,
    /// 向内缩 1 像素的外圆外接矩形（抗锯齿余量）
    pub base_rect: Rect,
    pub sweep_degrees: f32,
    /// value == min 时不画数据弧
    pub draw_value: bool,
    pub inner_rect: Rect,
    /// 内圆直径
    pub inner_radius: f32,
    /// 中心文字与字号；格式串为空时不画
    pub label: Option<(String, f32)>,
    pub info_rect: Rect,
    pub info: InfoText,
}

/// 圆形进度条
pub struct CircularProgress {
    min_value: f64,
    max_value: f64,
    value: f64,
    null_position: f32,
    style: BarStyle,
    outline_pen_width: f32,
    data_pen_width: f32,
    donut_thickness_ratio: f32,
    gradient_stops: Vec<GradientStop>,
    format: String,
    decimals: i32,
    tokens: TokenFlags,
    info_head: String,
    info_trail: String,
    font_family: FontFamily,
    size: f32,
    brush: ConicalBrush,
    brush_dirty: bool,
    repaint_requested: bool,
}

impl Default for CircularProgress {
    fn default() -> Self {
        let format = "%p%".to_owned();
        Self {
            min_value: 0.0,
            max_value: 100.0,
            value: 0.0,
            null_position: Self::POSITION_TOP,
            style: BarStyle::Donut,
            outline_pen_width: 1.0,
            data_pen_width: 1.0,
            donut_thickness_ratio: 0.75,
            gradient_stops: Vec::new(),
            tokens: TokenFlags::scan(&format),
            format,
            decimals: 1,
            info_head: "⏳ ".to_owned(),
            info_trail: " seconds".to_owned(),
            font_family: FontFamily::Proportional,
            size: 300.0,
            brush: ConicalBrush::build(&[], Self::POSITION_TOP),
            brush_dirty: false,
            repaint_requested: true,
        }
    }
}

impl CircularProgress {
    pub const POSITION_LEFT: f32 = 180.0;
    pub const POSITION_TOP: f32 = 90.0;
    pub const POSITION_RIGHT: f32 = 0.0;
    pub const POSITION_BOTTOM: f32 = -90.0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_value(&self) -> f64 {
        self.min_value
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn style(&self) -> BarStyle {
        self.style
    }

    pub fn null_position(&self) -> f32 {
        self.null_position
    }

    pub fn decimals(&self) -> i32 {
        self.decimals
    }

    pub fn donut_thickness_ratio(&self) -> f32 {
        self.donut_thickness_ratio
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// 设置范围；max < min 时交换，并把当前值夹回新范围。NaN 边界被忽略
    pub fn set_range(&mut self, min: f64, max: f64) {
        if min.is_nan() || max.is_nan() {
            return;
        }
        let (min, max) = if max < min { (max, min) } else { (min, max) };
        self.min_value = min;
        self.max_value = max;
        self.value = self.value.clamp(min, max);
        self.request_repaint();
    }

    pub fn set_min(&mut self, min: f64) {
        self.set_range(min, self.max_value);
    }

    pub fn set_max(&mut self, max: f64) {
        self.set_range(self.min_value, max);
    }

    /// 设置当前值（夹到范围内）；值不变或为 NaN 时不触发重绘
    pub fn set_value(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        let value = value.clamp(self.min_value, self.max_value);
        if value != self.value {
            self.value = value;
            self.request_repaint();
        }
    }

    /// 设置弧线起点角度（度），画刷需按新角度重建
    pub fn set_null_position(&mut self, degrees: f32) {
        if degrees != self.null_position {
            self.null_position = degrees;
            self.brush_dirty = true;
            self.request_repaint();
        }
    }

    pub fn set_bar_style(&mut self, style: BarStyle) {
        if style != self.style {
            self.style = style;
            self.request_repaint();
        }
    }

    pub fn set_outline_pen_width(&mut self, width: f32) {
        if width != self.outline_pen_width {
            self.outline_pen_width = width;
            self.request_repaint();
        }
    }

    pub fn set_data_pen_width(&mut self, width: f32) {
        if width != self.data_pen_width {
            self.data_pen_width = width;
            self.request_repaint();
        }
    }

    /// 设置渐变停靠点；为空时使用主题高亮色
    pub fn set_data_colors(&mut self, stops: Vec<GradientStop>) {
        if stops != self.gradient_stops {
            self.gradient_stops = stops;
            self.brush_dirty = true;
            self.request_repaint();
        }
    }

    pub fn set_format(&mut self, format: impl Into<String>) {
        let format = format.into();
        if format != self.format {
            self.format = format;
            self.value_format_changed();
        }
    }

    /// 清空格式串（不再绘制中心文字）
    pub fn reset_format(&mut self) {
        self.format.clear();
        self.value_format_changed();
    }

    /// 负数或与当前相同的值被忽略
    pub fn set_decimals(&mut self, count: i32) {
        if count >= 0 && count != self.decimals {
            self.decimals = count;
            self.value_format_changed();
        }
    }

    pub fn set_donut_thickness_ratio(&mut self, ratio: f32) {
        self.donut_thickness_ratio = ratio.clamp(0.0, 1.0);
        self.request_repaint();
    }

    /// 剩余时间后缀，如 " seconds"
    pub fn set_info_trail(&mut self, trail: impl Into<String>) {
        self.info_trail = trail.into();
        self.request_repaint();
    }

    /// 文字字体族（中心数值与剩余时间共用）
    pub fn set_font_family(&mut self, family: FontFamily) {
        if family != self.font_family {
            self.font_family = family;
            self.request_repaint();
        }
    }

    pub fn font_family(&self) -> &FontFamily {
        &self.font_family
    }

    /// 控件边长（逻辑像素）
    pub fn set_size(&mut self, size: f32) {
        self.size = size.max(1.0);
        self.request_repaint();
    }

    /// 取走重绘请求，取走后清空
    pub fn take_repaint_request(&mut self) -> bool {
        std::mem::take(&mut self.repaint_requested)
    }

    fn request_repaint(&mut self) {
        self.repaint_requested = true;
    }

    fn value_format_changed(&mut self) {
        self.tokens = TokenFlags::scan(&self.format);
        self.request_repaint();
    }

    /// 范围跨度；min == max 时按 1 处理，避免除零
    fn span(&self) -> f64 {
        let span = self.max_value - self.min_value;
        if span > 0.0 { span } else { 1.0 }
    }

    /// 当前值对应的扫过角度（度）
    pub fn sweep_degrees(&self) -> f32 {
        (360.0 / self.span() * (self.value - self.min_value)) as f32
    }

    /// 按格式串替换 %v / %p / %m，未出现的占位符不处理
    pub fn value_to_text(&self, value: f64) -> String {
        let mut text = self.format.clone();
        if self.tokens.value {
            text = text.replace("%v", &format!("{:02}", value as i64));
        }
        if self.tokens.percent {
            let percent = ((value - self.min_value) / self.span() * 100.0 - 1e-9).ceil();
            text = text.replace("%p", &format!("{:02}", percent as i64));
        }
        if self.tokens.max {
            // 先在浮点上加一，超大范围时转换饱和而不溢出
            let range = (self.max_value - self.min_value + 1.0) as i64;
            text = text.replace("%m", &format!("{:02}", range));
        }
        text
    }

    /// 剩余量（max - value）
    pub fn remaining(&self) -> f64 {
        self.max_value - self.value
    }

    /// 底部剩余时间文字与色调
    pub fn info_text(&self) -> InfoText {
        let remaining = self.remaining();
        let max = if self.max_value != 0.0 { self.max_value } else { 1.0 };
        let tone = RemainingTone::for_fraction(remaining / max);
        if remaining <= 0.0 {
            InfoText {
                text: TIMES_UP_TEXT.to_owned(),
                tone,
                bold: true,
            }
        } else if remaining == self.max_value {
            InfoText {
                text: NOT_STARTED_TEXT.to_owned(),
                tone,
                bold: false,
            }
        } else {
            InfoText {
                text: format!("{}{:.2}{}", self.info_head, remaining, self.info_trail),
                tone,
                bold: false,
            }
        }
    }

    fn rebuild_brush_if_needed(&mut self) {
        if self.brush_dirty {
            self.brush_dirty = false;
            self.brush = ConicalBrush::build(&self.gradient_stops, self.null_position);
        }
    }

    /// 计算一帧的几何与文字；除按需重建渐变画刷外无副作用
    pub fn layout(&mut self, area: Rect) -> ProgressFrame {
        self.rebuild_brush_if_needed();

        let outer = area.width().min(area.height());
        let rect = Rect::from_min_size(area.min, egui::vec2(outer, outer));
        let base_rect = rect.shrink(1.0);

        let inner_radius = match self.style {
            BarStyle::Line => outer - self.outline_pen_width,
            BarStyle::Donut | BarStyle::Pie => outer * self.donut_thickness_ratio,
        };
        let delta = (outer - inner_radius) / 2.0;
        let inner_rect = Rect::from_min_size(
            rect.min + egui::vec2(delta, delta),
            egui::vec2(inner_radius, inner_radius),
        );

        let label = if self.format.is_empty() {
            None
        } else {
            let text = self.value_to_text(self.value);
            let size = inner_radius / text.chars().count().max(1) as f32;
            Some((text, size))
        };

        let info_rect = Rect::from_min_max(
            egui::pos2(inner_rect.left(), inner_rect.bottom() - INFO_RECT_HEIGHT),
            inner_rect.right_bottom(),
        );

        ProgressFrame {
            rect,
            base_rect,
            sweep_degrees: self.sweep_degrees(),
            draw_value: self.value != self.min_value,
            inner_rect,
            inner_radius,
            label,
            info_rect,
            info: self.info_text(),
        }
    }

    /// 按帧数据绘制
    pub fn paint(&self, frame: &ProgressFrame, painter: &Painter, palette: &Palette) {
        painter.rect_filled(frame.rect, 0.0, palette.window);
        self.paint_base(frame.base_rect, painter, palette);
        if frame.draw_value {
            self.paint_value(frame.base_rect, frame.sweep_degrees, painter, palette);
        }
        if self.style == BarStyle::Donut {
            painter.circle_filled(
                frame.inner_rect.center(),
                frame.inner_radius / 2.0,
                palette.alternate_base,
            );
        }
        self.paint_text(frame, painter, palette);
    }

    fn paint_base(&self, base_rect: Rect, painter: &Painter, palette: &Palette) {
        let center = base_rect.center();
        let radius = base_rect.width() / 2.0;
        match self.style {
            BarStyle::Donut => {
                painter.circle(
                    center,
                    radius,
                    palette.base,
                    Stroke::new(self.outline_pen_width, palette.shadow),
                );
            }
            BarStyle::Pie => {
                painter.circle(
                    center,
                    radius,
                    palette.base,
                    Stroke::new(self.outline_pen_width, palette.base),
                );
            }
            BarStyle::Line => {
                painter.circle_stroke(
                    center,
                    radius - self.outline_pen_width / 2.0,
                    Stroke::new(self.outline_pen_width, palette.base),
                );
            }
        }
    }

    fn paint_value(&self, base_rect: Rect, sweep: f32, painter: &Painter, palette: &Palette) {
        let center = base_rect.center();
        let radius = base_rect.width() / 2.0;

        if self.style == BarStyle::Line {
            let arc = arc_points(
                center,
                radius - self.outline_pen_width / 2.0,
                self.null_position,
                sweep,
            );
            for (a, b) in arc.iter().zip(arc.iter().skip(1)) {
                let color = self.highlight_at(a.1, palette);
                painter.line_segment([a.0, b.0], Stroke::new(self.data_pen_width, color));
            }
            return;
        }

        let arc = arc_points(center, radius, self.null_position, sweep);
        let mut mesh = egui::Mesh::default();
        for (a, b) in arc.iter().zip(arc.iter().skip(1)) {
            let ca = self.highlight_at(a.1, palette);
            let cb = self.highlight_at(b.1, palette);
            let idx = mesh.vertices.len() as u32;
            mesh.colored_vertex(center, ca);
            mesh.colored_vertex(a.0, ca);
            mesh.colored_vertex(b.0, cb);
            mesh.add_triangle(idx, idx + 1, idx + 2);
        }
        painter.add(Shape::mesh(mesh));

        let mut outline = Vec::with_capacity(arc.len() + 1);
        outline.push(center);
        outline.extend(arc.iter().map(|p| p.0));
        painter.add(Shape::closed_line(
            outline,
            Stroke::new(self.data_pen_width, palette.shadow),
        ));
    }

    fn highlight_at(&self, degrees: f32, palette: &Palette) -> Color32 {
        self.brush
            .color_along_arc(degrees)
            .unwrap_or(palette.highlight)
    }

    fn paint_text(&self, frame: &ProgressFrame, painter: &Painter, palette: &Palette) {
        let Some((text, size)) = &frame.label else { return };
        painter.text(
            frame.inner_rect.center(),
            Align2::CENTER_CENTER,
            text,
            FontId::new(*size, self.font_family.clone()),
            palette.text,
        );

        let color = palette.tone(frame.info.tone);
        let font = FontId::new(INFO_FONT_SIZE, self.font_family.clone());
        let pos = frame.info_rect.center();
        painter.text(pos, Align2::CENTER_CENTER, &frame.info.text, font.clone(), color);
        if frame.info.bold {
            // 默认字体没有粗体，偏移半像素重绘加粗
            painter.text(
                pos + egui::vec2(0.6, 0.0),
                Align2::CENTER_CENTER,
                &frame.info.text,
                font,
                color,
            );
        }
    }
}

/// 从 start 起顺时针扫过 sweep 度的弧线点（屏幕坐标 y 向下），附带各点角度
fn arc_points(center: Pos2, radius: f32, start: f32, sweep: f32) -> Vec<(Pos2, f32)> {
    let steps = ((sweep.abs() / 360.0 * ARC_SEGMENTS).ceil() as usize).max(1);
    (0..=steps)
        .map(|i| {
            let degrees = start - sweep * i as f32 / steps as f32;
            let rad = degrees.to_radians();
            let pos = center + egui::vec2(radius * rad.cos(), -radius * rad.sin());
            (pos, degrees)
        })
        .collect()
}

impl egui::Widget for &mut CircularProgress {
    fn ui(self, ui: &mut egui::Ui) -> egui::Response {
        let (rect, response) =
            ui.allocate_exact_size(egui::vec2(self.size, self.size), egui::Sense::hover());
        if ui.is_rect_visible(rect) {
            let frame = self.layout(rect);
            let palette = Palette::from_visuals(ui.visuals());
            self.paint(&frame, ui.painter(), &palette);
        }
        response
    }
}

//! 圆锥渐变：按角度取色，用于进度扇形/弧线的填充

use egui::Color32;

/// 渐变停靠点：位置（0.0..=1.0）与颜色
pub type GradientStop = (f32, Color32);

/// 圆锥渐变画刷
///
/// 角度约定与进度条一致：0° 在右侧（3 点钟），逆时针为正。
/// 停靠点以 `1 - position` 存入，再整体旋转 `angle`，
/// 因此 position 0 落在起始角，沿顺时针方向（进度方向）递增。
#[derive(Clone, Debug, PartialEq)]
pub struct ConicalBrush {
    /// (offset, color)，按 offset 升序
    stops: Vec<GradientStop>,
    angle: f32,
}

impl ConicalBrush {
    /// 由进度条的渐变数据与零点角度构建画刷
    pub fn build(stops: &[GradientStop], angle: f32) -> Self {
        let mut mapped: Vec<GradientStop> = stops
            .iter()
            .map(|&(pos, color)| (1.0 - pos.clamp(0.0, 1.0), color))
            .collect();
        mapped.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self {
            stops: mapped,
            angle,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// 取弧线上绝对角度（度）处的颜色
    ///
    /// 按从起始角顺时针扫过的比例取色：起点本身是 position 0，
    /// 扫满一圈是 position 1，接缝不会混入终点色。
    pub fn color_along_arc(&self, degrees: f32) -> Option<Color32> {
        let position = ((self.angle - degrees) / 360.0).clamp(0.0, 1.0);
        self.color_at_offset(1.0 - position)
    }

    /// 取渐变参数 offset（0.0..=1.0）处的颜色，两端之外取端点色
    pub fn color_at_offset(&self, offset: f32) -> Option<Color32> {
        let first = self.stops.first()?;
        let last = self.stops.last()?;
        if offset <= first.0 {
            return Some(first.1);
        }
        if offset >= last.0 {
            return Some(last.1);
        }
        let upper = self.stops.iter().position(|s| s.0 >= offset)?;
        let (a_off, a) = self.stops[upper - 1];
        let (b_off, b) = self.stops[upper];
        let span = b_off - a_off;
        if span <= f32::EPSILON {
            return Some(b);
        }
        Some(a.lerp_to_gamma(b, (offset - a_off) / span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color32 = Color32::from_rgb(255, 0, 0);
    const BLUE: Color32 = Color32::from_rgb(0, 0, 255);

    #[test]
    fn test_empty_brush_has_no_color() {
        let brush = ConicalBrush::build(&[], 90.0);
        assert!(brush.is_empty());
        assert_eq!(brush.color_along_arc(0.0), None);
    }

    #[test]
    fn test_arc_start_uses_first_stop() {
        let brush = ConicalBrush::build(&[(0.0, RED), (1.0, BLUE)], 90.0);
        assert_eq!(brush.color_along_arc(90.0), Some(RED));
        let just_after_start = brush.color_along_arc(89.0).unwrap();
        assert!(just_after_start.r() > 250);
        assert!(just_after_start.b() < 5);
    }

    #[test]
    fn test_full_turn_ends_on_last_stop() {
        let brush = ConicalBrush::build(&[(0.0, RED), (1.0, BLUE)], 90.0);
        assert_eq!(brush.color_along_arc(90.0 - 360.0), Some(BLUE));
    }

    #[test]
    fn test_quarter_sweep_is_quarter_blend() {
        let brush = ConicalBrush::build(&[(0.0, RED), (1.0, BLUE)], 90.0);
        // 从顶部顺时针 90° 到右侧（0°）
        let c = brush.color_along_arc(0.0).unwrap();
        assert_eq!(c.r(), 191);
        assert_eq!(c.b(), 64);
    }

    #[test]
    fn test_middle_stop_reached_at_half_turn() {
        let green = Color32::from_rgb(0, 255, 0);
        let brush = ConicalBrush::build(&[(0.0, RED), (0.5, green), (1.0, BLUE)], 0.0);
        assert_eq!(brush.color_along_arc(-180.0), Some(green));
    }

    #[test]
    fn test_single_stop_is_solid() {
        let brush = ConicalBrush::build(&[(0.5, RED)], 0.0);
        for deg in [0.0, -45.0, -180.0, -359.0] {
            assert_eq!(brush.color_along_arc(deg), Some(RED));
        }
    }
}

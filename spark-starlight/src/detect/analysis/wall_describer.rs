use crate::detect::analysis::Describer;
use crate::detect::property::direction::DirectionCategory;
use crate::pipeline::FrameResult;

/// Mentions where the largest wall is, e.g. `wall on the right`.
#[derive(Debug, Clone, Default)]
pub struct WallDescriber;

impl Describer for WallDescriber {
    fn describe(&self, result: &FrameResult) -> Option<String> {
        let largest = result
            .walls
            .iter()
            .max_by(|a, b| a.area.total_cmp(&b.area))?;
        let center_x = (largest.bbox.x1 + largest.bbox.x2) as f32 / 2.0;

        let direction = DirectionCategory::get_direction(center_x, result.overlay.get_width());
        Some(match direction {
            DirectionCategory::Center => "wall ahead".to_string(),
            side => format!("wall on the {}", side),
        })
    }
}

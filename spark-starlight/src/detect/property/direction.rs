use crate::detect::{DIRECTION_LEFT_BOUNDARY, DIRECTION_RIGHT_BOUNDARY};
use log::error;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Coarse horizontal position of an object in the frame.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionCategory {
    Left,
    Center,
    Right,
}

impl Display for DirectionCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectionCategory::Left => write!(f, "left"),
            DirectionCategory::Center => write!(f, "center"),
            DirectionCategory::Right => write!(f, "right"),
        }
    }
}

impl DirectionCategory {
    /// Classifies a horizontal position by thirds of the frame.
    ///
    /// Args:
    ///     center_x (f32): X of the object's center, in pixels.
    ///     image_width (u32): Frame width in pixels.
    ///
    /// Returns:
    ///     DirectionCategory: `Left` below 0.33 of the width, `Right` above 0.66,
    ///     `Center` otherwise (both boundaries included).
    pub fn get_direction(center_x: f32, image_width: u32) -> DirectionCategory {
        if image_width == 0 {
            error!("Image width cannot be zero for direction calculation.");
            return DirectionCategory::Center;
        }

        let center_x = center_x as f64;
        let width = image_width as f64;
        if center_x < width * DIRECTION_LEFT_BOUNDARY {
            DirectionCategory::Left
        } else if center_x > width * DIRECTION_RIGHT_BOUNDARY {
            DirectionCategory::Right
        } else {
            DirectionCategory::Center
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirds_of_the_frame() {
        assert_eq!(DirectionCategory::get_direction(10.0, 640), DirectionCategory::Left);
        assert_eq!(DirectionCategory::get_direction(320.0, 640), DirectionCategory::Center);
        assert_eq!(DirectionCategory::get_direction(600.0, 640), DirectionCategory::Right);
    }

    #[test]
    fn boundaries_belong_to_the_center() {
        // 33 / 100 and 66 / 100 land exactly on the boundaries.
        assert_eq!(DirectionCategory::get_direction(33.0, 100), DirectionCategory::Center);
        assert_eq!(DirectionCategory::get_direction(66.0, 100), DirectionCategory::Center);
        assert_eq!(DirectionCategory::get_direction(32.9, 100), DirectionCategory::Left);
        assert_eq!(DirectionCategory::get_direction(66.1, 100), DirectionCategory::Right);
    }

    #[test]
    fn boundaries_scale_with_the_width() {
        // 300 * 0.33 lands just above 99.
        assert_eq!(DirectionCategory::get_direction(99.0, 300), DirectionCategory::Left);
        assert_eq!(DirectionCategory::get_direction(99.5, 300), DirectionCategory::Center);
        assert_eq!(DirectionCategory::get_direction(198.5, 300), DirectionCategory::Right);
    }
}

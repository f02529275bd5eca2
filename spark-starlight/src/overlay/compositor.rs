use crate::config::{LayerOrder, OverlayConfig};
use crate::detect::fusion::DetectionBox;
use crate::detect::wall::WallRegion;
use crate::detect::WALL_LABEL;
use crate::overlay::palette::{ClassColorTable, ClassKey};
use log::warn;
use spark_media::image::util::draw::{text_size, DrawOverlay};
use spark_media::image::util::mask::{rasterize_polygon, ApplyMask};
use spark_media::{Image, RGB};

const BANNER_ORIGIN: (i32, i32) = (10, 10);
const BANNER_COLOR: RGB = RGB(255, 0, 0);
/// Gap between a label and the top edge of its box.
const LABEL_MARGIN: i32 = 4;

/// Text drawn next to a detection box, e.g. `person left 2.35m`.
pub fn label_text(detection: &DetectionBox) -> String {
    format!(
        "{} {} {}m",
        detection.label, detection.direction, detection.distance_m
    )
}

/// Top-left corner of a label placed above its box and kept inside the frame.
pub fn label_origin(
    box_top_left: (i32, i32),
    label_size: (u32, u32),
    frame_size: (u32, u32),
) -> (i32, i32) {
    let (label_width, label_height) = (label_size.0 as i32, label_size.1 as i32);
    let (frame_width, frame_height) = (frame_size.0 as i32, frame_size.1 as i32);

    let x = box_top_left.0.min(frame_width - label_width).max(0);
    let y = (box_top_left.1 - LABEL_MARGIN - label_height)
        .min(frame_height - label_height)
        .max(0);
    (x, y)
}

/// Paints walls, detections and the alert banner onto a frame.
pub struct OverlayCompositor<'a> {
    config: &'a OverlayConfig,
    palette: &'a ClassColorTable,
}

impl<'a> OverlayCompositor<'a> {
    pub fn new(config: &'a OverlayConfig, palette: &'a ClassColorTable) -> Self {
        OverlayCompositor { config, palette }
    }

    /// Renders onto a working copy, `frame` itself is left untouched.
    pub fn compose(
        &self,
        frame: &Image,
        detections: &[DetectionBox],
        walls: &[WallRegion],
        alert: bool,
    ) -> Image {
        let mut canvas = frame.working_copy();
        self.compose_into(&mut canvas, detections, walls, alert);
        canvas
    }

    pub fn compose_into(
        &self,
        canvas: &mut Image,
        detections: &[DetectionBox],
        walls: &[WallRegion],
        alert: bool,
    ) {
        match self.config.order {
            LayerOrder::WallsFirst => {
                self.tint_walls(canvas, walls);
                self.draw_detections(canvas, detections);
            }
            LayerOrder::DetectionsFirst => {
                self.draw_detections(canvas, detections);
                self.tint_walls(canvas, walls);
            }
        }

        if alert {
            canvas.draw_text(
                BANNER_ORIGIN,
                &self.config.banner_text,
                BANNER_COLOR,
                self.config.banner_scale,
            );
        }
    }

    fn tint_walls(&self, canvas: &mut Image, walls: &[WallRegion]) {
        let (width, height) = canvas.get_size();
        let color = self.palette.color_for(&ClassKey::name(WALL_LABEL));

        for wall in walls {
            let mask = rasterize_polygon(&wall.contour, width, height);
            if let Err(err) = canvas.layering_mask(&mask, color, self.config.alpha) {
                warn!("Failed to tint wall region: {}", err);
            }
        }
    }

    fn draw_detections(&self, canvas: &mut Image, detections: &[DetectionBox]) {
        let frame_size = canvas.get_size();

        for detection in detections {
            let color = self.palette.color_for(&ClassKey::Id(detection.class_id));

            if let Some(mask) = &detection.mask {
                if let Err(err) = canvas.layering_mask(mask, color, self.config.alpha) {
                    warn!("Failed to tint mask of {}: {}", detection.label, err);
                }
            }

            let bbox = &detection.bbox;
            let top_left = (bbox.x1.round() as i32, bbox.y1.round() as i32);
            let bottom_right = (bbox.x2.round() as i32, bbox.y2.round() as i32);
            canvas.draw_box(top_left, bottom_right, color, self.config.box_thickness);

            let text = label_text(detection);
            let origin = label_origin(
                top_left,
                text_size(&text, self.config.label_scale),
                frame_size,
            );
            canvas.draw_text(origin, &text, color, self.config.label_scale);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::property::direction::DirectionCategory;
    use spark_inference::BoundingBox;

    fn detection(bbox: BoundingBox<f32>) -> DetectionBox {
        DetectionBox {
            class_id: 3,
            label: "chair".to_string(),
            confidence: 0.8,
            bbox,
            direction: DirectionCategory::Center,
            distance_m: 2.35,
            alert: false,
            mask: None,
        }
    }

    fn square_wall(x1: i32, y1: i32, x2: i32, y2: i32) -> WallRegion {
        WallRegion {
            label: WALL_LABEL,
            contour: vec![(x1, y1), (x2, y1), (x2, y2), (x1, y2)],
            bbox: BoundingBox::new(x1 as u32, y1 as u32, x2 as u32 + 1, y2 as u32 + 1),
            area: ((x2 - x1) * (y2 - y1)) as f32,
        }
    }

    #[test]
    fn label_reads_class_direction_and_distance() {
        let text = label_text(&detection(BoundingBox::new(0.0, 0.0, 1.0, 1.0)));
        assert_eq!(text, "chair center 2.35m");
    }

    #[test]
    fn labels_stay_inside_the_frame() {
        assert_eq!(label_origin((100, 50), (60, 7), (640, 480)), (100, 39));
        assert_eq!(label_origin((620, 0), (60, 7), (640, 480)), (580, 0));
        assert_eq!(label_origin((-5, 3), (60, 7), (640, 480)), (0, 0));
    }

    #[test]
    fn source_frame_is_not_modified() {
        let frame = Image::filled(64, 48, RGB(10, 10, 10));
        let config = OverlayConfig::default();
        let palette = ClassColorTable::new();

        let overlay = OverlayCompositor::new(&config, &palette).compose(
            &frame,
            &[detection(BoundingBox::new(10.0, 34.0, 30.0, 46.0))],
            &[square_wall(40, 5, 60, 40)],
            true,
        );

        assert_eq!(frame, Image::filled(64, 48, RGB(10, 10, 10)));
        assert_ne!(overlay, frame);
        // Box outline in the class color.
        let color = palette.color_for(&ClassKey::Id(3));
        assert_eq!(overlay.pixel(10, 40), Some(color));
        assert_eq!(overlay.pixel(11, 40), Some(color));
        assert_eq!(overlay.pixel(20, 40), Some(RGB(10, 10, 10)));
    }

    #[test]
    fn walls_are_tinted_at_the_configured_alpha() {
        let frame = Image::filled(64, 48, RGB(0, 0, 0));
        let config = OverlayConfig::default();
        let palette = ClassColorTable::new();
        let wall = palette.color_for(&ClassKey::name(WALL_LABEL));

        let overlay = OverlayCompositor::new(&config, &palette).compose(
            &frame,
            &[],
            &[square_wall(20, 20, 50, 40)],
            false,
        );

        let expected = |channel: u8| (channel as f32 * 0.4).round() as u8;
        assert_eq!(
            overlay.pixel(30, 30),
            Some(RGB(expected(wall.0), expected(wall.1), expected(wall.2)))
        );
        assert_eq!(overlay.pixel(5, 30), Some(RGB(0, 0, 0)));
    }

    #[test]
    fn layer_order_decides_what_ends_on_top() {
        let frame = Image::filled(64, 48, RGB(0, 0, 0));
        let palette = ClassColorTable::new();
        let boxes = [detection(BoundingBox::new(20.0, 20.0, 40.0, 40.0))];
        let walls = [square_wall(10, 10, 50, 45)];
        let box_color = palette.color_for(&ClassKey::Id(3));

        let walls_first = OverlayConfig::default();
        let overlay = OverlayCompositor::new(&walls_first, &palette).compose(&frame, &boxes, &walls, false);
        assert_eq!(overlay.pixel(20, 30), Some(box_color));

        let detections_first = OverlayConfig {
            order: LayerOrder::DetectionsFirst,
            ..OverlayConfig::default()
        };
        let overlay =
            OverlayCompositor::new(&detections_first, &palette).compose(&frame, &boxes, &walls, false);
        assert_ne!(overlay.pixel(20, 30), Some(box_color));
    }

    #[test]
    fn alert_banner_is_red() {
        let frame = Image::filled(200, 60, RGB(0, 0, 0));
        let config = OverlayConfig::default();
        let palette = ClassColorTable::new();

        let overlay = OverlayCompositor::new(&config, &palette).compose(&frame, &[], &[], true);
        let red = (0..60)
            .flat_map(|y| (0..200).map(move |x| (x, y)))
            .filter(|(x, y)| overlay.pixel(*x, *y) == Some(BANNER_COLOR))
            .count();
        assert!(red > 0);

        let quiet = OverlayCompositor::new(&config, &palette).compose(&frame, &[], &[], false);
        assert_eq!(quiet, frame);
    }
}

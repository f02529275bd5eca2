use crate::config::SegmentationConfig;
use crate::detect::contour::{polygon_area, ComponentLabels, ExteriorBackground};
use crate::detect::diagnostics::{Diagnostic, ItemSource};
use crate::detect::morphology::{BinaryMask, StructuringElement};
use crate::detect::normal::NormalField;
use crate::detect::stats::summed_local_variance;
use crate::detect::WALL_LABEL;
use log::debug;
use spark_inference::BoundingBox;
use spark_media::DepthMap;

/// A planar, roughly vertical surface found in the depth map.
#[derive(Debug, Clone, PartialEq)]
pub struct WallRegion {
    pub label: &'static str,
    /// Outer boundary in frame pixels, clockwise, not closed.
    pub contour: Vec<(i32, i32)>,
    /// Pixel extent of the component, `x2`/`y2` exclusive.
    pub bbox: BoundingBox<u32>,
    /// Area enclosed by the contour polygon.
    pub area: f32,
}

#[derive(Debug, Default)]
pub struct SegmentationOutcome {
    pub regions: Vec<WallRegion>,
    pub skipped: Vec<Diagnostic>,
}

/// Finds wall-like regions from depth-derived surface normals.
pub struct PlanarRegionSegmenter<'a> {
    config: &'a SegmentationConfig,
    element: StructuringElement,
}

impl<'a> PlanarRegionSegmenter<'a> {
    pub fn new(config: &'a SegmentationConfig) -> Self {
        PlanarRegionSegmenter {
            config,
            element: StructuringElement::ellipse(config.kernel_size),
        }
    }

    /// Normalized depth in, wall regions out.
    pub fn segment_depth(&self, depth: &DepthMap) -> SegmentationOutcome {
        let normals = NormalField::estimate(depth, self.config.depth_gain);
        self.segment(&normals)
    }

    pub fn segment(&self, normals: &NormalField) -> SegmentationOutcome {
        let candidates = self.candidate_mask(normals);
        let cleaned = self.clean(&candidates);
        let outcome = self.extract_regions(&cleaned);

        debug!(
            "Wall mask: {} candidate px, {} after cleanup, {} regions kept, {} skipped",
            candidates.count_ones(),
            cleaned.count_ones(),
            outcome.regions.len(),
            outcome.skipped.len()
        );
        outcome
    }

    /// Pixels that face sideways and sit in a locally flat neighbourhood.
    pub fn candidate_mask(&self, normals: &NormalField) -> BinaryMask {
        let variance = summed_local_variance(&normals.components(), self.config.planarity_window);
        let horizontal = normals.horizontal();

        BinaryMask::from_fn(normals.width(), normals.height(), |x, y| {
            let index = [y as usize, x as usize];
            horizontal[index].abs() > self.config.horizontal_normal_threshold
                && variance[index] < self.config.planarity_threshold
        })
    }

    /// Closing fills gaps inside a surface, opening then drops speckle.
    pub fn clean(&self, mask: &BinaryMask) -> BinaryMask {
        mask.close(&self.element, self.config.closing_iterations)
            .open(&self.element, self.config.opening_iterations)
    }

    /// External regions only: components lying inside another one's hole are dropped.
    pub fn extract_regions(&self, mask: &BinaryMask) -> SegmentationOutcome {
        let (labels, components) = ComponentLabels::label(mask);
        let exterior = ExteriorBackground::of(mask);
        let mut outcome = SegmentationOutcome::default();

        for (index, component) in components.iter().enumerate() {
            if !exterior.surrounds(component) {
                continue;
            }
            let contour = match labels.trace_outer(component) {
                Ok(contour) => contour,
                Err(reason) => {
                    outcome
                        .skipped
                        .push(Diagnostic::new(ItemSource::Region { index }, reason));
                    continue;
                }
            };

            let area = polygon_area(&contour);
            if area < self.config.min_region_area {
                continue;
            }

            outcome.regions.push(WallRegion {
                label: WALL_LABEL,
                contour,
                bbox: component.bbox,
                area,
            });
        }

        outcome
    }
}

use crate::detect::diagnostics::SkipReason;
use crate::detect::morphology::BinaryMask;
use bitvec::prelude::*;
use spark_inference::BoundingBox;

/// Clockwise ring around a pixel, starting west.
const NEIGHBOURS: [(i32, i32); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

/// An 8-connected set of on pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Label in the [`ComponentLabels`] grid, starting at 1.
    pub label: u32,
    /// First pixel in raster order, always on the outer boundary.
    pub seed: (u32, u32),
    pub pixel_count: usize,
    /// Pixel extent, `x2`/`y2` exclusive.
    pub bbox: BoundingBox<u32>,
}

/// Component label of every pixel, 0 for background.
#[derive(Debug, Clone)]
pub struct ComponentLabels {
    width: u32,
    height: u32,
    labels: Vec<u32>,
}

impl ComponentLabels {
    /// Labels the 8-connected components of `mask` in raster order of their seed.
    pub fn label(mask: &BinaryMask) -> (ComponentLabels, Vec<Component>) {
        let (width, height) = (mask.width, mask.height);
        let mut labels = vec![0u32; mask.bits.len()];
        let mut components = Vec::new();
        let mut stack = Vec::new();

        for start in mask.bits.iter_ones() {
            if labels[start] != 0 {
                continue;
            }

            let label = components.len() as u32 + 1;
            let seed = ((start % width as usize) as u32, (start / width as usize) as u32);
            let mut bbox = BoundingBox::new(seed.0, seed.1, seed.0 + 1, seed.1 + 1);
            let mut pixel_count = 0;

            labels[start] = label;
            stack.push(seed);
            while let Some((x, y)) = stack.pop() {
                pixel_count += 1;
                bbox.x1 = bbox.x1.min(x);
                bbox.y1 = bbox.y1.min(y);
                bbox.x2 = bbox.x2.max(x + 1);
                bbox.y2 = bbox.y2.max(y + 1);

                for (dx, dy) in NEIGHBOURS {
                    let (nx, ny) = (x as i32 + dx, y as i32 + dy);
                    if mask.get(nx, ny) != Some(true) {
                        continue;
                    }
                    let index = ny as usize * width as usize + nx as usize;
                    if labels[index] == 0 {
                        labels[index] = label;
                        stack.push((nx as u32, ny as u32));
                    }
                }
            }

            components.push(Component {
                label,
                seed,
                pixel_count,
                bbox,
            });
        }

        (
            ComponentLabels {
                width,
                height,
                labels,
            },
            components,
        )
    }

    pub fn get(&self, x: i32, y: i32) -> u32 {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return 0;
        }
        self.labels[y as usize * self.width as usize + x as usize]
    }

    /// Outer boundary of `component` by Moore-neighbour tracing, clockwise.
    ///
    /// Returns the boundary pixels without repeating the first one. Holes
    /// inside the component are not traced.
    pub fn trace_outer(&self, component: &Component) -> Result<Vec<(i32, i32)>, SkipReason> {
        let start = (component.seed.0 as i32, component.seed.1 as i32);
        let inside = |(x, y): (i32, i32)| self.get(x, y) == component.label;

        let mut contour = vec![start];
        let mut current = start;
        // The pixel west of a raster-first seed is always background.
        let mut backtrack = 0usize;
        let mut second = None;
        let limit = 4 * component.pixel_count + 8;

        for _ in 0..limit {
            let Some((next, entered_from)) = (1..=8).find_map(|step| {
                let direction = (backtrack + step) % 8;
                let (dx, dy) = NEIGHBOURS[direction];
                let candidate = (current.0 + dx, current.1 + dy);
                if !inside(candidate) {
                    return None;
                }
                let (px, py) = NEIGHBOURS[(direction + 7) % 8];
                let previous = (current.0 + px - candidate.0, current.1 + py - candidate.1);
                Some((candidate, ring_index(previous)))
            }) else {
                // Isolated pixel.
                return Ok(contour);
            };

            if current == start {
                match second {
                    None => second = Some(next),
                    Some(second) if second == next => {
                        contour.pop();
                        return Ok(contour);
                    }
                    Some(_) => {}
                }
            }

            contour.push(next);
            current = next;
            backtrack = entered_from;
        }

        Err(SkipReason::ContourNotClosed)
    }
}

fn ring_index(offset: (i32, i32)) -> usize {
    NEIGHBOURS
        .iter()
        .position(|neighbour| *neighbour == offset)
        .unwrap_or(0)
}

/// Background pixels 4-connected to the frame border.
///
/// Background inside a hole of some component is not part of it, so a
/// component is external exactly when the background around it is.
#[derive(Debug, Clone)]
pub struct ExteriorBackground {
    width: u32,
    bits: BitVec,
}

impl ExteriorBackground {
    pub fn of(mask: &BinaryMask) -> Self {
        let (width, height) = (mask.width, mask.height);
        let mut bits = bitvec![0; mask.bits.len()];
        let mut stack = Vec::new();

        let border = (0..width)
            .flat_map(|x| [(x, 0), (x, height.saturating_sub(1))])
            .chain((0..height).flat_map(|y| [(0, y), (width.saturating_sub(1), y)]));
        for (x, y) in border {
            stack.push((x as i32, y as i32));
        }

        while let Some((x, y)) = stack.pop() {
            if mask.get(x, y) != Some(false) {
                continue;
            }
            let index = y as usize * width as usize + x as usize;
            if bits[index] {
                continue;
            }
            bits.set(index, true);
            stack.extend([(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)]);
        }

        ExteriorBackground { width, bits }
    }

    /// Whether `component` sits in the outer background rather than in a hole.
    ///
    /// The pixel above a raster-first seed is outside the component and
    /// cannot be one of its own holes.
    pub fn surrounds(&self, component: &Component) -> bool {
        let (x, y) = component.seed;
        if y == 0 {
            return true;
        }
        self.bits[(y - 1) as usize * self.width as usize + x as usize]
    }
}

/// Shoelace area of a closed polygon given by its vertices.
pub fn polygon_area(points: &[(i32, i32)]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }

    let twice_area = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(&(x1, y1), &(x2, y2))| x1 as f64 * y2 as f64 - x2 as f64 * y1 as f64)
        .sum::<f64>();
    (twice_area.abs() / 2.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_pixels_are_one_component() {
        let mask = BinaryMask::from_fn(6, 6, |x, y| x == y || (x == 5 && y == 0));
        let (_, components) = ComponentLabels::label(&mask);

        assert_eq!(components.len(), 2);
        assert_eq!(components[0].seed, (0, 0));
        assert_eq!(components[0].pixel_count, 6);
        assert_eq!(components[0].bbox, BoundingBox::new(0, 0, 6, 6));
        assert_eq!(components[1].seed, (5, 0));
    }

    #[test]
    fn square_contour_runs_clockwise() {
        let mask = BinaryMask::from_fn(4, 4, |x, y| (1..3).contains(&x) && (1..3).contains(&y));
        let (labels, components) = ComponentLabels::label(&mask);

        let contour = labels.trace_outer(&components[0]).unwrap();
        assert_eq!(contour, vec![(1, 1), (2, 1), (2, 2), (1, 2)]);
        assert_eq!(polygon_area(&contour), 1.0);
    }

    #[test]
    fn rectangle_contour_covers_the_outline_once() {
        let mask = BinaryMask::from_fn(30, 20, |x, y| (5..25).contains(&x) && (4..14).contains(&y));
        let (labels, components) = ComponentLabels::label(&mask);

        let contour = labels.trace_outer(&components[0]).unwrap();
        // 20x10 block: perimeter pixels 2 * (20 + 10) - 4.
        assert_eq!(contour.len(), 56);
        assert_eq!(polygon_area(&contour), 19.0 * 9.0);
    }

    #[test]
    fn concave_shapes_are_traced_around_the_notch() {
        // U shape, opening upwards.
        let mask = BinaryMask::from_fn(12, 12, |x, y| {
            (2..10).contains(&x) && (2..10).contains(&y) && !((4..8).contains(&x) && y < 7)
        });
        let (labels, components) = ComponentLabels::label(&mask);

        assert_eq!(components.len(), 1);
        let contour = labels.trace_outer(&components[0]).unwrap();
        assert!(contour.contains(&(4, 7)));
        assert!(contour.contains(&(7, 7)));
        assert!(polygon_area(&contour) < 7.0 * 7.0);
    }

    #[test]
    fn blocks_inside_holes_are_not_exterior() {
        // Ring with a hole at 6..14, block at 8..12 inside the hole, block outside.
        let mask = BinaryMask::from_fn(30, 20, |x, y| {
            let ring = (2..18).contains(&x) && (2..18).contains(&y);
            let hole = (6..14).contains(&x) && (6..14).contains(&y);
            let inner = (8..12).contains(&x) && (8..12).contains(&y);
            let outer = (22..26).contains(&x) && (0..4).contains(&y);
            (ring && !hole) || inner || outer
        });
        let (_, components) = ComponentLabels::label(&mask);
        let exterior = ExteriorBackground::of(&mask);

        assert_eq!(components.len(), 3);
        let kept = components
            .iter()
            .filter(|component| exterior.surrounds(component))
            .map(|component| component.seed)
            .collect::<Vec<_>>();
        assert_eq!(kept, vec![(22, 0), (2, 2)]);
    }

    #[test]
    fn diagonal_gaps_do_not_open_a_hole() {
        // 8-connected ring whose corners only touch diagonally.
        let mask = BinaryMask::from_fn(9, 9, |x, y| {
            let on_diamond = (x as i32 - 4).abs() + (y as i32 - 4).abs() == 3;
            on_diamond || (x == 4 && y == 4)
        });
        let (_, components) = ComponentLabels::label(&mask);
        let exterior = ExteriorBackground::of(&mask);

        assert_eq!(components.len(), 2);
        assert!(exterior.surrounds(&components[0]));
        assert!(!exterior.surrounds(&components[1]));
    }

    #[test]
    fn single_pixel_has_a_single_point_contour() {
        let mask = BinaryMask::from_fn(3, 3, |x, y| x == 1 && y == 1);
        let (labels, components) = ComponentLabels::label(&mask);

        assert_eq!(labels.trace_outer(&components[0]).unwrap(), vec![(1, 1)]);
        assert_eq!(polygon_area(&[(1, 1)]), 0.0);
    }
}

use crate::detect::{NORMAL_EPSILON, SOBEL_WEIGHT};
use ndarray::{Array2, ArrayView2, Zip};
use spark_media::DepthMap;

/// Per-pixel unit surface normals of a depth map, one array per component.
#[derive(Debug, Clone)]
pub struct NormalField {
    nx: Array2<f32>,
    ny: Array2<f32>,
    nz: Array2<f32>,
}

impl NormalField {
    /// Estimates normals from the depth gradient.
    ///
    /// Args:
    ///     depth: depth map, normally already normalized to `[0, 1]`.
    ///     depth_gain: how many frame widths one full unit of depth spans.
    ///
    /// Returns:
    ///     The field `(-dz/dx, -dz/dy, 1) / |.|`, same size as `depth`.
    ///
    /// The gradient is a 3x3 Sobel with replicated borders, divided by the
    /// kernel weight to get a per-pixel slope and then scaled by the frame
    /// width so that the slope does not depend on the resolution.
    pub fn estimate(depth: &DepthMap, depth_gain: f32) -> NormalField {
        let (height, width) = depth.dim();
        let scale = width as f32 * depth_gain / SOBEL_WEIGHT;

        let mut nx = Array2::<f32>::zeros((height, width));
        let mut ny = Array2::<f32>::zeros((height, width));
        let mut nz = Array2::<f32>::zeros((height, width));
        if depth.is_empty() {
            return NormalField { nx, ny, nz };
        }

        let z: &Array2<f32> = depth;
        Zip::indexed(&mut nx)
            .and(&mut ny)
            .and(&mut nz)
            .par_for_each(|(y, x), nx, ny, nz| {
                let (gx, gy) = sobel(z, x, y);
                let dx = gx * scale;
                let dy = gy * scale;
                let norm = (dx * dx + dy * dy + 1.0).sqrt() + NORMAL_EPSILON;

                *nx = -dx / norm;
                *ny = -dy / norm;
                *nz = 1.0 / norm;
            });

        NormalField { nx, ny, nz }
    }

    pub fn width(&self) -> u32 {
        self.nx.ncols() as u32
    }

    pub fn height(&self) -> u32 {
        self.nx.nrows() as u32
    }

    pub fn get(&self, x: u32, y: u32) -> Option<[f32; 3]> {
        let index = (y as usize, x as usize);
        Some([
            *self.nx.get(index)?,
            *self.ny.get(index)?,
            *self.nz.get(index)?,
        ])
    }

    pub fn components(&self) -> [ArrayView2<'_, f32>; 3] {
        [self.nx.view(), self.ny.view(), self.nz.view()]
    }

    pub fn horizontal(&self) -> ArrayView2<'_, f32> {
        self.nx.view()
    }
}

/// Sobel responses at `(x, y)`, neighbours outside the map replicate the border.
fn sobel(z: &Array2<f32>, x: usize, y: usize) -> (f32, f32) {
    let (height, width) = z.dim();
    let left = x.saturating_sub(1);
    let right = (x + 1).min(width - 1);
    let up = y.saturating_sub(1);
    let down = (y + 1).min(height - 1);

    let gx = (z[[up, right]] + 2.0 * z[[y, right]] + z[[down, right]])
        - (z[[up, left]] + 2.0 * z[[y, left]] + z[[down, left]]);
    let gy = (z[[down, left]] + 2.0 * z[[down, x]] + z[[down, right]])
        - (z[[up, left]] + 2.0 * z[[up, x]] + z[[up, right]]);

    (gx, gy)
}

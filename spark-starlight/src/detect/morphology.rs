use bitvec::prelude::*;

/// Binary structuring element stored as offsets from its anchor.
#[derive(Debug, Clone)]
pub struct StructuringElement {
    offsets: Vec<(i32, i32)>,
}

impl StructuringElement {
    /// Elliptical kernel inscribed in a `size` x `size` square.
    ///
    /// For size 5 this is the familiar
    /// ```text
    /// ..#..
    /// #####
    /// #####
    /// #####
    /// ..#..
    /// ```
    pub fn ellipse(size: u32) -> Self {
        let size = size.max(1) as i32;
        let radius = size / 2;
        let mut offsets = Vec::new();

        for row in 0..size {
            let dy = row - radius;
            let half_width = if radius == 0 {
                0
            } else {
                let t = dy as f64 / radius as f64;
                (radius as f64 * (1.0 - t * t).max(0.0).sqrt()).round() as i32
            };
            for dx in -half_width..=half_width {
                offsets.push((dx, dy));
            }
        }

        StructuringElement { offsets }
    }

    pub fn offsets(&self) -> &[(i32, i32)] {
        &self.offsets
    }
}

impl Default for StructuringElement {
    fn default() -> Self {
        StructuringElement::ellipse(5)
    }
}

/// Row-major binary mask with its dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask {
    pub width: u32,
    pub height: u32,
    pub bits: BitVec,
}

impl BinaryMask {
    pub fn new(width: u32, height: u32) -> Self {
        BinaryMask {
            width,
            height,
            bits: bitvec![0; (width * height) as usize],
        }
    }

    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> bool) -> Self {
        let bits = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect::<BitVec>();
        BinaryMask {
            width,
            height,
            bits,
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<bool> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        self.bits
            .get(y as usize * self.width as usize + x as usize)
            .map(|bit| *bit)
    }

    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }

    fn neighbours<'a>(
        &'a self,
        element: &'a StructuringElement,
        x: u32,
        y: u32,
    ) -> impl Iterator<Item = bool> + 'a {
        element
            .offsets()
            .iter()
            .filter_map(move |(dx, dy)| self.get(x as i32 + dx, y as i32 + dy))
    }

    /// A pixel turns on when any neighbour under the element is on.
    pub fn dilate(&self, element: &StructuringElement) -> Self {
        BinaryMask::from_fn(self.width, self.height, |x, y| {
            self.neighbours(element, x, y).any(|bit| bit)
        })
    }

    /// A pixel stays on only when every in-frame neighbour under the element is on.
    pub fn erode(&self, element: &StructuringElement) -> Self {
        BinaryMask::from_fn(self.width, self.height, |x, y| {
            self.neighbours(element, x, y).all(|bit| bit)
        })
    }

    /// `iterations` dilations followed by as many erosions, fills small gaps.
    pub fn close(&self, element: &StructuringElement, iterations: u32) -> Self {
        let mut mask = self.clone();
        for _ in 0..iterations {
            mask = mask.dilate(element);
        }
        for _ in 0..iterations {
            mask = mask.erode(element);
        }
        mask
    }

    /// `iterations` erosions followed by as many dilations, drops speckles.
    pub fn open(&self, element: &StructuringElement, iterations: u32) -> Self {
        let mut mask = self.clone();
        for _ in 0..iterations {
            mask = mask.erode(element);
        }
        for _ in 0..iterations {
            mask = mask.dilate(element);
        }
        mask
    }
}

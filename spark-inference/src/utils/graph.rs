use num::{Num, NumCast, ToPrimitive};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Point<T: Num> {
    pub x: T,
    pub y: T,
}

impl<T: Num> Point<T> {
    pub fn new(x: T, y: T) -> Self {
        Point { x, y }
    }
}

/// Axis-aligned box given by its top-left `(x1, y1)` and bottom-right `(x2, y2)` corners.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox<T: Num> {
    pub x1: T,
    pub y1: T,
    pub x2: T,
    pub y2: T,
}

impl<T: Num + Copy + PartialOrd> BoundingBox<T> {
    pub fn new(x1: T, y1: T, x2: T, y2: T) -> Self {
        BoundingBox { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> T {
        self.x2 - self.x1
    }

    pub fn height(&self) -> T {
        self.y2 - self.y1
    }

    pub fn area(&self) -> T {
        self.width() * self.height()
    }

    pub fn contains(&self, point: Point<T>) -> bool {
        point.x >= self.x1 && point.x <= self.x2 && point.y >= self.y1 && point.y <= self.y2
    }

    /// Clamps every corner into `[0, width] x [0, height]`.
    pub fn clip(&self, width: T, height: T) -> Self {
        let clamp = |value: T, max: T| {
            if value < T::zero() {
                T::zero()
            } else if value > max {
                max
            } else {
                value
            }
        };

        BoundingBox {
            x1: clamp(self.x1, width),
            y1: clamp(self.y1, height),
            x2: clamp(self.x2, width),
            y2: clamp(self.y2, height),
        }
    }

    /// Converts the corners to another numeric type, `None` when a corner does not fit.
    pub fn cast<U: Num + NumCast>(&self) -> Option<BoundingBox<U>>
    where
        T: ToPrimitive,
    {
        Some(BoundingBox {
            x1: <U as NumCast>::from(self.x1)?,
            y1: <U as NumCast>::from(self.y1)?,
            x2: <U as NumCast>::from(self.x2)?,
            y2: <U as NumCast>::from(self.y2)?,
        })
    }
}

impl BoundingBox<f32> {
    pub fn center(&self) -> Point<f32> {
        Point::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    pub fn is_finite(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2]
            .iter()
            .all(|value| value.is_finite())
    }
}

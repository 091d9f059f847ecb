//! Engine coordinate types

/// Engine coordinate type
pub type Coord = i16;

/// A point in display coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: Coord,
    pub y: Coord,
}

impl Point {
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }
}

/// A rectangle with inclusive corners, as handed out by the engine
///
/// `x2`/`y2` are the last column/row *inside* the area, so a single pixel
/// at the origin is `Area::new(0, 0, 0, 0)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Area {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Area {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Area covering a `width` x `height` surface starting at the origin
    pub const fn of_size(width: u32, height: u32) -> Self {
        Self {
            x1: 0,
            y1: 0,
            x2: width as i32 - 1,
            y2: height as i32 - 1,
        }
    }

    /// Width in pixels (0 for inverted areas)
    pub fn width(&self) -> usize {
        (self.x2 as i64 - self.x1 as i64 + 1).max(0) as usize
    }

    /// Height in pixels (0 for inverted areas)
    pub fn height(&self) -> usize {
        (self.y2 as i64 - self.y1 as i64 + 1).max(0) as usize
    }

    /// Number of pixels covered
    pub fn pixel_count(&self) -> usize {
        self.width().saturating_mul(self.height())
    }

    pub fn is_empty(&self) -> bool {
        self.x2 < self.x1 || self.y2 < self.y1
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    /// Overlap of two areas, `None` when they do not touch
    pub fn intersect(&self, other: &Area) -> Option<Area> {
        let area = Area {
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
            x2: self.x2.min(other.x2),
            y2: self.y2.min(other.y2),
        };
        (!area.is_empty()).then_some(area)
    }

    /// True if no pixel of the area lands on a `width` x `height` surface
    pub fn is_outside(&self, width: u32, height: u32) -> bool {
        self.is_empty()
            || self.x2 < 0
            || self.y2 < 0
            || self.x1 > width as i32 - 1
            || self.y1 > height as i32 - 1
    }

    /// Truncate the area to a `width` x `height` surface
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Area> {
        if width == 0 || height == 0 {
            return None;
        }
        self.intersect(&Area::of_size(width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_dimensions_are_inclusive() {
        let area = Area::new(2, 3, 5, 3);
        assert_eq!(area.width(), 4);
        assert_eq!(area.height(), 1);
        assert_eq!(area.pixel_count(), 4);
        assert!(!area.is_empty());
    }

    #[test]
    fn test_inverted_area_is_empty() {
        let area = Area::new(5, 5, 4, 10);
        assert!(area.is_empty());
        assert_eq!(area.width(), 0);
        assert_eq!(area.pixel_count(), 0);
    }

    #[test]
    fn test_outside_checks() {
        assert!(Area::new(-10, 0, -1, 5).is_outside(8, 8));
        assert!(Area::new(8, 0, 12, 5).is_outside(8, 8));
        assert!(Area::new(0, 8, 3, 9).is_outside(8, 8));
        assert!(!Area::new(-3, -3, 0, 0).is_outside(8, 8));
        assert!(!Area::new(7, 7, 20, 20).is_outside(8, 8));
    }

    #[test]
    fn test_clamp_to_surface() {
        let clamped = Area::new(-2, 5, 9, 12).clamp_to(8, 8).unwrap();
        assert_eq!(clamped, Area::new(0, 5, 7, 7));

        assert!(Area::new(10, 10, 12, 12).clamp_to(8, 8).is_none());
        assert!(Area::new(0, 0, 1, 1).clamp_to(0, 8).is_none());
    }

    #[test]
    fn test_extreme_corners_do_not_overflow() {
        let area = Area::new(i32::MIN, 0, i32::MAX, 0);
        assert_eq!(area.width(), 1usize << 32);
        assert_eq!(area.height(), 1);

        let huge = Area::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        assert_eq!(huge.pixel_count(), usize::MAX);
        assert_eq!(huge.clamp_to(4, 4), Some(Area::new(0, 0, 3, 3)));
    }
}

use derive_more::Display;

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Display)]
#[display("{width}x{height}+{x}+{y}")]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn of(x: i32, y: i32, width: u32, height: u32) -> Self {
        Rect { x, y, width, height }
    }

    /// Same size, placed at the origin. Used for a child filling its parent.
    pub fn at_origin(self) -> Self {
        Rect { x: 0, y: 0, ..self }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Position and size as 16 bit protocol fields, clamped to their range.
    pub fn to_wire(self) -> (i16, i16, u16, u16) {
        let coord = |value: i32| value.clamp(i16::MIN.into(), i16::MAX.into()) as i16;
        let size = |value: u32| value.min(u16::MAX.into()) as u16;
        (coord(self.x), coord(self.y), size(self.width), size(self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_x_geometry_notation() {
        assert_eq!(Rect::of(10, 2, 24, 24).to_string(), "24x24+10+2");
    }

    #[test]
    fn test_at_origin_keeps_size() {
        assert_eq!(Rect::of(5, 6, 7, 8).at_origin(), Rect::of(0, 0, 7, 8));
        assert!(Rect::of(1, 1, 0, 3).is_empty());
    }

    #[test]
    fn test_to_wire_clamps() {
        assert_eq!(Rect::of(-3, 40, 24, 24).to_wire(), (-3, 40, 24, 24));
        assert_eq!(Rect::of(70_000, -70_000, 100_000, u32::MAX).to_wire(), (i16::MAX, i16::MIN, u16::MAX, u16::MAX));
    }
}

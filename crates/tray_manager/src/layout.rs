use crate::geometry::Rect;

/// Horizontal strip of equally sized icons, in insertion order.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct BoxLayout {
    pub icon_size: u32,
    pub spacing: u32,
    pub padding: u32,
}

impl Default for BoxLayout {
    fn default() -> Self {
        BoxLayout { icon_size: 24, spacing: 9, padding: 0 }
    }
}

impl BoxLayout {
    pub fn allocation(&self, index: usize) -> Rect {
        let step = self.icon_size.saturating_add(self.spacing) as usize;
        let x = (self.padding as usize).saturating_add(index.saturating_mul(step));
        let y = i32::try_from(self.padding).unwrap_or(i32::MAX);
        Rect::of(i32::try_from(x).unwrap_or(i32::MAX), y, self.icon_size, self.icon_size)
    }

    /// Size of a container holding `count` icons. Never zero-sized, since X rejects empty windows.
    pub fn extent(&self, count: usize) -> (u32, u32) {
        let count = u32::try_from(count).unwrap_or(u32::MAX);
        let padding = self.padding.saturating_mul(2);
        let icons = count.saturating_mul(self.icon_size).saturating_add(count.saturating_sub(1).saturating_mul(self.spacing));
        let width = icons.saturating_add(padding).max(1);
        let height = self.icon_size.saturating_add(padding);
        (width, height.max(1))
    }
}

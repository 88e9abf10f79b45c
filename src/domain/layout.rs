// Grid placement of rows and panels
pub const GRID_WIDTH: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPos {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Places items left-to-right, wrapping to a new line when a panel does not fit.
#[derive(Debug, Default)]
pub struct GridCursor {
    x: u32,
    y: u32,
    line_height: u32,
}

impl GridCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place_panel(&mut self, span: u32, height: u32) -> GridPos {
        let w = span.clamp(1, GRID_WIDTH);
        if self.x + w > GRID_WIDTH {
            self.new_line();
        }

        let pos = GridPos {
            x: self.x,
            y: self.y,
            w,
            h: height,
        };
        self.x += w;
        self.line_height = self.line_height.max(height);
        pos
    }

    /// Row headers always start a fresh line and are one unit tall.
    pub fn place_row(&mut self) -> GridPos {
        if self.x > 0 || self.line_height > 0 {
            self.new_line();
        }

        let pos = GridPos {
            x: 0,
            y: self.y,
            w: GRID_WIDTH,
            h: 1,
        };
        self.y += 1;
        pos
    }

    fn new_line(&mut self) {
        self.y += self.line_height;
        self.x = 0;
        self.line_height = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panels_wrap_by_tallest_panel() {
        let mut cursor = GridCursor::new();
        let first = cursor.place_panel(12, 8);
        let second = cursor.place_panel(12, 10);
        let third = cursor.place_panel(6, 4);

        assert_eq!(first, GridPos { x: 0, y: 0, w: 12, h: 8 });
        assert_eq!(second, GridPos { x: 12, y: 0, w: 12, h: 10 });
        assert_eq!(third, GridPos { x: 0, y: 10, w: 6, h: 4 });
    }

    #[test]
    fn test_rows_start_new_line() {
        let mut cursor = GridCursor::new();
        let row = cursor.place_row();
        let panel = cursor.place_panel(4, 6);
        let next_row = cursor.place_row();
        let after = cursor.place_panel(24, 12);

        assert_eq!(row, GridPos { x: 0, y: 0, w: 24, h: 1 });
        assert_eq!(panel, GridPos { x: 0, y: 1, w: 4, h: 6 });
        assert_eq!(next_row.y, 7);
        assert_eq!(after.y, 8);
    }
}

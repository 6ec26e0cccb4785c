use crate::GridSize;
use life_grid::Coord;

/// Which part of the unbounded grid the pixel buffer shows.
///
/// Buffer pixel `(col, row)` shows grid cell `origin + (col, row)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Camera {
    origin: Coord,
    pan_speed: i64,
}

impl Camera {
    pub fn new(pan_speed: u32) -> Self {
        Self {
            origin: Coord::default(),
            pan_speed: pan_speed as i64,
        }
    }

    pub fn origin(&self) -> Coord {
        self.origin
    }

    pub fn buffer_to_grid(&self, col: usize, row: usize) -> Coord {
        Coord::new(
            self.origin.x.saturating_add(col as i64),
            self.origin.y.saturating_add(row as i64),
        )
    }

    /// Index of `coord`'s pixel in a row-major buffer, if it is on screen.
    pub fn grid_to_buffer_index(&self, coord: Coord, size: GridSize) -> Option<usize> {
        let col = coord.x.checked_sub(self.origin.x)?;
        let row = coord.y.checked_sub(self.origin.y)?;
        if (0..size.width as i64).contains(&col) && (0..size.height as i64).contains(&row) {
            Some(row as usize * size.width as usize + col as usize)
        } else {
            None
        }
    }

    /// Inclusive corners of the visible part of the grid.
    pub fn visible_area(&self, size: GridSize) -> (Coord, Coord) {
        let max = self.buffer_to_grid(
            size.width.saturating_sub(1) as usize,
            size.height.saturating_sub(1) as usize,
        );
        (self.origin, max)
    }

    pub fn pan(&mut self, dx: i64, dy: i64) {
        self.origin = Coord::new(
            self.origin.x.saturating_add(dx),
            self.origin.y.saturating_add(dy),
        );
    }

    /// Drags the view toward the cursor: the further the cursor is from the
    /// center of the buffer, the faster the pan, up to `pan_speed` cells.
    pub fn pan_toward(&mut self, col: usize, row: usize, size: GridSize) {
        let center_col = (size.width as i64 / 2).max(1);
        let center_row = (size.height as i64 / 2).max(1);
        let dx = (self.pan_speed * (col as i64 - center_col)).div_euclid(center_col);
        let dy = (self.pan_speed * (row as i64 - center_row)).div_euclid(center_row);
        self.pan(dx, dy);
    }

    /// Moves the view so the `min..=max` rectangle sits in the middle of the buffer.
    pub fn center_on(&mut self, min: Coord, max: Coord, size: GridSize) {
        let mid_x = min.x / 2 + max.x / 2 + (min.x % 2 + max.x % 2) / 2;
        let mid_y = min.y / 2 + max.y / 2 + (min.y % 2 + max.y % 2) / 2;
        self.origin = Coord::new(
            mid_x.saturating_sub(size.width as i64 / 2),
            mid_y.saturating_sub(size.height as i64 / 2),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: GridSize = GridSize {
        width: 80,
        height: 50,
    };

    #[test]
    fn buffer_and_grid_positions_round_trip() {
        let mut camera = Camera::new(3);
        camera.pan(-100, 7);
        let coord = camera.buffer_to_grid(5, 2);
        assert_eq!(coord, Coord::new(-95, 9));
        assert_eq!(camera.grid_to_buffer_index(coord, SIZE), Some(2 * 80 + 5));
    }

    #[test]
    fn off_screen_cells_have_no_pixel() {
        let camera = Camera::new(3);
        assert_eq!(camera.grid_to_buffer_index(Coord::new(-1, 0), SIZE), None);
        assert_eq!(camera.grid_to_buffer_index(Coord::new(80, 0), SIZE), None);
        assert_eq!(camera.grid_to_buffer_index(Coord::new(0, 50), SIZE), None);
        assert_eq!(camera.grid_to_buffer_index(Coord::new(i64::MIN, 0), SIZE), None);
    }

    #[test]
    fn pan_toward_scales_with_cursor_distance() {
        let mut camera = Camera::new(3);
        camera.pan_toward(40, 25, SIZE);
        assert_eq!(camera.origin(), Coord::new(0, 0));

        camera.pan_toward(79, 0, SIZE);
        assert_eq!(camera.origin(), Coord::new(2, -3));

        camera.pan_toward(0, 49, SIZE);
        assert_eq!(camera.origin(), Coord::new(-1, -1));
    }

    #[test]
    fn center_on_pattern() {
        let mut camera = Camera::new(3);
        camera.center_on(Coord::new(100, -10), Coord::new(110, -4), SIZE);
        let (min, max) = camera.visible_area(SIZE);
        assert_eq!(min, Coord::new(65, -32));
        assert_eq!(max, Coord::new(144, 17));
    }
}

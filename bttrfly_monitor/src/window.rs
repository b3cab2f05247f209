//! The draggable note window. Positions are relative to the monitor's screen
//! area; pointer coordinates are in the host's client space.

use serde::Serialize;

pub const NOTE_WINDOW_WIDTH: f32 = 380.0;
pub const NOTE_WINDOW_HEIGHT: f32 = 540.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in client space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NoteWindow {
    is_open: bool,
    position: Point,
    width: f32,
    height: f32,
    /// Container rect as of the last drag start, open, or resize.
    bounds: Option<Rect>,
    /// Pointer offset inside the window while a drag is active.
    drag_offset: Option<Point>,
}

impl Default for NoteWindow {
    fn default() -> Self {
        Self::new(NOTE_WINDOW_WIDTH, NOTE_WINDOW_HEIGHT)
    }
}

impl NoteWindow {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            is_open: false,
            position: Point::default(),
            width,
            height,
            bounds: None,
            drag_offset: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_offset.is_some()
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn cached_bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Open and centre inside `container`. Reopening re-centres.
    pub fn open(&mut self, container: Rect) {
        self.is_open = true;
        self.bounds = Some(container);
        self.position = Point::new(
            ((container.width - self.width) / 2.0).round(),
            ((container.height - self.height) / 2.0).round(),
        );
    }

    pub fn close(&mut self) {
        self.is_open = false;
        self.drag_offset = None;
    }

    /// Container resize. Only the cached rect changes; the window keeps its
    /// position even if it now overhangs.
    pub fn container_resized(&mut self, container: Rect) {
        if self.is_open {
            self.bounds = Some(container);
        }
    }

    pub fn drag_start(&mut self, pointer: Point, container: Rect) {
        if !self.is_open {
            return;
        }
        self.bounds = Some(container);
        self.drag_offset = Some(Point::new(
            pointer.x - container.x - self.position.x,
            pointer.y - container.y - self.position.y,
        ));
    }

    /// Follow the pointer using the cached container rect. Returns the new
    /// position, or `None` when no drag is active.
    pub fn drag_move(&mut self, pointer: Point) -> Option<Point> {
        let offset = self.drag_offset?;
        let origin = self.bounds.map(|rect| Point::new(rect.x, rect.y)).unwrap_or_default();
        self.position = self.constrain(Point::new(
            pointer.x - origin.x - offset.x,
            pointer.y - origin.y - offset.y,
        ));
        Some(self.position)
    }

    pub fn drag_end(&mut self) -> bool {
        self.drag_offset.take().is_some()
    }

    /// Clamp each axis into `[0, container - window]`. When the window is
    /// larger than the container the lower bound wins. Unconstrained until a
    /// container rect has been cached.
    pub fn constrain(&self, candidate: Point) -> Point {
        let Some(bounds) = self.bounds else {
            return candidate;
        };
        Point::new(
            candidate.x.min(bounds.width - self.width).max(0.0),
            candidate.y.min(bounds.height - self.height).max(0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONITOR: Rect = Rect::new(20.0, 40.0, 1000.0, 800.0);

    #[test]
    fn opening_centres_the_window() {
        let mut window = NoteWindow::default();
        window.open(MONITOR);
        assert_eq!(window.position(), Point::new(310.0, 130.0));
    }

    #[test]
    fn drag_clamps_to_the_monitor() {
        let mut window = NoteWindow::default();
        window.open(MONITOR);
        // grab the title bar 10px in
        window.drag_start(Point::new(20.0 + 310.0 + 10.0, 40.0 + 130.0 + 10.0), MONITOR);

        let far = window.drag_move(Point::new(5_000.0, 5_000.0));
        assert_eq!(far, Some(Point::new(620.0, 260.0)));

        let negative = window.drag_move(Point::new(-500.0, -500.0));
        assert_eq!(negative, Some(Point::new(0.0, 0.0)));

        let inside = window.drag_move(Point::new(20.0 + 110.0, 40.0 + 60.0));
        assert_eq!(inside, Some(Point::new(100.0, 50.0)));

        assert!(window.drag_end());
        assert_eq!(window.drag_move(Point::new(300.0, 300.0)), None);
        assert_eq!(window.position(), Point::new(100.0, 50.0));
    }

    #[test]
    fn oversized_window_pins_to_origin() {
        let mut window = NoteWindow::new(1200.0, 900.0);
        window.open(MONITOR);
        window.drag_start(Point::new(0.0, 0.0), MONITOR);
        assert_eq!(
            window.drag_move(Point::new(400.0, 400.0)),
            Some(Point::new(0.0, 0.0))
        );
    }

    #[test]
    fn moves_use_the_rect_cached_at_drag_start() {
        let mut window = NoteWindow::default();
        window.open(MONITOR);
        let moved = Rect::new(120.0, 40.0, 1000.0, 800.0);
        window.drag_start(Point::new(120.0 + 310.0, 40.0 + 130.0), moved);
        assert_eq!(window.cached_bounds(), Some(moved));
        assert_eq!(
            window.drag_move(Point::new(120.0 + 320.0, 40.0 + 130.0)),
            Some(Point::new(320.0, 130.0))
        );
    }

    #[test]
    fn resize_refreshes_bounds_only_while_open() {
        let mut window = NoteWindow::default();
        let small = Rect::new(0.0, 0.0, 500.0, 600.0);
        window.container_resized(small);
        assert_eq!(window.cached_bounds(), None);
        assert_eq!(
            window.constrain(Point::new(-40.0, 9_000.0)),
            Point::new(-40.0, 9_000.0)
        );

        window.open(MONITOR);
        window.container_resized(small);
        assert_eq!(window.cached_bounds(), Some(small));
        assert_eq!(window.position(), Point::new(310.0, 130.0));
        assert_eq!(window.constrain(Point::new(400.0, 100.0)), Point::new(120.0, 60.0));
    }

    #[test]
    fn closing_ends_any_drag() {
        let mut window = NoteWindow::default();
        window.open(MONITOR);
        window.drag_start(Point::new(400.0, 300.0), MONITOR);
        window.close();
        assert!(!window.is_open());
        assert!(!window.is_dragging());
    }
}

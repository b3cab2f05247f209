//! Pointer routing for the card view. Primary-button drags pull the rubber
//! band, secondary-button drags orbit the camera. Kept free of winit types so
//! the routing rules can be tested directly.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    BandGrab { y: f32 },
    BandMove { y: f32 },
    BandRelease,
    Orbit { delta_x: f32 },
}

#[derive(Debug, Default)]
pub struct PointerRouter {
    cursor: Option<(f32, f32)>,
    band_active: bool,
    orbit_active: bool,
}

impl PointerRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging_band(&self) -> bool {
        self.band_active
    }

    pub fn cursor_moved(&mut self, x: f32, y: f32) -> Vec<PointerAction> {
        let previous = self.cursor.replace((x, y));
        let mut actions = Vec::new();
        if self.band_active {
            actions.push(PointerAction::BandMove { y });
        }
        if self.orbit_active {
            if let Some((last_x, _)) = previous {
                let delta_x = x - last_x;
                if delta_x != 0.0 {
                    actions.push(PointerAction::Orbit { delta_x });
                }
            }
        }
        actions
    }

    /// Presses need a known cursor position; a press before the first move
    /// is dropped.
    pub fn button(&mut self, button: PointerButton, pressed: bool) -> Option<PointerAction> {
        match (button, pressed) {
            (PointerButton::Primary, true) => {
                let (_, y) = self.cursor?;
                self.band_active = true;
                Some(PointerAction::BandGrab { y })
            }
            (PointerButton::Primary, false) => self.release_band(),
            (PointerButton::Secondary, true) => {
                self.orbit_active = self.cursor.is_some();
                None
            }
            (PointerButton::Secondary, false) => {
                self.orbit_active = false;
                None
            }
        }
    }

    /// Leaving the window ends both drags.
    pub fn cursor_left(&mut self) -> Option<PointerAction> {
        self.cursor = None;
        self.orbit_active = false;
        self.release_band()
    }

    fn release_band(&mut self) -> Option<PointerAction> {
        if !self.band_active {
            return None;
        }
        self.band_active = false;
        Some(PointerAction::BandRelease)
    }
}

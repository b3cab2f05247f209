//! Spring-damper model behind the card's rubber-band recoil. Pointer drags
//! pull the card vertically; on release it springs back with damping. The
//! integrator is normalized to a 60 Hz reference so frame rate does not
//! change the feel.

/// Pointer travel (pixels) to world units. Negative because screen Y grows
/// downward.
pub const DRAG_SCALE: f32 = 0.008;
/// Furthest a drag may pull the card.
pub const DRAG_LIMIT: f32 = 2.5;
/// Hard limit while springing back.
pub const TRAVEL_LIMIT: f32 = 4.0;
/// Below this in both position and velocity the body snaps to rest.
pub const REST_EPSILON: f32 = 0.01;
/// Fraction of the restoring force handed to the body on release.
pub const RELEASE_FACTOR: f32 = 0.8;
const REFERENCE_RATE: f32 = 60.0;

pub const ANCHOR_TOP: f32 = 6.5;
pub const ANCHOR_BOTTOM: f32 = -6.5;
pub const BAND_DEPTH: f32 = -0.1;
const MIN_BAND_LENGTH: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringState {
    pub position: f32,
    pub velocity: f32,
    pub is_dragging: bool,
    pub drag_anchor: f32,
    pub spring_constant: f32,
    pub damping: f32,
    pub mass: f32,
}

impl Default for SpringState {
    fn default() -> Self {
        Self {
            position: 0.0,
            velocity: 0.0,
            is_dragging: false,
            drag_anchor: 0.0,
            spring_constant: 0.15,
            damping: 0.92,
            mass: 1.0,
        }
    }
}

impl SpringState {
    /// One semi-implicit Euler step. Does nothing while dragging.
    pub fn integrate(&mut self, delta_seconds: f32) {
        if self.is_dragging {
            return;
        }
        let steps = delta_seconds * REFERENCE_RATE;
        let acceleration = -self.position * self.spring_constant / self.mass;
        let mut velocity = (self.velocity + acceleration * steps) * self.damping;
        let mut position =
            (self.position + velocity * steps).clamp(-TRAVEL_LIMIT, TRAVEL_LIMIT);

        if position.abs() < REST_EPSILON && velocity.abs() < REST_EPSILON {
            position = 0.0;
            velocity = 0.0;
        }

        self.position = position;
        self.velocity = velocity;
    }

    pub fn is_at_rest(&self) -> bool {
        !self.is_dragging && self.position == 0.0 && self.velocity == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RubberBandPhase {
    Idle,
    Dragging,
    Releasing,
}

/// One connector: centre and length along Y. The renderer scales a unit
/// cylinder by `length` and places it at `(0, center, BAND_DEPTH)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandSegment {
    pub center: f32,
    pub length: f32,
}

impl BandSegment {
    fn between(low: f32, high: f32) -> Self {
        Self {
            center: (low + high) / 2.0,
            length: (high - low).max(MIN_BAND_LENGTH),
        }
    }
}

impl Default for BandSegment {
    fn default() -> Self {
        Self {
            center: 0.0,
            length: MIN_BAND_LENGTH,
        }
    }
}

/// Visual handles the loop writes into each frame: the card's vertical offset
/// and both connectors.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BandRig {
    pub card_offset: f32,
    pub top: BandSegment,
    pub bottom: BandSegment,
}

#[derive(Debug, Clone)]
pub struct RubberBand {
    state: SpringState,
    card_height: f32,
}

impl RubberBand {
    pub fn new(card_height: f32) -> Self {
        Self::with_state(card_height, SpringState::default())
    }

    pub fn with_state(card_height: f32, state: SpringState) -> Self {
        Self { state, card_height }
    }

    pub fn state(&self) -> &SpringState {
        &self.state
    }

    pub fn position(&self) -> f32 {
        self.state.position
    }

    pub fn phase(&self) -> RubberBandPhase {
        if self.state.is_dragging {
            RubberBandPhase::Dragging
        } else if self.state.position != 0.0 || self.state.velocity != 0.0 {
            RubberBandPhase::Releasing
        } else {
            RubberBandPhase::Idle
        }
    }

    pub fn pointer_down(&mut self, pointer_y: f32) {
        self.state.is_dragging = true;
        self.state.drag_anchor = pointer_y;
        self.state.velocity = 0.0;
    }

    pub fn pointer_move(&mut self, pointer_y: f32) {
        if !self.state.is_dragging {
            return;
        }
        let offset = (pointer_y - self.state.drag_anchor) * -DRAG_SCALE;
        self.state.position = offset.clamp(-DRAG_LIMIT, DRAG_LIMIT);
    }

    pub fn pointer_up(&mut self) {
        if !self.state.is_dragging {
            return;
        }
        let restoring = -self.state.position * self.state.spring_constant;
        self.state.velocity = restoring * RELEASE_FACTOR;
        self.state.is_dragging = false;
        log::trace!(
            "rubber band released at {:.3} with velocity {:.4}",
            self.state.position,
            self.state.velocity
        );
    }

    /// Per-frame tick. Without a rig (nothing mounted yet) the frame is
    /// skipped entirely.
    pub fn update(&mut self, delta_seconds: f32, rig: Option<&mut BandRig>) {
        let Some(rig) = rig else {
            return;
        };
        self.state.integrate(delta_seconds);
        *rig = self.rig();
    }

    pub fn rig(&self) -> BandRig {
        let half = self.card_height / 2.0;
        let card_top = self.state.position + half;
        let card_bottom = self.state.position - half;
        BandRig {
            card_offset: self.state.position,
            top: BandSegment::between(card_top, ANCHOR_TOP),
            bottom: BandSegment::between(ANCHOR_BOTTOM, card_bottom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 60.0;

    #[test]
    fn rest_is_an_equilibrium() {
        let mut state = SpringState::default();
        state.integrate(FRAME);
        assert_eq!(state.position, 0.0);
        assert_eq!(state.velocity, 0.0);
    }

    #[test]
    fn released_spring_settles_exactly() {
        let mut state = SpringState {
            position: 2.0,
            ..SpringState::default()
        };
        let mut steps = 0;
        while !state.is_at_rest() {
            state.integrate(FRAME);
            assert!(state.position.abs() <= 2.0 + 1e-6);
            steps += 1;
            assert!(steps < 10_000, "spring never settled");
        }
        assert_eq!(state.position, 0.0);
        assert_eq!(state.velocity, 0.0);
    }

    #[test]
    fn oscillation_envelope_shrinks() {
        let mut state = SpringState {
            position: 2.0,
            ..SpringState::default()
        };
        let energy = |s: &SpringState| {
            0.5 * s.mass * s.velocity * s.velocity
                + 0.5 * s.spring_constant * s.position * s.position
        };
        let mut previous_peak = energy(&state);
        for _ in 0..20 {
            let mut peak: f32 = 0.0;
            for _ in 0..30 {
                state.integrate(FRAME);
                peak = peak.max(energy(&state));
            }
            assert!(peak <= previous_peak + 1e-6);
            previous_peak = peak;
        }
    }

    #[test]
    fn drag_clamps_at_the_boundary() {
        let mut band = RubberBand::new(4.5);
        band.pointer_down(100.0);
        band.pointer_move(100.0 + DRAG_LIMIT / DRAG_SCALE + 1000.0);
        assert_eq!(band.position(), -DRAG_LIMIT);

        band.pointer_move(100.0 - DRAG_LIMIT / DRAG_SCALE - 1000.0);
        assert_eq!(band.position(), DRAG_LIMIT);
        assert_eq!(band.phase(), RubberBandPhase::Dragging);
    }

    #[test]
    fn drag_start_zeroes_velocity_and_release_uses_restoring_force() {
        let mut band = RubberBand::with_state(
            4.5,
            SpringState {
                position: 0.5,
                velocity: 3.0,
                ..SpringState::default()
            },
        );
        band.pointer_down(200.0);
        assert_eq!(band.state().velocity, 0.0);
        band.pointer_move(150.0);
        assert!((band.position() - 0.4).abs() < 1e-6);
        band.pointer_up();
        let expected = -0.4 * 0.15 * 0.8;
        assert!((band.state().velocity - expected).abs() < 1e-6);
        assert_eq!(band.phase(), RubberBandPhase::Releasing);
    }

    #[test]
    fn moves_without_a_drag_are_ignored() {
        let mut band = RubberBand::new(4.5);
        band.pointer_move(500.0);
        band.pointer_up();
        assert_eq!(band.position(), 0.0);
        assert_eq!(band.phase(), RubberBandPhase::Idle);
    }

    #[test]
    fn dragging_freezes_integration() {
        let mut band = RubberBand::new(4.5);
        band.pointer_down(0.0);
        band.pointer_move(-100.0);
        let mut rig = BandRig::default();
        band.update(FRAME, Some(&mut rig));
        assert!((band.position() - 0.8).abs() < 1e-6);
        assert!((rig.card_offset - 0.8).abs() < 1e-6);
    }

    #[test]
    fn missing_rig_skips_the_frame() {
        let mut band = RubberBand::with_state(
            4.5,
            SpringState {
                position: 1.0,
                ..SpringState::default()
            },
        );
        band.update(FRAME, None);
        assert_eq!(band.position(), 1.0);
        assert_eq!(band.state().velocity, 0.0);
    }

    #[test]
    fn bands_span_anchor_to_card_edge() {
        let band = RubberBand::with_state(
            4.5,
            SpringState {
                position: 1.0,
                ..SpringState::default()
            },
        );
        let rig = band.rig();
        // card top at 3.25, bottom at -1.25
        assert!((rig.top.center - (3.25 + 6.5) / 2.0).abs() < 1e-6);
        assert!((rig.top.length - 3.25).abs() < 1e-6);
        assert!((rig.bottom.center - (-1.25 - 6.5) / 2.0).abs() < 1e-6);
        assert!((rig.bottom.length - 5.25).abs() < 1e-6);
    }

    #[test]
    fn band_length_never_collapses() {
        let band = RubberBand::with_state(
            12.0,
            SpringState {
                position: 2.0,
                ..SpringState::default()
            },
        );
        assert_eq!(band.rig().top.length, 0.1);
    }
}

//! Pull zones: the reveal height of one list edge and its threshold crossings.
//!
//! [`PullZone`] is generic over the [`Edge`] it sits on. The header ([`Top`])
//! absorbs pull distance into its own height, clamped to the header's rest
//! height. The footer ([`Bottom`]) absorbs nothing: its reveal height is the
//! positive list offset, which the controller feeds back in, and it is only
//! monitored against the load-more threshold.

use std::marker::PhantomData;

/// Lifecycle of a pull zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PullPhase {
    #[default]
    Idle,
    Pulling,
    /// Pulled to the rest height (header) or past the threshold (footer)
    AboveThreshold,
    /// Activation requested but not yet possible (header not measured yet)
    Activating,
    /// Refreshing or loading more
    Active,
    /// Returning to rest after a cancel or a finished activation
    Settling,
}

impl PullPhase {
    /// Phases in which height changes raise no events
    pub fn is_muted(self) -> bool {
        matches!(
            self,
            PullPhase::Activating | PullPhase::Active | PullPhase::Settling
        )
    }
}

/// Threshold-crossing notifications raised by a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullEvent {
    StartPulling,
    /// Current reveal height
    Pull(i32),
    ReachAboveBoundary,
    ReachBelowBoundary,
    CancelPulling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PullZoneState {
    pub reveal_height: i32,
    /// Natural full height of the header, 0 until measured
    pub rest_height: i32,
    /// Activation distance of the footer
    pub threshold_distance: i32,
    pub phase: PullPhase,
}

/// Boundary rules of one list edge
pub trait Edge {
    const NAME: &'static str;

    /// The height at which the zone counts as "above threshold"
    fn boundary(state: &PullZoneState) -> i32;

    /// Split `delta` into the new reveal height and the residual left for the offset
    fn absorb(state: &PullZoneState, delta: i32) -> (i32, i32);

    /// Push the events for a change from `old` to `new` and return the resulting phase
    fn cross(state: &PullZoneState, old: i32, new: i32, events: &mut Vec<PullEvent>) -> PullPhase;
}

/// The refresh header edge
#[derive(Debug, Clone, Copy)]
pub struct Top;

/// The load-more footer edge
#[derive(Debug, Clone, Copy)]
pub struct Bottom;

impl Edge for Top {
    const NAME: &'static str = "header";

    fn boundary(state: &PullZoneState) -> i32 {
        state.rest_height
    }

    fn absorb(state: &PullZoneState, delta: i32) -> (i32, i32) {
        let rest = state.rest_height;
        let height = state.reveal_height + delta;
        if delta > 0 {
            if height < rest {
                (height, 0)
            } else {
                (rest, height - rest)
            }
        } else if height > 0 {
            (height, 0)
        } else {
            (0, height)
        }
    }

    fn cross(state: &PullZoneState, old: i32, new: i32, events: &mut Vec<PullEvent>) -> PullPhase {
        let rest = state.rest_height;
        if old == 0 && new > 0 {
            events.push(PullEvent::StartPulling);
        }
        if old != new {
            events.push(PullEvent::Pull(new));
        }
        if old < rest && new == rest {
            events.push(PullEvent::ReachAboveBoundary);
        } else if old == rest && new < rest && rest > 0 {
            events.push(PullEvent::ReachBelowBoundary);
        }

        if new == 0 {
            PullPhase::Idle
        } else if new >= rest {
            PullPhase::AboveThreshold
        } else {
            PullPhase::Pulling
        }
    }
}

impl Edge for Bottom {
    const NAME: &'static str = "footer";

    fn boundary(state: &PullZoneState) -> i32 {
        state.threshold_distance
    }

    fn absorb(state: &PullZoneState, delta: i32) -> (i32, i32) {
        (state.reveal_height, delta)
    }

    fn cross(state: &PullZoneState, old: i32, new: i32, events: &mut Vec<PullEvent>) -> PullPhase {
        let threshold = state.threshold_distance;
        let half = threshold / 2;

        if new > half {
            if old <= half {
                events.push(PullEvent::StartPulling);
                if new >= threshold {
                    events.push(PullEvent::ReachAboveBoundary);
                }
            } else if old < threshold && new >= threshold {
                events.push(PullEvent::ReachAboveBoundary);
            } else if old >= threshold && new < threshold {
                events.push(PullEvent::ReachBelowBoundary);
            }
        } else if old > half {
            events.push(PullEvent::CancelPulling);
        }

        if new <= half {
            PullPhase::Idle
        } else if new >= threshold {
            PullPhase::AboveThreshold
        } else {
            PullPhase::Pulling
        }
    }
}

/// Reveal height and phase for one edge
#[derive(Debug, Clone)]
pub struct PullZone<E: Edge> {
    state: PullZoneState,
    edge: PhantomData<E>,
}

pub type HeaderZone = PullZone<Top>;
pub type FooterZone = PullZone<Bottom>;

impl<E: Edge> PullZone<E> {
    pub fn new(rest_height: i32, threshold_distance: i32) -> Self {
        Self {
            state: PullZoneState {
                rest_height: rest_height.max(0),
                threshold_distance: threshold_distance.max(0),
                ..Default::default()
            },
            edge: PhantomData,
        }
    }

    #[inline]
    pub fn reveal_height(&self) -> i32 {
        self.state.reveal_height
    }

    #[inline]
    pub fn rest_height(&self) -> i32 {
        self.state.rest_height
    }

    #[inline]
    pub fn threshold_distance(&self) -> i32 {
        self.state.threshold_distance
    }

    #[inline]
    pub fn phase(&self) -> PullPhase {
        self.state.phase
    }

    pub fn set_phase(&mut self, phase: PullPhase) {
        self.state.phase = phase;
    }

    pub fn set_rest_height(&mut self, rest_height: i32) {
        self.state.rest_height = rest_height.max(0);
    }

    /// Absorb an already damped delta and return what the zone could not take
    pub fn apply_delta(&mut self, delta: i32, events: &mut Vec<PullEvent>) -> i32 {
        let (height, residual) = E::absorb(&self.state, delta);
        self.set_reveal_height(height, events);
        residual
    }

    /// Update the reveal height, raising events only on boundary crossings
    pub fn set_reveal_height(&mut self, height: i32, events: &mut Vec<PullEvent>) {
        let height = height.max(0);
        let old = self.state.reveal_height;
        self.state.reveal_height = height;

        match self.state.phase {
            PullPhase::Settling => {
                if height == 0 {
                    self.state.phase = PullPhase::Idle;
                }
            }
            phase if phase.is_muted() => {}
            _ => {
                self.state.phase = E::cross(&self.state, old, height, events);
            }
        }
    }

    /// Update the height without events or phase changes
    pub fn sync_reveal_height(&mut self, height: i32) {
        self.state.reveal_height = height.max(0);
    }

    /// Leave `Settling` early with the phase that matches the current height
    pub fn resume(&mut self) {
        if self.state.phase == PullPhase::Settling {
            let height = self.state.reveal_height;
            let mut ignored = Vec::new();
            self.state.phase = E::cross(&self.state, height, height, &mut ignored);
        }
    }

    /// Give up a pull that is below the boundary
    ///
    /// The height is left alone; the caller drives the spring-back.
    pub fn cancel(&mut self, events: &mut Vec<PullEvent>) {
        let phase = self.state.phase;
        if phase.is_muted() || phase == PullPhase::Idle {
            return;
        }
        if self.state.reveal_height < E::boundary(&self.state) {
            events.push(PullEvent::CancelPulling);
            self.state.phase = PullPhase::Settling;
        }
    }
}

/// Pull resistance
///
/// `scale = (viewport - |offset| - reveal) / viewport * constant`, so the
/// more of the viewport a pull already takes, the heavier it gets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Damping {
    pub constant: f32,
}

impl Damping {
    pub fn new(constant: f32) -> Self {
        Self { constant }
    }

    pub fn scale(&self, viewport_height: i32, offset: i32, reveal_height: i32) -> f32 {
        if viewport_height <= 0 {
            return 0.0;
        }
        let remaining = viewport_height - offset.abs() - reveal_height;
        remaining as f32 / viewport_height as f32 * self.constant
    }

    /// Damp a raw finger delta
    ///
    /// A delta that rounds to zero passes through unchanged so slow drags still
    /// move. Once the pull has used up the viewport nothing passes.
    pub fn apply(&self, raw: i32, viewport_height: i32, offset: i32, reveal_height: i32) -> i32 {
        let scale = self.scale(viewport_height, offset, reveal_height);
        if scale <= 0.0 {
            return 0;
        }
        let damped = (raw as f32 * scale).round() as i32;
        if damped == 0 {
            raw
        } else {
            damped
        }
    }
}

impl Default for Damping {
    fn default() -> Self {
        Self::new(0.4)
    }
}

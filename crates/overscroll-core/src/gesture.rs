//! Touch-to-drag state machine and drag routing.
//!
//! [`GestureStateMachine`] turns raw touch samples into drag deltas and a
//! release velocity. [`route_drag`] decides where a drag delta goes: to the
//! header/footer pull path when the list sits on an edge, or back to the host
//! for its normal scrolling.

use std::collections::VecDeque;

use tracing::trace;

use crate::config::PhysicsConfig;
use crate::edge::{edge_hit, EdgeHit};
use crate::host::LayoutSnapshot;
use crate::pull::Damping;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    Down,
    Move,
    Up,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchSample {
    pub y: f32,
    pub timestamp_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub action: TouchAction,
    pub sample: TouchSample,
}

impl TouchEvent {
    pub fn new(action: TouchAction, y: f32, timestamp_ms: i64) -> Self {
        Self {
            action,
            sample: TouchSample { y, timestamp_ms },
        }
    }

    pub fn down(y: f32, timestamp_ms: i64) -> Self {
        Self::new(TouchAction::Down, y, timestamp_ms)
    }

    pub fn moved(y: f32, timestamp_ms: i64) -> Self {
        Self::new(TouchAction::Move, y, timestamp_ms)
    }

    pub fn up(y: f32, timestamp_ms: i64) -> Self {
        Self::new(TouchAction::Up, y, timestamp_ms)
    }

    pub fn cancel(y: f32, timestamp_ms: i64) -> Self {
        Self::new(TouchAction::Cancel, y, timestamp_ms)
    }
}

/// Release velocity estimate over the recent samples of one gesture
///
/// Each segment between consecutive samples contributes its velocity weighted
/// by its duration, so a single noisy sample cannot dominate.
#[derive(Debug, Clone)]
pub struct VelocityTracker {
    samples: VecDeque<TouchSample>,
    horizon_ms: i64,
}

impl VelocityTracker {
    pub fn new(horizon_ms: i64) -> Self {
        Self {
            samples: VecDeque::new(),
            horizon_ms: horizon_ms.max(1),
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn add(&mut self, sample: TouchSample) {
        if let Some(last) = self.samples.back() {
            if sample.timestamp_ms < last.timestamp_ms {
                // clock went backwards, start over
                self.samples.clear();
            }
        }
        self.samples.push_back(sample);

        let cutoff = sample.timestamp_ms - self.horizon_ms;
        while let Some(front) = self.samples.front() {
            if front.timestamp_ms < cutoff {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    /// Pixels per second, positive when the finger moves down
    pub fn velocity(&self) -> f32 {
        let mut weighted = 0.0_f32;
        let mut total_dt = 0_i64;

        for (a, b) in self.samples.iter().zip(self.samples.iter().skip(1)) {
            let dt = b.timestamp_ms - a.timestamp_ms;
            if dt <= 0 {
                continue;
            }
            let segment = (b.y - a.y) / dt as f32 * 1000.0;
            weighted += segment * dt as f32;
            total_dt += dt;
        }

        if total_dt == 0 {
            0.0
        } else {
            weighted / total_dt as f32
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureState {
    pub is_touching: bool,
    pub is_dragging: bool,
    pub last_y: f32,
    /// Pointer position where the drag left the slop
    pub drag_start_y: f32,
}

/// What a touch event amounted to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureStep {
    Pressed,
    /// Move with no whole-pixel motion
    Still,
    /// Move still within the touch slop
    Pending,
    /// Move that crossed the slop; its own distance is not applied
    DragStarted,
    Drag(i32),
    Released { velocity: f32 },
}

#[derive(Debug, Clone)]
pub struct GestureStateMachine {
    state: GestureState,
    tracker: VelocityTracker,
    slop: i32,
    max_velocity: f32,
}

impl GestureStateMachine {
    pub fn new(config: &PhysicsConfig) -> Self {
        Self {
            state: GestureState::default(),
            tracker: VelocityTracker::new(config.velocity_horizon_ms),
            slop: config.touch_slop_px(),
            max_velocity: config.max_fling_velocity_px(),
        }
    }

    #[inline]
    pub fn is_touching(&self) -> bool {
        self.state.is_touching
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.state.is_dragging
    }

    /// Clamped velocity of the current or last gesture
    pub fn velocity(&self) -> f32 {
        self.tracker
            .velocity()
            .clamp(-self.max_velocity, self.max_velocity)
    }

    pub fn handle(&mut self, event: TouchEvent) -> GestureStep {
        let y = event.sample.y;
        match event.action {
            TouchAction::Down => self.press(event.sample),
            TouchAction::Move => {
                if !self.state.is_touching {
                    // a move without a down: treat it as the down
                    return self.press(event.sample);
                }
                self.tracker.add(event.sample);

                let delta = (y - self.state.last_y) as i32;
                if delta == 0 {
                    return GestureStep::Still;
                }

                if self.state.is_dragging {
                    self.state.last_y = y;
                    GestureStep::Drag(delta)
                } else if delta.abs() > self.slop {
                    self.state.is_dragging = true;
                    self.state.last_y = y;
                    self.state.drag_start_y = y;
                    GestureStep::DragStarted
                } else {
                    GestureStep::Pending
                }
            }
            TouchAction::Up | TouchAction::Cancel => {
                if self.state.is_touching {
                    self.tracker.add(event.sample);
                }
                if self.state.is_dragging {
                    trace!("Drag ended {} px from its start", y - self.state.drag_start_y);
                }
                self.state.is_touching = false;
                self.state.is_dragging = false;
                GestureStep::Released {
                    velocity: self.velocity(),
                }
            }
        }
    }

    fn press(&mut self, sample: TouchSample) -> GestureStep {
        self.state = GestureState {
            is_touching: true,
            is_dragging: false,
            last_y: sample.y,
            drag_start_y: sample.y,
        };
        self.tracker.clear();
        self.tracker.add(sample);
        GestureStep::Pressed
    }
}

/// The list-side operations a drag is routed through
///
/// `scroll_down` takes a positive delta (finger moving down), `scroll_up` a
/// negative one. The same two operations serve spring-back animation ticks.
pub trait DragSurface {
    fn layout(&self) -> LayoutSnapshot;
    fn offset(&self) -> i32;
    fn header_reveal(&self) -> i32;
    fn scroll_down(&mut self, delta: i32);
    fn scroll_up(&mut self, delta: i32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Delta went through the pull path
    Routed,
    /// Not at an edge, the host scrolls
    Host,
}

/// Route one drag delta
pub fn route_drag<S: DragSurface + ?Sized>(
    surface: &mut S,
    delta: i32,
    damping: Damping,
) -> RouteOutcome {
    let layout = surface.layout();
    let Some(edge) = edge_hit(&layout) else {
        return RouteOutcome::Host;
    };

    let offset = surface.offset();
    let delta = damping.apply(
        delta,
        layout.viewport_height,
        offset,
        surface.header_reveal(),
    );
    if delta == 0 {
        return RouteOutcome::Routed;
    }

    match edge {
        EdgeHit::Top => {
            if delta > 0 {
                surface.scroll_down(delta);
            } else {
                surface.scroll_up(delta);
            }
        }
        EdgeHit::Bottom => {
            if delta > 0 {
                // pulling back a bottom over-scroll; plain downward scrolling is the host's
                if offset > 0 {
                    surface.scroll_down(delta.min(offset));
                }
            } else {
                surface.scroll_up(delta);
            }
        }
    }
    RouteOutcome::Routed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> GestureStateMachine {
        GestureStateMachine::new(&PhysicsConfig::default())
    }

    #[test]
    fn test_slop_gates_dragging() {
        let mut gesture = machine();
        assert_eq!(gesture.handle(TouchEvent::down(100.0, 0)), GestureStep::Pressed);
        assert_eq!(gesture.handle(TouchEvent::moved(100.4, 5)), GestureStep::Still);
        assert_eq!(gesture.handle(TouchEvent::moved(105.0, 10)), GestureStep::Pending);
        assert!(!gesture.is_dragging());

        assert_eq!(gesture.handle(TouchEvent::moved(110.0, 15)), GestureStep::DragStarted);
        assert!(gesture.is_dragging());
        assert_eq!(gesture.handle(TouchEvent::moved(125.0, 20)), GestureStep::Drag(15));
        assert_eq!(gesture.handle(TouchEvent::moved(120.0, 25)), GestureStep::Drag(-5));
    }

    #[test]
    fn test_release_resets_state() {
        let mut gesture = machine();
        gesture.handle(TouchEvent::down(0.0, 0));
        gesture.handle(TouchEvent::moved(20.0, 10));
        let step = gesture.handle(TouchEvent::up(20.0, 20));
        assert!(matches!(step, GestureStep::Released { .. }));
        assert!(!gesture.is_touching());
        assert!(!gesture.is_dragging());
    }

    #[test]
    fn test_move_without_down_starts_gesture() {
        let mut gesture = machine();
        assert_eq!(gesture.handle(TouchEvent::moved(50.0, 0)), GestureStep::Pressed);
        assert!(gesture.is_touching());
    }

    #[test]
    fn test_velocity_is_time_weighted() {
        let mut tracker = VelocityTracker::new(100);
        tracker.add(TouchSample { y: 0.0, timestamp_ms: 0 });
        tracker.add(TouchSample { y: 10.0, timestamp_ms: 10 });
        // one short noisy segment
        tracker.add(TouchSample { y: 20.0, timestamp_ms: 11 });
        tracker.add(TouchSample { y: 30.0, timestamp_ms: 30 });
        // total displacement over total time
        assert!((tracker.velocity() - 1000.0).abs() < 0.5);
    }

    #[test]
    fn test_velocity_forgets_old_samples() {
        let mut tracker = VelocityTracker::new(100);
        tracker.add(TouchSample { y: 0.0, timestamp_ms: 0 });
        tracker.add(TouchSample { y: 500.0, timestamp_ms: 10 });
        tracker.add(TouchSample { y: 500.0, timestamp_ms: 200 });
        tracker.add(TouchSample { y: 500.0, timestamp_ms: 250 });
        assert_eq!(tracker.velocity(), 0.0);
    }

    #[test]
    fn test_velocity_is_clamped() {
        let mut gesture = machine();
        gesture.handle(TouchEvent::down(0.0, 0));
        gesture.handle(TouchEvent::moved(400.0, 1));
        match gesture.handle(TouchEvent::up(400.0, 1)) {
            GestureStep::Released { velocity } => assert_eq!(velocity, 8000.0),
            other => panic!("unexpected step {:?}", other),
        }
    }

    struct Surface {
        layout: LayoutSnapshot,
        offset: i32,
        downs: Vec<i32>,
        ups: Vec<i32>,
    }

    impl DragSurface for Surface {
        fn layout(&self) -> LayoutSnapshot {
            self.layout
        }
        fn offset(&self) -> i32 {
            self.offset
        }
        fn header_reveal(&self) -> i32 {
            0
        }
        fn scroll_down(&mut self, delta: i32) {
            self.downs.push(delta);
        }
        fn scroll_up(&mut self, delta: i32) {
            self.ups.push(delta);
        }
    }

    fn surface(first: usize, last: usize, top: i32, bottom: i32, offset: i32) -> Surface {
        Surface {
            layout: LayoutSnapshot {
                item_count: 50,
                first_visible: first,
                last_visible: last,
                first_item_top: top,
                last_item_bottom: bottom,
                viewport_height: 800,
            },
            offset,
            downs: Vec::new(),
            ups: Vec::new(),
        }
    }

    #[test]
    fn test_route_in_the_middle_goes_to_host() {
        let mut s = surface(10, 20, -3, 805, 0);
        assert_eq!(route_drag(&mut s, 20, Damping::default()), RouteOutcome::Host);
        assert!(s.downs.is_empty() && s.ups.is_empty());
    }

    #[test]
    fn test_route_at_top_is_damped() {
        let mut s = surface(0, 10, 0, 900, 0);
        route_drag(&mut s, 20, Damping::default());
        route_drag(&mut s, -20, Damping::default());
        assert_eq!(s.downs, vec![8]);
        assert_eq!(s.ups, vec![-8]);
    }

    #[test]
    fn test_route_at_bottom_only_pulls_back_overscroll() {
        let mut s = surface(40, 49, -10, 800, 0);
        route_drag(&mut s, 20, Damping::default());
        assert!(s.downs.is_empty());

        let mut s = surface(40, 49, -10, 800, 5);
        route_drag(&mut s, 40, Damping::default());
        assert_eq!(s.downs, vec![5]);
    }
}

//! L3 Molecular Layer: Scroll animation controller
//!
//! Combines easing functions and timing utilities into a single-task animator.
//! The animator knows nothing about lists: it only turns a start offset, a target
//! offset and a duration into "the offset for now".

use crate::config::PhysicsConfig;

use super::easing::Interpolator;
use super::timing::{is_complete, lerp_i32, progress};

/// What an animation is doing, decides how its deltas are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationKind {
    /// Return offset and reveal height to rest
    SpringBack,
    /// Overshoot past an edge after a fling, applied to the offset only
    Fling,
}

/// Active animation state
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationTask {
    pub from: i32,
    pub to: i32,
    pub start_ms: i64,
    pub duration_ms: i64,
    pub kind: AnimationKind,
}

/// One computed animation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationFrame {
    /// Interpolated offset for the requested time
    pub offset: i32,
    pub kind: AnimationKind,
    /// True on the step that reached the target; the animator is idle afterwards
    pub finished: bool,
}

/// Scroll animation controller
///
/// Holds at most one task. Starting a new task supersedes the running one,
/// nothing is queued. Call `compute()` every frame while `is_animating()`.
#[derive(Debug, Clone)]
pub struct ScrollAnimator {
    /// Current active animation (if any)
    task: Option<AnimationTask>,
    interpolator: Interpolator,
    /// Duration used by `start()`
    duration_ms: i64,
    /// The task's start time is taken from the first `compute()`
    anchor_pending: bool,
}

impl Default for ScrollAnimator {
    fn default() -> Self {
        Self::new(Interpolator::default(), 350)
    }
}

impl ScrollAnimator {
    pub fn new(interpolator: Interpolator, duration_ms: i64) -> Self {
        Self {
            task: None,
            interpolator,
            duration_ms,
            anchor_pending: false,
        }
    }

    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self::new(
            Interpolator::new(config.easing, config.deceleration_factor),
            config.spring_back_duration_ms as i64,
        )
    }

    pub fn interpolator(&self) -> Interpolator {
        self.interpolator
    }

    pub fn duration_ms(&self) -> i64 {
        self.duration_ms
    }

    /// Check if an animation is currently active
    #[inline]
    pub fn is_animating(&self) -> bool {
        self.task.is_some()
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.task.is_none()
    }

    pub fn task(&self) -> Option<&AnimationTask> {
        self.task.as_ref()
    }

    /// Start an animation with the default duration
    ///
    /// A zero-distance task is kept: it still produces one finishing frame.
    pub fn start(&mut self, from: i32, to: i32, now_ms: i64, kind: AnimationKind) {
        self.start_with_duration(from, to, now_ms, self.duration_ms, kind);
    }

    pub fn start_with_duration(
        &mut self,
        from: i32,
        to: i32,
        now_ms: i64,
        duration_ms: i64,
        kind: AnimationKind,
    ) {
        self.anchor_pending = false;
        self.task = Some(AnimationTask {
            from,
            to,
            start_ms: now_ms,
            duration_ms: duration_ms.max(0),
            kind,
        });
    }

    /// Start an animation whose clock starts at the next `compute()`
    ///
    /// For callers that have no timestamp at hand, e.g. a completion signal
    /// arriving between frames.
    pub fn start_on_next_frame(&mut self, from: i32, to: i32, kind: AnimationKind) {
        self.start(from, to, 0, kind);
        self.anchor_pending = true;
    }

    /// Advance to `now_ms`
    ///
    /// Returns `None` when idle. The step that reaches the target returns the
    /// exact target with `finished` set and drops the task.
    pub fn compute(&mut self, now_ms: i64) -> Option<AnimationFrame> {
        if self.anchor_pending {
            self.anchor_pending = false;
            if let Some(task) = self.task.as_mut() {
                task.start_ms = now_ms;
            }
        }
        let task = self.task.as_ref()?;
        let kind = task.kind;

        if is_complete(task.start_ms, task.duration_ms, now_ms) {
            let offset = task.to;
            self.task = None;
            return Some(AnimationFrame {
                offset,
                kind,
                finished: true,
            });
        }

        let t = progress(task.start_ms, task.duration_ms, now_ms);
        Some(AnimationFrame {
            offset: lerp_i32(task.from, task.to, self.interpolator.apply(t)),
            kind,
            finished: false,
        })
    }

    /// Cancel any active animation
    pub fn cancel(&mut self) {
        self.task = None;
        self.anchor_pending = false;
    }
}

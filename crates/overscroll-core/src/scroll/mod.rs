//! Time-parameterized scroll animation
//!
//! # Architecture
//!
//! ## L4 Atomic Layer
//! - `easing` - Pure easing functions (cubic, quintic, exponential, decelerate)
//! - `timing` - Time calculation utilities (progress, interpolation)
//!
//! ## L3 Molecular Layer
//! - `animation` - Single-task animator combining atoms
//!
//! # Usage
//!
//! ```
//! use overscroll_core::scroll::{AnimationKind, ScrollAnimator};
//!
//! let mut animator = ScrollAnimator::default();
//! animator.start(-120, 0, 0, AnimationKind::SpringBack);
//!
//! // Once per frame
//! let mut now = 0;
//! while let Some(frame) = animator.compute(now) {
//!     now += 16;
//!     if frame.finished {
//!         assert_eq!(frame.offset, 0);
//!     }
//! }
//! ```

// L4 Atomic Layer
pub mod easing;
pub mod timing;

// L3 Molecular Layer
pub mod animation;

// Re-exports for convenient access
pub use animation::{AnimationFrame, AnimationKind, AnimationTask, ScrollAnimator};
pub use easing::{EasingType, Interpolator};

pub mod resolve;
pub mod smoothing;
pub mod stats;

pub use resolve::{MotionState, ResolvedPosition, RouteResolver};
pub use smoothing::{smooth, AnimationSpeed, Easing, Smoother};
pub use stats::RouteStats;

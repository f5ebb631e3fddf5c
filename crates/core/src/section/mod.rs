//! Per-section reveal orchestration: one observer per section, children
//! cascaded by computed delay.

pub mod controller;
pub mod presentation;
pub mod stagger;

pub use controller::{ControllerOptions, SectionAnimationController, route};
pub use presentation::{DEFAULT_DURATION_MS, present, progress};
pub use stagger::{DEFAULT_STEP_MS, StaggerPlan, delay_for};

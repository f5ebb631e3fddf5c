//! Scroll-driven reveal orchestration.
//!
//! ```text
//!   host primitive ──▶ IntersectionEntry ──▶ VisibilityObserver ──▶ SectionAnimationController
//!   (DOM, simulated)     (ratio, time)         (threshold, once)       (visible, delay_for(i))
//!                                                                              │
//!                                                         present(preset, ..)  ▼
//!                                                              RevealStyle ──▶ renderer
//! ```
//!
//! One observer watches each section root. Children never get observers
//! of their own: they share the section's transition and are offset by a
//! [`StaggerPlan`](section::StaggerPlan).

pub mod config;
pub mod observe;
pub mod page;
pub mod section;

pub use config::{ConfigError, PageSpec, RevealConfig, SectionSpec};
pub use observe::{
    IntersectionEntry, IntersectionHost, ObserverStatus, RootMargin, SimulatedViewport, Threshold,
    VisibilityObserver,
};
pub use page::{Page, SectionSetup};
pub use section::{ControllerOptions, SectionAnimationController, StaggerPlan, delay_for};

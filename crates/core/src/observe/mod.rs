//! Viewport visibility detection.
//!
//! A host environment supplies the intersection primitive
//! ([`IntersectionHost`]); a [`VisibilityObserver`] turns its raw entries
//! into hidden/visible transitions for one element.

pub mod geometry;
pub mod host;
pub mod margin;
pub mod observer;
pub mod options;
pub mod sim;

pub use geometry::{Intersection, intersect};
pub use host::{IntersectionEntry, IntersectionHost, WatchId, WatchParams};
pub use margin::{Length, MarginParseError, RootMargin};
pub use observer::{ObserverControl, ObserverStatus, VisibilityObserver};
pub use options::{ObserverOptions, OptionsError, Threshold};
pub use sim::{ElementId, SimulatedViewport};

//! Output contract between the reveal core and its renderers.
//!
//! Everything here is plain data: geometry, the `(visible, delay_ms)` pair
//! per item, and the resolved style a renderer applies. All types are
//! serde-serializable so they cross the WASM boundary as JSON.

pub mod frame;
pub mod motion;
pub mod reveal;
pub mod types;

pub use frame::{ChildFrame, PageFrame, SectionFrame};
pub use motion::MotionPreset;
pub use reveal::{ChildPhase, Reveal, RevealStyle};
pub use types::{EdgeInsets, Point, Rect};

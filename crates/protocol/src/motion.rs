use serde::{Deserialize, Serialize};

/// Semantic entrance motions resolved by the presentation mapping.
///
/// Renderers never see raw offsets from the core; they receive a
/// [`RevealStyle`](crate::RevealStyle) computed from one of these tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MotionPreset {
    /// Fade in while rising into place (hidden: 32px below).
    #[default]
    FadeInUp,
    /// Opacity only.
    FadeIn,
    /// Fade in while sliding in from the left (hidden: 16px to the left).
    SlideInLeft,
}

impl MotionPreset {
    /// Offset applied while hidden, in px.
    pub fn hidden_offset(self) -> (f64, f64) {
        match self {
            Self::FadeInUp => (0.0, 32.0),
            Self::FadeIn => (0.0, 0.0),
            Self::SlideInLeft => (-16.0, 0.0),
        }
    }
}

impl std::fmt::Display for MotionPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FadeInUp => write!(f, "fade-in-up"),
            Self::FadeIn => write!(f, "fade-in"),
            Self::SlideInLeft => write!(f, "slide-in-left"),
        }
    }
}

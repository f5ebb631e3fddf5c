use serde::{Deserialize, Serialize};

use crate::motion::MotionPreset;
use crate::reveal::{ChildPhase, Reveal, RevealStyle};

/// Snapshot of every section on a page at one instant.
///
/// The core emits one `PageFrame` per render; renderers consume it without
/// reaching back into controller state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageFrame {
    /// Host time the snapshot was taken at (ms).
    pub now_ms: f64,
    pub sections: Vec<SectionFrame>,
}

impl PageFrame {
    pub fn section(&self, id: &str) -> Option<&SectionFrame> {
        self.sections.iter().find(|s| s.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionFrame {
    pub id: String,
    pub visible: bool,
    pub preset: MotionPreset,
    /// Time the section last became visible, if it is visible.
    pub revealed_at: Option<f64>,
    pub children: Vec<ChildFrame>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChildFrame {
    pub index: usize,
    pub reveal: Reveal,
    pub phase: ChildPhase,
    pub style: RevealStyle,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    #[test]
    fn section_frame_json_shape() {
        let reveal = Reveal::new(true, 50);
        let frame = SectionFrame {
            id: "projects".into(),
            visible: true,
            preset: MotionPreset::SlideInLeft,
            revealed_at: Some(120.0),
            children: vec![ChildFrame {
                index: 1,
                reveal,
                phase: ChildPhase::Scheduled,
                style: RevealStyle {
                    opacity: 1.0,
                    translate: Point::ZERO,
                    duration_ms: 700,
                    delay_ms: 50,
                },
            }],
        };
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["preset"], "slide-in-left");
        assert_eq!(json["children"][0]["phase"], "scheduled");
        assert_eq!(json["children"][0]["reveal"]["delay_ms"], 50);

        let back: SectionFrame = serde_json::from_value(json).unwrap();
        assert_eq!(back, frame);
    }

    #[test]
    fn hidden_section_has_no_reveal_time() {
        let json = r#"{ "id": "about", "visible": false, "preset": "fade-in",
                        "revealed_at": null, "children": [] }"#;
        let frame: SectionFrame = serde_json::from_str(json).unwrap();
        assert!(frame.revealed_at.is_none());
        assert_eq!(frame.preset, MotionPreset::FadeIn);
    }
}

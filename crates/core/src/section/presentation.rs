use reveal_protocol::{MotionPreset, Point, Reveal, RevealStyle};

/// Transition length used by the page's reveal styling.
pub const DEFAULT_DURATION_MS: u32 = 700;

/// Map the two-value reveal contract onto concrete presentation.
///
/// Visible items sit at full opacity with no offset; hidden items are
/// transparent and displaced by the preset's offset. The delay is carried
/// through unchanged, so the cascade runs in both directions.
pub fn present(preset: MotionPreset, reveal: Reveal, duration_ms: u32) -> RevealStyle {
    let (opacity, translate) = if reveal.visible {
        (1.0, Point::ZERO)
    } else {
        let (x, y) = preset.hidden_offset();
        (0.0, Point::new(x, y))
    };
    RevealStyle {
        opacity,
        translate,
        duration_ms,
        delay_ms: reveal.delay_ms,
    }
}

/// Interpolated state of a style transition `elapsed_ms` after it started,
/// for renderers that animate frames themselves instead of handing the
/// transition to a compositor. Uses an ease-out curve.
pub fn progress(style: &RevealStyle, elapsed_ms: f64) -> f32 {
    if style.duration_ms == 0 {
        return 1.0;
    }
    let t = (elapsed_ms / f64::from(style.duration_ms)).clamp(0.0, 1.0) as f32;
    let omt = 1.0 - t;
    1.0 - omt * omt * omt
}

use std::collections::HashMap;
use std::io::{Stdout, stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Block,
};
use reveal_core::section::progress;
use reveal_core::{Page, PageSpec, SimulatedViewport};
use reveal_protocol::{ChildFrame, PageFrame};
use tracing::debug;

const LINE_STEP_PX: f64 = 40.0;
const WHEEL_STEP_PX: f64 = 60.0;
/// Fraction of the remaining distance covered per tick.
const SCROLL_EASE: f64 = 0.35;

/// Eased scroll position: input moves the target, each tick moves the
/// position part of the way there.
#[derive(Debug, Clone)]
struct Scroll {
    current: f64,
    target: f64,
    max: f64,
}

impl Scroll {
    fn new(max: f64) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            max: max.max(0.0),
        }
    }

    fn by(&mut self, dy: f64) {
        self.to(self.target + dy);
    }

    fn to(&mut self, y: f64) {
        self.target = y.clamp(0.0, self.max);
    }

    /// Advance one tick. Returns whether the position moved.
    fn tick(&mut self) -> bool {
        let remaining = self.target - self.current;
        if remaining == 0.0 {
            return false;
        }
        if remaining.abs() < 0.5 {
            self.current = self.target;
        } else {
            self.current += remaining * SCROLL_EASE;
        }
        true
    }
}

/// When each section last changed state, so exits cascade out the same way
/// entrances cascade in.
#[derive(Debug, Default)]
struct Flips {
    last: HashMap<String, (bool, f64)>,
}

impl Flips {
    fn observe(&mut self, frame: &PageFrame) {
        for section in &frame.sections {
            let entry = self
                .last
                .entry(section.id.clone())
                .or_insert((false, f64::NEG_INFINITY));
            if entry.0 != section.visible {
                *entry = (
                    section.visible,
                    section.revealed_at.unwrap_or(frame.now_ms),
                );
            }
        }
    }

    fn since(&self, id: &str) -> f64 {
        self.last.get(id).map_or(f64::NEG_INFINITY, |&(_, at)| at)
    }
}

/// How much of a child is on screen, 0 (hidden) to 1 (in place).
fn shown(child: &ChildFrame, visible: bool, flipped_at: f64, now_ms: f64) -> f32 {
    let start = flipped_at + f64::from(child.reveal.delay_ms);
    let p = progress(&child.style, now_ms - start);
    if visible { p } else { 1.0 - p }
}

fn put(buf: &mut Buffer, area: Rect, col: i32, row: i32, text: &str, style: Style) {
    if row < 0 || row >= i32::from(area.height) {
        return;
    }
    let y = area.y + row as u16;
    for (i, ch) in text.chars().enumerate() {
        let x = col + i as i32;
        if x < 0 {
            continue;
        }
        if x >= i32::from(area.width) {
            break;
        }
        buf[(area.x + x as u16, y)].set_char(ch).set_style(style);
    }
}

fn draw(
    f: &mut Frame,
    page: &PageFrame,
    layout: &[reveal_protocol::Rect],
    flips: &Flips,
    scroll_y: f64,
    viewport_height: f64,
) {
    let area = f.area();

    let visible = page.sections.iter().filter(|s| s.visible).count();
    let header = Block::default()
        .title(format!(
            " reveal | {visible}/{} sections visible | {scroll_y:.0}px | ↑↓ PgUp PgDn wheel | q quit ",
            page.sections.len()
        ))
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));
    f.render_widget(header, Rect::new(0, 0, area.width, 1));

    let content = Rect::new(0, 1, area.width, area.height.saturating_sub(1));
    f.render_widget(
        Block::default().style(Style::default().bg(Color::Black)),
        content,
    );
    if content.height == 0 {
        return;
    }

    let px_per_row = viewport_height / f64::from(content.height);
    let rule = "─".repeat(usize::from(content.width));
    let buf = f.buffer_mut();

    for (section, rect) in page.sections.iter().zip(layout) {
        let top = ((rect.y - scroll_y) / px_per_row).floor() as i32;
        let rows = (rect.h / px_per_row).floor().max(1.0) as i32;

        let accent = if section.visible {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let marker = if section.visible { '●' } else { '○' };
        let base = Style::default().bg(Color::Black);
        put(buf, content, 0, top, &rule, base.fg(Color::DarkGray));
        put(
            buf,
            content,
            2,
            top,
            &format!(" {marker} {} [{}] ", section.id, section.preset),
            base.fg(accent),
        );

        let flipped_at = flips.since(&section.id);
        let (hidden_x, hidden_y) = section.preset.hidden_offset();
        for child in &section.children {
            let slot = 2 + child.index as i32 * 2;
            if slot >= rows {
                break;
            }
            let amount = shown(child, section.visible, flipped_at, page.now_ms);
            if amount <= 0.02 {
                continue;
            }
            let rest = f64::from(1.0 - amount);
            let dx = (hidden_x * rest / 4.0).round() as i32;
            let dy = (hidden_y * rest / px_per_row).round() as i32;
            let level = (40.0 + 215.0 * amount) as u8;
            put(
                buf,
                content,
                4 + dx,
                top + slot + dy,
                &format!(
                    "▌ item {:<3} +{}ms",
                    child.index + 1,
                    child.reveal.delay_ms
                ),
                base.fg(Color::Rgb(level, level, level)),
            );
        }
    }
}

pub fn run(page: &mut Page<SimulatedViewport>, spec: &PageSpec) -> Result<()> {
    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, page, spec);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    page: &mut Page<SimulatedViewport>,
    spec: &PageSpec,
) -> Result<()> {
    let layout: Vec<reveal_protocol::Rect> =
        spec.layout().into_iter().map(|(_, rect)| rect).collect();
    let viewport_height = spec.viewport_height;
    let page_step = viewport_height * 0.9;

    let clock = Instant::now();
    let mut scroll = Scroll::new(spec.total_height() - viewport_height);
    let mut flips = Flips::default();

    loop {
        let now_ms = clock.elapsed().as_secs_f64() * 1000.0;
        if scroll.tick() {
            page.host().scroll_to(scroll.current, now_ms);
        }
        let transitions = page.pump();
        if transitions > 0 {
            debug!(transitions, scroll_y = scroll.current, "pumped");
        }

        let frame = page.snapshot(now_ms);
        flips.observe(&frame);
        terminal.draw(|f| draw(f, &frame, &layout, &flips, scroll.current, viewport_height))?;

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Up | KeyCode::Char('k') => scroll.by(-LINE_STEP_PX),
                    KeyCode::Down | KeyCode::Char('j') => scroll.by(LINE_STEP_PX),
                    KeyCode::PageUp => scroll.by(-page_step),
                    KeyCode::PageDown | KeyCode::Char(' ') => scroll.by(page_step),
                    KeyCode::Home => scroll.to(0.0),
                    KeyCode::End => scroll.to(f64::INFINITY),
                    _ => {}
                },
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollDown => scroll.by(WHEEL_STEP_PX),
                    MouseEventKind::ScrollUp => scroll.by(-WHEEL_STEP_PX),
                    _ => {}
                },
                _ => {}
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use reveal_core::section::present;
    use reveal_protocol::{ChildPhase, MotionPreset, Reveal, SectionFrame};

    use super::*;

    fn child(visible: bool, delay_ms: u32) -> ChildFrame {
        let reveal = Reveal::new(visible, delay_ms);
        ChildFrame {
            index: 0,
            reveal,
            phase: ChildPhase::Hidden,
            style: present(MotionPreset::FadeInUp, reveal, 100),
        }
    }

    #[test]
    fn scroll_eases_toward_clamped_target() {
        let mut scroll = Scroll::new(500.0);
        scroll.by(1_000.0);
        assert_eq!(scroll.target, 500.0);
        assert!(scroll.tick());
        assert!(scroll.current > 0.0 && scroll.current < 500.0);
        while scroll.tick() {}
        assert_eq!(scroll.current, 500.0);
        scroll.to(-20.0);
        assert_eq!(scroll.target, 0.0);
    }

    #[test]
    fn children_wait_for_their_delay() {
        let c = child(true, 50);
        assert_eq!(shown(&c, true, 1_000.0, 1_040.0), 0.0);
        assert_eq!(shown(&c, true, 1_000.0, 1_150.0), 1.0);

        let c = child(false, 50);
        assert_eq!(shown(&c, false, 1_000.0, 1_040.0), 1.0);
        assert_eq!(shown(&c, false, 1_000.0, 1_150.0), 0.0);
        // Never revealed.
        assert_eq!(shown(&c, false, f64::NEG_INFINITY, 0.0), 0.0);
    }

    #[test]
    fn flips_record_transition_times() {
        let mut flips = Flips::default();
        let section = |visible, revealed_at| SectionFrame {
            id: "hero".into(),
            visible,
            preset: MotionPreset::FadeInUp,
            revealed_at,
            children: Vec::new(),
        };
        flips.observe(&PageFrame {
            now_ms: 10.0,
            sections: vec![section(false, None)],
        });
        assert_eq!(flips.since("hero"), f64::NEG_INFINITY);

        flips.observe(&PageFrame {
            now_ms: 30.0,
            sections: vec![section(true, Some(20.0))],
        });
        assert_eq!(flips.since("hero"), 20.0);

        flips.observe(&PageFrame {
            now_ms: 90.0,
            sections: vec![section(false, None)],
        });
        assert_eq!(flips.since("hero"), 90.0);
    }
}

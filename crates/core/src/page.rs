//! A page of revealable sections sharing one intersection host.

use reveal_protocol::{MotionPreset, PageFrame, SectionFrame};
use tracing::{debug, info};

use crate::config::{ConfigError, PageSpec};
use crate::observe::{IntersectionHost, ObserverStatus, SimulatedViewport};
use crate::section::{ControllerOptions, DEFAULT_DURATION_MS, SectionAnimationController, route};

/// How a section is set up on a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionSetup {
    pub options: ControllerOptions,
    pub child_count: usize,
    pub preset: MotionPreset,
    pub duration_ms: u32,
}

impl Default for SectionSetup {
    fn default() -> Self {
        Self {
            options: ControllerOptions::default(),
            child_count: 0,
            preset: MotionPreset::default(),
            duration_ms: DEFAULT_DURATION_MS,
        }
    }
}

#[derive(Debug)]
pub struct Section<H: IntersectionHost> {
    id: String,
    controller: SectionAnimationController<H>,
    child_count: usize,
    preset: MotionPreset,
    duration_ms: u32,
}

impl<H: IntersectionHost> Section<H> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn controller(&self) -> &SectionAnimationController<H> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SectionAnimationController<H> {
        &mut self.controller
    }

    pub fn child_count(&self) -> usize {
        self.child_count
    }

    pub fn preset(&self) -> MotionPreset {
        self.preset
    }

    fn frame(&self, now_ms: f64) -> SectionFrame {
        SectionFrame {
            id: self.id.clone(),
            visible: self.controller.visible(),
            preset: self.preset,
            revealed_at: self.controller.revealed_at(),
            children: self.controller.child_frames(
                self.child_count,
                now_ms,
                self.preset,
                self.duration_ms,
            ),
        }
    }
}

/// Ordered sections plus the host they are observed through.
///
/// The host's entry queue is shared by every section; [`pump`](Self::pump)
/// drains it once and routes each entry to the section whose watch produced
/// it, in delivery order.
#[derive(Debug)]
pub struct Page<H: IntersectionHost + Clone> {
    host: H,
    sections: Vec<Section<H>>,
}

impl<H: IntersectionHost + Clone> Page<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            sections: Vec::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Add a section and bind it to `root`. A section with the same id is
    /// torn down and replaced.
    pub fn add_section(
        &mut self,
        id: impl Into<String>,
        root: &H::Target,
        setup: SectionSetup,
    ) -> ObserverStatus {
        let id = id.into();
        self.remove_section(&id);

        let mut controller = SectionAnimationController::new(self.host.clone(), setup.options);
        let status = controller.bind_root(root);
        debug!(section = %id, ?status, children = setup.child_count, "section added");
        self.sections.push(Section {
            id,
            controller,
            child_count: setup.child_count,
            preset: setup.preset,
            duration_ms: setup.duration_ms,
        });
        status
    }

    /// Remove a section, releasing its watch. Returns whether it existed.
    pub fn remove_section(&mut self, id: &str) -> bool {
        let Some(pos) = self.sections.iter().position(|s| s.id == id) else {
            return false;
        };
        let mut section = self.sections.remove(pos);
        section.controller.teardown();
        true
    }

    pub fn section(&self, id: &str) -> Option<&Section<H>> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn section_mut(&mut self, id: &str) -> Option<&mut Section<H>> {
        self.sections.iter_mut().find(|s| s.id == id)
    }

    pub fn sections(&self) -> &[Section<H>] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Deliver every queued host entry. Returns the number of section
    /// transitions that resulted.
    pub fn pump(&mut self) -> usize {
        let entries = self.host.drain();
        let mut controllers: Vec<_> = self
            .sections
            .iter_mut()
            .map(|s| &mut s.controller)
            .collect();
        route(&mut controllers, entries)
    }

    /// Snapshot every section for the renderer.
    pub fn snapshot(&self, now_ms: f64) -> PageFrame {
        PageFrame {
            now_ms,
            sections: self.sections.iter().map(|s| s.frame(now_ms)).collect(),
        }
    }
}

impl Page<SimulatedViewport> {
    /// Lay out `spec` on a fresh simulated viewport and bind every section.
    pub fn simulate(spec: &PageSpec) -> Result<Self, ConfigError> {
        spec.validate()?;
        let host = SimulatedViewport::new(spec.viewport_width, spec.viewport_height);
        let mut page = Page::new(host.clone());
        for (section, rect) in spec.layout() {
            let config = spec.config_for(section);
            let element = host.add_element(rect);
            page.add_section(
                section.id.clone(),
                &element,
                SectionSetup {
                    options: config.controller_options()?,
                    child_count: section.items,
                    preset: config.preset,
                    duration_ms: config.duration_ms,
                },
            );
        }
        info!(
            sections = page.len(),
            height = spec.total_height(),
            "simulated page ready"
        );
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use reveal_protocol::{ChildPhase, Rect};

    use super::*;
    use crate::config::SectionSpec;

    fn two_sections() -> PageSpec {
        let mut spec = PageSpec::portfolio();
        spec.viewport_height = 600.0;
        spec.sections = vec![
            SectionSpec::new("top", 600.0, 2),
            SectionSpec::new("bottom", 600.0, 3),
        ];
        spec
    }

    #[test]
    fn simulate_binds_every_section() {
        let page = Page::simulate(&two_sections()).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page.host().active_watches(), 2);
        assert!(
            page.sections()
                .iter()
                .all(|s| s.controller().status() == ObserverStatus::Observing)
        );
    }

    #[test]
    fn pump_routes_entries_to_their_sections() {
        let mut page = Page::simulate(&two_sections()).unwrap();
        assert_eq!(page.pump(), 1);
        assert!(page.section("top").unwrap().controller().visible());
        assert!(!page.section("bottom").unwrap().controller().visible());

        page.host().scroll_to(600.0, 500.0);
        assert_eq!(page.pump(), 2);
        assert!(!page.section("top").unwrap().controller().visible());
        assert!(page.section("bottom").unwrap().controller().visible());
    }

    #[test]
    fn snapshot_carries_reveal_style_and_phase() {
        let mut page = Page::simulate(&two_sections()).unwrap();
        page.pump();
        let frame = page.snapshot(25.0);
        let top = frame.section("top").unwrap();
        assert!(top.visible);
        assert_eq!(top.revealed_at, Some(0.0));
        assert_eq!(top.children.len(), 2);
        assert_eq!(top.children[1].reveal.delay_ms, 50);
        assert_eq!(top.children[0].phase, ChildPhase::Started);
        assert_eq!(top.children[1].phase, ChildPhase::Scheduled);
        assert_eq!(top.children[1].style.opacity, 1.0);

        let bottom = frame.section("bottom").unwrap();
        assert!(bottom.children.iter().all(|c| c.phase == ChildPhase::Hidden));
        assert!(bottom.children.iter().all(|c| c.style.opacity == 0.0));
    }

    #[test]
    fn removing_a_section_releases_its_watch() {
        let mut page = Page::simulate(&two_sections()).unwrap();
        assert!(page.remove_section("top"));
        assert!(!page.remove_section("top"));
        assert_eq!(page.host().active_watches(), 1);
    }

    #[test]
    fn dropping_the_page_releases_everything() {
        let page = Page::simulate(&two_sections()).unwrap();
        let host = page.host().clone();
        drop(page);
        assert_eq!(host.active_watches(), 0);
    }

    #[test]
    fn re_adding_an_id_replaces_the_section() {
        let host = SimulatedViewport::new(800.0, 600.0);
        let a = host.add_element(Rect::new(0.0, 0.0, 800.0, 300.0));
        let b = host.add_element(Rect::new(0.0, 300.0, 800.0, 300.0));
        let mut page = Page::new(host.clone());
        page.add_section("hero", &a, SectionSetup::default());
        page.add_section("hero", &b, SectionSetup::default());
        assert_eq!(page.len(), 1);
        assert_eq!(host.active_watches(), 1);
    }
}

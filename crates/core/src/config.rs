//! Reveal configuration and page layout descriptions.
//!
//! A page is described as a vertical stack of sections, each with a height,
//! a number of revealable children, and optional per-section overrides of
//! the page-wide [`RevealConfig`]. Layouts are read from JSON.

use std::collections::HashSet;

use reveal_protocol::{MotionPreset, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observe::{MarginParseError, ObserverOptions, OptionsError, RootMargin, Threshold};
use crate::section::{ControllerOptions, DEFAULT_DURATION_MS, DEFAULT_STEP_MS, StaggerPlan};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("root margin: {0}")]
    Margin(#[from] MarginParseError),
    #[error("options: {0}")]
    Options(#[from] OptionsError),
    #[error("page has no sections")]
    EmptyPage,
    #[error("section `{0}` is defined more than once")]
    DuplicateSection(String),
    #[error("section `{id}` has invalid height {height}")]
    InvalidHeight { id: String, height: f64 },
    #[error("section `{id}` has invalid top {top}")]
    InvalidTop { id: String, top: f64 },
}

/// Reveal behaviour for one section (or, as page defaults, for all).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub threshold: f64,
    pub trigger_once: bool,
    pub root_margin: RootMargin,
    pub step_ms: u32,
    pub base_ms: u32,
    pub duration_ms: u32,
    pub preset: MotionPreset,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: Threshold::DEFAULT.get(),
            trigger_once: false,
            root_margin: RootMargin::default(),
            step_ms: DEFAULT_STEP_MS,
            base_ms: 0,
            duration_ms: DEFAULT_DURATION_MS,
            preset: MotionPreset::default(),
        }
    }
}

impl RevealConfig {
    pub fn with_overrides(&self, overrides: &RevealOverrides) -> RevealConfig {
        RevealConfig {
            threshold: overrides.threshold.unwrap_or(self.threshold),
            trigger_once: overrides.trigger_once.unwrap_or(self.trigger_once),
            root_margin: overrides.root_margin.unwrap_or(self.root_margin),
            step_ms: overrides.step_ms.unwrap_or(self.step_ms),
            base_ms: overrides.base_ms.unwrap_or(self.base_ms),
            duration_ms: overrides.duration_ms.unwrap_or(self.duration_ms),
            preset: overrides.preset.unwrap_or(self.preset),
        }
    }

    pub fn controller_options(&self) -> Result<ControllerOptions, ConfigError> {
        Ok(ControllerOptions {
            observer: ObserverOptions::new(
                Threshold::new(self.threshold)?,
                self.root_margin,
                self.trigger_once,
            ),
            stagger: StaggerPlan::new(self.step_ms, self.base_ms),
        })
    }
}

/// Optional per-section replacements for [`RevealConfig`] fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_once: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_margin: Option<RootMargin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_ms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_ms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<MotionPreset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub id: String,
    /// Absolute page offset. Sections without one stack below the previous
    /// section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    /// Height in page pixels.
    pub height: f64,
    /// Number of revealable children.
    #[serde(default)]
    pub items: usize,
    #[serde(flatten)]
    pub overrides: RevealOverrides,
}

impl SectionSpec {
    pub fn new(id: impl Into<String>, height: f64, items: usize) -> Self {
        Self {
            id: id.into(),
            top: None,
            height,
            items,
            overrides: RevealOverrides::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSpec {
    #[serde(default = "default_viewport_width")]
    pub viewport_width: f64,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,
    /// Vertical space between sections.
    #[serde(default)]
    pub gap: f64,
    #[serde(default)]
    pub defaults: RevealConfig,
    pub sections: Vec<SectionSpec>,
}

fn default_viewport_width() -> f64 {
    1280.0
}

fn default_viewport_height() -> f64 {
    800.0
}

impl PageSpec {
    /// Parse and validate a JSON page description.
    pub fn from_json(data: &[u8]) -> Result<Self, ConfigError> {
        let spec: PageSpec = serde_json::from_slice(data)?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sections.is_empty() {
            return Err(ConfigError::EmptyPage);
        }
        let mut seen = HashSet::new();
        for section in &self.sections {
            if !seen.insert(section.id.as_str()) {
                return Err(ConfigError::DuplicateSection(section.id.clone()));
            }
            if !(section.height.is_finite() && section.height > 0.0) {
                return Err(ConfigError::InvalidHeight {
                    id: section.id.clone(),
                    height: section.height,
                });
            }
            if let Some(top) = section.top
                && !(top.is_finite() && top >= 0.0)
            {
                return Err(ConfigError::InvalidTop {
                    id: section.id.clone(),
                    top,
                });
            }
            self.config_for(section).controller_options()?;
        }
        Ok(())
    }

    /// Page defaults with the section's overrides applied.
    pub fn config_for(&self, section: &SectionSpec) -> RevealConfig {
        self.defaults.with_overrides(&section.overrides)
    }

    /// Each section with its page-space rectangle, in declaration order.
    pub fn layout(&self) -> Vec<(&SectionSpec, Rect)> {
        let mut y = 0.0;
        self.sections
            .iter()
            .map(|section| {
                let top = section.top.unwrap_or(y);
                let rect = Rect::new(0.0, top, self.viewport_width, section.height);
                y = top + section.height + self.gap;
                (section, rect)
            })
            .collect()
    }

    /// Bottom edge of the lowest section.
    pub fn total_height(&self) -> f64 {
        self.layout()
            .iter()
            .map(|(_, rect)| rect.bottom())
            .fold(0.0, f64::max)
    }

    /// The single-page portfolio: hero, project grid, about/timeline,
    /// contact form.
    pub fn portfolio() -> Self {
        let mut hero = SectionSpec::new("hero", 800.0, 4);
        hero.overrides.step_ms = Some(100);
        hero.overrides.base_ms = Some(100);
        hero.overrides.preset = Some(MotionPreset::FadeInUp);

        let mut projects = SectionSpec::new("projects", 1200.0, 6);
        projects.overrides.step_ms = Some(100);

        // Ten skill badges followed by three timeline entries on one cascade.
        let about = SectionSpec::new("about", 1100.0, 13);

        let mut contact = SectionSpec::new("contact", 900.0, 1);
        contact.overrides.preset = Some(MotionPreset::FadeInUp);

        Self {
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            gap: 0.0,
            defaults: RevealConfig::default(),
            sections: vec![hero, projects, about, contact],
        }
    }
}

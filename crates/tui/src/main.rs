mod renderer;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use reveal_core::{Page, PageSpec, RootMargin};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "reveal")]
#[command(about = "Scroll a page of sections and watch their children cascade into view")]
struct Cli {
    /// Page layout as JSON. Defaults to the built-in portfolio page.
    #[arg(long)]
    page: Option<PathBuf>,

    /// Reveal each section once and stop observing it.
    #[arg(long)]
    trigger_once: bool,

    /// Delay between consecutive children (ms).
    #[arg(long)]
    step_ms: Option<u32>,

    /// Visible fraction of a section needed to reveal it, 0 to 1.
    #[arg(long)]
    threshold: Option<f64>,

    /// CSS-style margin applied to the viewport, e.g. "0px 0px -50px 0px".
    #[arg(long, allow_hyphen_values = true)]
    root_margin: Option<RootMargin>,

    /// Log file; the terminal is taken over by the UI.
    #[arg(long, default_value = "reveal.log")]
    log: PathBuf,
}

impl Cli {
    /// Flags win over the file, including per-section overrides.
    fn apply(&self, spec: &mut PageSpec) {
        if self.trigger_once {
            spec.defaults.trigger_once = true;
            spec.sections
                .iter_mut()
                .for_each(|s| s.overrides.trigger_once = None);
        }
        if let Some(step_ms) = self.step_ms {
            spec.defaults.step_ms = step_ms;
            spec.sections
                .iter_mut()
                .for_each(|s| s.overrides.step_ms = None);
        }
        if let Some(threshold) = self.threshold {
            spec.defaults.threshold = threshold;
            spec.sections
                .iter_mut()
                .for_each(|s| s.overrides.threshold = None);
        }
        if let Some(root_margin) = self.root_margin {
            spec.defaults.root_margin = root_margin;
            spec.sections
                .iter_mut()
                .for_each(|s| s.overrides.root_margin = None);
        }
    }
}

fn init_tracing(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "reveal=debug,reveal_core=debug".into()),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

fn load_spec(path: Option<&Path>) -> Result<PageSpec> {
    match path {
        Some(path) => {
            let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            PageSpec::from_json(&data).with_context(|| format!("parsing {}", path.display()))
        }
        None => Ok(PageSpec::portfolio()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log)?;

    let mut spec = load_spec(cli.page.as_deref())?;
    cli.apply(&mut spec);
    let mut page = Page::simulate(&spec)?;
    info!(
        sections = page.len(),
        trigger_once = spec.defaults.trigger_once,
        root_margin = %spec.defaults.root_margin,
        "starting"
    );

    renderer::run(&mut page, &spec)
}

#[cfg(test)]
mod tests {
    use reveal_core::observe::Length;

    use super::*;

    #[test]
    fn flags_override_page_and_sections() {
        let cli = Cli::parse_from([
            "reveal",
            "--trigger-once",
            "--step-ms",
            "80",
            "--root-margin",
            "-10px",
        ]);
        let mut spec = PageSpec::portfolio();
        cli.apply(&mut spec);

        assert!(spec.defaults.trigger_once);
        assert_eq!(spec.defaults.root_margin, RootMargin::uniform(Length::Px(-10.0)));
        let hero = &spec.sections[0];
        assert_eq!(spec.config_for(hero).step_ms, 80);
        assert!(spec.config_for(hero).trigger_once);
    }

    #[test]
    fn bad_root_margin_is_rejected() {
        assert!(Cli::try_parse_from(["reveal", "--root-margin", "1em"]).is_err());
    }
}

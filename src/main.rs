//! bonnie-raster: render a model to an image file
//!
//! Run: `bonnie-raster --model models/teapot.obj --output teapot.png`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use bonnie_raster::logging::{init_logging, LoggingConfig};
use bonnie_raster::rasterizer::CullMode;
use bonnie_raster::{RasterizationRenderer, Settings, VERSION};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum CullArg {
    None,
    Back,
    Front,
}

impl From<CullArg> for CullMode {
    fn from(arg: CullArg) -> Self {
        match arg {
            CullArg::None => CullMode::None,
            CullArg::Back => CullMode::Back,
            CullArg::Front => CullMode::Front,
        }
    }
}

/// Software rasterizer: model in, image out
#[derive(Parser, Debug)]
#[command(name = "bonnie-raster")]
#[command(version)]
#[command(about = "CPU software rasterizer", long_about = None)]
struct Cli {
    /// Settings file (RON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model file (.obj or .ron); the built-in cube when omitted
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Output image (.png, .bmp, .jpg)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long)]
    width: Option<usize>,

    #[arg(long)]
    height: Option<usize>,

    /// Number of frames to render, orbiting the camera between them
    #[arg(short, long)]
    frames: Option<usize>,

    /// Disable the depth buffer (painter's order)
    #[arg(long)]
    no_depth: bool,

    #[arg(long, value_enum)]
    cull: Option<CullArg>,

    /// Interpolate attributes perspective-correctly
    #[arg(long)]
    perspective: bool,

    /// Write the effective settings to this file and exit
    #[arg(long)]
    write_config: Option<PathBuf>,

    /// Debug-level logging (RUST_LOG still wins)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None => Settings::default(),
        };

        if let Some(model) = &self.model {
            settings.model_path = Some(model.clone());
        }
        if let Some(output) = &self.output {
            settings.result_path = output.clone();
        }
        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        if let Some(frames) = self.frames {
            settings.frames = frames;
        }
        if self.no_depth {
            settings.depth_test = false;
        }
        if let Some(cull) = self.cull {
            settings.cull_mode = cull.into();
        }
        if self.perspective {
            settings.perspective_correct = true;
        }

        settings.validate().context("invalid settings")?;
        Ok(settings)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let env_filter = std::env::var("RUST_LOG").ok();
    init_logging(LoggingConfig { env_filter, ..Default::default() }.verbose(cli.verbose));
    log::info!("bonnie-raster v{}", VERSION);

    let settings = cli.settings()?;

    if let Some(path) = &cli.write_config {
        settings
            .save(path)
            .with_context(|| format!("failed to write settings to {}", path.display()))?;
        log::info!("Wrote settings to {}", path.display());
        return Ok(());
    }

    let frames = settings.frames.max(1);
    let mut renderer = RasterizationRenderer::init(settings.clone()).context("failed to initialize renderer")?;

    let progress = if frames > 1 {
        let bar = ProgressBar::new(frames as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} frames ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(bar)
    } else {
        None
    };

    for frame in 0..frames {
        if frame > 0 {
            renderer.update();
        }
        renderer
            .render()
            .with_context(|| format!("failed to render frame {}", frame))?;

        let path = settings.frame_path(frame);
        renderer
            .save(&path)
            .with_context(|| format!("failed to save {}", path.display()))?;

        if let Some(bar) = &progress {
            bar.inc(1);
        }
    }

    if let Some(bar) = progress {
        bar.finish_with_message("done");
    }
    renderer.destroy();
    Ok(())
}

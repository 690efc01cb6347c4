use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use image::{ImageBuffer, Luma, Rgb};

use cellsynth::config::Params;
use cellsynth::label::LabelCanvas;
use cellsynth::render;

/// Synthetic fluorescence cell images with instance labels.
///
/// Values come from `Params::default()`, then the `--config` file, then the
/// individual flags given on the command line.
#[derive(Debug, Parser)]
#[command(author, version, about = "Synthetic fluorescence cell image generator")]
struct Args {
    /// Seed for the run's random stream.
    #[arg(default_value_t = 42)]
    seed: u64,

    /// Output directory for the PNGs and `cells.json`.
    #[arg(long, default_value = "artifacts")]
    out_dir: PathBuf,

    /// JSON file with `Params`; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    width: Option<usize>,

    #[arg(long)]
    height: Option<usize>,

    #[arg(long)]
    num_cells: Option<usize>,

    /// Inclusive radius bounds.
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
    size_range: Option<Vec<u32>>,

    /// Inclusive base intensity bounds.
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
    intensity_range: Option<Vec<u32>>,

    #[arg(long)]
    noise_level: Option<f64>,

    /// Rescale the fluorescence output to this many bits.
    #[arg(long)]
    display_bits: Option<u32>,
}

fn load_params(path: &Path) -> Result<Params> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read params file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid params file {}", path.display()))
}

fn pair(values: &[u32]) -> (u32, u32) {
    (values[0], values[1])
}

/// Flags that were given replace the corresponding `base` fields; everything
/// else is left as loaded.
fn apply_overrides(args: &Args, base: Params) -> Params {
    Params {
        width: args.width.unwrap_or(base.width),
        height: args.height.unwrap_or(base.height),
        num_cells: args.num_cells.unwrap_or(base.num_cells),
        size_range: args.size_range.as_deref().map(pair).unwrap_or(base.size_range),
        intensity_range: args
            .intensity_range
            .as_deref()
            .map(pair)
            .unwrap_or(base.intensity_range),
        noise_level: args.noise_level.unwrap_or(base.noise_level),
        display_bits: args.display_bits.or(base.display_bits),
        ..base
    }
}

fn main() -> Result<()> {
    let _logger = flexi_logger::Logger::try_with_env_or_str("info")?.start()?;

    let args = Args::parse();
    let base = match &args.config {
        Some(path) => load_params(path)?,
        None => Params::default(),
    };
    let params = apply_overrides(&args, base);
    let (seed, out_dir) = (args.seed, &args.out_dir);
    let (width, height) = (params.width, params.height);

    std::fs::create_dir_all(out_dir).context("failed to create output directory")?;

    log::info!(
        "Generating {}x{} image with seed={}, cells={}, labels={:?}",
        width,
        height,
        seed,
        params.num_cells,
        params.label_scheme
    );

    let (image, timings) = cellsynth::generate(seed, &params)?;

    eprintln!("\nTimings:");
    for t in &timings {
        eprintln!("  {:20} {:8.1} ms", t.name, t.ms);
    }

    // Ground-truth pair
    let (w, h) = (width as u32, height as u32);
    let fluorescence: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_raw(w, h, image.fluorescence.data.clone())
            .context("fluorescence buffer size mismatch")?;
    save_image(out_dir, "fluorescence.png", |p| fluorescence.save(p))?;

    match &image.labels {
        LabelCanvas::Scalar(g) if g.data.iter().all(|&v| v <= u8::MAX as u16) => {
            let data: Vec<u8> = g.data.iter().map(|&v| v as u8).collect();
            let labels: ImageBuffer<Luma<u8>, Vec<u8>> =
                ImageBuffer::from_raw(w, h, data).context("label buffer size mismatch")?;
            save_image(out_dir, "labels.png", |p| labels.save(p))?;
        }
        LabelCanvas::Scalar(g) => {
            let labels: ImageBuffer<Luma<u16>, Vec<u16>> =
                ImageBuffer::from_raw(w, h, g.data.clone()).context("label buffer size mismatch")?;
            save_image(out_dir, "labels.png", |p| labels.save(p))?;
        }
        LabelCanvas::Rgb(g) => {
            let data: Vec<u8> = g.data.iter().flatten().copied().collect();
            let labels: ImageBuffer<Rgb<u8>, Vec<u8>> =
                ImageBuffer::from_raw(w, h, data).context("label buffer size mismatch")?;
            save_image(out_dir, "labels.png", |p| labels.save(p))?;
        }
    }

    // Previews
    let save_rgba = |name: &str, rgba: &[u8]| {
        save_image(out_dir, name, |p| {
            image::save_buffer(p, rgba, w, h, image::ColorType::Rgba8)
        })
    };
    save_rgba("preview.png", &render::render_fluorescence(&image.fluorescence))?;
    save_rgba("labels_preview.png", &render::render_labels(&image.labels))?;
    save_rgba(
        "outlines.png",
        &render::render_outlines(&image.fluorescence, &image.labels),
    )?;

    // Per-cell metadata
    let meta = out_dir.join("cells.json");
    std::fs::write(&meta, serde_json::to_string_pretty(&image.cells)?)
        .with_context(|| format!("failed to write {}", meta.display()))?;
    eprintln!("Saved {}", meta.display());

    if !image.skipped.is_empty() {
        log::warn!("skipped cells: {:?}", image.skipped);
    }
    eprintln!("\nDone.");
    Ok(())
}

fn save_image(
    dir: &Path,
    name: &str,
    save: impl FnOnce(&Path) -> image::ImageResult<()>,
) -> Result<()> {
    let path = dir.join(name);
    save(&path).with_context(|| format!("failed to save {}", path.display()))?;
    eprintln!("Saved {}", path.display());
    Ok(())
}

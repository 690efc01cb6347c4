use std::net::SocketAddr;

use axum::{Json, Router, http::StatusCode, routing::post};
use base64::Engine;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;

use cellsynth::config::{
    LabelScheme, MaskStyle, NoiseKind, OnPlacementFailure, OverlapPolicy, Params,
};
use cellsynth::render;

#[derive(Deserialize)]
struct GenerateRequest {
    seed: Option<u64>,
    width: Option<usize>,
    height: Option<usize>,
    num_cells: Option<usize>,
    size_range: Option<(u32, u32)>,
    intensity_range: Option<(u32, u32)>,
    intensity_jitter: Option<bool>,
    // Mask
    mask_style: Option<MaskStyle>,
    blur_factor: Option<f32>,
    inclusion_threshold: Option<f32>,
    // Placement
    overlap_policy: Option<OverlapPolicy>,
    max_placement_attempts: Option<usize>,
    on_placement_failure: Option<OnPlacementFailure>,
    // Labels
    label_scheme: Option<LabelScheme>,
    label_bits: Option<u32>,
    // Noise
    noise_level: Option<f64>,
    noise_kind: Option<NoiseKind>,
    bit_depth: Option<u32>,
    display_bits: Option<u32>,
}

#[derive(Serialize)]
struct GenerateResponse {
    layers: Vec<Layer>,
    timings: Vec<TimingEntry>,
    width: usize,
    height: usize,
    placed: usize,
    skipped: Vec<usize>,
}

#[derive(Serialize)]
struct Layer {
    name: String,
    data_url: String,
}

#[derive(Serialize)]
struct TimingEntry {
    name: String,
    ms: f64,
}

type ApiError = (StatusCode, String);

fn encode_png(rgba: &[u8], w: usize, h: usize) -> Result<String, ApiError> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new(&mut buf);
    encoder
        .write_image(rgba, w as u32, h as u32, image::ExtendedColorType::Rgba8)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("PNG encode failed: {e}")))?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&buf);
    Ok(format!("data:image/png;base64,{}", b64))
}

fn params_from(req: GenerateRequest) -> Params {
    let d = Params::default();
    Params {
        width: req.width.unwrap_or(d.width),
        height: req.height.unwrap_or(d.height),
        num_cells: req.num_cells.unwrap_or(d.num_cells),
        size_range: req.size_range.unwrap_or(d.size_range),
        intensity_range: req.intensity_range.unwrap_or(d.intensity_range),
        intensity_jitter: req.intensity_jitter.unwrap_or(d.intensity_jitter),
        mask_style: req.mask_style.unwrap_or(d.mask_style),
        blur_factor: req.blur_factor.unwrap_or(d.blur_factor),
        inclusion_threshold: req.inclusion_threshold.unwrap_or(d.inclusion_threshold),
        overlap_policy: req.overlap_policy.unwrap_or(d.overlap_policy),
        max_placement_attempts: req.max_placement_attempts.unwrap_or(d.max_placement_attempts),
        on_placement_failure: req.on_placement_failure.unwrap_or(d.on_placement_failure),
        label_scheme: req.label_scheme.unwrap_or(d.label_scheme),
        label_bits: req.label_bits.unwrap_or(d.label_bits),
        noise_level: req.noise_level.unwrap_or(d.noise_level),
        noise_kind: req.noise_kind.unwrap_or(d.noise_kind),
        bit_depth: req.bit_depth.unwrap_or(d.bit_depth),
        display_bits: req.display_bits.or(d.display_bits),
    }
}

async fn generate_handler(
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let seed = req.seed.unwrap_or(42);
    let params = params_from(req);

    let response = tokio::task::spawn_blocking(move || {
        let (image, timings) = cellsynth::generate(seed, &params)
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
        let (w, h) = (image.w, image.h);

        let layers = vec![
            Layer {
                name: "fluorescence".into(),
                data_url: encode_png(&render::render_fluorescence(&image.fluorescence), w, h)?,
            },
            Layer {
                name: "labels".into(),
                data_url: encode_png(&render::render_labels(&image.labels), w, h)?,
            },
            Layer {
                name: "outlines".into(),
                data_url: encode_png(
                    &render::render_outlines(&image.fluorescence, &image.labels),
                    w,
                    h,
                )?,
            },
        ];

        let timing_entries = timings
            .iter()
            .map(|t| TimingEntry {
                name: t.name.to_string(),
                ms: t.ms,
            })
            .collect();

        Ok::<_, ApiError>(GenerateResponse {
            layers,
            timings: timing_entries,
            width: w,
            height: h,
            placed: image.cells.len(),
            skipped: image.skipped,
        })
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("generation task failed: {e}")))??;

    Ok(Json(response))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _logger = flexi_logger::Logger::try_with_env_or_str("info")?.start()?;

    let frontend = ServeDir::new("frontend");

    let app = Router::new()
        .route("/api/generate", post(generate_handler))
        .fallback_service(frontend);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    log::info!("cellsynth server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_overrides_reach_params() {
        let req: GenerateRequest = serde_json::from_str(
            r#"{"num_cells": 3, "display_bits": 8, "label_scheme": "palette-color"}"#,
        )
        .unwrap();
        let p = params_from(req);
        assert_eq!(p.num_cells, 3);
        assert_eq!(p.display_bits, Some(8));
        assert_eq!(p.label_scheme, LabelScheme::PaletteColor);
        assert_eq!(p.width, Params::default().width);
    }

    #[test]
    fn empty_request_is_default_params() {
        let req: GenerateRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(params_from(req), Params::default());
    }
}

//! Headless glass demo.
//!
//! Renders a glass container with a nested button over a background
//! image (decoded from disk, or a synthesized gradient when none is
//! given) and writes the composited result to a PNG.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use glaze_core::{EngineConfig, Point, Rect, Shape, Size};
use glaze_gpu::GlassRenderer;
use glaze_scene::{ButtonOptions, ContainerOptions, FixedProbe, FrameInfo, Scene};
use glaze_snapshot::{Bitmap, CaptureError, SnapshotService, SnapshotSource};

#[derive(Parser, Debug)]
#[command(about = "Render a glass container + button over a background image")]
struct Args {
    /// Page width in pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,
    /// Page height in pixels
    #[arg(long, default_value_t = 800)]
    height: u32,
    /// Background image (png/jpeg); synthesized gradient when omitted
    #[arg(long)]
    background: Option<PathBuf>,
    /// Output path
    #[arg(long, default_value = "glass.png")]
    out: PathBuf,
}

/// Snapshot source backed by a pre-rendered page bitmap.
struct PageSource {
    pixels: image::RgbaImage,
}

impl PageSource {
    fn synthesize(width: u32, height: u32) -> Self {
        // Diagonal gradient with soft color blobs, enough structure for
        // the refraction and blur to be visible.
        let pixels = image::RgbaImage::from_fn(width, height, |x, y| {
            let fx = x as f32 / width as f32;
            let fy = y as f32 / height as f32;
            let blob = |cx: f32, cy: f32, r: f32| {
                let d = ((fx - cx).powi(2) + (fy - cy).powi(2)).sqrt();
                (1.0 - (d / r).min(1.0)).powi(2)
            };
            let warm = blob(0.25, 0.3, 0.45);
            let cool = blob(0.75, 0.7, 0.5);
            let base = 0.12 + 0.25 * (fx + fy) * 0.5;
            let r = (base + warm * 0.7).min(1.0);
            let g = (base + warm * 0.25 + cool * 0.3).min(1.0);
            let b = (base + cool * 0.8).min(1.0);
            image::Rgba([
                (r * 255.0) as u8,
                (g * 255.0) as u8,
                (b * 255.0) as u8,
                255,
            ])
        });
        Self { pixels }
    }

    fn from_file(path: &PathBuf, width: u32, height: u32) -> Result<Self> {
        let img = image::open(path)
            .with_context(|| format!("failed to open background {}", path.display()))?;
        let resized = img
            .resize_to_fill(width, height, image::imageops::FilterType::Triangle)
            .to_rgba8();
        Ok(Self { pixels: resized })
    }
}

impl SnapshotSource for PageSource {
    fn rasterize(&self, region: Option<Rect>, _scale_factor: f32) -> Result<Bitmap, CaptureError> {
        let cropped = match region {
            None => self.pixels.clone(),
            Some(rect) => {
                let x = rect.x().max(0.0) as u32;
                let y = rect.y().max(0.0) as u32;
                let w = (rect.width() as u32).min(self.pixels.width().saturating_sub(x));
                let h = (rect.height() as u32).min(self.pixels.height().saturating_sub(y));
                image::imageops::crop_imm(&self.pixels, x, y, w, h).to_image()
            }
        };
        let (w, h) = cropped.dimensions();
        Bitmap::from_rgba(cropped.into_raw(), w, h)
    }

    fn viewport(&self) -> Size {
        Size::new(self.pixels.width() as f32, self.pixels.height() as f32)
    }
}

fn blend_over(dst: &mut image::RgbaImage, src: &Bitmap, origin: Point) {
    let ox = origin.x as i64;
    let oy = origin.y as i64;
    for y in 0..src.height() {
        for x in 0..src.width() {
            let dx = ox + x as i64;
            let dy = oy + y as i64;
            if dx < 0 || dy < 0 || dx >= dst.width() as i64 || dy >= dst.height() as i64 {
                continue;
            }
            let i = ((y * src.width() + x) * 4) as usize;
            let px = &src.pixels()[i..i + 4];
            let alpha = px[3] as f32 / 255.0;
            if alpha <= 0.0 {
                continue;
            }
            let under = dst.get_pixel_mut(dx as u32, dy as u32);
            for c in 0..3 {
                under.0[c] =
                    (px[c] as f32 * alpha + under.0[c] as f32 * (1.0 - alpha)).round() as u8;
            }
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let source: Arc<dyn SnapshotSource> = match &args.background {
        Some(path) => Arc::new(PageSource::from_file(path, args.width, args.height)?),
        None => Arc::new(PageSource::synthesize(args.width, args.height)),
    };

    let runtime = tokio::runtime::Runtime::new().context("tokio runtime")?;
    runtime.block_on(render(source, &args))
}

async fn render(source: Arc<dyn SnapshotSource>, args: &Args) -> Result<()> {
    let config = EngineConfig {
        settle_delay_ms: 0,
        ..EngineConfig::standard()
    };
    let service = Arc::new(SnapshotService::new(source.clone(), config.clone()));

    let renderer = GlassRenderer::new()
        .await
        .context("GPU renderer bring-up failed")?;

    let mut scene = Scene::new(Arc::clone(&service), config);
    scene.attach_renderer(renderer);

    // A rounded glass card over the page
    let card_origin = Point::new(args.width as f32 * 0.12, args.height as f32 * 0.18);
    let card_size = Size::new(args.width as f32 * 0.42, args.height as f32 * 0.42);
    let container = scene.create_container(
        ContainerOptions::new()
            .shape(Shape::Rounded)
            .border_radius(36.0)
            .tint_opacity(0.18),
    )?;
    scene.set_content_probe(container, FixedProbe::new(card_size, card_origin))?;
    scene.update_size_from_content(container)?;

    // A pill button nested in the card's lower-left corner
    let button = scene.create_button(
        ButtonOptions::new("Get in touch")
            .size(18.0)
            .tint_opacity(0.3),
    )?;
    scene.add_child(container, button)?;
    scene.set_offset(
        button,
        Point::new(36.0, card_size.height - 90.0),
    )?;

    scene.mount(container).await?;
    scene.mount(button).await?;

    // First frame renders the container from the page snapshot; the
    // second lets the button sample the container's finished surface.
    scene.render_frame(FrameInfo::default());
    scene.render_frame(FrameInfo {
        frame: 1,
        time: 0.016,
        ..FrameInfo::default()
    });

    let page = source
        .rasterize(None, 1.0)
        .context("page rasterization failed")?;
    let mut composite =
        image::RgbaImage::from_raw(page.width(), page.height(), page.into_pixels())
            .context("page bitmap conversion failed")?;

    let card_pixels = scene
        .read_element(container)
        .context("container readback failed")?;
    blend_over(&mut composite, &card_pixels, card_origin);

    if let Some(button_pixels) = scene.read_element(button) {
        let button_origin = scene.position(button).unwrap_or(card_origin);
        blend_over(&mut composite, &button_pixels, button_origin);
    }

    composite
        .save(&args.out)
        .with_context(|| format!("failed to write {}", args.out.display()))?;
    tracing::info!(out = %args.out.display(), "wrote composited glass frame");
    println!("Wrote {}", args.out.display());
    Ok(())
}

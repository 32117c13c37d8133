//! Blocking figure window for `--show`.

use crate::viz::raster::{self, RgbaImage};
use anyhow::{Result, anyhow};
use eframe::egui;

/// Rasterize `svg` and display it until the window is closed.
pub fn show(svg: &str, title: &str) -> Result<()> {
    let image = raster::svg_to_rgba(svg)?;
    let inner = [image.width as f32 + 16.0, image.height as f32 + 16.0];

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(inner)
            .with_min_inner_size([200.0, 100.0])
            .with_title(title),
        ..Default::default()
    };

    log::debug!("opening viewer {}x{}", image.width, image.height);
    eframe::run_native(
        title,
        options,
        Box::new(move |_cc| Ok(Box::new(FigureViewer::new(&image)))),
    )
    .map_err(|e| anyhow!("viewer failed: {e}"))
}

fn to_color_image(image: &RgbaImage) -> egui::ColorImage {
    egui::ColorImage::from_rgba_unmultiplied(
        [image.width as usize, image.height as usize],
        &image.pixels,
    )
}

struct FigureViewer {
    /// Uploaded on the first frame.
    pending: Option<egui::ColorImage>,
    texture: Option<egui::TextureHandle>,
}

impl FigureViewer {
    fn new(image: &RgbaImage) -> Self {
        Self {
            pending: Some(to_color_image(image)),
            texture: None,
        }
    }
}

impl eframe::App for FigureViewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(image) = self.pending.take() {
            self.texture = Some(ctx.load_texture("figure", image, egui::TextureOptions::LINEAR));
        }
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().show(ui, |ui| {
                if let Some(texture) = &self.texture {
                    ui.image((texture.id(), texture.size_vec2()));
                }
            });
        });
    }
}

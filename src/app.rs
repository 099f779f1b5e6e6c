use eframe::egui;
use egui_extras::{Column, TableBuilder};
use image::RgbaImage;
use serde::Serialize;

use crate::assets::ReferenceImage;
use crate::config::Settings;
use crate::mapper::{CoordinateMapper, Point, Size};
use crate::polygon::{PolygonBuilder, PolygonState, PushOutcome};
use crate::render::{self, OverlayStyle};

// ── Session ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct PointsExport<'a> {
    image: &'a str,
    width: u32,
    height: u32,
    closed: bool,
    points: &'a [Point],
}

pub struct PolygonPickApp {
    image: ReferenceImage,
    pixels: Option<RgbaImage>,
    texture: Option<egui::TextureHandle>,

    mapper: CoordinateMapper,
    builder: PolygonBuilder,
    style: OverlayStyle,

    // None until the image has been laid out once
    display: Option<Size>,
}

impl PolygonPickApp {
    pub fn new(image: ReferenceImage, pixels: RgbaImage, settings: &Settings) -> Self {
        Self {
            image,
            pixels: Some(pixels),
            texture: None,
            mapper: CoordinateMapper::new(image.original_size()),
            builder: PolygonBuilder::new(settings.gravity_threshold),
            style: OverlayStyle::from(settings),
            display: None,
        }
    }

    pub fn set_display_size(&mut self, size: Size) {
        if self.display != Some(size) {
            log::debug!("display size {:?} -> {:?}", self.display, size);
            self.display = Some(size);
        }
    }

    /// Click relative to the displayed image's top-left corner.
    pub fn handle_click(&mut self, rel: Point) -> PushOutcome {
        let Some(display) = self.display else {
            log::debug!("click before layout ignored");
            return PushOutcome::Rejected;
        };
        let Some(original) = self.mapper.to_original(rel, display) else {
            log::debug!("click ignored, display size {display:?} not drawable");
            return PushOutcome::Rejected;
        };
        let outcome = self.builder.push(original);
        match outcome {
            PushOutcome::Appended => log::debug!(
                "point {} at ({:.2}, {:.2})",
                self.builder.len(),
                original.x,
                original.y
            ),
            PushOutcome::Closed => log::info!(
                "polygon closed with {} vertices",
                self.builder.len().saturating_sub(1)
            ),
            PushOutcome::Rejected => log::debug!("polygon closed, click ignored"),
        }
        outcome
    }

    pub fn export_json(&self) -> anyhow::Result<String> {
        let export = PointsExport {
            image: self.image.name,
            width: self.image.width,
            height: self.image.height,
            closed: self.builder.is_closed(),
            points: self.builder.points(),
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        if self.texture.is_some() {
            return;
        }
        if let Some(rgba) = self.pixels.take() {
            let size = [rgba.width() as usize, rgba.height() as usize];
            let pixels = rgba.as_flat_samples();
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
            self.texture = Some(ctx.load_texture(
                self.image.name,
                color_image,
                egui::TextureOptions::LINEAR,
            ));
        }
    }

    /// Largest rect of the image's aspect ratio that fits in `available`.
    fn fitted_size(&self, available: egui::Vec2) -> egui::Vec2 {
        let original = self.mapper.original_size();
        let scale = (available.x / original.width)
            .min(available.y / original.height)
            .max(0.0);
        egui::vec2(original.width * scale, original.height * scale)
    }

    fn state_label(&self) -> &'static str {
        match self.builder.state() {
            PolygonState::Open => "open",
            PolygonState::Closed => "closed",
        }
    }

    fn points_table(&self, ui: &mut egui::Ui) {
        let points = self.builder.points();
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(24.0))
            .column(Column::auto().at_least(70.0))
            .column(Column::remainder())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("#");
                });
                header.col(|ui| {
                    ui.strong("x");
                });
                header.col(|ui| {
                    ui.strong("y");
                });
            })
            .body(|body| {
                body.rows(18.0, points.len(), |mut row| {
                    let i = row.index();
                    let p = points[i];
                    row.col(|ui| {
                        ui.label(format!("{}", i + 1));
                    });
                    row.col(|ui| {
                        ui.monospace(format!("{:.2}", p.x));
                    });
                    row.col(|ui| {
                        ui.monospace(format!("{:.2}", p.y));
                    });
                });
            });
    }
}

/// Pointer position in viewport coordinates to a point relative to the
/// displayed image's top-left corner.
fn click_in_image(image_rect: egui::Rect, pointer: egui::Pos2) -> Point {
    let rel = pointer - image_rect.min;
    Point::new(rel.x, rel.y)
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for PolygonPickApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_texture(ctx);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(self.image.name);
                ui.separator();
                ui.label(format!("Original: {}×{}", self.image.width, self.image.height));
                if let Some(d) = self.display {
                    ui.separator();
                    ui.label(format!("Displayed: {:.0}×{:.0}", d.width, d.height));
                }
                ui.separator();
                ui.label(format!("Polygon: {}", self.state_label()));
                ui.separator();
                if ui.button("Copy JSON").clicked() {
                    match self.export_json() {
                        Ok(json) => ctx.copy_text(json),
                        Err(err) => log::warn!("could not export points: {err:#}"),
                    }
                }
            });
        });

        egui::SidePanel::right("points")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Points");
                ui.label(format!(
                    "{} point(s), gravity {:.1}px",
                    self.builder.len(),
                    self.builder.gravity_threshold()
                ));
                ui.separator();
                self.points_table(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let size = self.fitted_size(ui.available_size());
            let (response, painter) = ui.allocate_painter(size, egui::Sense::click());
            let image_rect = response.rect;
            self.set_display_size(Size::from(image_rect.size()));

            if let Some(ref tex) = self.texture {
                painter.image(
                    tex.id(),
                    image_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }

            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    self.handle_click(click_in_image(image_rect, pos));
                }
            }

            if let Some(display) = self.display {
                painter.extend(render::overlay_shapes(
                    &self.builder,
                    &self.mapper,
                    display,
                    image_rect.min,
                    &self.style,
                ));
            }
        });
    }
}

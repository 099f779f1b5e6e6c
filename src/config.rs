use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::polygon::DEFAULT_GRAVITY_THRESHOLD;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color4 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color4 {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_egui(&self) -> egui::Color32 {
        egui::Color32::from_rgba_unmultiplied(
            (self.r.clamp(0.0, 1.0) * 255.0) as u8,
            (self.g.clamp(0.0, 1.0) * 255.0) as u8,
            (self.b.clamp(0.0, 1.0) * 255.0) as u8,
            (self.a.clamp(0.0, 1.0) * 255.0) as u8,
        )
    }
}

/// Drawing and closure settings. Every field is optional in the TOML file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Original-space distance under which the newest point snaps onto the first.
    pub gravity_threshold: f32,
    pub stroke_width: f32,
    pub open_stroke: Color4,
    pub closed_stroke: Color4,
    pub fill: Color4,
    pub marker_radius: f32,
    pub marker_color: Color4,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gravity_threshold: DEFAULT_GRAVITY_THRESHOLD,
            stroke_width: 2.0,
            open_stroke: Color4::new(1.0, 0.0, 0.0, 1.0),
            closed_stroke: Color4::new(0.0, 0.0, 1.0, 1.0),
            fill: Color4::new(0.0, 1.0, 0.0, 0.5),
            marker_radius: 5.0,
            marker_color: Color4::new(1.0, 0.0, 0.0, 1.0),
        }
    }
}

impl Settings {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let settings: Settings = toml::from_str(text).context("invalid settings TOML")?;
        Ok(settings.sanitized())
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings = Self::from_toml(&text)
            .with_context(|| format!("parsing settings from {}", path.display()))?;
        log::info!("loaded settings from {}", path.display());
        Ok(settings)
    }

    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.gravity_threshold.is_finite() && self.gravity_threshold > 0.0) {
            log::warn!(
                "gravity_threshold {} is not positive, using {}",
                self.gravity_threshold,
                defaults.gravity_threshold
            );
            self.gravity_threshold = defaults.gravity_threshold;
        }
        if !(self.stroke_width.is_finite() && self.stroke_width > 0.0) {
            log::warn!(
                "stroke_width {} is not positive, using {}",
                self.stroke_width,
                defaults.stroke_width
            );
            self.stroke_width = defaults.stroke_width;
        }
        if !(self.marker_radius.is_finite() && self.marker_radius >= 0.0) {
            log::warn!(
                "marker_radius {} is negative, using {}",
                self.marker_radius,
                defaults.marker_radius
            );
            self.marker_radius = defaults.marker_radius;
        }
        self
    }
}

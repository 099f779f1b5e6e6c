mod app;
mod assets;
mod config;
mod mapper;
mod polygon;
mod render;

use std::path::PathBuf;

use anyhow::{bail, Context};
use eframe::egui;

use crate::app::PolygonPickApp;
use crate::assets::{ReferenceImage, DEFAULT_IMAGE_INDEX};
use crate::config::Settings;

const USAGE: &str = "Usage: polygon-pick [--config <settings.toml>] [--assets <dir>] [<image-index>]";

#[derive(Debug, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    assets: PathBuf,
    image_index: usize,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut parsed = Args {
        config: None,
        assets: PathBuf::from("assets"),
        image_index: DEFAULT_IMAGE_INDEX,
    };
    let mut index_seen = false;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "--assets" => {
                let dir = args.next().context("--assets needs a directory")?;
                parsed.assets = PathBuf::from(dir);
            }
            other if !index_seen && !other.starts_with('-') => {
                parsed.image_index = other
                    .parse()
                    .with_context(|| format!("image index must be a number, got {other:?}"))?;
                index_seen = true;
            }
            other => bail!("unexpected argument {other:?}\n{USAGE}"),
        }
    }
    Ok(parsed)
}

fn window_title(image: &ReferenceImage) -> String {
    format!("polygon-pick - {}", image.name)
}

fn run() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    let settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let image = ReferenceImage::by_index(args.image_index)?;
    let pixels = image.load(&args.assets)?;
    log::info!(
        "annotating {} ({}x{}), gravity threshold {}",
        image.name,
        image.width,
        image.height,
        settings.gravity_threshold
    );

    let title = window_title(&image);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title(&title),
        ..Default::default()
    };

    let app = PolygonPickApp::new(image, pixels, &settings);
    eframe::run_native(&title, options, Box::new(move |_cc| Ok(Box::new(app))))
        .map_err(|err| anyhow::anyhow!("failed to run eframe: {err}"))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

//! Render a brightness formula to a greyscale PGM image.
//!
//! ```bash
//! cargo run --example pixel_formula -- rings out.pgm
//! cargo run --example pixel_formula -- "(x, y, t, r) => x * y" out.pgm
//! RUST_LOG=textlambda_compiler=debug cargo run --example pixel_formula -- plasma
//! ```
//!
//! A formula receives the pixel position scaled to `0..1`, the frame number
//! and a seeded `Random`, and returns a brightness that is clamped to `0..1`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use textlambda::{Compiler, Random, TypedFunction};
use tracing::info;
use tracing_subscriber::EnvFilter;

const WIDTH: u32 = 256;
const HEIGHT: u32 = 256;
const SEED: i32 = 1234;

const PRESETS: &[(&str, &str)] = &[
    ("gradient", "(x, y, t, r) => (x + y) / 2"),
    (
        "rings",
        "(x, y, t, r) => Math.Sin(Math.Sqrt(x * x + y * y) * 20 + t) * 0.5 + 0.5",
    ),
    (
        "checker",
        "(x, y, t, r) => ((int)(x * 8) + (int)(y * 8)) % 2 == 0 ? 1.0 : 0.0",
    ),
    (
        "plasma",
        "(x, y, t, r) => (Math.Sin(x * 10 + t) + Math.Cos(y * 10 - t) + 2) / 4",
    ),
    ("noise", "(x, y, t, r) => r.NextDouble()"),
];

type Formula = TypedFunction<(f64, f64, i32, Arc<Random>), f64>;

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

fn resolve_source(arg: &str) -> &str {
    PRESETS
        .iter()
        .find(|(name, _)| *name == arg)
        .map_or(arg, |(_, source)| source)
}

fn render(formula: &Formula, frame: i32) -> Result<Vec<u8>> {
    let rng = Arc::new(Random::seeded(SEED));
    let mut pixels = Vec::with_capacity((WIDTH * HEIGHT) as usize);
    for py in 0..HEIGHT {
        for px in 0..WIDTH {
            let x = f64::from(px) / f64::from(WIDTH);
            let y = f64::from(py) / f64::from(HEIGHT);
            let brightness = formula
                .call((x, y, frame, rng.clone()))
                .with_context(|| format!("formula failed at pixel ({px}, {py})"))?;
            let brightness = if brightness.is_nan() {
                0.0
            } else {
                brightness.clamp(0.0, 1.0)
            };
            pixels.push((brightness * 255.0).round() as u8);
        }
    }
    Ok(pixels)
}

fn write_pgm(path: &str, pixels: &[u8]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("cannot create {path}"))?;
    let mut out = BufWriter::new(file);
    write!(out, "P5\n{WIDTH} {HEIGHT}\n255\n")?;
    out.write_all(pixels)?;
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    init_logging();

    let mut args = std::env::args().skip(1);
    let Some(formula_arg) = args.next() else {
        let names: Vec<_> = PRESETS.iter().map(|(name, _)| *name).collect();
        bail!(
            "usage: pixel_formula <preset|source> [out.pgm]\npresets: {}",
            names.join(", ")
        );
    };
    let output = args.next().unwrap_or_else(|| "formula.pgm".to_string());

    let source = resolve_source(&formula_arg);
    let compiler = Compiler::with_standard_library()?.namespace("System");
    let formula: Formula = compiler
        .compile_typed(source)
        .map_err(|err| anyhow::anyhow!(err.display_with_source(source)))?;
    info!(%source, "compiled formula");

    let pixels = render(&formula, 0)?;
    write_pgm(&output, &pixels)?;
    info!(path = %output, width = WIDTH, height = HEIGHT, "image written");
    Ok(())
}

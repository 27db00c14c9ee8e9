//! scrawl CLI - render marked-up text as handwritten ink
//!
//! Headless front end: loads a stroke font, runs the animation in instant
//! mode onto the software surface and writes the result out as a PPM
//! image. The animation-as-it-happens experience belongs to windowed
//! hosts; this binary is for checking fonts, markup and layout quickly.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;
use scrawl_core::driver::{Handwriter, StepContext, Tick};
use scrawl_core::error::{Result, ScrawlError};
use scrawl_core::style::named_color;
use scrawl_core::traits::{NoEquationSupport, NullInput};
use scrawl_core::{Color, WriteOptions};
use scrawl_strokedb::StrokeFontDb;
use scrawl_surface_soft::{SoftAssets, SoftSurface};

/// Simple command-line arguments
#[derive(Debug)]
struct Args {
    /// Marked-up text to write
    text: String,
    /// Directory holding the stroke-font JSON files
    fonts: PathBuf,
    /// Font name (the part of each filename before `#`)
    font: String,
    /// Fallback font for glyphs the main font lacks
    fallback: Option<String>,
    /// Output image path
    output: PathBuf,
    /// Nominal text size in points
    size: f32,
    /// Surface dimensions
    width: u32,
    height: u32,
    /// Base ink colour name
    color: String,
    /// Smoothing level 0-9
    smooth: u8,
    /// Break words at the margin instead of measuring ahead
    hyphenate: bool,
    /// List the fonts in the directory and exit
    list_fonts: bool,
}

impl Args {
    fn parse() -> Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        if args.len() < 2 {
            eprintln!("Usage: {} <text|--list-fonts> [options]", args[0]);
            eprintln!("Options:");
            eprintln!("  --fonts <dir>      Stroke font directory (default: ./stroke_fonts)");
            eprintln!("  --font <name>      Font to write with (default: default)");
            eprintln!("  --fallback <name>  Font for missing glyphs");
            eprintln!("  --output <file>    Output PPM file (default: scrawl.ppm)");
            eprintln!("  --size <pt>        Text size in points (default: 30)");
            eprintln!("  --width <px>       Surface width (default: 800)");
            eprintln!("  --height <px>      Surface height (default: 600)");
            eprintln!("  --color <name>     Ink colour (default: white)");
            eprintln!("  --smooth <0-9>     Stroke smoothing level (default: 0)");
            eprintln!("  --hyphenate        Break words at the margin");
            eprintln!("  --list-fonts       List fonts in the directory and exit");
            eprintln!();
            eprintln!("Example:");
            eprintln!(
                "  {} \"\\red{{hello}} world\" --fonts fonts/ --font cursive",
                args[0]
            );
            std::process::exit(1);
        }
        Self::parse_from(&args[1..])
    }

    fn parse_from(args: &[String]) -> Result<Self> {
        let mut parsed = Args {
            text: String::new(),
            fonts: PathBuf::from("./stroke_fonts"),
            font: "default".to_string(),
            fallback: None,
            output: PathBuf::from("scrawl.ppm"),
            size: 30.0,
            width: 800,
            height: 600,
            color: "white".to_string(),
            smooth: 0,
            hyphenate: false,
            list_fonts: false,
        };

        let mut i = 0;
        let take_value = |args: &[String], i: &mut usize, flag: &str| -> Result<String> {
            if *i + 1 < args.len() {
                *i += 2;
                Ok(args[*i - 1].clone())
            } else {
                Err(ScrawlError::Config(format!("{flag} requires an argument")))
            }
        };
        while i < args.len() {
            match args[i].as_str() {
                "--fonts" => parsed.fonts = PathBuf::from(take_value(args, &mut i, "--fonts")?),
                "--font" => parsed.font = take_value(args, &mut i, "--font")?,
                "--fallback" => parsed.fallback = Some(take_value(args, &mut i, "--fallback")?),
                "--output" | "-o" => {
                    parsed.output = PathBuf::from(take_value(args, &mut i, "--output")?)
                }
                "--size" | "-s" => {
                    let v = take_value(args, &mut i, "--size")?;
                    parsed.size = v
                        .parse()
                        .map_err(|_| ScrawlError::Config(format!("invalid size '{v}'")))?;
                }
                "--width" => {
                    let v = take_value(args, &mut i, "--width")?;
                    parsed.width = v
                        .parse()
                        .map_err(|_| ScrawlError::Config(format!("invalid width '{v}'")))?;
                }
                "--height" => {
                    let v = take_value(args, &mut i, "--height")?;
                    parsed.height = v
                        .parse()
                        .map_err(|_| ScrawlError::Config(format!("invalid height '{v}'")))?;
                }
                "--color" | "-c" => parsed.color = take_value(args, &mut i, "--color")?,
                "--smooth" => {
                    let v = take_value(args, &mut i, "--smooth")?;
                    parsed.smooth = v
                        .parse()
                        .map_err(|_| ScrawlError::Config(format!("invalid smooth level '{v}'")))?;
                }
                "--hyphenate" => {
                    parsed.hyphenate = true;
                    i += 1;
                }
                "--list-fonts" => {
                    parsed.list_fonts = true;
                    i += 1;
                }
                text if !text.starts_with("--") && parsed.text.is_empty() => {
                    parsed.text = text.to_string();
                    i += 1;
                }
                other => {
                    return Err(ScrawlError::Config(format!("unknown option: {other}")));
                }
            }
        }

        if parsed.text.is_empty() && !parsed.list_fonts {
            return Err(ScrawlError::Config("no text given".to_string()));
        }
        Ok(parsed)
    }

    fn ink(&self) -> Result<Color> {
        named_color(&self.color)
            .ok_or_else(|| ScrawlError::Config(format!("unknown colour '{}'", self.color)))
    }
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse()?;
    let db = StrokeFontDb::new(&args.fonts);

    if args.list_fonts {
        for name in db.available_fonts()? {
            println!("{name}");
        }
        return Ok(());
    }

    let store = db
        .load_store(&args.font, args.fallback.as_deref())
        .with_context(|| format!("loading stroke font from {}", args.fonts.display()))?;
    log::info!(
        "loaded font '{}' with {} glyphs",
        args.font,
        store.glyph_count()
    );
    let writer = Handwriter::new(store).with_assets(Box::new(SoftAssets::new()));

    let mut surface = SoftSurface::new(args.width, args.height);
    let opts = WriteOptions {
        instant: true,
        color: args.ink()?,
        pt_size: args.size,
        smooth_level: args.smooth,
        hyphenation: args.hyphenate,
        ..WriteOptions::default()
    };
    let mut playback = writer.write_text(&mut surface, &args.text, &opts)?;

    let mut input = NullInput;
    loop {
        match playback.step(&mut StepContext {
            surface: &mut surface,
            input: &mut input,
            equations: &NoEquationSupport,
        }) {
            Tick::Finished | Tick::UserQuit => break,
            Tick::Overflow => log::warn!("text overflowed the writing area"),
            _ => {}
        }
    }

    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    surface.write_ppm(&mut BufWriter::new(file))?;
    println!("wrote {}", args.output.display());
    Ok(())
}

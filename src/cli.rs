use crate::config::load_config;
use crate::ir::FixedMetrics;
use crate::layout::compute_layout;
use crate::layout_dump::{layout_dump_string, write_layout_dump};
use crate::scene::{parse_scene, Scene};
use crate::text_metrics::FontMetrics;
use anyhow::Result;
use clap::Parser;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "combo-overlay",
    version,
    about = "Keyboard combo overlay layout engine"
)]
pub struct Args {
    /// Scene file (JSON) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file for the layout dump. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Layout config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Measure label text against this font family instead of the fixed
    /// character-cell metrics.
    #[arg(long = "fontFamily")]
    pub font_family: Option<String>,

    /// Base font size for label measurement
    #[arg(long = "fontSize", default_value_t = 12.0)]
    pub font_size: f64,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let scene = read_scene(args.input.as_deref())?;

    let layout = match &args.font_family {
        Some(family) => {
            let metrics = FontMetrics::load(family, args.font_size);
            compute_layout(&scene.keys, &scene.combos, scene.canvas, &metrics, &config)
        }
        None => compute_layout(
            &scene.keys,
            &scene.combos,
            scene.canvas,
            &FixedMetrics::default(),
            &config,
        ),
    };

    match args.output.as_deref() {
        Some(path) => write_layout_dump(path, &layout)?,
        None => println!("{}", layout_dump_string(&layout)?),
    }
    Ok(())
}

fn read_scene(path: Option<&Path>) -> Result<Scene> {
    let contents = match path {
        Some(path) if path == Path::new("-") => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(parse_scene(&contents)?)
}

use clap::Parser;
use collcanvas::config::CanvasConfig;
use collcanvas::designer::Designer;
use collcanvas::geometry::Point;
use collcanvas::viewport::Viewport;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Render a collection schema to SVG, or convert it to export/save JSON.
#[derive(Parser, Debug)]
#[command(name = "collcanvas", version)]
struct Args {
    /// Schema JSON (current or legacy format)
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the flattened collection/document/field JSON instead of SVG
    #[arg(long, conflicts_with = "save")]
    export: bool,

    /// Write the full schema JSON (upgrades legacy input)
    #[arg(long)]
    save: bool,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pan_x: f64,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pan_y: f64,

    #[arg(long, default_value_t = 1.0)]
    zoom: f64,

    /// Collection id to draw as selected
    #[arg(long)]
    select: Option<String>,

    /// JSON file overriding canvas tuning values
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => CanvasConfig::from_json(&fs::read_to_string(path)?)?,
        None => CanvasConfig::default(),
    };

    let source = fs::read_to_string(&args.input)?;
    let mut designer = Designer::new(config);
    designer.import_json(&source)?;

    let out = if args.export {
        designer.export_json()?
    } else if args.save {
        designer.save_json()?
    } else {
        designer.set_viewport(Viewport {
            pan_offset: Point::new(args.pan_x, args.pan_y),
            zoom: args.zoom,
        });
        designer.select(args.select.as_deref())?;
        designer.render_svg()
    };

    match &args.output {
        Some(path) => fs::write(path, &out)?,
        None => print!("{}", out),
    }
    Ok(())
}

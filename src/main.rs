use clap::Parser;
use kml_geojson::bbox::bounding_box;
use kml_geojson::{
    ConvertError, ConvertOptions, Schema, StyleNaming, StyleOptions, convert_path,
    convert_path_with_folders,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(about = "Convert KML documents to GeoJSON")]
struct Cli {
    /// KML or KMZ file, or a directory to convert recursively
    path: PathBuf,
    /// Output file; for a directory input, the output directory
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long)]
    pretty: bool,
    /// Add a bbox member to each FeatureCollection
    #[arg(long)]
    bbox: bool,
    /// Use line-stroke-*/poly-fill-* style property names
    #[arg(long)]
    prefixed_styles: bool,
    /// Emit icon-offset-units next to icon-offset
    #[arg(long)]
    offset_units: bool,
    #[arg(long)]
    no_ground_overlays: bool,
    /// Keep the Folder hierarchy: emit a root/folder tree instead of a
    /// FeatureCollection
    #[arg(long)]
    folders: bool,
    /// SimpleData types, e.g. population=int,capital=bool
    #[arg(long, default_value = "")]
    schema: Schema,
}

impl Cli {
    fn options(&self) -> ConvertOptions {
        let naming = if self.prefixed_styles {
            StyleNaming::Prefixed
        } else {
            StyleNaming::Simplestyle
        };
        ConvertOptions {
            style: StyleOptions {
                naming,
                offset_units: self.offset_units,
            },
            schema: self.schema.clone(),
            ground_overlays: !self.no_ground_overlays,
            bbox: self.bbox,
        }
    }
}

fn render<T: Serialize>(output: &T, pretty: bool) -> Result<String, ConvertError> {
    let json = if pretty {
        serde_json::to_string_pretty(output)?
    } else {
        serde_json::to_string(output)?
    };
    Ok(json)
}

fn run(args: &Cli) -> Result<(), ConvertError> {
    let options = args.options();
    if args.folders {
        let converted = convert_path_with_folders(&args.path, &options)?;
        for (source, tree) in &converted {
            log::info!("{}: {} feature(s)", source.display(), tree.features().len());
        }
        write_all(args, &converted)
    } else {
        let converted = convert_path(&args.path, &options)?;
        for (source, collection) in &converted {
            log::info!("{}: {} feature(s)", source.display(), collection.features.len());
            if let Some(extent) = bounding_box(&collection.features) {
                log::info!("{}: {}", source.display(), extent);
            }
        }
        write_all(args, &converted)
    }
}

fn write_all<T: Serialize>(args: &Cli, converted: &[(PathBuf, T)]) -> Result<(), ConvertError> {
    let batch = args.path.is_dir();
    for (source, output) in converted {
        let json = render(output, args.pretty)?;
        match (&args.output, batch) {
            (None, false) => println!("{json}"),
            (Some(target), false) => fs::write(target, json)?,
            (target_dir, true) => {
                let target = batch_target(source, &args.path, target_dir.as_deref());
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&target, json)?;
                log::info!("wrote {}", target.display());
            }
        }
    }
    Ok(())
}

/// `<name>.geojson` next to the source, or mirrored under `output`.
fn batch_target(source: &Path, root: &Path, output: Option<&Path>) -> PathBuf {
    let target = source.with_extension("geojson");
    match output {
        Some(output) => match target.strip_prefix(root) {
            Ok(relative) => output.join(relative),
            Err(_) => target,
        },
        None => target,
    }
}

fn main() {
    env_logger::init();
    let args = Cli::parse();
    if let Err(e) = run(&args) {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

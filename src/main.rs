use std::path::PathBuf;

use clap::Parser;
use dicom_mpr::{
    enums::{GeometryCheck, Interpolation, Plane},
    volume_loader::VolumeLoader,
};
use tracing_subscriber::EnvFilter;

/// Load a DICOM series and write its three centre planes as PNG files.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Glob pattern matching the slice files.
    #[arg(default_value = "dicom/*")]
    pattern: String,

    /// Directory the images are written to.
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Resample sagittal and coronal planes to square pixels.
    #[arg(short, long)]
    interpolate: bool,

    /// Reject series whose slices differ in spacing or thickness.
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let check = if args.strict {
        GeometryCheck::Strict
    } else {
        GeometryCheck::Shape
    };
    let interpolation = if args.interpolate {
        Interpolation::Bilinear
    } else {
        Interpolation::None
    };

    let volume = VolumeLoader::load_with(&args.pattern, check)?;
    for plane in Plane::ALL {
        let image = volume.plane_image(
            plane,
            volume.extent(plane) / 2,
            volume.full_window(),
            interpolation,
        )?;
        image.save(args.output.join(format!("{plane}.png")))?;
    }
    Ok(())
}

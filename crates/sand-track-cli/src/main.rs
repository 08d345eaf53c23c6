//! `sand-track`: convert an image into a single-stroke sand-table track.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use log::{info, LevelFilter};

use sand_track::{
    preview_image, write_report, write_track, EdgeParams, IoError, TraceImageError, TraceReport,
};

#[derive(Parser, Debug)]
#[command(
    name = "sand-track",
    version,
    about = "Convert an image into a single continuous track a sand table can draw"
)]
struct Args {
    /// Input image (any format the `image` crate decodes).
    image: PathBuf,

    /// Output track file; defaults to the image path with a `.txt` extension.
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Write the connected edge grid as a PNG preview.
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Write a JSON run report.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Flip the image vertically before tracing; tables draw the track
    /// bottom-up.
    #[arg(long)]
    flip: bool,

    /// Gaussian blur sigma for edge detection.
    #[arg(long, default_value_t = EdgeParams::default().sigma)]
    sigma: f32,

    /// Weak-edge threshold, relative to the peak gradient magnitude.
    #[arg(long, default_value_t = EdgeParams::default().low_threshold)]
    low: f32,

    /// Strong-edge threshold, relative to the peak gradient magnitude.
    #[arg(long, default_value_t = EdgeParams::default().high_threshold)]
    high: f32,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("failed to write {path}: {source}")]
    Save {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error(transparent)]
    Trace(#[from] TraceImageError),
    #[error(transparent)]
    Io(#[from] IoError),
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = sand_track::core::init_with_level(level);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let started = Instant::now();

    let img = image::open(&args.image)
        .map_err(|source| CliError::Read {
            path: args.image.clone(),
            source,
        })?
        .to_luma8();
    let img = if args.flip {
        image::imageops::flip_vertical(&img)
    } else {
        img
    };
    info!("loaded {} ({}x{})", args.image.display(), img.width(), img.height());

    let params = EdgeParams {
        sigma: args.sigma,
        low_threshold: args.low,
        high_threshold: args.high,
    };
    let (result, grid) = sand_track::trace_image(&img, &params)?;

    let out = args
        .out
        .clone()
        .unwrap_or_else(|| args.image.with_extension("txt"));
    write_track(&out, &result.track)?;
    info!("wrote {} track points to {}", result.track.len(), out.display());

    if let Some(path) = &args.preview {
        let mut preview = preview_image(&grid);
        if args.flip {
            // Undo the table orientation so the preview matches the input.
            preview = image::imageops::flip_vertical(&preview);
        }
        preview.save(path).map_err(|source| CliError::Save {
            path: path.clone(),
            source,
        })?;
        info!("wrote preview to {}", path.display());
    }

    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    if let Some(path) = &args.report {
        write_report(
            path,
            &TraceReport {
                image: args.image.display().to_string(),
                params,
                summary: result.summary.clone(),
                elapsed_ms,
            },
        )?;
        info!("wrote report to {}", path.display());
    }

    info!("finished in {elapsed_ms:.1} ms");
    Ok(())
}

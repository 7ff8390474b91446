use std::path::PathBuf;

use clap::Parser;
use stackprep_rs::image_pipeline::{
    center_image, center_image_per_channel, write_sequential_image, CenterOptions, ReadOptions,
    ReadPipeline, WriteOptions,
};
use stackprep_rs::logger;

use tracing::{error, info};

/// Reads raw or standard frames into linear RGB, optionally recenters them,
/// and writes sRGB PNG previews for stacking.
#[derive(Parser, Debug)]
#[command(name = "stackprep", version)]
struct Args {
    /// Input frames (.cr2 and other raw formats, .tif, .png, ...)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output basename; frame i is written to `<BASE>_latest.png` and `<BASE>_<i>.png`
    #[arg(short, long, default_value = "out")]
    output: PathBuf,

    /// Centered crop as WIDTHxHEIGHT
    #[arg(long, value_parser = parse_crop)]
    crop: Option<(usize, usize)>,

    /// Crop origin alignment in pixels
    #[arg(long, default_value_t = 2)]
    crop_align: usize,

    /// Keep integer code values (no float conversion or color processing)
    #[arg(long)]
    raw_values: bool,

    /// Don't decode sRGB standard images to linear light
    #[arg(long)]
    keep_srgb: bool,

    /// Skip black-level and white-balance correction of raw frames
    #[arg(long)]
    no_color_balance: bool,

    /// Leave raw frames as single-channel mosaics
    #[arg(long)]
    no_demosaic: bool,

    /// Roll each frame so its center of mass is centered
    #[arg(long)]
    center: bool,

    /// Center each channel on its own centroid
    #[arg(long, requires = "center")]
    per_channel: bool,

    /// Zero border added before centering
    #[arg(long, default_value_t = 0)]
    pad: usize,

    /// Only shift by even amounts
    #[arg(long)]
    even_shifts: bool,

    /// Divide by the frame maximum before writing
    #[arg(long)]
    normalize: bool,

    /// Don't clamp values above 1.0 before writing
    #[arg(long)]
    no_saturate: bool,
}

fn parse_crop(value: &str) -> Result<(usize, usize), String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {}", value))?;
    let parse = |s: &str| s.trim().parse::<usize>().map_err(|e| format!("{}: {}", s, e));
    Ok((parse(width)?, parse(height)?))
}

fn main() -> anyhow::Result<()> {
    logger::init();
    let args = Args::parse();

    info!("Starting stackprep...");

    let read_options = ReadOptions::builder()
        .to_float(!args.raw_values)
        .srgb_to_linear(!args.keep_srgb)
        .crop(args.crop)
        .crop_align(args.crop_align)
        .color_balance(!args.no_color_balance)
        .demosaic(!args.no_demosaic)
        .build();
    let center_options = CenterOptions::builder()
        .pad(args.pad)
        .only_even_shifts(args.even_shifts)
        .build();
    let write_options = WriteOptions::builder()
        .normalize(args.normalize)
        .saturate(!args.no_saturate)
        .build();

    let pipeline = ReadPipeline::new(read_options);
    info!("Read options: {:?}", pipeline.options());

    let mut failures = 0;
    for (sequence_num, input) in (0u32..).zip(&args.inputs) {
        let result = pipeline.read_file(input).and_then(|image| {
            let image = match (args.center, args.per_channel) {
                (true, true) => center_image_per_channel(&image, &center_options)?,
                (true, false) => center_image(&image, &center_options)?,
                _ => image,
            };
            write_sequential_image(&image, &args.output, sequence_num, &write_options)
        });

        match result {
            Ok([latest, numbered]) => {
                info!("{} -> {} ({})", input.display(), numbered.display(), latest.display())
            }
            Err(e) => {
                error!("Failed to process {}: {}", input.display(), e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} frames failed", failures, args.inputs.len());
    }
    Ok(())
}

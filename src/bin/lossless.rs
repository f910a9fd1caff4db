use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use env_logger::{Builder, Env};
use log::{info, LevelFilter};
use lossless_codec::container::compressed_file::{compress_with, decompress_with, CompressedImage};
use lossless_codec::encode::lossless::{verify_round_trip, CodecParams};
use lossless_codec::image::{load_image, save_image};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Lossless RGB image compressor", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Frequency at which the adaptive model halves its counts.
    /// Must be the same for compression and decompression.
    #[arg(long, global = true, default_value_t = CodecParams::default().rescale_threshold)]
    rescale_threshold: u32,

    /// Enable debug logging for the codec
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress an image (BMP, PNG) into a .compress file
    Compress {
        input: PathBuf,
        /// Defaults to the input path with a `.compress` extension
        output: Option<PathBuf>,
    },
    /// Decompress a .compress file into an image
    Decompress { input: PathBuf, output: PathBuf },
    /// Compress in memory, decompress again and compare
    Verify { input: PathBuf },
    /// Print the header of a .compress file
    Info { input: PathBuf },
}

fn init_logging(args: &Args) {
    let mut builder = Builder::from_env(Env::new().default_filter_or("info"));
    if args.verbose {
        builder.filter_module("lossless_codec", LevelFilter::Debug);
    }
    builder.init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let params = CodecParams {
        rescale_threshold: args.rescale_threshold,
    };
    params.validate()?;

    match &args.command {
        Command::Compress { input, output } => {
            let grid = load_image(input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let compressed = compress_with(&grid, &params)?;
            let output = output.clone().unwrap_or_else(|| {
                input.with_extension(lossless_codec::container::compressed_file::FILE_EXTENSION)
            });
            compressed.save(&output)?;
            println!("{}", compressed.stats());
        }
        Command::Decompress { input, output } => {
            let compressed = CompressedImage::load(input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let grid = decompress_with(&compressed, &params)?;
            save_image(&grid, output)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!("Wrote {}x{} image to {}", grid.width(), grid.height(), output.display());
        }
        Command::Verify { input } => {
            let grid = load_image(input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let compressed = compress_with(&grid, &params)?;
            if let Err(err) = verify_round_trip(&grid, &compressed.bits, &params) {
                bail!("verification failed for {}: {}", input.display(), err);
            }
            println!("OK: {}", compressed.stats());
        }
        Command::Info { input } => {
            let compressed = CompressedImage::load(input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            println!("Width:   {}", compressed.width);
            println!("Height:  {}", compressed.height);
            println!("Payload: {} bytes", compressed.bits.byte_len());
            println!("Total:   {} bytes", compressed.byte_len());
        }
    }

    Ok(())
}

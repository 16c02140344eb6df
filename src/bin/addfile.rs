//! MiniVSFS file adder
//!
//! Copies an existing image, inserts one host file into its root directory
//! and writes the result to a new path. The input image is never modified.

use anyhow::{bail, Context};
use clap::Parser;
use minivsfs::{insert_file, Image};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "minivsfs-add")]
#[command(about = "Add a file to a MiniVSFS filesystem image")]
struct Args {
    /// Input image file
    #[arg(long)]
    input: PathBuf,

    /// Output image file
    #[arg(long)]
    output: PathBuf,

    /// File to add to the root directory
    #[arg(long)]
    file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();

    let metadata = fs::metadata(&args.file)
        .with_context(|| format!("file '{}' not found", args.file.display()))?;
    if !metadata.is_file() {
        bail!("'{}' is not a regular file", args.file.display());
    }

    let content = fs::read(&args.file)
        .with_context(|| format!("cannot read file '{}'", args.file.display()))?;
    let mut image = Image::load(&args.input)
        .with_context(|| format!("cannot open input image '{}'", args.input.display()))?;

    info!("Adding {:?} to {:?}", args.file, args.input);
    let name = args.file.to_string_lossy();
    let now = chrono::Utc::now().timestamp() as u64;
    let summary = insert_file(&mut image, &name, &content, now)?;
    image
        .save(&args.output)
        .with_context(|| format!("cannot create output image '{}'", args.output.display()))?;

    println!(
        "Added '{}' to image '{}'",
        args.file.display(),
        args.output.display()
    );
    println!(
        "File size: {} bytes ({} blocks)",
        summary.size_bytes, summary.blocks_used
    );
    println!("Assigned inode: {}", summary.inode_no);

    Ok(())
}

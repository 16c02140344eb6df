//! MiniVSFS formatter
//!
//! Creates a brand-new, empty MiniVSFS image at the requested size and
//! inode count.

use anyhow::Context;
use clap::Parser;
use minivsfs::format_image;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "minivsfs-mkfs")]
#[command(about = "Create an empty MiniVSFS filesystem image")]
struct Args {
    /// Output image file
    #[arg(long)]
    image: PathBuf,

    /// Total size in KiB (multiple of 4, range 180-4096)
    #[arg(long = "size-kib")]
    size_kib: u64,

    /// Number of inodes (range 128-512)
    #[arg(long)]
    inodes: u64,
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

    info!("Formatting {:?}", args.image);
    let now = chrono::Utc::now().timestamp() as u64;
    let image = format_image(args.size_kib, args.inodes, now)?;
    image
        .save(&args.image)
        .with_context(|| format!("cannot create image file '{}'", args.image.display()))?;

    let sb = image.superblock();
    println!("Created MiniVSFS image '{}'", args.image.display());
    println!("Size: {} KiB ({} blocks)", args.size_kib, sb.total_blocks);
    println!("Inodes: {}", sb.inode_count);

    Ok(())
}

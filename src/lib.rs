//! # MiniVSFS - Minimal Single-Directory Filesystem Image Format
//!
//! `minivsfs` builds and mutates fixed-layout filesystem images: a
//! superblock, two one-block bitmaps, a packed inode table and a flat data
//! region, all in 4 KiB blocks with checksum-guarded records.
//!
//! - **Byte-exact records**: field-by-field little-endian codecs, no
//!   reliance on in-memory representation
//! - **Checksummed metadata**: CRC32 on the superblock and every inode, a
//!   one-byte XOR on directory entries, always finalized last
//! - **First-fit bitmap allocation** over small, bounded resource counts
//! - **Whole-image I/O**: load fully, mutate a private copy, rewrite fully
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use minivsfs::{format_image, insert_file, Image, Result};
//!
//! # fn main() -> Result<()> {
//! // Format a 180 KiB image with 128 inodes.
//! let image = format_image(180, 128, 1_700_000_000)?;
//! image.save("disk.img")?;
//!
//! // Add one file to the root directory.
//! let mut image = Image::load("disk.img")?;
//! let summary = insert_file(&mut image, "notes.txt", b"hello", 1_700_000_100)?;
//! image.save("disk.out.img")?;
//! println!("assigned inode {}", summary.inode_no);
//! # Ok(())
//! # }
//! ```
//!
//! ## Image Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ Block 0: Superblock                         │
//! │  - Magic 0x4D565346, version, block size    │
//! │  - Region boundaries, root inode, CRC32     │
//! ├─────────────────────────────────────────────┤
//! │ Block 1: Inode bitmap (1 bit per inode)     │
//! ├─────────────────────────────────────────────┤
//! │ Block 2: Data bitmap (1 bit per data block) │
//! ├─────────────────────────────────────────────┤
//! │ Blocks 3..: Inode table (128 B records)     │
//! ├─────────────────────────────────────────────┤
//! │ Remaining blocks: Data region               │
//! │  - Root directory entries + file content    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The root directory is fixed-capacity: its entries live in the first
//! data-region block only (64 slots, two taken by `.` and `..`).

pub mod bitmap;
pub mod checksum;
pub mod dirent;
pub mod error;
pub mod format;
pub mod image;
pub mod inode;
pub mod insert;
pub mod layout;
pub mod superblock;

// Re-export commonly used types
pub use dirent::{DirEntry, EntryKind, DIRENT_SIZE, NAME_LEN};
pub use error::{Result, VsfsError};
pub use format::format_image;
pub use image::Image;
pub use inode::{Inode, DIRECT_MAX, INODE_SIZE};
pub use insert::{insert_file, InsertSummary};
pub use layout::Layout;
pub use superblock::{Superblock, BLOCK_SIZE, FORMAT_VERSION, MAGIC, ROOT_INO};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Region planning for a new image
//!
//! The planner turns a requested size and inode count into fixed region
//! boundaries: superblock, inode bitmap, data bitmap, inode table, data
//! region, in that order. Everything after the metadata becomes the data
//! region; an image whose metadata would leave no data blocks is rejected.

use crate::error::{Result, VsfsError};
use crate::inode::INODE_SIZE;
use crate::superblock::BLOCK_SIZE;

/// Smallest accepted image size in KiB
pub const MIN_SIZE_KIB: u64 = 180;

/// Largest accepted image size in KiB
pub const MAX_SIZE_KIB: u64 = 4096;

/// Smallest accepted inode count
pub const MIN_INODES: u64 = 128;

/// Largest accepted inode count
pub const MAX_INODES: u64 = 512;

const KIB_PER_BLOCK: u64 = BLOCK_SIZE as u64 / 1024;

/// Planned region boundaries, all in whole blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Requested image size in KiB
    pub size_kib: u64,

    /// Total number of blocks in the image
    pub total_blocks: u64,

    /// Number of inodes in the table
    pub inode_count: u64,

    /// First block of the inode bitmap
    pub inode_bitmap_start: u64,

    /// Length of the inode bitmap in blocks
    pub inode_bitmap_blocks: u64,

    /// First block of the data bitmap
    pub data_bitmap_start: u64,

    /// Length of the data bitmap in blocks
    pub data_bitmap_blocks: u64,

    /// First block of the inode table
    pub inode_table_start: u64,

    /// Length of the inode table in blocks
    pub inode_table_blocks: u64,

    /// First block of the data region
    pub data_region_start: u64,

    /// Length of the data region in blocks
    pub data_region_blocks: u64,
}

impl Layout {
    /// Plan the fixed metadata regions for a `size_kib` image holding
    /// `inode_count` inodes
    ///
    /// Fails without producing anything if the size is unaligned, either
    /// parameter is out of range, or the metadata footprint would consume
    /// the entire image.
    pub fn plan(size_kib: u64, inode_count: u64) -> Result<Self> {
        if size_kib % KIB_PER_BLOCK != 0 {
            return Err(VsfsError::UnalignedSize(size_kib));
        }
        if !(MIN_SIZE_KIB..=MAX_SIZE_KIB).contains(&size_kib) {
            return Err(VsfsError::SizeOutOfRange {
                size: size_kib,
                min: MIN_SIZE_KIB,
                max: MAX_SIZE_KIB,
            });
        }
        if !(MIN_INODES..=MAX_INODES).contains(&inode_count) {
            return Err(VsfsError::InodeCountOutOfRange {
                count: inode_count,
                min: MIN_INODES,
                max: MAX_INODES,
            });
        }

        let total_blocks = size_kib / KIB_PER_BLOCK;
        let inode_table_blocks = (inode_count * INODE_SIZE as u64).div_ceil(BLOCK_SIZE as u64);

        // Superblock + inode bitmap + data bitmap + inode table.
        let metadata_blocks = 3 + inode_table_blocks;
        if metadata_blocks >= total_blocks {
            return Err(VsfsError::NoDataBlocks {
                metadata: metadata_blocks,
                total: total_blocks,
            });
        }

        Ok(Layout {
            size_kib,
            total_blocks,
            inode_count,
            inode_bitmap_start: 1,
            inode_bitmap_blocks: 1,
            data_bitmap_start: 2,
            data_bitmap_blocks: 1,
            inode_table_start: 3,
            inode_table_blocks,
            data_region_start: 3 + inode_table_blocks,
            data_region_blocks: total_blocks - metadata_blocks,
        })
    }
}

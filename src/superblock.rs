//! Superblock codec (block 0)
//!
//! The superblock occupies the first 116 bytes of block 0 and describes the
//! whole image: magic, format version, region boundaries, root inode and a
//! trailing CRC32. The remainder of block 0 is zero and is covered by the
//! checksum, so the checksum always goes in last.

use crate::checksum::crc32;
use crate::error::{Result, VsfsError};
use crate::layout::Layout;

/// Magic number identifying a MiniVSFS image
pub const MAGIC: u32 = 0x4D56_5346;

/// On-disk format version (recorded, not enforced)
pub const FORMAT_VERSION: u32 = 1;

/// Size of every block in the image
pub const BLOCK_SIZE: usize = 4096;

/// Bytes of block 0 occupied by superblock fields
pub const SUPERBLOCK_SIZE: usize = 116;

/// Inode number of the root directory
pub const ROOT_INO: u64 = 1;

/// Byte offset of the trailing checksum field within block 0
const CHECKSUM_OFFSET: usize = 112;

/// The checksum covers every block-0 byte before the final four
const CHECKSUM_SPAN: usize = BLOCK_SIZE - 4;

/// Image superblock
///
/// All integers are little-endian on disk; the layout is packed, no padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Superblock {
    /// Magic number: 0x4D565346
    pub magic: u32,

    /// Format version
    pub version: u32,

    /// Block size in bytes (always 4096)
    pub block_size: u32,

    /// Total number of blocks in the image
    pub total_blocks: u64,

    /// Number of inodes in the inode table
    pub inode_count: u64,

    /// First block of the inode bitmap (always 1)
    pub inode_bitmap_start: u64,

    /// Length of the inode bitmap in blocks (always 1)
    pub inode_bitmap_blocks: u64,

    /// First block of the data bitmap (always 2)
    pub data_bitmap_start: u64,

    /// Length of the data bitmap in blocks (always 1)
    pub data_bitmap_blocks: u64,

    /// First block of the inode table (always 3)
    pub inode_table_start: u64,

    /// Length of the inode table in blocks
    pub inode_table_blocks: u64,

    /// First block of the data region
    pub data_region_start: u64,

    /// Length of the data region in blocks
    pub data_region_blocks: u64,

    /// Inode number of the root directory (always 1)
    pub root_inode: u64,

    /// Image creation time (Unix epoch seconds)
    pub mtime_epoch: u64,

    /// Feature flags (none defined)
    pub flags: u32,

    /// CRC32 over block 0 with this field zeroed
    pub checksum: u32,
}

impl Superblock {
    /// Create a superblock for a freshly planned layout
    ///
    /// The checksum starts at zero; it is finalized at the block level once
    /// every block-0 byte is in place.
    pub fn new(layout: &Layout, mtime_epoch: u64) -> Self {
        Superblock {
            magic: MAGIC,
            version: FORMAT_VERSION,
            block_size: BLOCK_SIZE as u32,
            total_blocks: layout.total_blocks,
            inode_count: layout.inode_count,
            inode_bitmap_start: layout.inode_bitmap_start,
            inode_bitmap_blocks: layout.inode_bitmap_blocks,
            data_bitmap_start: layout.data_bitmap_start,
            data_bitmap_blocks: layout.data_bitmap_blocks,
            inode_table_start: layout.inode_table_start,
            inode_table_blocks: layout.inode_table_blocks,
            data_region_start: layout.data_region_start,
            data_region_blocks: layout.data_region_blocks,
            root_inode: ROOT_INO,
            mtime_epoch,
            flags: 0,
            checksum: 0,
        }
    }

    /// Validate the superblock magic
    ///
    /// The version field is recorded but not enforced beyond existence.
    pub fn validate(&self) -> Result<()> {
        if self.magic != MAGIC {
            return Err(VsfsError::InvalidMagic);
        }
        Ok(())
    }

    /// Serialize the superblock fields to bytes
    pub fn to_bytes(&self) -> [u8; SUPERBLOCK_SIZE] {
        let mut bytes = [0u8; SUPERBLOCK_SIZE];
        bytes[0..4].copy_from_slice(&self.magic.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.version.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.block_size.to_le_bytes());
        bytes[12..20].copy_from_slice(&self.total_blocks.to_le_bytes());
        bytes[20..28].copy_from_slice(&self.inode_count.to_le_bytes());
        bytes[28..36].copy_from_slice(&self.inode_bitmap_start.to_le_bytes());
        bytes[36..44].copy_from_slice(&self.inode_bitmap_blocks.to_le_bytes());
        bytes[44..52].copy_from_slice(&self.data_bitmap_start.to_le_bytes());
        bytes[52..60].copy_from_slice(&self.data_bitmap_blocks.to_le_bytes());
        bytes[60..68].copy_from_slice(&self.inode_table_start.to_le_bytes());
        bytes[68..76].copy_from_slice(&self.inode_table_blocks.to_le_bytes());
        bytes[76..84].copy_from_slice(&self.data_region_start.to_le_bytes());
        bytes[84..92].copy_from_slice(&self.data_region_blocks.to_le_bytes());
        bytes[92..100].copy_from_slice(&self.root_inode.to_le_bytes());
        bytes[100..108].copy_from_slice(&self.mtime_epoch.to_le_bytes());
        bytes[108..112].copy_from_slice(&self.flags.to_le_bytes());
        bytes[112..116].copy_from_slice(&self.checksum.to_le_bytes());
        bytes
    }

    /// Deserialize a superblock from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < SUPERBLOCK_SIZE {
            return Err(VsfsError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "Insufficient bytes for superblock",
            )));
        }

        Ok(Superblock {
            magic: get_u32(bytes, 0),
            version: get_u32(bytes, 4),
            block_size: get_u32(bytes, 8),
            total_blocks: get_u64(bytes, 12),
            inode_count: get_u64(bytes, 20),
            inode_bitmap_start: get_u64(bytes, 28),
            inode_bitmap_blocks: get_u64(bytes, 36),
            data_bitmap_start: get_u64(bytes, 44),
            data_bitmap_blocks: get_u64(bytes, 52),
            inode_table_start: get_u64(bytes, 60),
            inode_table_blocks: get_u64(bytes, 68),
            data_region_start: get_u64(bytes, 76),
            data_region_blocks: get_u64(bytes, 84),
            root_inode: get_u64(bytes, 92),
            mtime_epoch: get_u64(bytes, 100),
            flags: get_u32(bytes, 108),
            checksum: get_u32(bytes, 112),
        })
    }
}

/// Recompute and store the block-0 checksum
///
/// Call only after every other byte of the block is final: the CRC covers
/// the whole block except the last four bytes, with the checksum field
/// itself zeroed during computation.
pub fn finalize_block(block: &mut [u8]) -> u32 {
    block[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 4].fill(0);
    let sum = crc32(&block[..CHECKSUM_SPAN]);
    block[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 4].copy_from_slice(&sum.to_le_bytes());
    sum
}

/// True when the stored block-0 checksum matches a recomputation
pub fn verify_block(block: &[u8]) -> bool {
    let stored = get_u32(block, CHECKSUM_OFFSET);
    let mut copy = block[..CHECKSUM_SPAN].to_vec();
    copy[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 4].fill(0);
    crc32(&copy) == stored
}

fn get_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn get_u64(bytes: &[u8], offset: usize) -> u64 {
    u64::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
        bytes[offset + 4],
        bytes[offset + 5],
        bytes[offset + 6],
        bytes[offset + 7],
    ])
}

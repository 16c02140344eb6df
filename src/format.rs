//! Format operation: assemble a brand-new image
//!
//! Blocks are laid down in strict order: superblock, inode bitmap (root
//! inode pre-marked), data bitmap (root directory block pre-marked), inode
//! table (root inode in table block 0), data region (root directory entries
//! in data block 0). The superblock checksum goes in only once every other
//! block-0 byte is final.

use tracing::debug;

use crate::bitmap;
use crate::dirent::{DirEntry, EntryKind, DIRENT_SIZE};
use crate::error::Result;
use crate::image::Image;
use crate::inode::{Inode, INODE_SIZE};
use crate::layout::Layout;
use crate::superblock::{self, Superblock, BLOCK_SIZE, ROOT_INO, SUPERBLOCK_SIZE};

/// Build a fresh image of `size_kib` KiB holding `inode_count` inodes,
/// stamped with `now` (Unix epoch seconds)
///
/// The caller decides where the image goes; writing it out is a separate
/// [`Image::save`] step, so validation failures produce nothing on disk.
pub fn format_image(size_kib: u64, inode_count: u64, now: u64) -> Result<Image> {
    let layout = Layout::plan(size_kib, inode_count)?;
    debug!(
        "Planned layout: {} blocks total, {} inode table, {} data",
        layout.total_blocks, layout.inode_table_blocks, layout.data_region_blocks
    );

    let mut bytes = vec![0u8; layout.total_blocks as usize * BLOCK_SIZE];

    let superblock = Superblock::new(&layout, now);
    bytes[..SUPERBLOCK_SIZE].copy_from_slice(&superblock.to_bytes());

    // Root inode and root directory block are allocated from birth.
    let inode_bitmap_offset = layout.inode_bitmap_start as usize * BLOCK_SIZE;
    bitmap::mark_used(
        &mut bytes[inode_bitmap_offset..inode_bitmap_offset + BLOCK_SIZE],
        0,
    );
    let data_bitmap_offset = layout.data_bitmap_start as usize * BLOCK_SIZE;
    bitmap::mark_used(
        &mut bytes[data_bitmap_offset..data_bitmap_offset + BLOCK_SIZE],
        0,
    );

    // Inode table block 0 carries the root inode; the rest stays zero.
    let root = Inode::new_root_dir(layout.data_region_start, now);
    let table_offset = layout.inode_table_start as usize * BLOCK_SIZE;
    bytes[table_offset..table_offset + INODE_SIZE].copy_from_slice(&root.to_bytes());

    // Data block 0: the root directory's "." and "..", both the root inode.
    let dot = DirEntry::new(ROOT_INO as u32, EntryKind::Directory, ".");
    let dotdot = DirEntry::new(ROOT_INO as u32, EntryKind::Directory, "..");
    let dir_offset = layout.data_region_start as usize * BLOCK_SIZE;
    bytes[dir_offset..dir_offset + DIRENT_SIZE].copy_from_slice(&dot.to_bytes());
    bytes[dir_offset + DIRENT_SIZE..dir_offset + 2 * DIRENT_SIZE]
        .copy_from_slice(&dotdot.to_bytes());

    superblock::finalize_block(&mut bytes[..BLOCK_SIZE]);

    Image::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VsfsError;

    const NOW: u64 = 1_700_000_000;

    #[test]
    fn test_superblock_checksum_verifies() {
        let image = format_image(180, 128, NOW).unwrap();
        assert!(superblock::verify_block(image.block(0)));
        assert_ne!(image.superblock().checksum, 0);
    }

    #[test]
    fn test_bitmaps_mark_only_root_resources() {
        let image = format_image(180, 128, NOW).unwrap();
        let sb = image.superblock();
        assert_eq!(bitmap::count_used(image.inode_bitmap(), sb.inode_count), 1);
        assert!(bitmap::is_set(image.inode_bitmap(), 0));
        assert_eq!(
            bitmap::count_used(image.data_bitmap(), sb.data_region_blocks),
            1
        );
        assert!(bitmap::is_set(image.data_bitmap(), 0));
    }

    #[test]
    fn test_root_directory_has_dot_and_dotdot() {
        let image = format_image(180, 128, NOW).unwrap();
        let entries = image.root_entries().unwrap();
        assert_eq!(entries.len(), BLOCK_SIZE / DIRENT_SIZE);

        assert_eq!(entries[0].name_str(), ".");
        assert_eq!(entries[0].inode_no as u64, ROOT_INO);
        assert_eq!(entries[0].kind().unwrap(), EntryKind::Directory);
        assert!(entries[0].verify());

        assert_eq!(entries[1].name_str(), "..");
        assert_eq!(entries[1].inode_no as u64, ROOT_INO);
        assert_eq!(entries[1].kind().unwrap(), EntryKind::Directory);
        assert!(entries[1].verify());

        assert!(entries[2..].iter().all(DirEntry::is_empty));
    }

    #[test]
    fn test_remaining_blocks_are_zero() {
        let image = format_image(180, 128, NOW).unwrap();
        let sb = image.superblock();
        // Inode table past the root inode.
        assert!(image.block(sb.inode_table_start)[INODE_SIZE..]
            .iter()
            .all(|&b| b == 0));
        // Data region past the root directory block.
        for index in 1..sb.data_region_blocks {
            assert!(image
                .block(sb.data_region_start + index)
                .iter()
                .all(|&b| b == 0));
        }
    }

    #[test]
    fn test_superblock_timestamps_propagate() {
        let image = format_image(180, 128, NOW).unwrap();
        assert_eq!(image.superblock().mtime_epoch, NOW);
        let root = image.read_inode(ROOT_INO).unwrap();
        assert_eq!(root.atime, NOW);
        assert_eq!(root.mtime, NOW);
        assert_eq!(root.ctime, NOW);
    }

    #[test]
    fn test_invalid_parameters_produce_nothing() {
        assert!(matches!(
            format_image(181, 128, NOW),
            Err(VsfsError::UnalignedSize(181))
        ));
        assert!(matches!(
            format_image(180, 600, NOW),
            Err(VsfsError::InodeCountOutOfRange { .. })
        ));
    }
}

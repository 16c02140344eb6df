//! Insert operation: add one file to a loaded image
//!
//! Every precondition is checked against the in-memory snapshot before a
//! single byte of it changes, so a failed insertion leaves the caller's
//! image exactly as loaded and the output path untouched.

use tracing::debug;

use crate::bitmap;
use crate::dirent::{DirEntry, EntryKind, DIRENT_SIZE};
use crate::error::{Result, VsfsError};
use crate::image::Image;
use crate::inode::{Inode, DIRECT_MAX};
use crate::superblock::BLOCK_SIZE;

/// Outcome of a successful insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertSummary {
    /// Inode number assigned to the new file
    pub inode_no: u64,

    /// Exact content length in bytes
    pub size_bytes: u64,

    /// Data blocks allocated for the content
    pub blocks_used: u64,
}

/// Insert `content` into `image` as a root-directory entry named `name`,
/// stamping `now` (Unix epoch seconds)
///
/// The stored name is truncated to the directory entry's field capacity;
/// duplicate detection compares that stored form. A zero-length file is
/// accepted and consumes no data blocks.
pub fn insert_file(
    image: &mut Image,
    name: &str,
    content: &[u8],
    now: u64,
) -> Result<InsertSummary> {
    let size_bytes = content.len() as u64;
    let blocks_needed = size_bytes.div_ceil(BLOCK_SIZE as u64);
    if blocks_needed > DIRECT_MAX as u64 {
        return Err(VsfsError::FileTooLarge {
            size: size_bytes,
            max: (DIRECT_MAX * BLOCK_SIZE) as u64,
            slots: DIRECT_MAX,
        });
    }

    let sb = *image.superblock();

    // Resource scan, read-only until every precondition holds.
    let inode_no = bitmap::find_free(image.inode_bitmap(), sb.inode_count)
        .map(|index| index + 1)
        .ok_or(VsfsError::OutOfInodes)?;

    let free_data = collect_free(image.data_bitmap(), sb.data_region_blocks, blocks_needed);
    if (free_data.len() as u64) < blocks_needed {
        return Err(VsfsError::OutOfDataBlocks {
            needed: blocks_needed,
            found: free_data.len() as u64,
        });
    }

    // Scan every root-directory slot: a duplicate anywhere is fatal, the
    // first empty slot receives the new entry.
    let stored_name = DirEntry::encode_name(name);
    let mut free_slot = None;
    for (slot, entry) in image.root_entries()?.iter().enumerate() {
        if entry.is_empty() {
            if free_slot.is_none() {
                free_slot = Some(slot);
            }
        } else if entry.name == stored_name {
            return Err(VsfsError::DuplicateName(entry.name_str()));
        }
    }
    let slot = free_slot.ok_or(VsfsError::DirectoryFull)?;

    debug!(
        "Inserting '{}': inode {}, {} data blocks",
        name, inode_no, blocks_needed
    );

    // New inode, direct pointers as absolute block indices.
    let mut direct = [0u32; DIRECT_MAX];
    for (slot, &region_index) in free_data.iter().enumerate() {
        direct[slot] = (sb.data_region_start + region_index) as u32;
    }
    let inode = Inode::new_file(size_bytes, direct, now);
    image.write_inode(inode_no, &inode);

    // Content, zero-padding the tail of the final block.
    for (chunk, &region_index) in content.chunks(BLOCK_SIZE).zip(&free_data) {
        let block = image.data_block_mut(region_index);
        block.fill(0);
        block[..chunk.len()].copy_from_slice(chunk);
    }

    for &region_index in &free_data {
        bitmap::mark_used(image.data_bitmap_mut(), region_index);
    }
    bitmap::mark_used(image.inode_bitmap_mut(), inode_no - 1);

    let entry = DirEntry::new(inode_no as u32, EntryKind::File, name);
    image.write_root_entry(slot, &entry);

    // Root directory bookkeeping: one more link, one more entry's worth of
    // size, fresh mtime, CRC re-finalized last.
    let mut root = image.read_inode(sb.root_inode)?;
    root.links += 1;
    root.size_bytes += DIRENT_SIZE as u64;
    root.mtime = now;
    root.finalize();
    image.write_inode(sb.root_inode, &root);

    // No superblock field changed, but the checksum discipline still holds:
    // finalize block 0 after every mutation.
    image.finalize_superblock();

    Ok(InsertSummary {
        inode_no,
        size_bytes,
        blocks_used: blocks_needed,
    })
}

/// First `wanted` free data-region indices, ascending
fn collect_free(bitmap: &[u8], capacity: u64, wanted: u64) -> Vec<u64> {
    let mut found = Vec::with_capacity(wanted as usize);
    for index in 0..capacity {
        if found.len() as u64 == wanted {
            break;
        }
        if !bitmap::is_set(bitmap, index) {
            found.push(index);
        }
    }
    found
}

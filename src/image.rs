//! In-memory image and whole-file I/O
//!
//! Every operation works on a private in-memory copy of the image: read it
//! fully, mutate the buffer, write it fully. There is no incremental or
//! streaming path, and the insert operation never writes its input path.

use std::fs;
use std::path::Path;

use crate::dirent::{DirEntry, DIRENT_SIZE};
use crate::error::{Result, VsfsError};
use crate::inode::{Inode, INODE_SIZE};
use crate::superblock::{self, Superblock, BLOCK_SIZE, SUPERBLOCK_SIZE};

/// A whole filesystem image held in memory
pub struct Image {
    superblock: Superblock,
    bytes: Vec<u8>,
}

impl Image {
    /// Wrap a fully loaded image buffer
    ///
    /// Validates the magic and that the buffer covers the declared block
    /// count. Trailing bytes past the declared size are dropped; a shorter
    /// buffer is a fatal truncation error.
    pub fn from_bytes(mut bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() < BLOCK_SIZE {
            return Err(VsfsError::TruncatedImage {
                expected: BLOCK_SIZE as u64,
                actual: bytes.len() as u64,
            });
        }

        let superblock = Superblock::from_bytes(&bytes[..SUPERBLOCK_SIZE])?;
        superblock.validate()?;

        let expected = superblock.total_blocks.saturating_mul(BLOCK_SIZE as u64);
        if (bytes.len() as u64) < expected {
            return Err(VsfsError::TruncatedImage {
                expected,
                actual: bytes.len() as u64,
            });
        }
        bytes.truncate(expected as usize);

        Ok(Image { superblock, bytes })
    }

    /// Read a whole image from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_bytes(fs::read(path)?)
    }

    /// Write the whole image to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, &self.bytes)?;
        Ok(())
    }

    /// The parsed superblock
    pub fn superblock(&self) -> &Superblock {
        &self.superblock
    }

    /// The raw image bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// One block of the image
    pub fn block(&self, index: u64) -> &[u8] {
        let start = index as usize * BLOCK_SIZE;
        &self.bytes[start..start + BLOCK_SIZE]
    }

    /// One block of the image, mutable
    pub fn block_mut(&mut self, index: u64) -> &mut [u8] {
        let start = index as usize * BLOCK_SIZE;
        &mut self.bytes[start..start + BLOCK_SIZE]
    }

    /// The inode bitmap block
    pub fn inode_bitmap(&self) -> &[u8] {
        self.block(self.superblock.inode_bitmap_start)
    }

    /// The inode bitmap block, mutable
    pub fn inode_bitmap_mut(&mut self) -> &mut [u8] {
        let index = self.superblock.inode_bitmap_start;
        self.block_mut(index)
    }

    /// The data bitmap block
    pub fn data_bitmap(&self) -> &[u8] {
        self.block(self.superblock.data_bitmap_start)
    }

    /// The data bitmap block, mutable
    pub fn data_bitmap_mut(&mut self) -> &mut [u8] {
        let index = self.superblock.data_bitmap_start;
        self.block_mut(index)
    }

    /// One data-region block by its region-relative index, mutable
    pub fn data_block_mut(&mut self, region_index: u64) -> &mut [u8] {
        let index = self.superblock.data_region_start + region_index;
        self.block_mut(index)
    }

    /// Read inode `number` (1-based) from the table
    pub fn read_inode(&self, number: u64) -> Result<Inode> {
        let (block, offset) = self.inode_slot(number);
        Inode::from_bytes(&self.block(block)[offset..offset + INODE_SIZE])
    }

    /// Write inode `number` (1-based) into the table
    pub fn write_inode(&mut self, number: u64, inode: &Inode) {
        let (block, offset) = self.inode_slot(number);
        self.block_mut(block)[offset..offset + INODE_SIZE].copy_from_slice(&inode.to_bytes());
    }

    fn inode_slot(&self, number: u64) -> (u64, usize) {
        let byte_index = (number - 1) as usize * INODE_SIZE;
        (
            self.superblock.inode_table_start + (byte_index / BLOCK_SIZE) as u64,
            byte_index % BLOCK_SIZE,
        )
    }

    /// Every slot of the root directory's first data block, in order
    ///
    /// Directory entries live only in that single block.
    pub fn root_entries(&self) -> Result<Vec<DirEntry>> {
        self.block(self.superblock.data_region_start)
            .chunks_exact(DIRENT_SIZE)
            .map(DirEntry::from_bytes)
            .collect()
    }

    /// Overwrite one slot of the root directory block
    pub fn write_root_entry(&mut self, slot: usize, entry: &DirEntry) {
        let index = self.superblock.data_region_start;
        let start = slot * DIRENT_SIZE;
        self.block_mut(index)[start..start + DIRENT_SIZE].copy_from_slice(&entry.to_bytes());
    }

    /// Re-finalize the block-0 checksum
    ///
    /// Call after any mutation, once every other byte of block 0 is final.
    pub fn finalize_superblock(&mut self) {
        let sum = superblock::finalize_block(&mut self.bytes[..BLOCK_SIZE]);
        self.superblock.checksum = sum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::format_image;
    use tempfile::NamedTempFile;

    #[test]
    fn test_save_and_load_round_trip() {
        let temp = NamedTempFile::new().unwrap();
        let image = format_image(180, 128, 1_700_000_000).unwrap();
        image.save(temp.path()).unwrap();

        let loaded = Image::load(temp.path()).unwrap();
        assert_eq!(loaded.superblock(), image.superblock());
        assert_eq!(loaded.as_bytes(), image.as_bytes());
    }

    #[test]
    fn test_load_rejects_bad_magic() {
        let temp = NamedTempFile::new().unwrap();
        let image = format_image(180, 128, 1_700_000_000).unwrap();
        let mut bytes = image.as_bytes().to_vec();
        bytes[0] ^= 0xFF;
        fs::write(temp.path(), &bytes).unwrap();

        assert!(matches!(
            Image::load(temp.path()),
            Err(VsfsError::InvalidMagic)
        ));
    }

    #[test]
    fn test_load_rejects_truncated_image() {
        let temp = NamedTempFile::new().unwrap();
        let image = format_image(180, 128, 1_700_000_000).unwrap();
        let bytes = image.as_bytes();
        fs::write(temp.path(), &bytes[..bytes.len() - BLOCK_SIZE]).unwrap();

        assert!(matches!(
            Image::load(temp.path()),
            Err(VsfsError::TruncatedImage { .. })
        ));
    }

    #[test]
    fn test_load_drops_trailing_bytes() {
        let temp = NamedTempFile::new().unwrap();
        let image = format_image(180, 128, 1_700_000_000).unwrap();
        let mut bytes = image.as_bytes().to_vec();
        bytes.extend_from_slice(&[0xAB; 100]);
        fs::write(temp.path(), &bytes).unwrap();

        let loaded = Image::load(temp.path()).unwrap();
        assert_eq!(loaded.as_bytes(), image.as_bytes());
    }

    #[test]
    fn test_read_root_inode() {
        let image = format_image(180, 128, 1_700_000_000).unwrap();
        let root = image.read_inode(1).unwrap();
        assert!(root.is_dir());
        assert_eq!(root.direct[0] as u64, image.superblock().data_region_start);
        assert!(root.verify());
    }

    #[test]
    fn test_inode_slot_crosses_blocks() {
        let mut image = format_image(180, 128, 1_700_000_000).unwrap();
        // 32 inodes per block; number 33 lands at the start of table block 1.
        let inode = Inode::new_file(1, [0u32; crate::inode::DIRECT_MAX], 1_700_000_000);
        image.write_inode(33, &inode);
        assert_eq!(image.read_inode(33).unwrap(), inode);
        // Neighbors stay untouched.
        assert_eq!(image.read_inode(32).unwrap(), Inode::from_bytes(&[0u8; INODE_SIZE]).unwrap());
    }
}

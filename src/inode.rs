//! Inode codec
//!
//! Inodes are 128-byte records packed contiguously across the inode-table
//! blocks and addressed by 1-based inode number (storage index is number
//! minus one). The trailing integrity field holds a CRC32 over the first
//! 120 bytes in its low four bytes; the high four bytes are always zero.

use crate::dirent::DIRENT_SIZE;
use crate::error::{Result, VsfsError};

/// Size of one inode record in bytes
pub const INODE_SIZE: usize = 128;

/// Number of direct block pointers per inode
pub const DIRECT_MAX: usize = 12;

/// Mode bits for a regular file
pub const MODE_FILE: u16 = 0o100000;

/// Mode bits for a directory
pub const MODE_DIR: u16 = 0o040000;

/// Byte span covered by the trailing CRC
const CRC_SPAN: usize = 120;

/// One file or directory record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inode {
    /// File type bits (`MODE_FILE` or `MODE_DIR`)
    pub mode: u16,

    /// Hard link count
    pub links: u16,

    /// Owner user id
    pub uid: u32,

    /// Owner group id
    pub gid: u32,

    /// Content size in bytes
    pub size_bytes: u64,

    /// Last access time (Unix epoch seconds)
    pub atime: u64,

    /// Last modification time (Unix epoch seconds)
    pub mtime: u64,

    /// Creation time (Unix epoch seconds)
    pub ctime: u64,

    /// Absolute block indices of the content; 0 marks an unused slot
    pub direct: [u32; DIRECT_MAX],

    /// Reserved padding, always zero
    pub reserved: [u32; 3],

    /// Project id, always zero
    pub proj_id: u32,

    /// Legacy packed uid/gid field, always zero
    pub uid16_gid16: u32,

    /// Extended attribute pointer, always zero
    pub xattr_ptr: u64,

    /// Low four bytes: CRC32 over bytes 0..120; high four bytes zero
    pub crc: u64,
}

impl Inode {
    /// Root directory inode as written at format time
    ///
    /// Directory mode, two links (`.` and `..`), size of two directory
    /// entries, single direct pointer at the first data-region block.
    pub fn new_root_dir(first_data_block: u64, now: u64) -> Self {
        let mut direct = [0u32; DIRECT_MAX];
        direct[0] = first_data_block as u32;
        let mut inode = Inode {
            mode: MODE_DIR,
            links: 2,
            uid: 0,
            gid: 0,
            size_bytes: 2 * DIRENT_SIZE as u64,
            atime: now,
            mtime: now,
            ctime: now,
            direct,
            reserved: [0; 3],
            proj_id: 0,
            uid16_gid16: 0,
            xattr_ptr: 0,
            crc: 0,
        };
        inode.finalize();
        inode
    }

    /// Inode for a newly inserted regular file
    pub fn new_file(size_bytes: u64, direct: [u32; DIRECT_MAX], now: u64) -> Self {
        let mut inode = Inode {
            mode: MODE_FILE,
            links: 1,
            uid: 0,
            gid: 0,
            size_bytes,
            atime: now,
            mtime: now,
            ctime: now,
            direct,
            reserved: [0; 3],
            proj_id: 0,
            uid16_gid16: 0,
            xattr_ptr: 0,
            crc: 0,
        };
        inode.finalize();
        inode
    }

    /// True when the mode bits mark a directory
    pub fn is_dir(&self) -> bool {
        self.mode == MODE_DIR
    }

    /// True when the mode bits mark a regular file
    pub fn is_file(&self) -> bool {
        self.mode == MODE_FILE
    }

    /// Serialize the inode to its on-disk record
    pub fn to_bytes(&self) -> [u8; INODE_SIZE] {
        let mut bytes = [0u8; INODE_SIZE];
        bytes[0..2].copy_from_slice(&self.mode.to_le_bytes());
        bytes[2..4].copy_from_slice(&self.links.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.uid.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.gid.to_le_bytes());
        bytes[12..20].copy_from_slice(&self.size_bytes.to_le_bytes());
        bytes[20..28].copy_from_slice(&self.atime.to_le_bytes());
        bytes[28..36].copy_from_slice(&self.mtime.to_le_bytes());
        bytes[36..44].copy_from_slice(&self.ctime.to_le_bytes());
        for (slot, pointer) in self.direct.iter().enumerate() {
            let offset = 44 + slot * 4;
            bytes[offset..offset + 4].copy_from_slice(&pointer.to_le_bytes());
        }
        bytes[92..96].copy_from_slice(&self.reserved[0].to_le_bytes());
        bytes[96..100].copy_from_slice(&self.reserved[1].to_le_bytes());
        bytes[100..104].copy_from_slice(&self.reserved[2].to_le_bytes());
        bytes[104..108].copy_from_slice(&self.proj_id.to_le_bytes());
        bytes[108..112].copy_from_slice(&self.uid16_gid16.to_le_bytes());
        bytes[112..120].copy_from_slice(&self.xattr_ptr.to_le_bytes());
        bytes[120..128].copy_from_slice(&self.crc.to_le_bytes());
        bytes
    }

    /// Deserialize an inode from its on-disk record
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < INODE_SIZE {
            return Err(VsfsError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "Insufficient bytes for inode",
            )));
        }

        let mut direct = [0u32; DIRECT_MAX];
        for (slot, pointer) in direct.iter_mut().enumerate() {
            let offset = 44 + slot * 4;
            *pointer = get_u32(bytes, offset);
        }

        Ok(Inode {
            mode: u16::from_le_bytes([bytes[0], bytes[1]]),
            links: u16::from_le_bytes([bytes[2], bytes[3]]),
            uid: get_u32(bytes, 4),
            gid: get_u32(bytes, 8),
            size_bytes: get_u64(bytes, 12),
            atime: get_u64(bytes, 20),
            mtime: get_u64(bytes, 28),
            ctime: get_u64(bytes, 36),
            direct,
            reserved: [get_u32(bytes, 92), get_u32(bytes, 96), get_u32(bytes, 100)],
            proj_id: get_u32(bytes, 104),
            uid16_gid16: get_u32(bytes, 108),
            xattr_ptr: get_u64(bytes, 112),
            crc: get_u64(bytes, 120),
        })
    }

    /// Recompute the trailing CRC from the current field values
    ///
    /// Must be the last mutation applied to the record: any later field
    /// change invalidates the CRC until it is finalized again.
    pub fn finalize(&mut self) {
        let bytes = self.to_bytes();
        self.crc = u64::from(crate::checksum::crc32(&bytes[..CRC_SPAN]));
    }

    /// True when the stored CRC matches a recomputation
    pub fn verify(&self) -> bool {
        let bytes = self.to_bytes();
        u64::from(crate::checksum::crc32(&bytes[..CRC_SPAN])) == self.crc
    }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_inode_state() {
        let root = Inode::new_root_dir(7, 1_700_000_000);
        assert!(root.is_dir());
        assert_eq!(root.links, 2);
        assert_eq!(root.size_bytes, 2 * DIRENT_SIZE as u64);
        assert_eq!(root.direct[0], 7);
        assert!(root.direct[1..].iter().all(|&p| p == 0));
        assert!(root.verify());
    }

    #[test]
    fn test_file_inode_state() {
        let mut direct = [0u32; DIRECT_MAX];
        direct[0] = 19;
        direct[1] = 20;
        let inode = Inode::new_file(5000, direct, 1_700_000_000);
        assert!(inode.is_file());
        assert_eq!(inode.links, 1);
        assert_eq!(inode.size_bytes, 5000);
        assert!(inode.verify());
    }

    #[test]
    fn test_serialization_round_trip() {
        let root = Inode::new_root_dir(7, 1_700_000_000);
        let bytes = root.to_bytes();
        let decoded = Inode::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, root);
        assert_eq!(decoded.to_bytes(), bytes);
    }

    #[test]
    fn test_crc_high_bytes_zero() {
        let root = Inode::new_root_dir(7, 1_700_000_000);
        assert_eq!(root.crc >> 32, 0);
    }

    #[test]
    fn test_crc_invalidated_by_mutation() {
        let mut inode = Inode::new_root_dir(7, 1_700_000_000);
        inode.links += 1;
        assert!(!inode.verify());
        inode.finalize();
        assert!(inode.verify());
    }

    #[test]
    fn test_from_bytes_too_short() {
        let result = Inode::from_bytes(&[0u8; INODE_SIZE - 1]);
        assert!(matches!(result, Err(VsfsError::Io(_))));
    }
}

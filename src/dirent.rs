//! Directory entry codec
//!
//! Fixed 64-byte records: inode number, entry type, a NUL-padded name field
//! and a trailing one-byte checksum (XOR of all preceding bytes). An entry
//! with inode number 0 marks an empty slot.

use crate::checksum::xor8;
use crate::error::{Result, VsfsError};

/// Size of one directory entry in bytes
pub const DIRENT_SIZE: usize = 64;

/// Size of the name field; the stored name keeps at most `NAME_LEN - 1`
/// bytes plus a NUL terminator
pub const NAME_LEN: usize = 58;

/// Byte span covered by the XOR checksum
const CHECKSUM_SPAN: usize = 63;

/// Directory entry type
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file
    File = 1,
    /// Directory
    Directory = 2,
}

impl EntryKind {
    /// Parse an entry type from its on-disk byte
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            1 => Ok(EntryKind::File),
            2 => Ok(EntryKind::Directory),
            _ => Err(VsfsError::InvalidEntryType(value)),
        }
    }
}

/// One name-to-inode mapping within a directory block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry {
    /// Referenced inode number; 0 marks an empty slot
    pub inode_no: u32,

    /// Raw entry type byte (`EntryKind`; 0 in empty slots)
    pub entry_type: u8,

    /// NUL-padded name field
    pub name: [u8; NAME_LEN],

    /// XOR of all preceding record bytes
    pub checksum: u8,
}

impl DirEntry {
    /// Build a finalized entry for `name`
    ///
    /// The name is truncated to the field capacity (57 bytes) and
    /// NUL-terminated; the checksum is computed last.
    pub fn new(inode_no: u32, kind: EntryKind, name: &str) -> Self {
        let mut entry = DirEntry {
            inode_no,
            entry_type: kind as u8,
            name: Self::encode_name(name),
            checksum: 0,
        };
        entry.finalize();
        entry
    }

    /// An all-zero empty slot
    pub fn empty() -> Self {
        DirEntry {
            inode_no: 0,
            entry_type: 0,
            name: [0; NAME_LEN],
            checksum: 0,
        }
    }

    /// Truncate `name` into the on-disk field: at most 57 bytes, NUL padded
    pub fn encode_name(name: &str) -> [u8; NAME_LEN] {
        let mut field = [0u8; NAME_LEN];
        let len = name.len().min(NAME_LEN - 1);
        field[..len].copy_from_slice(&name.as_bytes()[..len]);
        field
    }

    /// True when this slot holds no entry
    pub fn is_empty(&self) -> bool {
        self.inode_no == 0
    }

    /// Typed entry kind
    pub fn kind(&self) -> Result<EntryKind> {
        EntryKind::from_u8(self.entry_type)
    }

    /// Stored name up to the first NUL, lossily decoded
    pub fn name_str(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }

    /// Serialize the entry to its on-disk record
    pub fn to_bytes(&self) -> [u8; DIRENT_SIZE] {
        let mut bytes = [0u8; DIRENT_SIZE];
        bytes[0..4].copy_from_slice(&self.inode_no.to_le_bytes());
        bytes[4] = self.entry_type;
        bytes[5..5 + NAME_LEN].copy_from_slice(&self.name);
        bytes[63] = self.checksum;
        bytes
    }

    /// Deserialize an entry from its on-disk record
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < DIRENT_SIZE {
            return Err(VsfsError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "Insufficient bytes for directory entry",
            )));
        }

        let mut name = [0u8; NAME_LEN];
        name.copy_from_slice(&bytes[5..5 + NAME_LEN]);

        Ok(DirEntry {
            inode_no: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            entry_type: bytes[4],
            name,
            checksum: bytes[63],
        })
    }

    /// Recompute the trailing checksum from the current field values
    ///
    /// Must be the last mutation applied to the record.
    pub fn finalize(&mut self) {
        let bytes = self.to_bytes();
        self.checksum = xor8(&bytes[..CHECKSUM_SPAN]);
    }

    /// True when the stored checksum matches a recomputation
    pub fn verify(&self) -> bool {
        let bytes = self.to_bytes();
        xor8(&bytes[..CHECKSUM_SPAN]) == self.checksum
    }
}

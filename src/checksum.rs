//! Checksum routines shared by the record codecs
//!
//! Superblock and inode records carry a CRC32 (the standard reflected
//! polynomial, as computed by `crc32fast`); directory entries carry a
//! single-byte XOR accumulator.

use crc32fast::Hasher;

/// CRC32 of `data` (CRC-32/ISO-HDLC: reflected 0xEDB88320, init and
/// final XOR 0xFFFFFFFF).
pub fn crc32(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Bytewise XOR of `data`.
pub fn xor8(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &byte| acc ^ byte)
}

//! Error types for image operations

use thiserror::Error;

/// Image operation errors
#[derive(Error, Debug)]
pub enum VsfsError {
    /// The supplied image does not start with the MiniVSFS magic
    #[error("Invalid magic number in superblock")]
    InvalidMagic,

    /// Requested image size is not block-aligned
    #[error("Image size {0} KiB is not a multiple of 4")]
    UnalignedSize(u64),

    /// Requested image size falls outside the accepted range
    #[error("Image size out of range: {size} KiB (expected {min}-{max})")]
    SizeOutOfRange { size: u64, min: u64, max: u64 },

    /// Requested inode count falls outside the accepted range
    #[error("Inode count out of range: {count} (expected {min}-{max})")]
    InodeCountOutOfRange { count: u64, min: u64, max: u64 },

    /// The metadata regions would consume every block of the image
    #[error("Metadata needs {metadata} blocks, leaving no data blocks in a {total}-block image")]
    NoDataBlocks { metadata: u64, total: u64 },

    /// File content does not fit in the direct block pointers of one inode
    #[error("File too large: {size} bytes (max {max} bytes across {slots} direct blocks)")]
    FileTooLarge { size: u64, max: u64, slots: usize },

    /// Every inode bitmap bit is already set
    #[error("No free inodes available")]
    OutOfInodes,

    /// The data bitmap has fewer unset bits than the file needs
    #[error("Not enough free data blocks (need {needed}, found {found})")]
    OutOfDataBlocks { needed: u64, found: u64 },

    /// Every slot of the root directory block is occupied
    #[error("No free directory entry slots in the root directory")]
    DirectoryFull,

    /// A non-empty root directory entry already carries this name
    #[error("Entry '{0}' already exists in the root directory")]
    DuplicateName(String),

    /// Invalid directory entry type byte
    #[error("Invalid directory entry type: {0}")]
    InvalidEntryType(u8),

    /// The image file is shorter than its superblock declares
    #[error("Image truncated: {actual} bytes (expected {expected})")]
    TruncatedImage { expected: u64, actual: u64 },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Image operation result type
pub type Result<T> = std::result::Result<T, VsfsError>;

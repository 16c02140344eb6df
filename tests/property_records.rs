//! Property-based tests for record codecs and layout planning
//!
//! Uses proptest to verify the byte-exact round-trip and partition
//! invariants across many random inputs

use minivsfs::{
    bitmap, format_image, insert_file, superblock, DirEntry, EntryKind, Inode, Layout, Superblock,
    BLOCK_SIZE, DIRECT_MAX,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_layout_partitions_every_valid_image(
        blocks in 45u64..=1024,
        inodes in 128u64..=512,
    ) {
        let layout = Layout::plan(blocks * 4, inodes).unwrap();
        prop_assert_eq!(layout.total_blocks, blocks);
        prop_assert_eq!(
            1 + layout.inode_bitmap_blocks
                + layout.data_bitmap_blocks
                + layout.inode_table_blocks
                + layout.data_region_blocks,
            layout.total_blocks
        );
        prop_assert_eq!(
            layout.data_region_start,
            layout.inode_table_start + layout.inode_table_blocks
        );
        prop_assert!(layout.data_region_blocks > 0);
    }

    #[test]
    fn prop_formatted_superblock_checksum_verifies(
        blocks in 45u64..=1024,
        inodes in 128u64..=512,
        now in 0u64..=4_000_000_000,
    ) {
        let image = format_image(blocks * 4, inodes, now).unwrap();
        prop_assert!(superblock::verify_block(image.block(0)));
        prop_assert_eq!(image.superblock().mtime_epoch, now);
    }

    #[test]
    fn prop_superblock_round_trip_is_byte_identical(
        total_blocks in any::<u64>(),
        inode_count in any::<u64>(),
        table_blocks in any::<u64>(),
        mtime in any::<u64>(),
        flags in any::<u32>(),
        checksum in any::<u32>(),
    ) {
        let layout = Layout::plan(180, 128).unwrap();
        let mut sb = Superblock::new(&layout, mtime);
        sb.total_blocks = total_blocks;
        sb.inode_count = inode_count;
        sb.inode_table_blocks = table_blocks;
        sb.flags = flags;
        sb.checksum = checksum;

        let bytes = sb.to_bytes();
        let decoded = Superblock::from_bytes(&bytes).unwrap();
        prop_assert_eq!(decoded, sb);
        prop_assert_eq!(decoded.to_bytes(), bytes);
    }

    #[test]
    fn prop_inode_round_trip_is_byte_identical(
        size in any::<u64>(),
        times in any::<(u64, u64, u64)>(),
        pointers in prop::array::uniform12(any::<u32>()),
    ) {
        let mut inode = Inode::new_file(size, pointers, times.0);
        inode.atime = times.0;
        inode.mtime = times.1;
        inode.ctime = times.2;
        inode.finalize();

        let bytes = inode.to_bytes();
        let decoded = Inode::from_bytes(&bytes).unwrap();
        prop_assert_eq!(decoded, inode);
        prop_assert_eq!(decoded.to_bytes(), bytes);
        prop_assert!(decoded.verify());
        prop_assert_eq!(decoded.crc >> 32, 0);
    }

    #[test]
    fn prop_dirent_round_trip_and_checksum(
        inode_no in 1u32..=512,
        name in "[a-zA-Z0-9._-]{1,80}",
    ) {
        let entry = DirEntry::new(inode_no, EntryKind::File, &name);
        prop_assert!(entry.verify());
        prop_assert!(entry.name_str().len() <= 57);

        let bytes = entry.to_bytes();
        let decoded = DirEntry::from_bytes(&bytes).unwrap();
        prop_assert_eq!(decoded, entry);
        prop_assert_eq!(decoded.to_bytes(), bytes);
    }

    #[test]
    fn prop_insert_allocates_ceil_of_length(
        len in 1usize..=DIRECT_MAX * BLOCK_SIZE,
    ) {
        let mut image = format_image(1024, 128, 1_700_000_000).unwrap();
        let sb = *image.superblock();
        let before = bitmap::count_used(image.data_bitmap(), sb.data_region_blocks);

        let content = vec![0xA5u8; len];
        let summary = insert_file(&mut image, "payload.bin", &content, 1_700_000_001).unwrap();

        let after = bitmap::count_used(image.data_bitmap(), sb.data_region_blocks);
        prop_assert_eq!(summary.blocks_used as usize, len.div_ceil(BLOCK_SIZE));
        prop_assert_eq!(after - before, summary.blocks_used);

        let inode = image.read_inode(summary.inode_no).unwrap();
        prop_assert_eq!(inode.size_bytes as usize, len);
        prop_assert_eq!(
            inode.direct.iter().filter(|&&p| p != 0).count(),
            summary.blocks_used as usize
        );
    }
}

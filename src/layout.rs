//! The fixed on-disk layout of a catalog image.
//!
//! Addressed relative to a base block:
//!
//! | blocks  | content                                                   |
//! |---------|-----------------------------------------------------------|
//! | 0       | magic (7) + file count (1) + directory count (1), zeroed  |
//! | 1..=4   | directory region, 16 slots of 32 bytes per block          |
//! | 5..=12  | file region, 2 slots of 256 bytes per block               |
//!
//! A directory slot is a zero-terminated path string. A file slot is
//! name (32) + parent dir (32) + content (128) + 64 unused bytes.

use log::{debug, info, warn};

use crate::{
    catalog::{Block, Catalog, FileRecord, BLOCK_SIZE, MAX_DIRS, MAX_FILES},
    device::BlockDevice,
    error::Error,
};

// Tag identifying a valid catalog image.
pub const MAGIC: &[u8; 7] = b"TACOSFS";

const OFF_FILE_COUNT: usize = 7;
const OFF_DIR_COUNT: usize = 8;

pub const DIR_REGION_START: usize = 1;
pub const DIR_SLOT_SIZE: usize = 32;
pub const DIR_SLOTS_PER_BLOCK: usize = BLOCK_SIZE / DIR_SLOT_SIZE;
pub const DIR_REGION_BLOCKS: usize = 4;

pub const FILE_REGION_START: usize = DIR_REGION_START + DIR_REGION_BLOCKS;
pub const FILE_SLOT_SIZE: usize = 256;
pub const FILE_SLOTS_PER_BLOCK: usize = BLOCK_SIZE / FILE_SLOT_SIZE;

// Total image size: header + directory region + file region.
pub const IMAGE_BLOCKS: usize = FILE_REGION_START + MAX_FILES / FILE_SLOTS_PER_BLOCK;

// Copy a string into a zero-terminated slot. The slot is pre-zeroed, so
// anything that fits keeps its terminator; an oversized string (which the
// catalog API never produces) is truncated to fit.
fn put_str(slot: &mut [u8], s: &str) {
    let len = s.len().min(slot.len() - 1);
    slot[..len].copy_from_slice(&s.as_bytes()[..len]);
}

// Read a zero-terminated slot back into a string.
fn get_str(slot: &[u8]) -> String {
    let end = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
    String::from_utf8_lossy(&slot[..end]).into_owned()
}

// Serialize a catalog into its full fixed block image.
pub fn encode(catalog: &Catalog) -> Vec<Block> {
    let mut blocks = vec![[0u8; BLOCK_SIZE]; IMAGE_BLOCKS];

    blocks[0][..MAGIC.len()].copy_from_slice(MAGIC);
    blocks[0][OFF_FILE_COUNT] = catalog.file_count() as u8;
    blocks[0][OFF_DIR_COUNT] = catalog.dir_count() as u8;

    for (i, dir) in catalog.directories.iter().enumerate() {
        let block = DIR_REGION_START + i / DIR_SLOTS_PER_BLOCK;
        let offset = (i % DIR_SLOTS_PER_BLOCK) * DIR_SLOT_SIZE;
        put_str(&mut blocks[block][offset..offset + DIR_SLOT_SIZE], dir);
    }

    for (i, file) in catalog.files.iter().enumerate() {
        let block = FILE_REGION_START + i / FILE_SLOTS_PER_BLOCK;
        let offset = (i % FILE_SLOTS_PER_BLOCK) * FILE_SLOT_SIZE;
        let slot = &mut blocks[block][offset..offset + FILE_SLOT_SIZE];
        put_str(&mut slot[0..32], &file.name);
        put_str(&mut slot[32..64], &file.parent_dir);
        put_str(&mut slot[64..192], &file.content);
    }

    blocks
}

// Deserialize a block image back into a catalog. Fails only with
// `BadMagic`; header counts are clamped to the capacity caps and missing
// blocks leave their entries at zero defaults.
pub fn decode(blocks: &[Block]) -> Result<Catalog, Error> {
    let header = blocks.first().ok_or(Error::BadMagic)?;
    if header[..MAGIC.len()] != MAGIC[..] {
        return Err(Error::BadMagic);
    }

    let file_count = (header[OFF_FILE_COUNT] as usize).min(MAX_FILES);
    let dir_count = (header[OFF_DIR_COUNT] as usize).min(MAX_DIRS);

    let mut catalog = Catalog::new();

    for i in 0..dir_count {
        let block = DIR_REGION_START + i / DIR_SLOTS_PER_BLOCK;
        let offset = (i % DIR_SLOTS_PER_BLOCK) * DIR_SLOT_SIZE;
        let dir = match blocks.get(block) {
            Some(b) => get_str(&b[offset..offset + DIR_SLOT_SIZE]),
            None => String::new(),
        };
        catalog.directories.push(dir);
    }

    for i in 0..file_count {
        let block = FILE_REGION_START + i / FILE_SLOTS_PER_BLOCK;
        let offset = (i % FILE_SLOTS_PER_BLOCK) * FILE_SLOT_SIZE;
        let record = match blocks.get(block) {
            Some(b) => {
                let slot = &b[offset..offset + FILE_SLOT_SIZE];
                FileRecord {
                    name: get_str(&slot[0..32]),
                    parent_dir: get_str(&slot[32..64]),
                    content: get_str(&slot[64..192]),
                }
            }
            None => FileRecord::default(),
        };
        catalog.files.push(record);
    }

    Ok(catalog)
}

// Write the catalog image out: the header plus every region block that
// holds at least one live entry. A failed write propagates immediately;
// blocks already written stay written, there is no rollback.
pub fn save(catalog: &Catalog, device: &mut dyn BlockDevice, base: u32) -> Result<(), Error> {
    debug!(
        "saving catalog: {} directories, {} files",
        catalog.dir_count(),
        catalog.file_count()
    );
    let blocks = encode(catalog);

    device.write_block(base, &blocks[0])?;

    let dir_blocks = catalog.dir_count().div_ceil(DIR_SLOTS_PER_BLOCK);
    for i in 0..dir_blocks {
        let index = DIR_REGION_START + i;
        device.write_block(base + index as u32, &blocks[index])?;
    }

    let file_blocks = catalog.file_count().div_ceil(FILE_SLOTS_PER_BLOCK);
    for i in 0..file_blocks {
        let index = FILE_REGION_START + i;
        device.write_block(base + index as u32, &blocks[index])?;
    }

    Ok(())
}

// Read the catalog from the device. A header without the magic tag means
// an unformatted medium: the default catalog is written out once and
// returned. An unreadable region block is tolerated, its entries load as
// zero defaults.
pub fn load(device: &mut dyn BlockDevice, base: u32) -> Result<Catalog, Error> {
    let header = device.read_block(base)?;

    if header[..MAGIC.len()] != MAGIC[..] {
        info!("no catalog magic on medium, writing default catalog");
        let catalog = Catalog::bootstrap();
        save(&catalog, device, base)?;
        return Ok(catalog);
    }

    let mut blocks = vec![[0u8; BLOCK_SIZE]; IMAGE_BLOCKS];
    blocks[0] = header;

    let dir_count = (header[OFF_DIR_COUNT] as usize).min(MAX_DIRS);
    let file_count = (header[OFF_FILE_COUNT] as usize).min(MAX_FILES);

    let dir_blocks = dir_count.div_ceil(DIR_SLOTS_PER_BLOCK);
    let file_blocks = file_count.div_ceil(FILE_SLOTS_PER_BLOCK);

    let indices = (0..dir_blocks)
        .map(|i| DIR_REGION_START + i)
        .chain((0..file_blocks).map(|i| FILE_REGION_START + i));

    for index in indices {
        match device.read_block(base + index as u32) {
            Ok(block) => blocks[index] = block,
            // Tolerated: the entries in this block load as zero defaults.
            Err(_) => warn!("catalog block {index} unreadable, entries left blank"),
        }
    }

    decode(&blocks)
}

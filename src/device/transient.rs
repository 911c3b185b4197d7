use std::collections::BTreeMap;

use crate::{
    catalog::{Block, BLOCK_SIZE},
    device::BlockDevice,
    error::Error,
};

// In-memory block device. Never fails, never grows stale; blocks that
// were never written read back as zeros, like an unformatted medium.
#[derive(Debug, Default)]
pub struct TransientDevice {
    blocks: BTreeMap<u32, Block>,
}

impl TransientDevice {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlockDevice for TransientDevice {
    fn read_block(&mut self, lba: u32) -> Result<Block, Error> {
        Ok(self.blocks.get(&lba).copied().unwrap_or([0u8; BLOCK_SIZE]))
    }

    fn write_block(&mut self, lba: u32, block: &Block) -> Result<(), Error> {
        self.blocks.insert(lba, *block);
        Ok(())
    }
}

use crate::{catalog::Block, error::Error};

pub mod dummy;
pub mod emulated;
pub mod pio;
pub mod transient;

// Abstraction of the underlying block storage medium.
//
// Blocks are fixed 512-byte units addressed by LBA. Operations are
// synchronous and either transfer a whole block or fail; no partial
// transfer is ever exposed. No implementation retries internally.
pub trait BlockDevice {
    // Read one block at the given address.
    fn read_block(&mut self, lba: u32) -> Result<Block, Error>;

    // Write one block at the given address.
    fn write_block(&mut self, lba: u32, block: &Block) -> Result<(), Error>;
}

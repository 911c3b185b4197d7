use crate::{catalog::Block, device::BlockDevice, error::Error};

// A device that is not there. Every operation times out, the same way an
// absent drive exhausts the driver's poll budget.
#[derive(Debug, Default)]
pub struct DummyDevice;

impl DummyDevice {
    pub fn new() -> Self {
        Self
    }
}

impl BlockDevice for DummyDevice {
    fn read_block(&mut self, _lba: u32) -> Result<Block, Error> {
        Err(Error::DeviceTimeout)
    }

    fn write_block(&mut self, _lba: u32, _block: &Block) -> Result<(), Error> {
        Err(Error::DeviceTimeout)
    }
}

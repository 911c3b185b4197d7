use std::{cell::Cell, rc::Rc};

use ic_stable_structures::VectorMemory;

use crate::{
    catalog::{Block, Catalog},
    device::{emulated::EmulatedDrive, pio::PioDrive, transient::TransientDevice, BlockDevice},
    error::Error,
    fs::CatalogFs,
    layout,
};

pub fn new_vector_memory() -> VectorMemory {
    use std::cell::RefCell;

    Rc::new(RefCell::new(Vec::new()))
}

// A freshly bootstrapped catalog on an in-memory device.
pub fn test_fs() -> CatalogFs {
    CatalogFs::new(Box::new(TransientDevice::new())).unwrap()
}

// A freshly bootstrapped catalog behind the PIO driver and an emulated
// drive. Cloning the memory beforehand keeps a handle on the disk image.
pub fn test_fs_on_memory(memory: VectorMemory) -> CatalogFs {
    let drive = PioDrive::new(EmulatedDrive::new(memory));
    CatalogFs::new(Box::new(drive)).unwrap()
}

pub fn test_fs_emulated() -> CatalogFs {
    test_fs_on_memory(new_vector_memory())
}

// Every device setup an operation test should pass on.
pub fn test_fs_setups() -> Vec<CatalogFs> {
    vec![test_fs(), test_fs_emulated()]
}

// A catalog with a chosen starting state, pre-saved onto the device.
pub fn fs_with_catalog(catalog: &Catalog) -> CatalogFs {
    let mut device = TransientDevice::new();
    layout::save(catalog, &mut device, 0).unwrap();
    CatalogFs::new(Box::new(device)).unwrap()
}

// An in-memory device that fails on chosen block addresses, for
// exercising partial-save and tolerated-read paths.
#[derive(Default)]
pub struct FailingDevice {
    pub inner: TransientDevice,
    pub fail_read_at: Option<u32>,
    pub fail_write_at: Option<u32>,
}

impl BlockDevice for FailingDevice {
    fn read_block(&mut self, lba: u32) -> Result<Block, Error> {
        if self.fail_read_at == Some(lba) {
            return Err(Error::DeviceTimeout);
        }
        self.inner.read_block(lba)
    }

    fn write_block(&mut self, lba: u32, block: &Block) -> Result<(), Error> {
        if self.fail_write_at == Some(lba) {
            return Err(Error::DeviceTimeout);
        }
        self.inner.write_block(lba, block)
    }
}

// An in-memory device that counts block writes.
#[derive(Default)]
pub struct CountingDevice {
    pub inner: TransientDevice,
    pub writes: Rc<Cell<usize>>,
}

impl BlockDevice for CountingDevice {
    fn read_block(&mut self, lba: u32) -> Result<Block, Error> {
        self.inner.read_block(lba)
    }

    fn write_block(&mut self, lba: u32, block: &Block) -> Result<(), Error> {
        self.writes.set(self.writes.get() + 1);
        self.inner.write_block(lba, block)
    }
}

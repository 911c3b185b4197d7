use bitflags::bitflags;

use crate::{
    catalog::{Block, BLOCK_SIZE},
    device::BlockDevice,
    error::Error,
};

// Register map of the primary ATA channel.
pub(crate) mod reg {
    pub const DATA: u16 = 0x1F0;
    pub const SECTOR_COUNT: u16 = 0x1F2;
    pub const LBA_LO: u16 = 0x1F3;
    pub const LBA_MID: u16 = 0x1F4;
    pub const LBA_HI: u16 = 0x1F5;
    pub const DRIVE_HEAD: u16 = 0x1F6;
    pub const STATUS: u16 = 0x1F7;
    pub const COMMAND: u16 = 0x1F7;
}

pub(crate) mod cmd {
    pub const READ_SECTORS: u8 = 0x20;
    pub const WRITE_SECTORS: u8 = 0x30;
}

bitflags! {
    // Bits of the ATA status register.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Status: u8 {
        const ERR = 1 << 0;
        const DRQ = 1 << 3;
        const DF = 1 << 5;
        const RDY = 1 << 6;
        const BSY = 1 << 7;
    }
}

// Maximum number of status polls per wait. This is an iteration count,
// not a wall-clock duration: "timeout" means the device did not respond
// within a bounded number of polls.
pub const POLL_BUDGET: u32 = 100_000;

// Register-level port access, the seam between the driver and the
// hardware (or an emulation of it).
pub trait PortIo {
    fn inb(&mut self, port: u16) -> u8;
    fn outb(&mut self, port: u16, value: u8);
    fn inw(&mut self, port: u16) -> u16;
    fn outw(&mut self, port: u16, value: u16);
}

// ATA PIO driver for a single drive on the primary channel, 28-bit LBA,
// one sector per command. Timeouts surface immediately and are never
// retried here; retry policy belongs to the caller.
pub struct PioDrive<P: PortIo> {
    ports: P,
}

impl<P: PortIo> PioDrive<P> {
    pub fn new(ports: P) -> Self {
        Self { ports }
    }

    pub fn into_ports(self) -> P {
        self.ports
    }

    fn status(&mut self) -> Status {
        Status::from_bits_truncate(self.ports.inb(reg::STATUS))
    }

    // Poll until BSY clears, bounded by POLL_BUDGET iterations.
    fn wait_ready(&mut self) -> Result<(), Error> {
        for _ in 0..POLL_BUDGET {
            if !self.status().contains(Status::BSY) {
                return Ok(());
            }
        }
        Err(Error::DeviceTimeout)
    }

    // Poll until DRQ sets, bounded by POLL_BUDGET iterations.
    fn wait_data_request(&mut self) -> Result<(), Error> {
        for _ in 0..POLL_BUDGET {
            if self.status().contains(Status::DRQ) {
                return Ok(());
            }
        }
        Err(Error::DeviceTimeout)
    }

    // Select the drive, program a one-sector transfer and issue a command.
    fn issue(&mut self, lba: u32, command: u8) {
        self.ports
            .outb(reg::DRIVE_HEAD, 0xE0 | ((lba >> 24) & 0x0F) as u8);
        self.ports.outb(reg::SECTOR_COUNT, 1);
        self.ports.outb(reg::LBA_LO, lba as u8);
        self.ports.outb(reg::LBA_MID, (lba >> 8) as u8);
        self.ports.outb(reg::LBA_HI, (lba >> 16) as u8);
        self.ports.outb(reg::COMMAND, command);
    }
}

impl<P: PortIo> BlockDevice for PioDrive<P> {
    fn read_block(&mut self, lba: u32) -> Result<Block, Error> {
        self.issue(lba, cmd::READ_SECTORS);
        self.wait_ready()?;
        self.wait_data_request()?;

        let mut block = [0u8; BLOCK_SIZE];
        for i in 0..BLOCK_SIZE / 2 {
            let word = self.ports.inw(reg::DATA);
            block[2 * i] = word as u8;
            block[2 * i + 1] = (word >> 8) as u8;
        }
        Ok(block)
    }

    fn write_block(&mut self, lba: u32, block: &Block) -> Result<(), Error> {
        self.issue(lba, cmd::WRITE_SECTORS);
        self.wait_ready()?;
        self.wait_data_request()?;

        for i in 0..BLOCK_SIZE / 2 {
            let word = block[2 * i] as u16 | (block[2 * i + 1] as u16) << 8;
            self.ports.outw(reg::DATA, word);
        }
        // Wait out the flush.
        self.wait_ready()
    }
}

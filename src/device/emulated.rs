use ic_stable_structures::Memory;

use crate::{
    catalog::{Block, BLOCK_SIZE},
    device::pio::{cmd, reg, PortIo, Status},
};

// A `Memory` grows in wasm pages.
pub const WASM_PAGE_SIZE: u64 = 65536;

// An emulated ATA drive whose platter is a `Memory`, used to exercise the
// PIO driver without hardware. The drive is always prompt: BSY is never
// reported and DRQ raises as soon as a command is issued.
//
// Hosting the medium on a `Memory` means a `VectorMemory` clone can be
// kept around to reopen the same disk image later.
pub struct EmulatedDrive<M: Memory> {
    memory: M,
    lba_lo: u8,
    lba_mid: u8,
    lba_hi: u8,
    drive_head: u8,
    sector_count: u8,
    transfer: Option<Transfer>,
}

// One in-flight single-sector transfer.
struct Transfer {
    offset: u64,
    buf: Block,
    pos: usize,
    writing: bool,
}

impl<M: Memory> EmulatedDrive<M> {
    pub fn new(memory: M) -> Self {
        Self {
            memory,
            lba_lo: 0,
            lba_mid: 0,
            lba_hi: 0,
            drive_head: 0,
            sector_count: 0,
            transfer: None,
        }
    }

    pub fn into_memory(self) -> M {
        self.memory
    }

    fn selected_offset(&self) -> u64 {
        let lba = self.lba_lo as u32
            | (self.lba_mid as u32) << 8
            | (self.lba_hi as u32) << 16
            | ((self.drive_head & 0x0F) as u32) << 24;
        lba as u64 * BLOCK_SIZE as u64
    }

    // Load a sector from the medium; bytes past the grown region read as
    // zero, matching an unformatted disk.
    fn load_sector(&self, offset: u64) -> Block {
        let mut buf = [0u8; BLOCK_SIZE];
        let end = self.memory.size() * WASM_PAGE_SIZE;
        if offset < end {
            let avail = ((end - offset) as usize).min(BLOCK_SIZE);
            self.memory.read(offset, &mut buf[..avail]);
        }
        buf
    }

    // Grow the medium so a full sector at `offset` is addressable.
    fn ensure_capacity(&self, offset: u64) {
        let needed = (offset + BLOCK_SIZE as u64).div_ceil(WASM_PAGE_SIZE);
        let current = self.memory.size();
        if current < needed {
            self.memory.grow(needed - current);
        }
    }

    fn start_command(&mut self, command: u8) {
        let offset = self.selected_offset();
        match command {
            cmd::READ_SECTORS => {
                self.transfer = Some(Transfer {
                    offset,
                    buf: self.load_sector(offset),
                    pos: 0,
                    writing: false,
                });
            }
            cmd::WRITE_SECTORS => {
                self.transfer = Some(Transfer {
                    offset,
                    buf: [0u8; BLOCK_SIZE],
                    pos: 0,
                    writing: true,
                });
            }
            _ => self.transfer = None,
        }
    }
}

impl<M: Memory> PortIo for EmulatedDrive<M> {
    fn inb(&mut self, port: u16) -> u8 {
        match port {
            reg::STATUS => {
                let mut status = Status::RDY;
                if self.transfer.is_some() {
                    status |= Status::DRQ;
                }
                status.bits()
            }
            reg::SECTOR_COUNT => self.sector_count,
            reg::LBA_LO => self.lba_lo,
            reg::LBA_MID => self.lba_mid,
            reg::LBA_HI => self.lba_hi,
            reg::DRIVE_HEAD => self.drive_head,
            _ => 0,
        }
    }

    fn outb(&mut self, port: u16, value: u8) {
        match port {
            reg::SECTOR_COUNT => self.sector_count = value,
            reg::LBA_LO => self.lba_lo = value,
            reg::LBA_MID => self.lba_mid = value,
            reg::LBA_HI => self.lba_hi = value,
            reg::DRIVE_HEAD => self.drive_head = value,
            reg::COMMAND => self.start_command(value),
            _ => {}
        }
    }

    fn inw(&mut self, port: u16) -> u16 {
        if port != reg::DATA {
            return 0;
        }
        let Some(transfer) = self.transfer.as_mut() else {
            return 0;
        };
        if transfer.writing {
            return 0;
        }
        let word = transfer.buf[transfer.pos] as u16 | (transfer.buf[transfer.pos + 1] as u16) << 8;
        transfer.pos += 2;
        if transfer.pos == BLOCK_SIZE {
            self.transfer = None;
        }
        word
    }

    fn outw(&mut self, port: u16, value: u16) {
        if port != reg::DATA {
            return;
        }
        let Some(transfer) = self.transfer.as_mut() else {
            return;
        };
        if !transfer.writing {
            return;
        }
        transfer.buf[transfer.pos] = value as u8;
        transfer.buf[transfer.pos + 1] = (value >> 8) as u8;
        transfer.pos += 2;
        if transfer.pos == BLOCK_SIZE {
            let offset = transfer.offset;
            let buf = transfer.buf;
            self.transfer = None;
            self.ensure_capacity(offset);
            self.memory.write(offset, &buf);
        }
    }
}

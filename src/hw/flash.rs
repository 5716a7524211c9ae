// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Settings storage in the last internal flash sector.
//!
//! The STM32F777 (single-bank mode) ends with sector 11, 256 KiB at `0x081C_0000`. `memory.x`
//! stops the program image short of it. Every save erases the whole sector and programs the record
//! at its start, so saves should be rare; the settings layer skips writes of unchanged records.

/// Reasons a flash erase or program failed, decoded from `FLASH_SR`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Target is write protected (WRPERR).
    WriteProtected,
    /// Program address not aligned to the parallelism (PGAERR).
    Alignment,
    /// Program size does not match the parallelism (PGPERR).
    Parallelism,
    /// Erase sequence error (ERSERR).
    EraseSequence,
    /// Operation error (OPERR).
    Operation,
}

pub mod sr {
    pub const EOP: u32 = 1 << 0;
    pub const OPERR: u32 = 1 << 1;
    pub const WRPERR: u32 = 1 << 4;
    pub const PGAERR: u32 = 1 << 5;
    pub const PGPERR: u32 = 1 << 6;
    pub const ERSERR: u32 = 1 << 7;
    pub const BSY: u32 = 1 << 16;

    pub const ERRORS: u32 = OPERR | WRPERR | PGAERR | PGPERR | ERSERR;
}

/// Decode the error flags of a `FLASH_SR` value, most specific first.
pub fn check_status(status: u32) -> Result<(), FlashError> {
    if status & sr::WRPERR != 0 {
        Err(FlashError::WriteProtected)
    } else if status & sr::PGAERR != 0 {
        Err(FlashError::Alignment)
    } else if status & sr::PGPERR != 0 {
        Err(FlashError::Parallelism)
    } else if status & sr::ERSERR != 0 {
        Err(FlashError::EraseSequence)
    } else if status & sr::OPERR != 0 {
        Err(FlashError::Operation)
    } else {
        Ok(())
    }
}

#[cfg(target_os = "none")]
pub use self::store::FlashStore;

#[cfg(target_os = "none")]
mod store {
    use core::ptr;

    use stm32f7xx_hal::pac;

    use super::{check_status, sr, FlashError};
    use crate::settings::{Record, SettingsStore, WORDS};

    const SECTOR: u32 = 11;
    const SECTOR_ADDR: usize = 0x081C_0000;

    const KEY1: u32 = 0x4567_0123;
    const KEY2: u32 = 0xCDEF_89AB;

    // FLASH_CR bits
    const CR_PG: u32 = 1 << 0;
    const CR_SER: u32 = 1 << 1;
    const CR_SNB_SHIFT: u32 = 3;
    const CR_PSIZE_X32: u32 = 0b10 << 8;
    const CR_STRT: u32 = 1 << 16;
    const CR_LOCK: u32 = 1 << 31;

    pub struct FlashStore {
        flash: pac::FLASH,
    }

    impl FlashStore {
        pub fn new(flash: pac::FLASH) -> Self {
            Self { flash }
        }

        #[inline]
        pub fn free(self) -> pac::FLASH {
            self.flash
        }

        fn wait(&self) -> Result<(), FlashError> {
            while self.flash.sr.read().bits() & sr::BSY != 0 {}
            let status = self.flash.sr.read().bits();
            // Flags are write-one-to-clear
            self.flash
                .sr
                .write(|w| unsafe { w.bits(status & (sr::ERRORS | sr::EOP)) });
            check_status(status)
        }

        fn unlock(&mut self) {
            if self.flash.cr.read().bits() & CR_LOCK != 0 {
                self.flash.keyr.write(|w| unsafe { w.bits(KEY1) });
                self.flash.keyr.write(|w| unsafe { w.bits(KEY2) });
            }
        }

        fn lock(&mut self) {
            self.flash.cr.write(|w| unsafe { w.bits(CR_LOCK) });
        }

        fn erase_and_program(&mut self, record: &Record) -> Result<(), FlashError> {
            self.wait()?;

            let erase = CR_SER | (SECTOR << CR_SNB_SHIFT) | CR_PSIZE_X32;
            self.flash.cr.write(|w| unsafe { w.bits(erase) });
            self.flash.cr.write(|w| unsafe { w.bits(erase | CR_STRT) });
            self.wait()?;

            self.flash
                .cr
                .write(|w| unsafe { w.bits(CR_PG | CR_PSIZE_X32) });
            for (i, &word) in record.iter().enumerate() {
                let addr = (SECTOR_ADDR as *mut u32).wrapping_add(i);
                unsafe { ptr::write_volatile(addr, word) };
                cortex_m::asm::dsb();
                self.wait()?;
            }

            Ok(())
        }
    }

    impl SettingsStore for FlashStore {
        type Error = FlashError;

        fn read(&self) -> Record {
            let base = SECTOR_ADDR as *const u32;
            let mut record: Record = [0; WORDS];
            for (i, word) in record.iter_mut().enumerate() {
                *word = unsafe { ptr::read_volatile(base.wrapping_add(i)) };
            }
            record
        }

        fn write(&mut self, record: &Record) -> Result<(), FlashError> {
            self.unlock();
            let result = self.erase_and_program(record);
            self.lock();
            result
        }
    }
}

// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Settings persisted across power cycles.
//!
//! The record is two little-endian 32-bit words, `[version, target_rpm]`. A record with any other
//! version (including erased flash, which reads as all ones) is replaced by the defaults.

use crate::config;

/// Version tag of the stored record.
pub const VERSION: u32 = 1;

/// Number of 32-bit words in a stored record.
pub const WORDS: usize = 2;

/// Raw stored record.
pub type Record = [u32; WORDS];

/// Backing storage for one settings record.
pub trait SettingsStore {
    type Error;

    /// Read whatever record is currently stored.
    fn read(&self) -> Record;

    /// Replace the stored record.
    fn write(&mut self, record: &Record) -> Result<(), Self::Error>;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Settings {
    /// Speed applied when the motor is started (rpm).
    pub target_rpm: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_rpm: config::DEFAULT_RPM,
        }
    }
}

impl Settings {
    pub fn encode(&self) -> Record {
        [VERSION, self.target_rpm]
    }

    /// Decode a stored record, or `None` if its version is not ours.
    pub fn decode(record: &Record) -> Option<Self> {
        match record {
            [VERSION, target_rpm] => Some(Self {
                target_rpm: *target_rpm,
            }),
            _ => None,
        }
    }

    /// Load from `store`, falling back to defaults.
    pub fn load<S: SettingsStore>(store: &S) -> Self {
        Self::decode(&store.read()).unwrap_or_default()
    }

    /// Save to `store` unless it already holds this record. Returns whether a write happened.
    pub fn save<S: SettingsStore>(&self, store: &mut S) -> Result<bool, S::Error> {
        let record = self.encode();
        if store.read() == record {
            return Ok(false);
        }
        store.write(&record)?;
        Ok(true)
    }
}

/// Settings store held in RAM, for host-side simulation and tests.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RamStore {
    record: Record,
    pub writes: u32,
}

impl RamStore {
    /// A store that reads like freshly erased flash.
    pub const fn erased() -> Self {
        Self {
            record: [u32::MAX; WORDS],
            writes: 0,
        }
    }

    pub const fn with_record(record: Record) -> Self {
        Self { record, writes: 0 }
    }
}

impl SettingsStore for RamStore {
    type Error = core::convert::Infallible;

    fn read(&self) -> Record {
        self.record
    }

    fn write(&mut self, record: &Record) -> Result<(), Self::Error> {
        self.record = *record;
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erased_store_loads_defaults() {
        let store = RamStore::erased();
        assert_eq!(Settings::load(&store), Settings::default());
        assert_eq!(Settings::default().target_rpm, 20);
    }

    #[test]
    fn foreign_version_loads_defaults() {
        let store = RamStore::with_record([VERSION + 1, 45]);
        assert_eq!(Settings::load(&store).target_rpm, config::DEFAULT_RPM);
    }

    #[test]
    fn save_then_load() {
        let mut store = RamStore::erased();
        let settings = Settings { target_rpm: 35 };
        assert_eq!(settings.save(&mut store), Ok(true));
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn unchanged_settings_are_not_rewritten() {
        let mut store = RamStore::erased();
        let settings = Settings { target_rpm: 35 };
        settings.save(&mut store).unwrap();
        assert_eq!(settings.save(&mut store), Ok(false));
        assert_eq!(store.writes, 1);
    }
}

// Copyright (C) 2025 Paul Hampson
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License version 3 as  published by the
// Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::calibration::CalibrationRecord;
use crate::storage::{CalibrationStorage, StorageError};
use core::ops::Range;
use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

/// Key the calibration record is filed under in the map.
pub const CALIBRATION_RECORD_KEY: u16 = 0;

const DATA_BUFFER_SIZE: usize = 64;

/// Calibration record kept in a sequential-storage map on NOR flash. Each save appends one
/// CRC checked item, a torn write is simply not found on the next load.
pub struct StorageManagerSequentialStorage<F>
where
    F: NorFlash,
{
    flash: F,
    key_value_range: Range<u32>,
    flash_cache: NoCache,
}

impl<F> StorageManagerSequentialStorage<F>
where
    F: NorFlash,
{
    pub fn new(flash: F, key_value_range: Range<u32>) -> Self {
        debug!(
            "Storage initialising. KeyValue flash address range: 0x{:x} to 0x{:x}",
            key_value_range.start,
            key_value_range.end,
        );
        Self {
            flash,
            key_value_range,
            flash_cache: NoCache::new(),
        }
    }

    pub async fn clear_data(&mut self) -> Result<(), StorageError> {
        sequential_storage::erase_all(&mut self.flash, self.key_value_range.clone())
            .await
            .map_err(|_| {
                warn!("Unable to erase storage");
                StorageError::EraseError
            })
    }
}

impl<F> CalibrationStorage for StorageManagerSequentialStorage<F>
where
    F: NorFlash,
{
    async fn load(&mut self) -> Result<Option<CalibrationRecord>, StorageError> {
        let mut data_buffer = [0; DATA_BUFFER_SIZE];
        let record: Option<CalibrationRecord> = map::fetch_item(
            &mut self.flash,
            self.key_value_range.clone(),
            &mut self.flash_cache,
            &mut data_buffer,
            &CALIBRATION_RECORD_KEY,
        )
        .await
        .map_err(|_| {
            warn!("Unable to read calibration record");
            StorageError::RetrieveError
        })?;
        Ok(record)
    }

    async fn save(&mut self, record: &CalibrationRecord) -> Result<(), StorageError> {
        let mut data_buffer = [0; DATA_BUFFER_SIZE];
        map::store_item(
            &mut self.flash,
            self.key_value_range.clone(),
            &mut self.flash_cache,
            &mut data_buffer,
            &CALIBRATION_RECORD_KEY,
            record,
        )
        .await
        .map_err(|_| {
            warn!("Unable to save calibration record");
            StorageError::SaveError
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryFlash;
    use embassy_futures::block_on;

    fn storage() -> StorageManagerSequentialStorage<MemoryFlash> {
        let flash = MemoryFlash::new();
        let range = 0..flash.capacity_bytes();
        StorageManagerSequentialStorage::new(flash, range)
    }

    #[test]
    fn empty_flash_has_no_record() {
        let mut storage = storage();
        assert_eq!(block_on(storage.load()).unwrap(), None);
    }

    #[test]
    fn saved_record_is_loaded_back() {
        let mut storage = storage();
        let record = CalibrationRecord::new(8373663, -25272.0);
        block_on(storage.save(&record)).unwrap();

        let loaded = block_on(storage.load()).unwrap().unwrap();
        assert!(loaded.is_valid());
        assert_eq!(loaded.tare_offset, 8373663);
        assert_eq!(loaded.scale_factor.to_bits(), (-25272.0f32).to_bits());
    }

    #[test]
    fn latest_save_wins_and_clear_forgets() {
        let mut storage = storage();
        block_on(storage.save(&CalibrationRecord::new(1, 1.0))).unwrap();
        block_on(storage.save(&CalibrationRecord::new(2, 2.0))).unwrap();
        assert_eq!(block_on(storage.load()).unwrap(), Some(CalibrationRecord::new(2, 2.0)));

        block_on(storage.clear_data()).unwrap();
        assert_eq!(block_on(storage.load()).unwrap(), None);
    }
}

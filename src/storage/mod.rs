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

use core::ops::Range;
use embassy_embedded_hal::adapter::BlockingAsync;
use embassy_rp::flash::{self, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
#[cfg(feature = "fixed-layout-storage")]
use orlighthouse_core::storage::fixed_layout::FixedLayoutStorage;
#[cfg(not(feature = "fixed-layout-storage"))]
use orlighthouse_core::storage::storage_manager::StorageManagerSequentialStorage;

pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

const CALIBRATION_PAGES: usize = 4;

/// Tail of flash kept out of the firmware image by memory.x.
pub const CALIBRATION_RANGE: Range<u32> =
    (FLASH_SIZE - CALIBRATION_PAGES * ERASE_SIZE) as u32..FLASH_SIZE as u32;

pub type BlockingAsyncFlash = BlockingAsync<Flash<'static, FLASH, flash::Blocking, FLASH_SIZE>>;

#[cfg(not(feature = "fixed-layout-storage"))]
pub type CalibrationFlashStorage = StorageManagerSequentialStorage<BlockingAsyncFlash>;

#[cfg(feature = "fixed-layout-storage")]
pub type CalibrationFlashStorage = FixedLayoutStorage<BlockingAsyncFlash>;

pub fn calibration_storage(flash: Peri<'static, FLASH>) -> CalibrationFlashStorage {
    let flash = BlockingAsync::new(Flash::<_, flash::Blocking, FLASH_SIZE>::new_blocking(flash));
    #[cfg(not(feature = "fixed-layout-storage"))]
    let storage = StorageManagerSequentialStorage::new(flash, CALIBRATION_RANGE);
    #[cfg(feature = "fixed-layout-storage")]
    let storage = FixedLayoutStorage::new(flash, CALIBRATION_RANGE.start);
    storage
}

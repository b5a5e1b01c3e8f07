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

pub mod fixed_layout;
pub mod storage_manager;

use crate::calibration::CalibrationRecord;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    SaveError,
    RetrieveError,
    EraseError,
}

pub trait CalibrationStorage {
    /// The stored record, valid or not. `None` when nothing was ever written.
    async fn load(&mut self) -> Result<Option<CalibrationRecord>, StorageError>;

    /// Replace the stored record. Either the whole record lands or the old one stays.
    async fn save(&mut self, record: &CalibrationRecord) -> Result<(), StorageError>;
}

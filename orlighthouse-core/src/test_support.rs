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

//! Stand-ins for the hardware, used by the unit tests.

use crate::calibration::CalibrationRecord;
use crate::led::strip::PixelWriter;
use crate::led::LedDriver;
use crate::storage::{CalibrationStorage, StorageError};
use crate::weight::interface::StrainGaugeInterface;
use crate::weight::LoadSensor;
use embassy_time::Duration;
use embedded_hal_async::delay::DelayNs;
use embedded_storage_async::nor_flash::{
    ErrorType, MultiwriteNorFlash, NorFlash, NorFlashErrorKind, ReadNorFlash,
};
use smart_leds::RGB8;
use std::collections::VecDeque;

#[derive(Default)]
pub struct RecordingWriter {
    pub frames: Vec<Vec<RGB8>>,
}

impl<const LED_COUNT: usize> PixelWriter<LED_COUNT> for RecordingWriter {
    async fn write(&mut self, pixels: &[RGB8; LED_COUNT]) {
        self.frames.push(pixels.to_vec());
    }
}

pub struct MockLeds {
    pub pixels: Vec<RGB8>,
    pub brightness: u8,
    pub begun: bool,
    pub shows: usize,
    pub frames: Vec<Vec<RGB8>>,
}

impl MockLeds {
    pub fn new(pixel_count: usize) -> Self {
        Self {
            pixels: vec![RGB8::default(); pixel_count],
            brightness: u8::MAX,
            begun: false,
            shows: 0,
            frames: Vec::new(),
        }
    }
}

impl LedDriver for MockLeds {
    fn begin(&mut self) {
        self.begun = true;
        self.pixels.fill(RGB8::default());
    }

    fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    fn set_pixel_color(&mut self, index: usize, colour: RGB8) {
        if let Some(pixel) = self.pixels.get_mut(index) {
            *pixel = colour;
        }
    }

    fn fill(&mut self, colour: RGB8) {
        self.pixels.fill(colour);
    }

    async fn show(&mut self) {
        self.shows += 1;
        self.frames.push(self.pixels.clone());
    }
}

#[derive(Default)]
pub struct MockDelay {
    pub total_ns: u64,
    pub total_ms: u64,
    pub calls: usize,
}

impl MockDelay {
    fn add_ns(&mut self, ns: u64) {
        self.calls += 1;
        self.total_ns += ns;
        self.total_ms = self.total_ns / 1_000_000;
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.add_ns(ns as u64);
    }

    async fn delay_us(&mut self, us: u32) {
        self.add_ns(us as u64 * 1_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.add_ns(ms as u64 * 1_000_000);
    }
}

/// Load sensor whose readings are set directly by the test.
pub struct MockSensor {
    pub ready: bool,
    pub fail_updates: bool,
    pub weight: f32,
    pub sps: f32,
    pub tare_result: i32,
    pub new_calibration: f32,
    /// Next `tare()` runs out of time.
    pub tare_times_out: bool,
    pub tare_timeout: bool,
    pub signal_timeout: bool,
    pub tare_offset: i32,
    pub cal_factor: f32,
    pub begins: usize,
    pub starts: usize,
    pub updates: usize,
    pub tares: usize,
    pub refreshes: usize,
    pub calibration_masses: Vec<f32>,
}

impl MockSensor {
    pub fn new() -> Self {
        Self {
            ready: true,
            fail_updates: false,
            weight: 0.0,
            sps: 10.0,
            tare_result: 8373663,
            new_calibration: -25272.0,
            tare_times_out: false,
            tare_timeout: false,
            signal_timeout: false,
            tare_offset: 0,
            cal_factor: 1.0,
            begins: 0,
            starts: 0,
            updates: 0,
            tares: 0,
            refreshes: 0,
            calibration_masses: Vec::new(),
        }
    }
}

impl LoadSensor for MockSensor {
    type Error = ();

    async fn begin(&mut self) -> Result<(), Self::Error> {
        self.begins += 1;
        Ok(())
    }

    fn set_tare_offset(&mut self, offset: i32) {
        self.tare_offset = offset;
    }

    fn set_cal_factor(&mut self, factor: f32) {
        self.cal_factor = factor;
    }

    async fn start(&mut self, _stabilizing_time: Duration, _tare_on_start: bool) -> Result<(), Self::Error> {
        self.starts += 1;
        Ok(())
    }

    async fn update(&mut self) -> Result<bool, Self::Error> {
        self.updates += 1;
        if self.fail_updates {
            return Err(());
        }
        Ok(self.ready)
    }

    fn get_data(&self) -> f32 {
        self.weight
    }

    async fn tare(&mut self) -> Result<(), Self::Error> {
        self.tares += 1;
        self.tare_timeout = self.tare_times_out;
        if !self.tare_timeout {
            self.tare_offset = self.tare_result;
        }
        Ok(())
    }

    fn get_tare_offset(&self) -> i32 {
        self.tare_offset
    }

    async fn refresh_dataset(&mut self) -> Result<(), Self::Error> {
        self.refreshes += 1;
        Ok(())
    }

    fn get_new_calibration(&mut self, known_mass: f32) -> f32 {
        self.calibration_masses.push(known_mass);
        self.cal_factor = self.new_calibration;
        self.cal_factor
    }

    fn get_sps(&self) -> f32 {
        self.sps
    }

    fn tare_timeout(&self) -> bool {
        self.tare_timeout
    }

    fn signal_timeout(&self) -> bool {
        self.signal_timeout
    }
}

/// Strain gauge that hands out a fixed list of conversions and then goes quiet.
pub struct ScriptedGauge {
    conversions: VecDeque<i32>,
    pub powered_up: bool,
}

impl ScriptedGauge {
    pub fn new(conversions: impl IntoIterator<Item = i32>) -> Self {
        Self {
            conversions: conversions.into_iter().collect(),
            powered_up: false,
        }
    }
}

impl StrainGaugeInterface for ScriptedGauge {
    type Error = ();

    async fn initialize(&mut self) -> Result<(), Self::Error> {
        self.power_up().await
    }

    fn is_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.conversions.is_empty())
    }

    async fn read_conversion(&mut self) -> Result<i32, Self::Error> {
        self.conversions.pop_front().ok_or(())
    }

    async fn power_up(&mut self) -> Result<(), Self::Error> {
        self.powered_up = true;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    pub stored: Option<CalibrationRecord>,
    pub saves: usize,
    pub fail_load: bool,
    pub fail_save: bool,
}

impl MemoryStorage {
    pub fn holding(record: CalibrationRecord) -> Self {
        Self {
            stored: Some(record),
            ..Default::default()
        }
    }
}

impl CalibrationStorage for MemoryStorage {
    async fn load(&mut self) -> Result<Option<CalibrationRecord>, StorageError> {
        if self.fail_load {
            return Err(StorageError::RetrieveError);
        }
        Ok(self.stored)
    }

    async fn save(&mut self, record: &CalibrationRecord) -> Result<(), StorageError> {
        if self.fail_save {
            return Err(StorageError::SaveError);
        }
        self.saves += 1;
        self.stored = Some(*record);
        Ok(())
    }
}

const FLASH_PAGE_SIZE: usize = 4096;
const FLASH_PAGES: usize = 4;

/// NOR flash in RAM: erase sets bytes to 0xFF, writes can only clear bits.
pub struct MemoryFlash {
    data: Vec<u8>,
    /// Writes allowed before every further write fails, as if power was cut.
    pub writes_left: Option<usize>,
}

impl MemoryFlash {
    pub fn new() -> Self {
        Self {
            data: vec![0xFF; FLASH_PAGE_SIZE * FLASH_PAGES],
            writes_left: None,
        }
    }

    pub fn capacity_bytes(&self) -> u32 {
        self.data.len() as u32
    }

    fn check_range(&self, offset: u32, length: usize) -> Result<core::ops::Range<usize>, NorFlashErrorKind> {
        let start = offset as usize;
        let end = start + length;
        if end > self.data.len() {
            return Err(NorFlashErrorKind::OutOfBounds);
        }
        Ok(start..end)
    }
}

impl ErrorType for MemoryFlash {
    type Error = NorFlashErrorKind;
}

impl ReadNorFlash for MemoryFlash {
    const READ_SIZE: usize = 1;

    async fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let range = self.check_range(offset, bytes.len())?;
        bytes.copy_from_slice(&self.data[range]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }
}

impl NorFlash for MemoryFlash {
    const WRITE_SIZE: usize = 4;
    const ERASE_SIZE: usize = FLASH_PAGE_SIZE;

    async fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        if from as usize % FLASH_PAGE_SIZE != 0 || to as usize % FLASH_PAGE_SIZE != 0 {
            return Err(NorFlashErrorKind::NotAligned);
        }
        let range = self.check_range(from, (to - from) as usize)?;
        self.data[range].fill(0xFF);
        Ok(())
    }

    async fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        if offset as usize % Self::WRITE_SIZE != 0 || bytes.len() % Self::WRITE_SIZE != 0 {
            return Err(NorFlashErrorKind::NotAligned);
        }
        if let Some(left) = self.writes_left.as_mut() {
            if *left == 0 {
                return Err(NorFlashErrorKind::Other);
            }
            *left -= 1;
        }
        let range = self.check_range(offset, bytes.len())?;
        for (cell, byte) in self.data[range].iter_mut().zip(bytes) {
            *cell &= *byte;
        }
        Ok(())
    }
}

impl MultiwriteNorFlash for MemoryFlash {}

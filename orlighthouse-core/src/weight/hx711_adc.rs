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

use crate::weight::interface::StrainGaugeInterface;
use crate::weight::{calibrated_weight, LoadSensor};
use embassy_time::{Duration, Instant, Timer};
use heapless::HistoryBuffer;

/// Conversions averaged into one reading.
pub const DATASET_SIZE: usize = 16;

const DEFAULT_TARE_TIMEOUT: Duration = Duration::from_secs(3);
const READY_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Moving average, tare and scaling on top of a raw strain gauge.
pub struct Hx711Adc<StrainGauge> {
    strain_gauge: StrainGauge,
    dataset: HistoryBuffer<i32, DATASET_SIZE>,
    tare_offset: i32,
    cal_factor: f32,
    last_conversion: Option<Instant>,
    conversion_time_us: u64,
    tare_timeout_limit: Duration,
    tare_timeout: bool,
    signal_timeout: bool,
}

impl<StrainGauge, StrainGaugeE> Hx711Adc<StrainGauge>
where
    StrainGauge: StrainGaugeInterface<Error = StrainGaugeE>,
{
    pub fn new(strain_gauge: StrainGauge) -> Self {
        Self {
            strain_gauge,
            dataset: HistoryBuffer::new(),
            tare_offset: 0,
            cal_factor: 1.0,
            last_conversion: None,
            conversion_time_us: 0,
            tare_timeout_limit: DEFAULT_TARE_TIMEOUT,
            tare_timeout: false,
            signal_timeout: false,
        }
    }

    /// How long [`LoadSensor::tare`] and [`LoadSensor::refresh_dataset`] wait for a full dataset.
    pub fn with_tare_timeout(mut self, timeout: Duration) -> Self {
        self.tare_timeout_limit = timeout;
        self
    }

    /// Mean of the dataset in raw counts.
    pub fn smoothed_raw(&self) -> i32 {
        if self.dataset.len() == 0 {
            return 0;
        }
        let sum: i64 = self.dataset.as_slice().iter().map(|&r| r as i64).sum();
        (sum / self.dataset.len() as i64) as i32
    }

    fn record_conversion_time(&mut self, now: Instant) {
        if let Some(last) = self.last_conversion {
            let elapsed_us = now.saturating_duration_since(last).as_micros();
            self.conversion_time_us = match self.conversion_time_us {
                0 => elapsed_us,
                previous => (previous * 3 + elapsed_us) / 4,
            };
        }
        self.last_conversion = Some(now);
    }

    /// Forget the conversion spacing seen so far, so a pause in polling (calibration
    /// prompts) does not drag the rate down.
    fn restart_rate_measurement(&mut self) {
        self.last_conversion = None;
        self.conversion_time_us = 0;
    }

    /// Wait for a whole dataset of new conversions. False if the timeout ran out first.
    async fn fill_dataset(&mut self) -> Result<bool, StrainGaugeE> {
        self.restart_rate_measurement();
        let deadline = Instant::now() + self.tare_timeout_limit;
        let mut collected = 0;
        while collected < DATASET_SIZE {
            if self.update().await? {
                collected += 1;
            } else if Instant::now() >= deadline {
                return Ok(false);
            } else {
                Timer::after(READY_POLL_INTERVAL).await;
            }
        }
        Ok(true)
    }
}

impl<StrainGauge, StrainGaugeE> LoadSensor for Hx711Adc<StrainGauge>
where
    StrainGauge: StrainGaugeInterface<Error = StrainGaugeE>,
{
    type Error = StrainGaugeE;

    async fn begin(&mut self) -> Result<(), Self::Error> {
        self.strain_gauge.initialize().await
    }

    fn set_tare_offset(&mut self, offset: i32) {
        self.tare_offset = offset;
    }

    fn set_cal_factor(&mut self, factor: f32) {
        self.cal_factor = factor;
    }

    async fn start(&mut self, stabilizing_time: Duration, tare_on_start: bool) -> Result<(), Self::Error> {
        self.restart_rate_measurement();
        let deadline = Instant::now() + stabilizing_time;
        let mut conversion_seen = false;
        while Instant::now() < deadline {
            if self.update().await? {
                conversion_seen = true;
            } else {
                Timer::after(READY_POLL_INTERVAL).await;
            }
        }

        self.signal_timeout = !conversion_seen;
        if self.signal_timeout {
            warn!("No conversion from the load cell during start up");
            return Ok(());
        }

        if tare_on_start {
            self.tare().await?;
        }
        Ok(())
    }

    async fn update(&mut self) -> Result<bool, Self::Error> {
        if !self.strain_gauge.is_ready()? {
            return Ok(false);
        }
        let raw = self.strain_gauge.read_conversion().await?;
        self.record_conversion_time(Instant::now());
        self.dataset.write(raw);
        trace!("Raw conversion = {}", raw);
        Ok(true)
    }

    fn get_data(&self) -> f32 {
        calibrated_weight(self.smoothed_raw(), self.tare_offset, self.cal_factor)
    }

    async fn tare(&mut self) -> Result<(), Self::Error> {
        if self.fill_dataset().await? {
            self.tare_offset = self.smoothed_raw();
            self.tare_timeout = false;
            debug!("Tare offset = {}", self.tare_offset);
        } else {
            self.tare_timeout = true;
            warn!("Tare did not complete in time");
        }
        Ok(())
    }

    fn get_tare_offset(&self) -> i32 {
        self.tare_offset
    }

    async fn refresh_dataset(&mut self) -> Result<(), Self::Error> {
        if !self.fill_dataset().await? {
            self.signal_timeout = true;
            warn!("Dataset refresh did not complete in time");
        }
        Ok(())
    }

    fn get_new_calibration(&mut self, known_mass: f32) -> f32 {
        if known_mass == 0.0 {
            return self.cal_factor;
        }
        let tared_counts = (self.smoothed_raw() as i64 - self.tare_offset as i64) as f32;
        self.cal_factor = tared_counts / known_mass;
        self.cal_factor
    }

    fn get_sps(&self) -> f32 {
        match self.conversion_time_us {
            0 => 0.0,
            us => 1_000_000.0 / us as f32,
        }
    }

    fn tare_timeout(&self) -> bool {
        self.tare_timeout
    }

    fn signal_timeout(&self) -> bool {
        self.signal_timeout
    }
}

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

//! Start up calibration. A stored record is applied as is, without one the user is walked
//! through an empty scale reading and a known mass reading, and the result is written back.

use crate::calibration::{CalibrationRecord, EffectiveCalibration};
use crate::config::{LighthouseConfig, CALIBRATION_PHASE_1_COLOUR, CALIBRATION_PHASE_2_COLOUR};
use crate::error::FatalError;
use crate::led::LedDriver;
use crate::storage::CalibrationStorage;
use crate::weight::LoadSensor;
use embedded_hal_async::delay::DelayNs;

pub struct CalibrationStore<ST> {
    storage: ST,
    config: LighthouseConfig,
}

impl<ST> CalibrationStore<ST>
where
    ST: CalibrationStorage,
{
    pub fn new(storage: ST, config: &LighthouseConfig) -> Self {
        Self {
            storage,
            config: *config,
        }
    }

    /// Bring the sensor up and leave it with a calibration applied.
    pub async fn initialize<S, L, D>(
        &mut self,
        sensor: &mut S,
        leds: &mut L,
        delay: &mut D,
    ) -> Result<EffectiveCalibration, FatalError>
    where
        S: LoadSensor,
        L: LedDriver,
        D: DelayNs,
    {
        sensor.begin().await.map_err(|_| FatalError::SensorReadingError)?;
        sensor
            .start(self.config.stabilizing_time, false)
            .await
            .map_err(|_| FatalError::SensorReadingError)?;
        if sensor.tare_timeout() || sensor.signal_timeout() {
            error!("Timeout, check HX711 wiring and pin designations");
            return Err(FatalError::SensorTimeout);
        }
        info!("Startup is complete");

        let stored = match self.storage.load().await {
            Ok(record) => record,
            Err(e) => {
                warn!("Calibration record unreadable ({:?}), recalibrating", e);
                None
            }
        };

        let record = match stored {
            Some(record) if record.is_valid() => {
                info!(
                    "Using stored calibration, offset {} factor {}",
                    record.tare_offset,
                    record.scale_factor
                );
                record
            }
            _ => {
                info!("No calibration stored, starting calibration");
                let record = self.calibrate(sensor, leds, delay).await?;
                self.storage.save(&record).await.map_err(|e| {
                    error!("Unable to save calibration: {:?}", e);
                    FatalError::StorageFailure
                })?;
                info!(
                    "New calibration saved, offset {} factor {}",
                    record.tare_offset,
                    record.scale_factor
                );
                record
            }
        };

        sensor.set_tare_offset(record.tare_offset);
        sensor.set_cal_factor(record.scale_factor);
        Ok(record.effective())
    }

    async fn calibrate<S, L, D>(
        &mut self,
        sensor: &mut S,
        leds: &mut L,
        delay: &mut D,
    ) -> Result<CalibrationRecord, FatalError>
    where
        S: LoadSensor,
        L: LedDriver,
        D: DelayNs,
    {
        let settle_ms = self.config.calibration_settle_time.as_millis() as u32;

        leds.show_solid(CALIBRATION_PHASE_1_COLOUR).await;
        info!("Remove any load from the scale");
        delay.delay_ms(settle_ms).await;
        sensor.update().await.map_err(|_| FatalError::SensorReadingError)?;
        sensor.tare().await.map_err(|_| FatalError::SensorReadingError)?;
        if sensor.tare_timeout() {
            error!("Tare did not complete");
            return Err(FatalError::SensorTimeout);
        }
        let tare_offset = sensor.get_tare_offset();
        info!("Tare complete, offset {}", tare_offset);

        leds.show_solid(CALIBRATION_PHASE_2_COLOUR).await;
        info!("Place the {} kg reference mass on the scale", self.config.known_mass);
        delay.delay_ms(settle_ms).await;
        sensor
            .refresh_dataset()
            .await
            .map_err(|_| FatalError::SensorReadingError)?;
        let scale_factor = sensor.get_new_calibration(self.config.known_mass);

        Ok(CalibrationRecord::new(tare_offset, scale_factor))
    }
}

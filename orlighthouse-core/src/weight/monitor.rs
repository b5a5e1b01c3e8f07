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

use crate::config::{LighthouseConfig, ALERT_COLOUR, NOMINAL_COLOUR, STARTUP_COLOUR};
use crate::error::FatalError;
use crate::led::colour_to_hex;
use crate::weight::{classify, LoadSensor, WeightClass};
use embassy_time::{Duration, Instant};
use embedded_hal_async::delay::DelayNs;
use smart_leds::RGB8;

const READY_POLL_INTERVAL_MS: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WeightSample {
    pub weight: f32,
    pub class: WeightClass,
    /// Set only on the report where the colour moved away from the previous one.
    pub state_changed: bool,
}

/// Colour picked from the latest report and the one before it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColourState {
    current: RGB8,
    previous: RGB8,
}

impl ColourState {
    pub const fn new(initial: RGB8) -> Self {
        Self {
            current: initial,
            previous: initial,
        }
    }

    pub fn current(&self) -> RGB8 {
        self.current
    }

    /// Take the newly classified colour. Returns true when it differs from the previous one,
    /// after which both are the same again.
    pub fn assign(&mut self, colour: RGB8) -> bool {
        self.current = colour;
        let changed = self.current != self.previous;
        self.previous = self.current;
        changed
    }
}

pub struct WeightMonitor {
    threshold: f32,
    report_interval: Duration,
    startup_window: Duration,
    min_samples_per_second: f32,
    max_samples_per_second: f32,
    last_report: Instant,
    colours: ColourState,
}

impl WeightMonitor {
    pub fn new(config: &LighthouseConfig, now: Instant) -> Self {
        Self {
            threshold: config.weight_threshold,
            report_interval: config.report_interval,
            startup_window: config.startup_window,
            min_samples_per_second: config.min_samples_per_second,
            max_samples_per_second: config.max_samples_per_second,
            last_report: now,
            colours: ColourState::new(STARTUP_COLOUR),
        }
    }

    pub fn current_colour(&self) -> RGB8 {
        self.colours.current()
    }

    /// Start the report interval again from `now`, used once start up has finished.
    pub fn restart_interval(&mut self, now: Instant) {
        self.last_report = now;
    }

    pub fn colour_for(class: WeightClass) -> RGB8 {
        match class {
            WeightClass::Nominal => NOMINAL_COLOUR,
            WeightClass::Alert => ALERT_COLOUR,
        }
    }

    /// Check the sensor once. A sample is only reported when a conversion just completed and
    /// the report interval has passed since the last one.
    pub async fn poll<S: LoadSensor>(&mut self, sensor: &mut S, now: Instant) -> Result<Option<WeightSample>, S::Error> {
        if !sensor.update().await? {
            return Ok(None);
        }

        let elapsed = now.saturating_duration_since(self.last_report);
        if elapsed < self.report_interval {
            return Ok(None);
        }
        self.last_report = now;

        let weight = sensor.get_data();
        let class = classify(weight, self.threshold);
        let state_changed = self.colours.assign(Self::colour_for(class));
        info!("Weight: {}", weight);
        if state_changed {
            info!("Status changed to: {:x}", colour_to_hex(self.colours.current()));
        }

        Ok(Some(WeightSample {
            weight,
            class,
            state_changed,
        }))
    }

    /// Wait for the first conversion with the calibration applied, then check the sensor
    /// converts at a rate that means it is wired up properly.
    pub async fn validate_sample_rate<S, D>(&self, sensor: &mut S, delay: &mut D) -> Result<f32, FatalError>
    where
        S: LoadSensor,
        D: DelayNs,
    {
        let attempts = self.startup_window.as_millis() / READY_POLL_INTERVAL_MS as u64;
        let mut converted = false;
        for _ in 0..=attempts {
            if sensor.update().await.map_err(|_| FatalError::SensorReadingError)? {
                converted = true;
                break;
            }
            delay.delay_ms(READY_POLL_INTERVAL_MS).await;
        }
        if !converted {
            return Err(FatalError::SensorTimeout);
        }

        let sps = sensor.get_sps();
        if sps < self.min_samples_per_second {
            error!("Sampling rate too low ({} sps)", sps);
            return Err(FatalError::SampleRateOutOfRange(sps));
        }
        if sps > self.max_samples_per_second || sps.is_nan() {
            error!("Sampling rate too high ({} sps)", sps);
            return Err(FatalError::SampleRateOutOfRange(sps));
        }
        Ok(sps)
    }
}

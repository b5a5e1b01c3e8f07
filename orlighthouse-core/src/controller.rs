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

//! The lamp's control loop: boot, then weigh and animate until something fatal happens.

use crate::animation::AnimationEngine;
use crate::calibration::store::CalibrationStore;
use crate::config::{LighthouseConfig, ANGULAR_RESOLUTION, ERROR_COLOUR, STARTUP_COLOUR};
use crate::error::FatalError;
use crate::led::LedDriver;
use crate::storage::CalibrationStorage;
use crate::weight::monitor::WeightMonitor;
use crate::weight::LoadSensor;
use embassy_time::Instant;
use embedded_hal_async::delay::DelayNs;

pub struct Lighthouse<S, L, ST, D> {
    sensor: S,
    leds: L,
    store: CalibrationStore<ST>,
    delay: D,
    monitor: WeightMonitor,
    engine: AnimationEngine<ANGULAR_RESOLUTION>,
    config: LighthouseConfig,
    halted: bool,
}

impl<S, L, ST, D> Lighthouse<S, L, ST, D>
where
    S: LoadSensor,
    L: LedDriver,
    ST: CalibrationStorage,
    D: DelayNs,
{
    pub fn new(sensor: S, leds: L, storage: ST, delay: D, config: LighthouseConfig, now: Instant) -> Self {
        Self {
            sensor,
            leds,
            store: CalibrationStore::new(storage, &config),
            delay,
            monitor: WeightMonitor::new(&config, now),
            engine: AnimationEngine::new(config.phase_step),
            config,
            halted: false,
        }
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Startup fill, calibration and the sample rate check.
    pub async fn boot(&mut self) -> Result<(), FatalError> {
        self.leds.begin();
        self.leds.set_brightness(self.config.led_brightness);
        self.leds.show_solid(STARTUP_COLOUR).await;
        info!("Starting...");

        let calibration = self
            .store
            .initialize(&mut self.sensor, &mut self.leds, &mut self.delay)
            .await?;
        debug!(
            "Calibration offset {} factor {}",
            calibration.tare_offset,
            calibration.scale_factor
        );

        let sps = self
            .monitor
            .validate_sample_rate(&mut self.sensor, &mut self.delay)
            .await?;
        info!("Load cell running at {} sps", sps);
        Ok(())
    }

    /// First report comes one report interval after `now`. Called once boot has finished.
    pub fn start_reporting(&mut self, now: Instant) {
        self.monitor.restart_interval(now);
    }

    /// One pass of the loop: poll the weight, rebuild the glow on a colour change and draw a
    /// frame. Does nothing once halted.
    pub async fn tick(&mut self, now: Instant) -> Result<(), FatalError> {
        if self.halted {
            return Ok(());
        }

        let sample = self
            .monitor
            .poll(&mut self.sensor, now)
            .await
            .map_err(|_| FatalError::SensorReadingError)?;
        if let Some(sample) = sample {
            if sample.state_changed {
                self.engine.on_color_change(self.monitor.current_colour());
            }
        }

        self.engine.render_frame(&mut self.leds).await;
        self.delay
            .delay_ms(self.config.frame_interval.as_millis() as u32)
            .await;
        Ok(())
    }

    /// Show the error colour and stop the loop for good.
    pub async fn fail(&mut self, error: FatalError) {
        error!("{}", error.description());
        if let FatalError::SampleRateOutOfRange(sps) = error {
            error!("Measured {} sps", sps);
        }
        self.leds.show_solid(ERROR_COLOUR).await;
        self.delay
            .delay_ms(self.config.error_hold_time.as_millis() as u32)
            .await;
        self.halted = true;
    }

    pub async fn run(&mut self) -> ! {
        match self.boot().await {
            Ok(()) => self.start_reporting(Instant::now()),
            Err(e) => self.fail(e).await,
        }

        while !self.halted {
            if let Err(e) = self.tick(Instant::now()).await {
                self.fail(e).await;
            }
        }

        warn!("Halted, reset to start again");
        loop {
            core::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ALERT_COLOUR, NOMINAL_COLOUR, STRIP_SIZE};
    use crate::test_support::{MemoryStorage, MockDelay, MockLeds, MockSensor};
    use crate::animation::AnimationState;
    use crate::calibration::CalibrationRecord;
    use embassy_futures::block_on;
    use embassy_time::Duration;
    use smart_leds::RGB8;

    type TestLighthouse = Lighthouse<MockSensor, MockLeds, MemoryStorage, MockDelay>;

    fn lighthouse(sensor: MockSensor) -> TestLighthouse {
        Lighthouse::new(
            sensor,
            MockLeds::new(STRIP_SIZE),
            MemoryStorage::holding(CalibrationRecord::new(8373663, -25272.0)),
            MockDelay::default(),
            LighthouseConfig::DEFAULT,
            Instant::from_millis(0),
        )
    }

    fn gamma(colour: RGB8) -> RGB8 {
        MockLeds::new(1).gamma_correct(colour)
    }

    #[test]
    fn boot_shows_startup_colour_and_applies_calibration() {
        let mut lamp = lighthouse(MockSensor::new());
        block_on(lamp.boot()).unwrap();

        assert!(lamp.leds.begun);
        assert_eq!(lamp.leds.brightness, 75);
        assert_eq!(lamp.leds.frames[0], vec![gamma(STARTUP_COLOUR); STRIP_SIZE]);
        assert_eq!(lamp.sensor.tare_offset, 8373663);
        assert_eq!(lamp.engine.state(), AnimationState::Idle);
    }

    #[test]
    fn crossing_the_threshold_rebuilds_once() {
        let mut lamp = lighthouse(MockSensor::new());
        block_on(lamp.boot()).unwrap();

        let mut now = Instant::from_millis(0);
        let mut step = |lamp: &mut TestLighthouse, weight: f32| {
            lamp.sensor.weight = weight;
            now = now + Duration::from_millis(800);
            block_on(lamp.tick(now)).unwrap();
        };

        step(&mut lamp, 3.0);
        assert_eq!(lamp.engine.rebuild_count(), 1);
        assert_eq!(lamp.engine.base_colour(), NOMINAL_COLOUR);

        step(&mut lamp, 15.0);
        assert_eq!(lamp.engine.rebuild_count(), 2);
        assert_eq!(lamp.engine.base_colour(), ALERT_COLOUR);
        let status = *lamp.leds.frames.last().unwrap().last().unwrap();
        assert_eq!(status, gamma(ALERT_COLOUR));

        step(&mut lamp, 15.0);
        step(&mut lamp, 12.0);
        assert_eq!(lamp.engine.rebuild_count(), 2);
    }

    #[test]
    fn nothing_drawn_before_the_first_report() {
        let mut lamp = lighthouse(MockSensor::new());
        block_on(lamp.boot()).unwrap();
        lamp.sensor.ready = false;

        let shows = lamp.leds.shows;
        block_on(lamp.tick(Instant::from_millis(5_000))).unwrap();
        assert_eq!(lamp.leds.shows, shows);
        assert_eq!(lamp.engine.state(), AnimationState::Idle);
    }

    #[test]
    fn startup_timeout_halts_the_loop() {
        let mut sensor = MockSensor::new();
        sensor.signal_timeout = true;
        let mut lamp = lighthouse(sensor);

        let error = block_on(lamp.boot()).unwrap_err();
        assert_eq!(error, FatalError::SensorTimeout);
        block_on(lamp.fail(error));

        assert!(lamp.is_halted());
        assert_eq!(*lamp.leds.frames.last().unwrap(), vec![gamma(ERROR_COLOUR); STRIP_SIZE]);
        assert!(lamp.delay.total_ms >= 500);

        let updates = lamp.sensor.updates;
        let shows = lamp.leds.shows;
        block_on(lamp.tick(Instant::from_millis(10_000))).unwrap();
        assert_eq!(lamp.sensor.updates, updates);
        assert_eq!(lamp.leds.shows, shows);
    }

    #[test]
    fn first_report_waits_a_full_interval_after_boot() {
        let mut lamp = lighthouse(MockSensor::new());
        block_on(lamp.boot()).unwrap();
        lamp.sensor.weight = 3.0;

        let booted = Instant::from_millis(11_000);
        lamp.start_reporting(booted);

        block_on(lamp.tick(booted + Duration::from_millis(500))).unwrap();
        assert_eq!(lamp.engine.rebuild_count(), 0);
        assert_eq!(lamp.engine.state(), AnimationState::Idle);

        block_on(lamp.tick(booted + Duration::from_millis(750))).unwrap();
        assert_eq!(lamp.engine.rebuild_count(), 1);
        assert_eq!(lamp.engine.base_colour(), NOMINAL_COLOUR);
    }

    #[test]
    fn sensor_failure_in_the_loop_is_fatal() {
        let mut lamp = lighthouse(MockSensor::new());
        block_on(lamp.boot()).unwrap();
        lamp.sensor.fail_updates = true;
        let result = block_on(lamp.tick(Instant::from_millis(1_000)));
        assert_eq!(result, Err(FatalError::SensorReadingError));
    }
}

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

#![no_std]
#![no_main]

mod led;
mod storage;

use crate::led::Ws2812Writer;
use crate::storage::calibration_storage;
use assign_resources::assign_resources;
use defmt::info;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::{self, Pio};
use embassy_rp::pio_programs::ws2812::{PioWs2812, PioWs2812Program};
use embassy_rp::{bind_interrupts, peripherals, Peri};
use embassy_time::{Delay, Instant};
use orlighthouse_core::config::{LighthouseConfig, STRIP_SIZE};
use orlighthouse_core::controller::Lighthouse;
use orlighthouse_core::led::strip::LedStrip;
use orlighthouse_core::weight::hx711_adc::Hx711Adc;
use orlighthouse_core::weight::interface::hx711::{Hx711, Hx711Gain};
#[allow(unused_imports)]
use {defmt_rtt as _, panic_probe as _};

assign_resources! {
    led_control: LedControlResources {
        pio: PIO0,
        dma_channel: DMA_CH0,
        data_pin: PIN_16,
    },
    strain_gauge_io: StrainGaugeResources {
        clk_pin: PIN_14,
        data_pin: PIN_15,
    },
    storage: StorageResources {
        flash: FLASH,
    },
}

bind_interrupts!(struct PioIrqs {
    PIO0_IRQ_0 => pio::InterruptHandler<PIO0>;
});

#[embassy_executor::main]
async fn main(_spawner: Spawner) -> ! {
    let p = embassy_rp::init(Default::default());
    let resources = split_resources! {p};

    info!("Or Light House starting");

    let led_resources = resources.led_control;
    let Pio { mut common, sm0, .. } = Pio::new(led_resources.pio, PioIrqs);
    let program = PioWs2812Program::new(&mut common);
    let pio_ws2812: PioWs2812<'_, PIO0, 0, STRIP_SIZE> = PioWs2812::new(
        &mut common,
        sm0,
        led_resources.dma_channel,
        led_resources.data_pin,
        &program,
    );
    let leds = LedStrip::<_, STRIP_SIZE>::new(Ws2812Writer::new(pio_ws2812));

    let clk_pin_out = Output::new(resources.strain_gauge_io.clk_pin, Level::Low);
    let data_pin = Input::new(resources.strain_gauge_io.data_pin, Pull::Up);
    let sensor = Hx711Adc::new(Hx711::new(clk_pin_out, data_pin, Hx711Gain::Gain128));

    let storage = calibration_storage(resources.storage.flash);

    let mut lighthouse = Lighthouse::new(
        sensor,
        leds,
        storage,
        Delay,
        LighthouseConfig::DEFAULT,
        Instant::now(),
    );
    lighthouse.run().await
}

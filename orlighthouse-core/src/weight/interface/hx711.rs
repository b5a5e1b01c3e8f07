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
use embassy_time::{Duration, Ticker, Timer};
use embedded_hal::digital::{InputPin, OutputPin};

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Hx711Gain {
    Gain128,
    Gain64,
    Gain32ChannelB,
}

impl Hx711Gain {
    fn tick_count(&self) -> usize {
        match self {
            Hx711Gain::Gain128 => 25,
            Hx711Gain::Gain64 => 27,
            Hx711Gain::Gain32ChannelB => 26,
        }
    }
}

const POWER_MODE_CHANGE_DELAY: Duration = Duration::from_micros(60);
const CLK_HALF_PERIOD: Duration = Duration::from_micros(1);
const VALID_DATA_BITS: usize = 24;

#[derive(Debug)]
pub enum Error<OutPinE, InPinE> {
    OutPin(OutPinE),
    InPin(InPinE),
}

/// Two wire HX711 link. DOUT going low marks a finished conversion, the 24 bit result is then
/// clocked out MSB first followed by the pulses that select the gain for the next one.
pub struct Hx711<CLK, DATA> {
    clock_pin: CLK,
    data_pin: DATA,
    gain_clocks: usize,
    powered_up: bool,
}

impl<CLK, DATA, ClkE, DataE> Hx711<CLK, DATA>
where
    CLK: OutputPin<Error = ClkE>,
    DATA: InputPin<Error = DataE>,
{
    pub fn new(clock_pin: CLK, data_pin: DATA, gain: Hx711Gain) -> Self {
        Self {
            clock_pin,
            data_pin,
            gain_clocks: gain.tick_count(),
            powered_up: false,
        }
    }
}

/// Keep the raw 24 bit two's complement value, sign extended to 32 bits.
fn sign_extend_conversion(clocked: i32, gain_clocks: usize) -> i32 {
    let data_bits_to_discard = gain_clocks - VALID_DATA_BITS;
    let data_mask = (1 << VALID_DATA_BITS) - 1;
    let mut data = (clocked >> data_bits_to_discard) & data_mask;
    if (data >> 23) & 0x1 == 0x1 {
        data |= 0xFF000000u32 as i32;
    }
    data
}

impl<CLK, DATA, ClkE, DataE> StrainGaugeInterface for Hx711<CLK, DATA>
where
    CLK: OutputPin<Error = ClkE>,
    DATA: InputPin<Error = DataE>,
{
    type Error = Error<ClkE, DataE>;

    async fn initialize(&mut self) -> Result<(), Self::Error> {
        self.power_up().await
    }

    fn is_ready(&mut self) -> Result<bool, Self::Error> {
        if !self.powered_up {
            return Ok(false);
        }
        self.data_pin.is_low().map_err(Error::InPin)
    }

    async fn read_conversion(&mut self) -> Result<i32, Self::Error> {
        let mut clock_ticker = Ticker::every(CLK_HALF_PERIOD);
        let mut data: i32 = 0;

        clock_ticker.next().await;
        for _ in 0..self.gain_clocks {
            data <<= 1;
            self.clock_pin.set_high().map_err(Error::OutPin)?;
            clock_ticker.next().await;
            self.clock_pin.set_low().map_err(Error::OutPin)?;
            if self.data_pin.is_high().map_err(Error::InPin)? {
                data |= 0x1;
            }
            clock_ticker.next().await;
        }

        Ok(sign_extend_conversion(data, self.gain_clocks))
    }

    async fn power_up(&mut self) -> Result<(), Self::Error> {
        self.clock_pin.set_low().map_err(Error::OutPin)?;
        Timer::after(POWER_MODE_CHANGE_DELAY).await;
        self.powered_up = true;
        Ok(())
    }
}

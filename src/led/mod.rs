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

use embassy_rp::pio::Instance;
use embassy_rp::pio_programs::ws2812::PioWs2812;
use orlighthouse_core::led::strip::PixelWriter;
use smart_leds::RGB8;

/// WS2812 strip driven from a PIO state machine.
pub struct Ws2812Writer<'d, P: Instance, const S: usize, const LED_COUNT: usize> {
    ws2812pio: PioWs2812<'d, P, S, LED_COUNT>,
}

impl<'d, P: Instance, const S: usize, const LED_COUNT: usize> Ws2812Writer<'d, P, S, LED_COUNT> {
    pub fn new(ws2812pio: PioWs2812<'d, P, S, LED_COUNT>) -> Self {
        Self { ws2812pio }
    }
}

impl<'d, P: Instance, const S: usize, const LED_COUNT: usize> PixelWriter<LED_COUNT>
    for Ws2812Writer<'d, P, S, LED_COUNT>
{
    async fn write(&mut self, pixels: &[RGB8; LED_COUNT]) {
        self.ws2812pio.write(pixels).await;
    }
}

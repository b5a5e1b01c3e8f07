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

//! Board independent logic for the Or Light House weight lamp.
//!
//! - [`calibration`]: persisted tare offset / scale factor and the guided calibration flow
//! - [`weight`]: load sensor interface, HX711 adapter and the threshold monitor
//! - [`animation`]: colour table and rotating glow renderer
//! - [`led`]: pixel buffer and LED driver interface
//! - [`storage`]: where the calibration record lives between boots
//! - [`controller`]: the single control loop that owns all of the above

#![cfg_attr(not(test), no_std)]
#![allow(async_fn_in_trait)]

mod fmt;

pub mod animation;
pub mod calibration;
pub mod config;
pub mod controller;
pub mod error;
pub mod led;
pub mod storage;
pub mod weight;

#[cfg(test)]
pub(crate) mod test_support;

//! IEEE 802.11 frequency/channel helpers.
//!
//! Frequencies are in MHz. Only the 2.4 GHz and 5 GHz bands are mapped.

use std::fmt;

/// Frequency band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    /// 2.4 GHz.
    TwoPointFourGhz,
    /// 5 GHz.
    FiveGhz,
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::TwoPointFourGhz => f.write_str("2.4GHz"),
            Band::FiveGhz => f.write_str("5GHz"),
        }
    }
}

const BASE_2G: u32 = 2407;
const CHANNEL_14_FREQ: u32 = 2484;
const BASE_5G: u32 = 5000;

/// Band of `freq`, if it falls in a mapped band.
pub fn freq_to_band(freq: u32) -> Option<Band> {
    match freq {
        2401..=2495 => Some(Band::TwoPointFourGhz),
        4900..=5895 => Some(Band::FiveGhz),
        _ => None,
    }
}

/// Channel number for `freq`.
pub fn freq_to_channel(freq: u32) -> Option<u8> {
    match freq {
        CHANNEL_14_FREQ => Some(14),
        2412..=2472 if (freq - BASE_2G) % 5 == 0 => u8::try_from((freq - BASE_2G) / 5).ok(),
        5160..=5885 if (freq - BASE_5G) % 5 == 0 => u8::try_from((freq - BASE_5G) / 5).ok(),
        _ => None,
    }
}

/// Centre frequency of `channel`.
///
/// Channels 1-13 and 14 map to 2.4 GHz, 32-177 to 5 GHz.
pub fn channel_to_freq(channel: u8) -> Option<u32> {
    let channel = u32::from(channel);
    match channel {
        1..=13 => Some(BASE_2G + 5 * channel),
        14 => Some(CHANNEL_14_FREQ),
        32..=177 => Some(BASE_5G + 5 * channel),
        _ => None,
    }
}

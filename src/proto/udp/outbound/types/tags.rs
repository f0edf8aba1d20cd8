//! Tags that can be attached to the outbound UDP packet
//! The `Tag` trait contains the core logic, and is implemented by structs with specific roles

use bytes::BufMut;

use crate::util::to_u8_vec;

/// Enum wrapping possible outgoing UDP tags
#[derive(Clone, Debug, PartialEq)]
pub enum UdpTag {
    /// Tag sent to inform user code of the time left in the current mode
    Countdown(Countdown),
    /// Tag sent to provide joystick input to the user code
    Joysticks(Joysticks),
    /// Tag sent to update the roboRIO system clock to match that of the driver station
    DateTime(DateTime),
    /// Tag sent to update the roboRIO timezone. Sent alongside the DateTime tag
    Timezone(Timezone),
}

impl UdpTag {
    pub(crate) fn construct(&self) -> Vec<u8> {
        match self {
            UdpTag::Countdown(tag) => tag.construct(),
            UdpTag::Joysticks(tag) => tag.construct(),
            UdpTag::DateTime(tag) => tag.construct(),
            UdpTag::Timezone(tag) => tag.construct(),
        }
    }
}

/// Represents an outgoing UDP tag
pub(crate) trait Tag {
    fn id(&self) -> u8;

    fn data(&self) -> Vec<u8>;

    /// Length prefixed tag, the length counts the id byte
    fn construct(&self) -> Vec<u8> {
        let data = self.data();
        let mut buf = Vec::with_capacity(data.len() + 2);
        buf.push((data.len() + 1) as u8);
        buf.push(self.id());
        buf.extend(data);

        buf
    }
}

/// Tag containing the time remaining in the current mode
#[derive(Clone, Debug, PartialEq)]
pub struct Countdown {
    seconds_remaining: f32,
}

impl Countdown {
    pub fn new(seconds: f32) -> Countdown {
        Countdown {
            seconds_remaining: seconds,
        }
    }
}

impl Tag for Countdown {
    fn id(&self) -> u8 {
        0x07
    }

    fn data(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4);
        buf.put_f32(self.seconds_remaining);

        buf
    }
}

/// Tag containing values from joysticks
#[derive(Clone, Debug, PartialEq)]
pub struct Joysticks {
    axes: Vec<i8>,
    buttons: Vec<bool>,
    povs: Vec<i16>,
}

impl Joysticks {
    pub fn new(axes: Vec<i8>, buttons: Vec<bool>, povs: Vec<i16>) -> Joysticks {
        Joysticks {
            axes,
            buttons,
            povs,
        }
    }
}

impl Tag for Joysticks {
    fn id(&self) -> u8 {
        0x0c
    }

    fn data(&self) -> Vec<u8> {
        let mut buf = vec![];
        buf.put_u8(self.axes.len() as u8);
        for axis in &self.axes {
            buf.put_i8(*axis);
        }

        buf.put_u8(self.buttons.len() as u8);
        buf.extend(to_u8_vec(&self.buttons));

        buf.put_u8(self.povs.len() as u8);
        for pov in &self.povs {
            buf.put_i16(*pov);
        }

        buf
    }
}

/// Tag containing the current date and time in UTC
#[derive(Clone, Debug, PartialEq)]
pub struct DateTime {
    micros: u32,
    second: u8,
    minute: u8,
    hour: u8,
    day: u8,
    month: u8,
    year: u8,
}

impl DateTime {
    pub fn new(
        micros: u32,
        second: u8,
        minute: u8,
        hour: u8,
        day: u8,
        month: u8,
        year: u8,
    ) -> DateTime {
        DateTime {
            micros,
            second,
            minute,
            hour,
            day,
            month,
            year,
        }
    }

    /// The current UTC time. Months are 0 indexed and years count from 1900 on the wire
    pub fn now() -> DateTime {
        use chrono::{Datelike, Timelike, Utc};

        let now = Utc::now();
        DateTime::new(
            now.timestamp_subsec_micros(),
            now.second() as u8,
            now.minute() as u8,
            now.hour() as u8,
            now.day() as u8,
            now.month0() as u8,
            (now.year() - 1900) as u8,
        )
    }
}

impl Tag for DateTime {
    fn id(&self) -> u8 {
        0x0f
    }

    fn data(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(10);
        buf.put_u32(self.micros);
        buf.put_slice(&[
            self.second,
            self.minute,
            self.hour,
            self.day,
            self.month,
            self.year,
        ]);

        buf
    }
}

/// Tag containing the current timezone of the RIO
#[derive(Clone, Debug, PartialEq)]
pub struct Timezone {
    tz: String,
}

impl Timezone {
    pub fn new(tz: &str) -> Timezone {
        Timezone { tz: tz.to_string() }
    }
}

impl Tag for Timezone {
    fn id(&self) -> u8 {
        0x10
    }

    fn data(&self) -> Vec<u8> {
        self.tz.as_bytes().to_vec()
    }
}

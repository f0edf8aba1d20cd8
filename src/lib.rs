//! # ds-engine
//!
//! `ds-engine` is a driver station engine for FIRST Robotics Competition robots.
//! It keeps a live control link to a roboRIO, sending the desired robot state and joystick
//! input every 20ms over UDP, and consuming status telemetry and robot logs in return.
//!
//! The core type of the crate is [`DriverStation`](struct.DriverStation.html). Constructing one
//! spawns the network threads, which run until the driver station is shut down or dropped.
//! Joystick input is provided through the [`JoystickRegistry`](struct.JoystickRegistry.html)
//! owned by each driver station, and robot logs can be consumed by registering a callback with
//! [`DriverStation::set_log_consumer`](struct.DriverStation.html#method.set_log_consumer).

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate smallvec;

mod config;
mod ds;
mod error;
mod ext;
mod proto;
pub(crate) mod util;

pub use self::config::DsConfig;
pub use self::ds::joysticks::{JoystickRegistry, JoystickSlot, MAX_JOYSTICKS};
pub use self::ds::state::{DsMode, Mode};
pub use self::ds::target::TargetSpec;
pub use self::ds::{DriverStation, LinkStats};
pub use self::error::{DsError, DsResult};
pub use self::proto::tcp::inbound::*;
pub use self::proto::udp::inbound::types::Trace;
pub use self::proto::udp::outbound::types::*;

pub type Result<T> = std::result::Result<T, failure::Error>;

//! Wire formats spoken with the roboRIO
//!
//! `udp` holds the control packets sent every tick and the status packets that come back,
//! `tcp` the length prefixed log stream and the tags sent over it.

pub mod tcp;
pub mod udp;

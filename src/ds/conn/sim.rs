use std::io;
use std::net::UdpSocket;
use std::time::{Duration, Instant};

use crate::ds::state::DsMode;
use crate::ds::target::SIMULATOR_ADDRESS;

/// A simulator stops being considered alive after this long without a ping
const SIM_TIMEOUT: Duration = Duration::from_millis(250);

/// Watches the local port robot simulators ping while they run
pub struct SimProbe {
    socket: UdpSocket,
    last_seen: Option<Instant>,
    mode: DsMode,
}

impl SimProbe {
    pub fn bind(port: u16) -> io::Result<SimProbe> {
        let socket = UdpSocket::bind((SIMULATOR_ADDRESS, port))?;
        socket.set_nonblocking(true)?;
        Ok(SimProbe {
            socket,
            last_seen: None,
            mode: DsMode::Normal,
        })
    }

    /// Drains pending pings, returning the new mode if it changed
    pub fn poll(&mut self) -> Option<DsMode> {
        let mut buf = [0u8; 64];
        loop {
            match self.socket.recv(&mut buf) {
                Ok(_) => self.last_seen = Some(Instant::now()),
                // WouldBlock once drained, anything else is retried next poll
                Err(_) => break,
            }
        }

        let mode = match self.last_seen {
            Some(seen) if seen.elapsed() < SIM_TIMEOUT => DsMode::Simulation,
            _ => DsMode::Normal,
        };
        if mode == self.mode {
            None
        } else {
            self.mode = mode;
            Some(mode)
        }
    }
}

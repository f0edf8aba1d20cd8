use std::io;
use std::net::UdpSocket;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use crossbeam_channel::Receiver;
use tokio_util::codec::Decoder;
use tracing::{debug, info, warn};

use super::backoff::ExponentialBackoff;
use super::{stopped, wait};
use crate::config::DsConfig;
use crate::ds::state::{DsState, LinkCounters};
use crate::proto::udp::inbound::UdpResponsePacket;
use crate::proto::udp::outbound::types::tags::{DateTime, Timezone, UdpTag};
use crate::proto::udp::DsUdpCodec;

fn bind(port: u16, timeout: Duration) -> io::Result<UdpSocket> {
    let socket = UdpSocket::bind(("0.0.0.0", port))?;
    socket.set_read_timeout(Some(timeout))?;
    Ok(socket)
}

/// Applies status packets from the roboRIO to the shared state
struct StatusReceiver {
    state: Arc<DsState>,
    config: DsConfig,
    epoch: u64,
    last_packet: Option<Instant>,
    buf: BytesMut,
}

impl StatusReceiver {
    fn new(state: Arc<DsState>, config: DsConfig) -> StatusReceiver {
        let (_, epoch) = state.target();
        StatusReceiver {
            state,
            config,
            epoch,
            last_packet: None,
            buf: BytesMut::with_capacity(1500),
        }
    }

    /// Telemetry from a previous target is dropped as soon as the target changes
    fn check_epoch(&mut self) {
        let (_, epoch) = self.state.target();
        if epoch != self.epoch {
            debug!("Target changed, dropping telemetry");
            self.epoch = epoch;
            self.last_packet = None;
            self.state.recv().reset();
        }
    }

    fn check_timeout(&mut self) {
        if let Some(at) = self.last_packet {
            if at.elapsed() >= self.config.link_timeout {
                info!("RIO disconnected");
                self.last_packet = None;
                self.state.recv().reset();
            }
        }
    }

    fn handle(&mut self, datagram: &[u8]) {
        self.buf.clear();
        self.buf.extend_from_slice(datagram);

        match DsUdpCodec.decode(&mut self.buf) {
            Ok(Some(packet)) => self.apply(packet),
            Ok(None) => {}
            Err(e) => {
                LinkCounters::bump(&self.state.counters().decode_errors);
                debug!("Dropping status packet: {}", e);
            }
        }
    }

    fn apply(&mut self, packet: UdpResponsePacket) {
        LinkCounters::bump(&self.state.counters().status_received);

        {
            let mut send = self.state.send();
            // The RIO keeps asking until the tags arrive, only keep one set queued
            let queued = send
                .pending_udp()
                .iter()
                .any(|tag| matches!(tag, UdpTag::DateTime(_)));
            if packet.need_date && !queued {
                send.queue_udp(UdpTag::DateTime(DateTime::now()));
                send.queue_udp(UdpTag::Timezone(Timezone::new(&self.config.timezone)));
            }

            if packet.status.emergency_stopped() && !send.estopped() {
                warn!("roboRIO reported an emergency stop");
                send.estop();
            }
        }

        let mut recv = self.state.recv();
        if !recv.connected() {
            info!("RIO connected");
        }
        recv.set_trace(packet.trace);
        recv.set_battery_voltage(packet.battery);
        recv.set_connected(true);
        self.last_packet = Some(Instant::now());
    }
}

/// Receives status packets until `shutdown` disconnects
pub(crate) fn status_thread(state: Arc<DsState>, config: DsConfig, shutdown: Receiver<()>) {
    let mut backoff = ExponentialBackoff::new(config.max_backoff);
    let socket = loop {
        match bind(config.status_port, config.read_timeout) {
            Ok(socket) => break socket,
            Err(e) => {
                if backoff.failed() {
                    warn!("Couldn't bind status port {}: {}", config.status_port, e);
                }
                while !backoff.ready() {
                    if wait(&shutdown, config.read_timeout) {
                        info!("Status thread stopped");
                        return;
                    }
                }
            }
        }
    };

    let mut rx = StatusReceiver::new(state, config);
    let mut datagram = [0u8; 1500];

    while !stopped(&shutdown) {
        rx.check_epoch();

        match socket.recv(&mut datagram) {
            Ok(n) => rx.handle(&datagram[..n]),
            Err(ref e)
                if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut => {}
            Err(e) => debug!("Status socket error: {}", e),
        }

        rx.check_timeout();
    }

    info!("Status thread stopped");
}

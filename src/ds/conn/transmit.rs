use std::io;
use std::net::UdpSocket;
use std::sync::Arc;

use bytes::BytesMut;
use crossbeam_channel::{select, tick, Receiver};
use tokio_util::codec::Encoder;
use tracing::{debug, error, info, warn};

use super::backoff::ExponentialBackoff;
use super::sim::SimProbe;
use crate::config::DsConfig;
use crate::ds::state::{DsState, LinkCounters};
use crate::ds::target::TargetSpec;
use crate::proto::udp::DsUdpCodec;

/// Where the transmit loop is in its lifecycle
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LinkState {
    Idle,
    Connecting,
    Streaming,
    Reconnecting,
    Stopped,
}

/// The socket control packets go out on, and the target epoch it was opened for
struct Link {
    socket: UdpSocket,
    epoch: u64,
}

fn open(target: &TargetSpec, port: u16) -> io::Result<UdpSocket> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect((target.host().as_str(), port))?;
    Ok(socket)
}

struct Transmitter {
    state: Arc<DsState>,
    config: DsConfig,
    link_state: LinkState,
    link: Option<Link>,
    backoff: ExponentialBackoff,
    probe: Option<SimProbe>,
    joysticks_poisoned: bool,
    send_failing: bool,
    buf: BytesMut,
}

impl Transmitter {
    fn new(state: Arc<DsState>, config: DsConfig) -> Transmitter {
        let probe = config.sim_port.and_then(|port| match SimProbe::bind(port) {
            Ok(probe) => Some(probe),
            Err(e) => {
                warn!("Simulator detection disabled, couldn't bind port {}: {}", port, e);
                None
            }
        });

        Transmitter {
            backoff: ExponentialBackoff::new(config.max_backoff),
            state,
            config,
            link_state: LinkState::Idle,
            link: None,
            probe,
            joysticks_poisoned: false,
            send_failing: false,
            buf: BytesMut::with_capacity(128),
        }
    }

    fn transition(&mut self, next: LinkState) {
        if self.link_state != next {
            debug!("Transmit link {:?} -> {:?}", self.link_state, next);
            self.link_state = next;
        }
    }

    /// Opens a socket for the current target if the one we have is stale
    ///
    /// The old socket is dropped before the new one is opened. Sends happen on this thread only, so
    /// none can be in flight while that happens. Failed opens are retried once the backoff allows.
    fn ensure_link(&mut self) -> bool {
        let (target, epoch) = self.state.target();
        if self.link.as_ref().map(|link| link.epoch) == Some(epoch) {
            return true;
        }

        if self.link.take().is_some() || self.link_state == LinkState::Reconnecting {
            self.transition(LinkState::Reconnecting);
        } else {
            self.transition(LinkState::Connecting);
        }
        if !self.backoff.ready() {
            return false;
        }

        match open(&target, self.config.control_port) {
            Ok(socket) => {
                info!("Sending control packets to {}", target);
                self.link = Some(Link { socket, epoch });
                self.backoff.reset();
                self.transition(LinkState::Streaming);
                true
            }
            Err(e) => {
                if self.backoff.failed() {
                    warn!("Couldn't open control socket for {}: {}", target, e);
                } else {
                    debug!("Couldn't open control socket for {}: {}", target, e);
                }
                self.transition(LinkState::Reconnecting);
                false
            }
        }
    }

    fn poll_simulator(&mut self) {
        if let Some(mode) = self.probe.as_mut().and_then(SimProbe::poll) {
            info!("Driver station mode is now {:?}", mode);
            self.state.send().set_ds_mode(mode);
        }
    }

    fn tick(&mut self) {
        self.poll_simulator();

        if !self.ensure_link() {
            return;
        }
        let link = match self.link {
            Some(ref link) => link,
            None => return,
        };

        let joysticks = match self.state.joysticks().snapshot() {
            Ok(snapshot) => {
                self.joysticks_poisoned = false;
                Some(snapshot)
            }
            Err(e) => {
                if !self.joysticks_poisoned {
                    error!("Sending without joysticks: {}", e);
                    self.joysticks_poisoned = true;
                }
                None
            }
        };

        let packet = {
            let mut send = self.state.send();
            // The target moved since the link was checked, reconnect first
            if send.target_epoch() != link.epoch {
                return;
            }
            let packet = send.control(joysticks.as_deref());
            send.increment_seqnum();
            packet
        };

        self.buf.clear();
        if let Err(e) = DsUdpCodec.encode(packet, &mut self.buf) {
            error!("Failed to encode control packet: {}", e);
            return;
        }

        let counters = self.state.counters();
        match link.socket.send(&self.buf) {
            Ok(_) => {
                LinkCounters::bump(&counters.packets_sent);
                if self.send_failing {
                    info!("Control packets are going out again");
                    self.send_failing = false;
                }
            }
            Err(e) => {
                // The next tick sends a fresh packet regardless
                LinkCounters::bump(&counters.send_errors);
                if self.send_failing {
                    debug!("Failed to send control packet: {}", e);
                } else {
                    warn!("Failed to send control packet: {}", e);
                    self.send_failing = true;
                }
            }
        }
    }
}

/// Sends a control packet to the current target every tick until `shutdown` disconnects
pub(crate) fn transmit_thread(state: Arc<DsState>, config: DsConfig, shutdown: Receiver<()>) {
    let ticker = tick(config.tick);
    let mut tx = Transmitter::new(state, config);

    loop {
        select! {
            recv(shutdown) -> _ => break,
            recv(ticker) -> _ => tx.tick(),
        }
    }

    tx.link = None;
    tx.transition(LinkState::Stopped);
    info!("Transmit thread stopped");
}

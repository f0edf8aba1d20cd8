use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use tracing::warn;

use crate::ds::joysticks::JoystickRegistry;
use crate::ds::state::recv::{LogSink, RecvState, TcpState};
use crate::ds::state::send::SendState;
use crate::proto::tcp::inbound::TcpPacket;
use crate::ds::target::TargetSpec;
use crate::proto::udp::outbound::types::{Alliance, Control};

pub(crate) mod recv;
pub(crate) mod send;

/// State shared between a `DriverStation` and its connection threads
pub struct DsState {
    send_state: Mutex<SendState>,
    recv_state: Mutex<RecvState>,
    tcp_state: Mutex<TcpState>,
    log_sink: Mutex<LogSink>,
    joysticks: JoystickRegistry,
    counters: LinkCounters,
}

/// Locks a state mutex, carrying on with the inner value if a previous holder panicked
///
/// Every field behind these locks is replaced by a single assignment, so a panic can't leave a
/// half written value. The joystick registry reports poisoning instead.
fn lock<'a, T>(mutex: &'a Mutex<T>, name: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!("{} state lock was poisoned, recovering", name);
        poisoned.into_inner()
    })
}

impl DsState {
    pub fn new(alliance: Alliance, team_number: u32, static_ip: Option<String>) -> DsState {
        DsState {
            send_state: Mutex::new(SendState::new(alliance, team_number, static_ip)),
            recv_state: Mutex::new(RecvState::new()),
            tcp_state: Mutex::new(TcpState::new()),
            log_sink: Mutex::new(LogSink::new()),
            joysticks: JoystickRegistry::new(),
            counters: LinkCounters::default(),
        }
    }

    pub fn send(&self) -> MutexGuard<SendState> {
        lock(&self.send_state, "send")
    }

    pub fn recv(&self) -> MutexGuard<RecvState> {
        lock(&self.recv_state, "recv")
    }

    pub fn tcp(&self) -> MutexGuard<TcpState> {
        lock(&self.tcp_state, "tcp")
    }

    pub fn log_sink(&self) -> MutexGuard<LogSink> {
        lock(&self.log_sink, "log sink")
    }

    /// Hands a log frame to the consumer with the sink unlocked, so the consumer may call back
    /// into the driver station, including to replace itself.
    pub fn consume_log(&self, packet: &TcpPacket) {
        let consumer = match self.log_sink().consumer() {
            Some(consumer) => consumer,
            None => return,
        };
        let mut call = lock(&*consumer, "log consumer");
        (&mut **call)(packet);
    }

    pub fn joysticks(&self) -> &JoystickRegistry {
        &self.joysticks
    }

    pub fn counters(&self) -> &LinkCounters {
        &self.counters
    }

    /// The current target and its epoch, which changes every time the target does
    pub fn target(&self) -> (TargetSpec, u64) {
        let send = self.send();
        (send.target().clone(), send.target_epoch())
    }
}

/// Counters updated by the connection threads
#[derive(Debug, Default)]
pub struct LinkCounters {
    pub packets_sent: AtomicU64,
    pub send_errors: AtomicU64,
    pub status_received: AtomicU64,
    pub decode_errors: AtomicU64,
}

impl LinkCounters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> LinkStats {
        LinkStats {
            packets_sent: self.packets_sent.load(Ordering::Relaxed),
            send_errors: self.send_errors.load(Ordering::Relaxed),
            status_received: self.status_received.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
        }
    }
}

/// Traffic statistics for a driver station's connection to the roboRIO
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Control packets handed to the socket
    pub packets_sent: u64,
    /// Control packets the socket refused
    pub send_errors: u64,
    /// Status packets decoded from the roboRIO
    pub status_received: u64,
    /// Status packets or log frames that failed to decode
    pub decode_errors: u64,
}

/// Represents the current Mode that the robot is in. the `Mode` of the robot is considered separately from whether it is enabled or not
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Autonomous,
    Teleoperated,
    Test,
}

impl Mode {
    pub(crate) fn to_control(self) -> Control {
        match self {
            Mode::Teleoperated => Control::TELEOP,
            Mode::Autonomous => Control::AUTO,
            Mode::Test => Control::TEST,
        }
    }
}

/// Whether the driver station is talking to a real robot or a simulator on this machine
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DsMode {
    Normal,
    Simulation,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};

    #[test]
    fn mode_control_bits() {
        assert_eq!(Mode::Teleoperated.to_control().bits(), 0b00);
        assert_eq!(Mode::Test.to_control().bits(), 0b01);
        assert_eq!(Mode::Autonomous.to_control().bits(), 0b10);
    }

    #[test]
    fn poisoned_state_lock_recovers() {
        let state = DsState::new(Alliance::new_red(1), 4069, None);
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _send = state.send_state.lock().unwrap();
            panic!("poisoning the send lock");
        }));
        assert!(result.is_err());

        state.send().set_mode(Mode::Test);
        assert_eq!(state.send().mode(), Mode::Test);
    }

    #[test]
    fn consumer_can_replace_itself() {
        use crate::proto::tcp::inbound::Stdout;
        use std::sync::Arc;

        let state = Arc::new(DsState::new(Alliance::new_red(1), 4069, None));
        let seen = Arc::new(Mutex::new(vec![]));

        let (inner, lines) = (state.clone(), seen.clone());
        state.log_sink().set_consumer(move |_| {
            let lines = lines.clone();
            inner.log_sink().set_consumer(move |packet| {
                if let TcpPacket::Stdout(stdout) = packet {
                    lines.lock().unwrap().push(stdout.message.clone());
                }
            });
        });

        let line = |message: &str| {
            TcpPacket::Stdout(Stdout {
                timestamp: 0.0,
                message: message.to_string(),
                seqnum: 0,
            })
        };
        state.consume_log(&line("first"));
        state.consume_log(&line("second"));

        assert_eq!(*seen.lock().unwrap(), vec!["second".to_string()]);
    }

    #[test]
    fn counters_snapshot() {
        let state = DsState::new(Alliance::new_red(1), 4069, None);
        LinkCounters::bump(&state.counters().packets_sent);
        LinkCounters::bump(&state.counters().packets_sent);
        LinkCounters::bump(&state.counters().decode_errors);

        let stats = state.counters().snapshot();
        assert_eq!(stats.packets_sent, 2);
        assert_eq!(stats.decode_errors, 1);
        assert_eq!(stats.send_errors, 0);
    }
}

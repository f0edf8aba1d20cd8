use std::sync::{Arc, Mutex};

use crate::proto::tcp::inbound::TcpPacket;
use crate::proto::tcp::outbound::{GameData, TcpTag};
use crate::proto::udp::inbound::types::*;

pub type LogConsumer = dyn FnMut(&TcpPacket) + Send + 'static;
pub type SharedConsumer = Arc<Mutex<Box<LogConsumer>>>;

/// Telemetry reported by the roboRIO. Only the status thread writes to it.
pub struct RecvState {
    battery_voltage: f32,
    trace: Trace,
    connected: bool,
}

impl RecvState {
    pub fn new() -> RecvState {
        RecvState {
            battery_voltage: 0f32,
            trace: Trace::empty(),
            connected: false,
        }
    }

    pub fn battery_voltage(&self) -> f32 {
        self.battery_voltage
    }

    pub fn set_battery_voltage(&mut self, voltage: f32) {
        self.battery_voltage = voltage;
    }

    pub fn trace(&self) -> Trace {
        self.trace
    }

    pub fn set_trace(&mut self, trace: Trace) {
        self.trace = trace;
    }

    /// Whether status packets are currently arriving
    pub fn connected(&self) -> bool {
        self.connected
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Forgets everything the last roboRIO told us
    pub fn reset(&mut self) {
        *self = RecvState::new();
    }
}

/// Receives the frames read from the log connection
///
/// Kept apart from `TcpState` so a consumer can set game data without deadlocking the log thread.
/// The consumer is called through its own lock, after this one is released, so it may also
/// replace itself.
pub struct LogSink {
    consumer: Option<SharedConsumer>,
}

impl LogSink {
    pub fn new() -> LogSink {
        LogSink { consumer: None }
    }

    pub fn set_consumer(&mut self, consumer: impl FnMut(&TcpPacket) + Send + 'static) {
        let consumer: Box<LogConsumer> = Box::new(consumer);
        self.consumer = Some(Arc::new(Mutex::new(consumer)));
    }

    /// The registered consumer, if any
    pub fn consumer(&self) -> Option<SharedConsumer> {
        self.consumer.clone()
    }
}

/// Game data waiting to go out on the log connection
pub struct TcpState {
    game_data: Option<String>,
    game_data_pending: bool,
}

impl TcpState {
    pub fn new() -> TcpState {
        TcpState {
            game_data: None,
            game_data_pending: false,
        }
    }

    pub fn game_data(&self) -> Option<&str> {
        self.game_data.as_deref()
    }

    pub fn set_game_data(&mut self, gsm: String) {
        self.game_data = Some(gsm);
        self.game_data_pending = true;
    }

    /// Marks the game data as unsent, used when a fresh connection is made
    pub fn resend_game_data(&mut self) {
        self.game_data_pending = self.game_data.is_some();
    }

    /// The game data tag, if it hasn't been sent on the current connection yet
    pub fn take_pending_tag(&mut self) -> Option<TcpTag> {
        if !self.game_data_pending {
            return None;
        }
        self.game_data_pending = false;
        self.game_data
            .clone()
            .map(|gsm| TcpTag::GameData(GameData { gsm }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::tcp::inbound::Stdout;

    #[test]
    fn reset_clears_telemetry() {
        let mut state = RecvState::new();
        state.set_battery_voltage(12.3);
        state.set_trace(Trace::ROBOT_CODE | Trace::IS_ROBORIO);
        state.set_connected(true);

        state.reset();
        assert_eq!(state.battery_voltage(), 0.0);
        assert_eq!(state.trace(), Trace::empty());
        assert!(!state.connected());
    }

    #[test]
    fn game_data_is_sent_once_per_connection() {
        let mut state = TcpState::new();
        assert_eq!(state.take_pending_tag(), None);

        state.set_game_data("LRL".to_string());
        assert_eq!(
            state.take_pending_tag(),
            Some(TcpTag::GameData(GameData {
                gsm: "LRL".to_string()
            }))
        );
        assert_eq!(state.take_pending_tag(), None);

        state.resend_game_data();
        assert!(state.take_pending_tag().is_some());
        assert_eq!(state.game_data(), Some("LRL"));
    }

    #[test]
    fn replacing_the_consumer_keeps_the_old_one_callable() {
        let seen = Arc::new(Mutex::new(vec![]));
        let mut sink = LogSink::new();
        assert!(sink.consumer().is_none());

        let lines = seen.clone();
        sink.set_consumer(move |packet| {
            if let TcpPacket::Stdout(stdout) = packet {
                lines.lock().unwrap().push(stdout.message.clone());
            }
        });
        let first = sink.consumer().unwrap();
        sink.set_consumer(|_| {});

        let mut call = first.lock().unwrap();
        (&mut **call)(&TcpPacket::Stdout(Stdout {
            timestamp: 0.0,
            message: "hi".to_string(),
            seqnum: 0,
        }));

        assert_eq!(*seen.lock().unwrap(), vec!["hi".to_string()]);
        assert!(!Arc::ptr_eq(&first, &sink.consumer().unwrap()));
    }
}

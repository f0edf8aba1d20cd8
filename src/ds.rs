use std::sync::Arc;

use tracing::{error, info};

mod conn;
pub(crate) mod joysticks;
pub(crate) mod state;
pub(crate) mod target;

pub use self::state::LinkStats;

use self::conn::Workers;
use self::joysticks::JoystickRegistry;
use self::state::*;
use self::target::TargetSpec;

use crate::config::DsConfig;
use crate::error::{DsError, DsResult};
use crate::proto::tcp::inbound::TcpPacket;
use crate::proto::udp::inbound::types::Trace;
use crate::proto::udp::outbound::types::tags::UdpTag;
use crate::proto::udp::outbound::types::*;

/// Represents a connection to the roboRIO acting as a driver station
///
/// This struct contains the functions to update the state of the robot, and owns the threads that
/// manage the network connections. Every method takes `&self`, the state is shared with those
/// threads behind locks, so a `DriverStation` can be wrapped in an `Arc` and driven from several
/// threads at once.
pub struct DriverStation {
    state: Arc<DsState>,
    config: DsConfig,
    workers: Option<Workers>,
}

impl DriverStation {
    /// Creates a new driver station with the given team number and alliance
    ///
    /// This driver station will attempt to connect to a roboRIO at 10.TE.AM.2,
    /// if the roboRIO is at a different ip, use [new] and specify the ip directly.
    pub fn new_team(team_number: u32, alliance: Alliance) -> DriverStation {
        Self::with_config(None, alliance, team_number, DsConfig::default())
    }

    /// Creates a new driver station for the given alliance station and team number
    /// Connects to the roborio at `ip`. To infer the ip from team_number, use `new_team` instead.
    pub fn new(ip: &str, alliance: Alliance, team_number: u32) -> DriverStation {
        Self::with_config(Some(ip), alliance, team_number, DsConfig::default())
    }

    /// Creates a new driver station with custom ports and timings
    ///
    /// `ip` takes precedence over the team number when picking the roboRIO to connect to, see
    /// [`TargetSpec`](enum.TargetSpec.html). If the network threads can't be started the error is
    /// logged and the driver station stays idle, as though it had been shut down.
    pub fn with_config(
        ip: Option<&str>,
        alliance: Alliance,
        team_number: u32,
        config: DsConfig,
    ) -> DriverStation {
        let state = Arc::new(DsState::new(
            alliance,
            team_number,
            ip.map(str::to_string),
        ));

        let workers = match Workers::spawn(&state, &config) {
            Ok(workers) => {
                info!("Driver station started, targeting {}", state.send().target());
                Some(workers)
            }
            Err(e) => {
                error!("Failed to start the driver station threads: {}", e);
                None
            }
        };

        DriverStation {
            state,
            config,
            workers,
        }
    }

    /// The joysticks whose values are sent to the robot with every control packet
    pub fn joysticks(&self) -> &JoystickRegistry {
        self.state.joysticks()
    }

    /// Provides a closure that will be called when TCP packets are received from the roboRIO
    ///
    /// The closure runs on the log thread and only borrows the packet for the duration of the call.
    /// It may call back into this `DriverStation`; a consumer set from inside it takes over from
    /// the next packet.
    ///
    /// Example usage: Logging all stdout messages from robot code.
    pub fn set_log_consumer(&self, consumer: impl FnMut(&TcpPacket) + Send + 'static) {
        self.state.log_sink().set_consumer(consumer);
    }

    /// Changes the alliance for the given `DriverStation`
    pub fn set_alliance(&self, alliance: Alliance) {
        self.state.send().set_alliance(alliance);
    }

    pub fn alliance(&self) -> Alliance {
        self.state.send().alliance()
    }

    /// Changes the given `mode` the robot will be in
    pub fn set_mode(&self, mode: Mode) {
        self.state.send().set_mode(mode);
    }

    /// Returns the current mode of the robot
    pub fn mode(&self) -> Mode {
        self.state.send().mode()
    }

    /// Whether a robot simulator was detected on this machine
    pub fn ds_mode(&self) -> DsMode {
        self.state.send().ds_mode()
    }

    /// Changes the team number of this driver station
    ///
    /// When the roboRIO is targeted by team number its ip becomes 10.TE.AM.2. Changing the target
    /// disables the robot.
    pub fn set_team_number(&self, team_number: u32) {
        self.state.send().set_team_number(team_number);
    }

    pub fn team_number(&self) -> u32 {
        self.state.send().team_number()
    }

    /// Targets the roboRIO over USB at 172.22.11.2, overriding the team number and any static ip
    pub fn set_use_usb(&self, use_usb: bool) {
        self.state.send().set_use_usb(use_usb);
    }

    pub fn use_usb(&self) -> bool {
        self.state.send().use_usb()
    }

    /// Targets the roboRIO at `ip`, or by team number again when `None`
    pub fn set_ip(&self, ip: Option<&str>) {
        self.state.send().set_static_ip(ip.map(str::to_string));
    }

    /// The roboRIO this driver station currently sends to
    pub fn target(&self) -> TargetSpec {
        self.state.send().target().clone()
    }

    /// Sets the game specific message sent to the robot, and used during the autonomous period
    ///
    /// The message replaces any previous one and is sent as soon as the log connection is up.
    pub fn set_game_specific_message(&self, message: &str) -> DsResult<()> {
        if message.len() > self.config.gsm_max_len {
            return Err(DsError::InvalidMessage(format!(
                "message is longer than {} characters",
                self.config.gsm_max_len
            )));
        }
        if let Some(c) = message.chars().find(|c| !(c.is_ascii_graphic() || *c == ' ')) {
            return Err(DsError::InvalidMessage(format!(
                "{:?} is not a printable ASCII character",
                c
            )));
        }

        self.state.tcp().set_game_data(message.to_string());
        Ok(())
    }

    pub fn game_specific_message(&self) -> Option<String> {
        self.state.tcp().game_data().map(str::to_string)
    }

    /// Enables outputs on the robot
    ///
    /// Ignored once the robot has been estopped.
    pub fn enable(&self) {
        self.state.send().enable();
    }

    /// Disables outputs on the robot
    pub fn disable(&self) {
        self.state.send().disable();
    }

    /// Returns whether the robot is currently enabled
    pub fn enabled(&self) -> bool {
        self.state.send().enabled()
    }

    /// Disables outputs on the robot and disallows enabling it for the rest of this session
    pub fn estop(&self) {
        self.state.send().estop();
    }

    /// Returns whether the robot is currently E-stopped
    pub fn estopped(&self) -> bool {
        self.state.send().estopped()
    }

    /// Instructs the roboRIO to restart robot code
    pub fn restart_code(&self) {
        self.state.send().request(Request::RESTART_CODE);
    }

    /// Instructs the roboRIO to reboot
    pub fn restart_roborio(&self) {
        self.state.send().request(Request::REBOOT_ROBORIO);
    }

    /// Queues a UDP tag to be transmitted with the next outbound packet to the roboRIO
    pub fn queue_udp(&self, udp_tag: UdpTag) {
        self.state.send().queue_udp(udp_tag);
    }

    /// Returns a Vec of the current contents of the UDP queue
    pub fn udp_queue(&self) -> Vec<UdpTag> {
        self.state.send().pending_udp().to_vec()
    }

    /// Returns the last received Trace from the robot
    pub fn trace(&self) -> Trace {
        self.state.recv().trace()
    }

    /// Returns the last received battery voltage from the robot
    pub fn battery_voltage(&self) -> f32 {
        self.state.recv().battery_voltage()
    }

    /// Whether status packets are arriving from the roboRIO
    pub fn connected(&self) -> bool {
        self.state.recv().connected()
    }

    pub fn link_stats(&self) -> LinkStats {
        self.state.counters().snapshot()
    }

    /// Whether the network threads are running
    pub fn is_running(&self) -> bool {
        self.workers.is_some()
    }

    /// Stops the network threads and waits for them to exit
    ///
    /// Telemetry reads as disconnected afterwards and the robot is left disabled. Calling this again
    /// does nothing.
    pub fn shutdown(&mut self) {
        let mut workers = match self.workers.take() {
            Some(workers) => workers,
            None => return,
        };
        workers.stop();

        self.state.recv().reset();
        self.state.send().disable();
        info!("Driver station shut down");
    }
}

impl Drop for DriverStation {
    fn drop(&mut self) {
        // When this struct is dropped the threads that we spawned should be stopped otherwise we're leaking
        self.shutdown();
    }
}

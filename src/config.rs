use std::time::Duration;

/// Port on the roboRIO that receives control packets
pub const ROBORIO_CONTROL_PORT: u16 = 1110;
/// Local port the roboRIO sends status packets to
pub const DS_STATUS_PORT: u16 = 1150;
/// Port on the roboRIO serving the log stream
pub const ROBORIO_LOG_PORT: u16 = 1740;
/// Local port a robot simulator pings while it is running
pub const SIMULATOR_PORT: u16 = 1135;
/// Game data is 3 characters on the wire
pub const DEFAULT_GSM_MAX_LEN: usize = 3;

/// Tunables for the network threads of a [`DriverStation`](struct.DriverStation.html).
///
/// The defaults match what a roboRIO expects, changing ports is mostly useful when talking to a
/// simulator or a test harness on localhost.
#[derive(Clone, Debug)]
pub struct DsConfig {
    pub control_port: u16,
    pub status_port: u16,
    pub log_port: u16,
    /// `None` disables simulator detection
    pub sim_port: Option<u16>,
    /// Interval between control packets
    pub tick: Duration,
    /// The robot is considered gone when no status packet arrives for this long
    pub link_timeout: Duration,
    /// Upper bound on any blocking socket read, also bounds how long shutdown can take
    pub read_timeout: Duration,
    pub connect_timeout: Duration,
    pub max_backoff: Duration,
    pub gsm_max_len: usize,
    /// Sent to the roboRIO alongside the date when it asks for it
    pub timezone: String,
}

impl Default for DsConfig {
    fn default() -> DsConfig {
        DsConfig {
            control_port: ROBORIO_CONTROL_PORT,
            status_port: DS_STATUS_PORT,
            log_port: ROBORIO_LOG_PORT,
            sim_port: Some(SIMULATOR_PORT),
            tick: Duration::from_millis(20),
            link_timeout: Duration::from_secs(2),
            read_timeout: Duration::from_millis(100),
            connect_timeout: Duration::from_secs(1),
            max_backoff: Duration::from_secs(5),
            gsm_max_len: DEFAULT_GSM_MAX_LEN,
            timezone: "UTC".to_string(),
        }
    }
}

impl DsConfig {
    pub fn with_ports(mut self, control: u16, status: u16, log: u16) -> DsConfig {
        self.control_port = control;
        self.status_port = status;
        self.log_port = log;
        self
    }

    pub fn with_sim_port(mut self, port: Option<u16>) -> DsConfig {
        self.sim_port = port;
        self
    }

    pub fn with_tick(mut self, tick: Duration) -> DsConfig {
        self.tick = tick;
        self
    }

    pub fn with_link_timeout(mut self, timeout: Duration) -> DsConfig {
        self.link_timeout = timeout;
        self
    }

    pub fn with_gsm_max_len(mut self, len: usize) -> DsConfig {
        self.gsm_max_len = len;
        self
    }

    pub fn with_timezone(mut self, tz: &str) -> DsConfig {
        self.timezone = tz.to_string();
        self
    }
}

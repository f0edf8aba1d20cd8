use std::fmt;

use crate::ds::state::DsMode;
use crate::util::ip_from_team_number;

/// Address of the roboRIO when connected over USB
pub const USB_ADDRESS: &str = "172.22.11.2";
/// Simulators run on the same machine as the driver station
pub const SIMULATOR_ADDRESS: &str = "127.0.0.1";

/// Where the driver station sends control packets
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetSpec {
    /// An explicitly configured IP or hostname
    StaticIp(String),
    /// 10.TE.AM.2, derived from the team number
    TeamDerived(u32),
    /// The roboRIO's fixed address over USB
    Usb,
    /// A robot simulator running locally
    Simulator,
}

impl TargetSpec {
    /// Picks the target for the given inputs
    ///
    /// A running simulator wins over everything, then a USB connection, then an explicit IP.
    /// The team number is the fallback.
    pub fn resolve(
        ds_mode: DsMode,
        use_usb: bool,
        static_ip: Option<&str>,
        team_number: u32,
    ) -> TargetSpec {
        match (ds_mode, use_usb, static_ip) {
            (DsMode::Simulation, _, _) => TargetSpec::Simulator,
            (_, true, _) => TargetSpec::Usb,
            (_, false, Some(ip)) => TargetSpec::StaticIp(ip.to_string()),
            (_, false, None) => TargetSpec::TeamDerived(team_number),
        }
    }

    /// The host part of the address to connect to
    pub fn host(&self) -> String {
        match self {
            TargetSpec::StaticIp(ip) => ip.clone(),
            TargetSpec::TeamDerived(team) => ip_from_team_number(*team),
            TargetSpec::Usb => USB_ADDRESS.to_string(),
            TargetSpec::Simulator => SIMULATOR_ADDRESS.to_string(),
        }
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TargetSpec::StaticIp(ip) => write!(f, "{}", ip),
            TargetSpec::TeamDerived(team) => write!(f, "team {} ({})", team, self.host()),
            TargetSpec::Usb => write!(f, "USB ({})", USB_ADDRESS),
            TargetSpec::Simulator => write!(f, "simulator ({})", SIMULATOR_ADDRESS),
        }
    }
}

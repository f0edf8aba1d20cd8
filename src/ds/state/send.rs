use tracing::{info, warn};

use crate::ds::joysticks::{joystick_tags, JoystickSlot};
use crate::ds::state::{DsMode, Mode};
use crate::ds::target::TargetSpec;
use crate::proto::udp::outbound::types::tags::UdpTag;
use crate::proto::udp::outbound::types::{Alliance, Control, Request};
use crate::proto::udp::outbound::UdpControlPacket;

/// Everything that goes into the next control packet
pub struct SendState {
    mode: Mode,
    ds_mode: DsMode,
    udp_seqnum: u16,
    enabled: bool,
    estopped: bool,
    alliance: Alliance,
    pending_udp: Vec<UdpTag>,
    pending_request: Option<Request>,
    team_number: u32,
    static_ip: Option<String>,
    use_usb: bool,
    target: TargetSpec,
    target_epoch: u64,
}

impl SendState {
    pub fn new(alliance: Alliance, team_number: u32, static_ip: Option<String>) -> SendState {
        let target = TargetSpec::resolve(DsMode::Normal, false, static_ip.as_deref(), team_number);
        SendState {
            mode: Mode::Autonomous,
            ds_mode: DsMode::Normal,
            udp_seqnum: 0,
            enabled: false,
            estopped: false,
            alliance,
            pending_udp: Vec::new(),
            pending_request: None,
            team_number,
            static_ip,
            use_usb: false,
            target,
            target_epoch: 0,
        }
    }

    pub fn request(&mut self, request: Request) {
        self.pending_request = Some(request);
    }

    pub fn queue_udp(&mut self, tag: UdpTag) {
        self.pending_udp.push(tag);
    }

    pub fn pending_udp(&self) -> &[UdpTag] {
        &self.pending_udp
    }

    pub fn set_alliance(&mut self, alliance: Alliance) {
        self.alliance = alliance;
    }

    pub fn alliance(&self) -> Alliance {
        self.alliance
    }

    /// Builds the next control packet, draining any queued tags and the pending request
    ///
    /// `joysticks` is `None` when the joystick values couldn't be read, the packet then goes out
    /// without joystick tags.
    pub fn control(&mut self, joysticks: Option<&[Option<JoystickSlot>]>) -> UdpControlPacket {
        let mut control = self.mode.to_control();

        // Control bits not related to the mode
        if self.enabled {
            control |= Control::ENABLED;
        }

        if self.estopped {
            control |= Control::ESTOP
        }

        let mut tags: Vec<UdpTag> = self.pending_udp.drain(..).collect();
        if let Some(joysticks) = joysticks {
            tags.extend(joystick_tags(joysticks).into_iter().map(UdpTag::Joysticks));
        }

        UdpControlPacket {
            seqnum: self.udp_seqnum,
            control,
            request: self.pending_request.take(),
            alliance: self.alliance,
            tags,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn ds_mode(&self) -> DsMode {
        self.ds_mode
    }

    pub fn set_ds_mode(&mut self, ds_mode: DsMode) -> bool {
        self.ds_mode = ds_mode;
        self.retarget()
    }

    pub fn increment_seqnum(&mut self) {
        self.udp_seqnum = self.udp_seqnum.wrapping_add(1);
    }

    pub fn seqnum(&self) -> u16 {
        self.udp_seqnum
    }

    /// Enables the robot. Returns false, leaving the robot disabled, if it has been estopped.
    pub fn enable(&mut self) -> bool {
        if self.estopped {
            warn!("Ignoring enable, the robot is estopped");
            return false;
        }
        self.enabled = true;
        true
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Disables the robot and latches estop for the rest of the session
    pub fn estop(&mut self) {
        self.disable();
        self.estopped = true;
    }

    pub fn estopped(&self) -> bool {
        self.estopped
    }

    pub fn team_number(&self) -> u32 {
        self.team_number
    }

    pub fn set_team_number(&mut self, team_number: u32) -> bool {
        self.team_number = team_number;
        self.retarget()
    }

    pub fn set_static_ip(&mut self, ip: Option<String>) -> bool {
        self.static_ip = ip;
        self.retarget()
    }

    pub fn use_usb(&self) -> bool {
        self.use_usb
    }

    pub fn set_use_usb(&mut self, use_usb: bool) -> bool {
        self.use_usb = use_usb;
        self.retarget()
    }

    pub fn target(&self) -> &TargetSpec {
        &self.target
    }

    pub fn target_epoch(&self) -> u64 {
        self.target_epoch
    }

    /// Recomputes the target from the current inputs, returning whether it changed
    ///
    /// A new target disables the robot and restarts the sequence numbers, whatever is on the
    /// other end hasn't seen this driver station before.
    fn retarget(&mut self) -> bool {
        let target = TargetSpec::resolve(
            self.ds_mode,
            self.use_usb,
            self.static_ip.as_deref(),
            self.team_number,
        );
        if target == self.target {
            return false;
        }

        info!("Retargeting from {} to {}", self.target, target);
        self.target = target;
        self.target_epoch += 1;
        self.udp_seqnum = 0;
        self.disable();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::udp::outbound::types::tags::Countdown;

    fn state() -> SendState {
        SendState::new(Alliance::new_red(1), 4069, None)
    }

    #[test]
    fn estop_latches() {
        let mut state = state();
        assert!(state.enable());
        state.estop();

        assert!(state.estopped());
        assert!(!state.enabled());
        assert!(!state.enable());
        assert!(!state.enabled());
        assert!(state.estopped());
    }

    #[test]
    fn control_bits_follow_state() {
        let mut state = state();
        state.set_mode(Mode::Test);
        state.enable();
        let packet = state.control(None);
        assert_eq!(packet.control, Control::TEST | Control::ENABLED);

        state.estop();
        let packet = state.control(None);
        assert_eq!(packet.control, Control::TEST | Control::ESTOP);
    }

    #[test]
    fn request_and_tags_are_sent_once() {
        let mut state = state();
        state.request(Request::RESTART_CODE);
        state.queue_udp(UdpTag::Countdown(Countdown::new(15.0)));

        let first = state.control(None);
        assert_eq!(first.request, Some(Request::RESTART_CODE));
        assert_eq!(first.tags.len(), 1);

        let second = state.control(None);
        assert_eq!(second.request, None);
        assert!(second.tags.is_empty());
        assert!(state.pending_udp().is_empty());
    }

    #[test]
    fn joysticks_follow_queued_tags() {
        let mut state = state();
        state.queue_udp(UdpTag::Countdown(Countdown::new(1.0)));
        let slots = vec![Some(JoystickSlot::default()), None];

        let packet = state.control(Some(&slots));
        assert_eq!(packet.tags.len(), 2);
        assert!(matches!(packet.tags[0], UdpTag::Countdown(_)));
        assert!(matches!(packet.tags[1], UdpTag::Joysticks(_)));
    }

    #[test]
    fn team_change_retargets() {
        let mut state = state();
        state.enable();
        state.increment_seqnum();

        assert!(state.set_team_number(121));
        assert_eq!(state.target(), &TargetSpec::TeamDerived(121));
        assert_eq!(state.target_epoch(), 1);
        assert_eq!(state.seqnum(), 0);
        assert!(!state.enabled());

        // same team, same target
        assert!(!state.set_team_number(121));
        assert_eq!(state.target_epoch(), 1);
    }

    #[test]
    fn usb_holds_until_cleared() {
        let mut state = state();
        assert!(state.set_use_usb(true));
        assert!(!state.set_team_number(9));
        assert!(!state.set_static_ip(Some("10.0.0.5".to_string())));
        assert_eq!(state.target(), &TargetSpec::Usb);

        assert!(state.set_use_usb(false));
        assert_eq!(state.target(), &TargetSpec::StaticIp("10.0.0.5".to_string()));

        assert!(state.set_static_ip(None));
        assert_eq!(state.target(), &TargetSpec::TeamDerived(9));
    }

    #[test]
    fn simulation_overrides_target() {
        let mut state = state();
        assert!(state.set_ds_mode(DsMode::Simulation));
        assert_eq!(state.target(), &TargetSpec::Simulator);
        assert!(state.set_ds_mode(DsMode::Normal));
        assert_eq!(state.target(), &TargetSpec::TeamDerived(4069));
    }
}

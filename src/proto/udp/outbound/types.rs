pub mod tags;

bitflags! {
    /// bitflag struct for the Control value of the packet
    pub struct Control: u8 {
        const ESTOP = 0b1000_0000;
        const FMS_CONNECTED = 0b0000_1000;
        const ENABLED = 0b0000_0100;

        // Mode flags
        const TELEOP = 0b00;
        const TEST = 0b01;
        const AUTO = 0b10;
    }
}

bitflags! {
    /// Requests the driver station can make of the roboRIO
    ///
    /// These are exclusive, only one should be sent with a given packet.
    pub struct Request: u8 {
        const REBOOT_ROBORIO = 0b0000_1000;
        const RESTART_CODE = 0b0000_0100;
    }
}

/// The colour of an alliance
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AllianceColor {
    Red,
    Blue,
}

/// Struct abstracting the byte value for alliance colour and position
///
/// Positions are 1, 2 or 3. Out of range positions are clamped into that range.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Alliance(pub(crate) u8);

impl Alliance {
    pub fn new(color: AllianceColor, position: u8) -> Alliance {
        let offset = position.max(1).min(3) - 1;
        match color {
            AllianceColor::Red => Alliance(offset),
            AllianceColor::Blue => Alliance(offset + 3),
        }
    }

    pub fn new_red(position: u8) -> Alliance {
        Alliance::new(AllianceColor::Red, position)
    }

    pub fn new_blue(position: u8) -> Alliance {
        Alliance::new(AllianceColor::Blue, position)
    }

    pub fn color(self) -> AllianceColor {
        if self.is_red() {
            AllianceColor::Red
        } else {
            AllianceColor::Blue
        }
    }

    pub fn is_red(self) -> bool {
        self.0 < 3
    }

    pub fn is_blue(self) -> bool {
        !self.is_red()
    }

    pub fn position(self) -> u8 {
        (self.0 % 3) + 1
    }

    /// The byte sent on the wire
    pub fn bits(self) -> u8 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alliance_bytes() {
        assert_eq!(Alliance::new_red(1).bits(), 0);
        assert_eq!(Alliance::new_red(3).bits(), 2);
        assert_eq!(Alliance::new_blue(1).bits(), 3);
        assert_eq!(Alliance::new_blue(3).bits(), 5);
    }

    #[test]
    fn alliance_round_trips_color_and_position() {
        for &color in &[AllianceColor::Red, AllianceColor::Blue] {
            for position in 1..=3 {
                let alliance = Alliance::new(color, position);
                assert_eq!(alliance.color(), color);
                assert_eq!(alliance.position(), position);
            }
        }
    }

    #[test]
    fn out_of_range_positions_are_clamped() {
        assert_eq!(Alliance::new_red(0), Alliance::new_red(1));
        assert_eq!(Alliance::new_blue(9), Alliance::new_blue(3));
        assert!(Alliance::new_blue(0).is_blue());
    }
}

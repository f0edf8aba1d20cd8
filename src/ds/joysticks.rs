//! Storage for joystick input sent to the roboRIO
//!
//! Each driver station owns one registry with a slot for each of the six joystick ports the
//! roboRIO supports. Every call takes the lock on its own, so values set in consecutive calls may
//! land in different control packets. At 50 packets a second that is well within what the
//! protocol tolerates.

use std::sync::{Mutex, MutexGuard};

use crate::error::{DsError, DsResult};
use crate::proto::udp::outbound::types::tags::Joysticks;

/// The number of joystick ports supported by the roboRIO
pub const MAX_JOYSTICKS: usize = 6;

/// Axes beyond this index are stored but not transmitted
const MAX_AXES: usize = 12;
const MAX_BUTTONS: usize = 32;
const MAX_POVS: usize = 4;

/// The last known values of a joystick attached to a port
///
/// Axes range over `-1.0..=1.0` (or `0.0..=1.0` for triggers), POVs hold an angle in degrees or
/// -1 when released. Indices are 0 based for all three.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JoystickSlot {
    pub axes: Vec<f32>,
    pub buttons: Vec<bool>,
    pub povs: Vec<i16>,
}

impl JoystickSlot {
    fn clear(&mut self) {
        // Keep the allocations around, ports are often reattached
        self.axes.clear();
        self.buttons.clear();
        self.povs.clear();
    }

    /// Converts the slot into the tag sent in the control packet
    ///
    /// An axis of exactly 1.0 maps to 127, everything else scales by 128 and saturates.
    pub(crate) fn to_tag(&self) -> Joysticks {
        let axes = self
            .axes
            .iter()
            .take(MAX_AXES)
            .map(|value| {
                if (*value - 1.0).abs() < std::f32::EPSILON {
                    127i8
                } else {
                    (value.max(-1.0).min(1.0) * 128f32) as i8
                }
            })
            .collect();
        let buttons = self.buttons.iter().take(MAX_BUTTONS).copied().collect();
        let povs = self.povs.iter().take(MAX_POVS).copied().collect();

        Joysticks::new(axes, buttons, povs)
    }
}

#[derive(Debug, Default)]
struct Port {
    attached: bool,
    slot: JoystickSlot,
}

/// Thread safe, fixed size table of joystick values indexed by port
#[derive(Debug, Default)]
pub struct JoystickRegistry {
    ports: Mutex<[Port; MAX_JOYSTICKS]>,
}

fn set_at<T: Copy>(values: &mut Vec<T>, index: usize, value: T, fill: T) {
    if values.len() <= index {
        values.resize(index + 1, fill);
    }
    values[index] = value;
}

impl JoystickRegistry {
    pub fn new() -> JoystickRegistry {
        JoystickRegistry::default()
    }

    fn lock(&self) -> DsResult<MutexGuard<[Port; MAX_JOYSTICKS]>> {
        self.ports.lock().map_err(|_| DsError::LockPoisoned)
    }

    fn check_port(port: usize) -> DsResult<()> {
        if port >= MAX_JOYSTICKS {
            Err(DsError::OutOfBounds { port })
        } else {
            Ok(())
        }
    }

    /// Runs `f` on the slot at `port`, which must be attached
    fn with_slot(&self, port: usize, f: impl FnOnce(&mut JoystickSlot)) -> DsResult<()> {
        Self::check_port(port)?;
        let mut ports = self.lock()?;
        let entry = &mut ports[port];
        if !entry.attached {
            return Err(DsError::OutOfBounds { port });
        }
        f(&mut entry.slot);
        Ok(())
    }

    /// Attaches a joystick at `port`. Attaching an already attached port leaves its values alone.
    pub fn attach(&self, port: usize) -> DsResult<()> {
        Self::check_port(port)?;
        let mut ports = self.lock()?;
        ports[port].attached = true;
        Ok(())
    }

    /// Detaches the joystick at `port`, resetting its values. Detaching an empty port does nothing.
    pub fn detach(&self, port: usize) -> DsResult<()> {
        Self::check_port(port)?;
        let mut ports = self.lock()?;
        let entry = &mut ports[port];
        entry.attached = false;
        entry.slot.clear();
        Ok(())
    }

    pub fn set_axis(&self, port: usize, axis: u8, value: f32) -> DsResult<()> {
        self.with_slot(port, |slot| set_at(&mut slot.axes, axis as usize, value, 0.0))
    }

    pub fn set_button(&self, port: usize, button: u8, pressed: bool) -> DsResult<()> {
        self.with_slot(port, |slot| {
            set_at(&mut slot.buttons, button as usize, pressed, false)
        })
    }

    pub fn set_pov(&self, port: usize, pov: u8, angle: i16) -> DsResult<()> {
        self.with_slot(port, |slot| set_at(&mut slot.povs, pov as usize, angle, -1))
    }

    /// Returns a copy of the slot at `port`, or `None` if nothing is attached there
    pub fn slot(&self, port: usize) -> DsResult<Option<JoystickSlot>> {
        Self::check_port(port)?;
        let ports = self.lock()?;
        let entry = &ports[port];
        Ok(if entry.attached {
            Some(entry.slot.clone())
        } else {
            None
        })
    }

    /// Copies every port under a single lock, so no slot is observed half written
    pub fn snapshot(&self) -> DsResult<Vec<Option<JoystickSlot>>> {
        let ports = self.lock()?;
        Ok(ports
            .iter()
            .map(|entry| {
                if entry.attached {
                    Some(entry.slot.clone())
                } else {
                    None
                }
            })
            .collect())
    }

    /// Panics while holding the lock, leaving it poisoned
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        use std::panic::{self, AssertUnwindSafe};

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = self.ports.lock().unwrap();
            panic!("poisoning the joystick lock");
        }));
        assert!(result.is_err());
    }
}

/// Builds the joystick tags for a control packet
///
/// The roboRIO assigns ports by tag order, so empty tags pad any gaps below the highest attached port.
pub(crate) fn joystick_tags(snapshot: &[Option<JoystickSlot>]) -> Vec<Joysticks> {
    let used = snapshot
        .iter()
        .rposition(Option::is_some)
        .map_or(0, |last| last + 1);

    snapshot[..used]
        .iter()
        .map(|slot| match slot {
            Some(slot) => slot.to_tag(),
            None => JoystickSlot::default().to_tag(),
        })
        .collect()
}

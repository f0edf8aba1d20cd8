use crate::{DsMode, Mode, StdoutMessage};
use ds::{Alliance, DriverStation, TcpPacket};
use libc::c_char;
use std::ffi::{CStr, CString};
use std::ptr;

/// Reads a C string, or `None` if it is NULL or not valid UTF-8
unsafe fn str_arg<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    CStr::from_ptr(s).to_str().ok()
}

/// Constructs a new Alliance representing a Red alliance robot of the given position
#[no_mangle]
pub extern "C" fn DS_Alliance_new_red(position: u8) -> *mut Alliance {
    let ptr = Box::new(Alliance::new_red(position));

    Box::into_raw(ptr)
}

/// Constructs a new Alliance representing a Blue alliance robot of the given position
#[no_mangle]
pub extern "C" fn DS_Alliance_new_blue(position: u8) -> *mut Alliance {
    let ptr = Box::new(Alliance::new_blue(position));

    Box::into_raw(ptr)
}

/// Constructs a new DriverStation that will connect to 10.TE.AM.2 with the given team, and that will be assigned the given alliance.
///
/// This function will return NULL if alliance is NULL
/// After calling this function, alliance will no longer be a valid pointer. Attempting to use it may result in UB.
/// The pointer returned by this function **must** be freed using DS_DriverStation_destroy(). Using any other means is undefined.
#[no_mangle]
pub unsafe extern "C" fn DS_DriverStation_new_team(
    team_number: u32,
    alliance: *mut Alliance,
) -> *mut DriverStation {
    if alliance.is_null() {
        return ptr::null_mut();
    }

    let alliance = Box::from_raw(alliance);
    let ds = Box::new(DriverStation::new_team(team_number, *alliance));

    Box::into_raw(ds)
}

/// Constructs a new DriverStation that will connect to the specified IP, and that will be assigned the given alliance and team number
///
/// This function will return NULL if alliance or ip is NULL, or if ip isn't valid UTF-8.
/// After calling this function, alliance will no longer be a valid pointer, even if NULL was returned. Attempting to use it may result in UB.
/// The pointer returned by this function **must** be freed using DS_DriverStation_destroy(). Using any other means is undefined.
#[no_mangle]
pub unsafe extern "C" fn DS_DriverStation_new_ip(
    ip: *const c_char,
    alliance: *mut Alliance,
    team_number: u32,
) -> *mut DriverStation {
    if alliance.is_null() {
        return ptr::null_mut();
    }
    let alliance = Box::from_raw(alliance);

    let ip = match str_arg(ip) {
        Some(ip) => ip,
        None => return ptr::null_mut(),
    };
    let ds = Box::new(DriverStation::new(ip, *alliance, team_number));

    Box::into_raw(ds)
}

/// Stops the network threads of the given DriverStation and frees it.
///
/// This function should only be passed pointers that were allocated via DS_DriverStation_new_team or DS_DriverStation_new_ip
/// It does nothing if ds is NULL.
#[no_mangle]
pub unsafe extern "C" fn DS_DriverStation_destroy(ds: *mut DriverStation) {
    if ds.is_null() {
        return;
    }

    drop(Box::from_raw(ds));
}

/// Assigns the given alliance station to the given driver station
///
/// This function does nothing if ds or alliance are NULL
/// After calling this function, the alliance pointer will no longer be valid.
#[no_mangle]
pub unsafe extern "C" fn DS_DriverStation_set_alliance(
    ds: *const DriverStation,
    alliance: *mut Alliance,
) {
    if ds.is_null() || alliance.is_null() {
        return;
    }

    (*ds).set_alliance(*Box::from_raw(alliance));
}

/// Updates the team number of the given driver station. If the roboRIO is targeted by team
/// number, the network threads reconnect to 10.TE.AM.2
///
/// This function does nothing if ds is NULL
#[no_mangle]
pub unsafe extern "C" fn DS_DriverStation_set_team_number(ds: *const DriverStation, team_number: u32) {
    if let Some(ds) = ds.as_ref() {
        ds.set_team_number(team_number);
    }
}

/// Specifies whether the driver station should attempt to connect to 172.22.11.2 over USB rather than any other specified target
///
/// This function does nothing if ds is NULL
#[no_mangle]
pub unsafe extern "C" fn DS_DriverStation_set_use_usb(ds: *const DriverStation, use_usb: bool) {
    if let Some(ds) = ds.as_ref() {
        ds.set_use_usb(use_usb);
    }
}

/// Targets the roboRIO at `ip`. Passing NULL goes back to targeting it by team number.
///
/// Returns -1 if ds is NULL, 1 if ip isn't valid UTF-8 and 0 on a success.
#[no_mangle]
pub unsafe extern "C" fn DS_DriverStation_set_ip(ds: *const DriverStation, ip: *const c_char) -> i8 {
    let ds = match ds.as_ref() {
        Some(ds) => ds,
        None => return -1,
    };
    if ip.is_null() {
        ds.set_ip(None);
        return 0;
    }

    match str_arg(ip) {
        Some(ip) => {
            ds.set_ip(Some(ip));
            0
        }
        None => 1,
    }
}

/// Gets the team number currently assigned to the given DriverStation
///
/// This function will return 0 if the given ds is NULL.
#[no_mangle]
pub unsafe extern "C" fn DS_DriverStation_get_team_number(ds: *const DriverStation) -> u32 {
    ds.as_ref().map_or(0, DriverStation::team_number)
}

/// Updates the Game Specific Message (GSM) associated with the given DriverStation.
///
/// This is additional information that can be provided to robot code by the DS, such as colour information in 2020,
/// or switch/scale assignments in 2018.
///
/// This function will return -1 if either of the given pointers are null
/// It will return 1 if the message isn't valid UTF-8, is too long, or contains non printable characters
/// It will return 0 on a success.
#[no_mangle]
pub unsafe extern "C" fn DS_DriverStation_set_game_specific_message(
    ds: *const DriverStation,
    message: *const c_char,
) -> i8 {
    if ds.is_null() || message.is_null() {
        return -1;
    }

    let msg = match str_arg(message) {
        Some(msg) => msg,
        None => return 1,
    };

    match (*ds).set_game_specific_message(msg) {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

/// Gets the robot mode of the specified ds, updating the value in `mode`
///
/// This function returns 1 if either pointer is NULL, and 0 on a success
/// On a success the value of `mode` will be updated with the current mode of the DS.
#[no_mangle]
pub unsafe extern "C" fn DS_DriverStation_get_mode(ds: *const DriverStation, mode: *mut Mode) -> u8 {
    if ds.is_null() || mode.is_null() {
        return 1;
    }

    *mode = Mode::from_ds((*ds).mode());
    0
}

/// Changes the robot mode of the specified ds
///
/// If ds is NULL, this function does nothing.
#[no_mangle]
pub unsafe extern "C" fn DS_DriverStation_set_mode(ds: *const DriverStation, mode: Mode) {
    if let Some(ds) = ds.as_ref() {
        ds.set_mode(mode.to_ds());
    }
}

/// Gets the DsMode of the specified ds, DsMode can specify whether the DS is currently connected to a simulator
///
/// This function returns 1 if either pointer is NULL, and 0 on a success
/// On a successful function call, the value of `mode` will be updated with the current DsMode of the driver station.
#[no_mangle]
pub unsafe extern "C" fn DS_DriverStation_get_ds_mode(
    ds: *const DriverStation,
    mode: *mut DsMode,
) -> u8 {
    if ds.is_null() || mode.is_null() {
        return 1;
    }

    *mode = DsMode::from_ds((*ds).ds_mode());
    0
}

/// Enables the robot connected to the given ds. Ignored once the robot has been estopped.
///
/// This function does nothing if ds is NULL
#[no_mangle]
pub unsafe extern "C" fn DS_DriverStation_enable(ds: *const DriverStation) {
    if let Some(ds) = ds.as_ref() {
        ds.enable();
    }
}

/// Disables the robot connected to the given ds
///
/// This function does nothing if ds is NULL
#[no_mangle]
pub unsafe extern "C" fn DS_DriverStation_disable(ds: *const DriverStation) {
    if let Some(ds) = ds.as_ref() {
        ds.disable();
    }
}

/// Checks whether the given DS is enabling its connected robot
///
/// This function returns false if the pointer is NULL, and the true/false depending on whether the robot is enabled otherwise
#[no_mangle]
pub unsafe extern "C" fn DS_DriverStation_enabled(ds: *const DriverStation) -> bool {
    ds.as_ref().map_or(false, DriverStation::enabled)
}

/// Emergency stops the robot connected to the given ds
///
/// This function does nothing if ds is NULL
#[no_mangle]
pub unsafe extern "C" fn DS_DriverStation_estop(ds: *const DriverStation) {
    if let Some(ds) = ds.as_ref() {
        ds.estop();
    }
}

/// Checks whether the given ds is estopping its connected robot
///
/// This function returns false if ds is NULL, and the status reported by the driver station otherwise.
#[no_mangle]
pub unsafe extern "C" fn DS_DriverStation_estopped(ds: *const DriverStation) -> bool {
    ds.as_ref().map_or(false, DriverStation::estopped)
}

/// Instructs the roboRIO connected to the given driver station to restart user code
///
/// This function does nothing if the given pointer is NULL
#[no_mangle]
pub unsafe extern "C" fn DS_DriverStation_restart_code(ds: *const DriverStation) {
    if let Some(ds) = ds.as_ref() {
        ds.restart_code();
    }
}

/// Instructs the roboRIO connected to the given driver station to reboot itself
///
/// This function does nothing if the given pointer is NULL
#[no_mangle]
pub unsafe extern "C" fn DS_DriverStation_restart_roborio(ds: *const DriverStation) {
    if let Some(ds) = ds.as_ref() {
        ds.restart_roborio();
    }
}

/// Returns the latest Trace returned by the roboRIO connected to the given driver station
///
/// Trace is a bitflags value, the individual bitmasks are #define'd at the top of the header.
///
/// This function returns 0 if the given pointer is NULL
#[no_mangle]
pub unsafe extern "C" fn DS_DriverStation_trace(ds: *const DriverStation) -> u8 {
    ds.as_ref().map_or(0, |ds| ds.trace().bits())
}

/// Returns the reported battery voltage of the connected robot
///
/// This function returns 0F if the given pointer is NULL, otherwise it returns the reported battery voltage
/// If no robot is connected this function will return 0F.
#[no_mangle]
pub unsafe extern "C" fn DS_DriverStation_battery_voltage(ds: *const DriverStation) -> f32 {
    ds.as_ref().map_or(0f32, DriverStation::battery_voltage)
}

/// Checks whether status packets are arriving from the roboRIO
///
/// This function returns false if the given pointer is NULL
#[no_mangle]
pub unsafe extern "C" fn DS_DriverStation_connected(ds: *const DriverStation) -> bool {
    ds.as_ref().map_or(false, DriverStation::connected)
}

/// Register a callback to be notified when the driver station returns TCP packets containing riolog data
///
/// This function does nothing if the given ds pointer is NULL
///
/// WARNING: The pointer passed to the callback is INVALIDATED after the callback returns
/// If keeping the string is desirable, it should be copied out of the pointer provided.
/// Keeping the raw pointer after the callback returns will result in a use-after-free bug when it
/// is next accessed.
#[no_mangle]
pub unsafe extern "C" fn DS_DriverStation_set_tcp_consumer(
    ds: *const DriverStation,
    callback: extern "C" fn(StdoutMessage),
) {
    let ds = match ds.as_ref() {
        Some(ds) => ds,
        None => return,
    };

    ds.set_log_consumer(move |packet| {
        if let TcpPacket::Stdout(stdout) = packet {
            // Interior NULs would cut the message short on the C side anyway
            let message = stdout.message.replace('\0', "");
            if let Ok(cstr) = CString::new(message) {
                callback(StdoutMessage::new(&cstr));
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_handles_return_defaults() {
        unsafe {
            let null: *const DriverStation = ptr::null();
            assert_eq!(DS_DriverStation_get_team_number(null), 0);
            assert!(!DS_DriverStation_enabled(null));
            assert!(!DS_DriverStation_estopped(null));
            assert!(!DS_DriverStation_connected(null));
            assert_eq!(DS_DriverStation_trace(null), 0);
            assert_eq!(DS_DriverStation_battery_voltage(null), 0.0);

            let mut mode = Mode::Test;
            assert_eq!(DS_DriverStation_get_mode(null, &mut mode), 1);
            assert_eq!(DS_DriverStation_set_ip(null, ptr::null()), -1);
            assert_eq!(
                DS_DriverStation_set_game_specific_message(null, ptr::null()),
                -1
            );

            // mutators and destroy are no-ops
            DS_DriverStation_enable(null);
            DS_DriverStation_set_mode(null, Mode::Teleoperated);
            DS_DriverStation_destroy(ptr::null_mut());
            assert!(DS_DriverStation_new_team(4069, ptr::null_mut()).is_null());
        }
    }

    #[test]
    fn driver_station_round_trip() {
        let ip = CString::new("127.0.0.1").unwrap();
        unsafe {
            let ds = DS_DriverStation_new_ip(ip.as_ptr(), DS_Alliance_new_blue(2), 4069);
            assert!(!ds.is_null());
            assert_eq!(DS_DriverStation_get_team_number(ds), 4069);

            DS_DriverStation_set_mode(ds, Mode::Teleoperated);
            let mut mode = Mode::Autonomous;
            assert_eq!(DS_DriverStation_get_mode(ds, &mut mode), 0);
            assert_eq!(mode, Mode::Teleoperated);

            DS_DriverStation_enable(ds);
            assert!(DS_DriverStation_enabled(ds));
            DS_DriverStation_estop(ds);
            DS_DriverStation_enable(ds);
            assert!(!DS_DriverStation_enabled(ds));
            assert!(DS_DriverStation_estopped(ds));

            let gsm = CString::new("RLR").unwrap();
            assert_eq!(DS_DriverStation_set_game_specific_message(ds, gsm.as_ptr()), 0);
            let long = CString::new("RLRL").unwrap();
            assert_eq!(DS_DriverStation_set_game_specific_message(ds, long.as_ptr()), 1);
            let invalid = [0xffu8 as c_char, 0];
            assert_eq!(
                DS_DriverStation_set_game_specific_message(ds, invalid.as_ptr()),
                1
            );

            assert_eq!(DS_DriverStation_set_ip(ds, ptr::null()), 0);
            assert_eq!(DS_DriverStation_get_team_number(ds), 4069);
            assert_eq!((*ds).target(), ds::TargetSpec::TeamDerived(4069));

            DS_DriverStation_destroy(ds);
        }
    }

    #[test]
    fn invalid_ip_returns_null() {
        let ip = [0xc3u8 as c_char, 0x28u8 as c_char, 0];
        unsafe {
            assert!(DS_DriverStation_new_ip(ip.as_ptr(), DS_Alliance_new_red(1), 1).is_null());
        }
    }
}

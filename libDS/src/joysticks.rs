use ds::{DriverStation, DsError, DsResult};

/// The error value returned by joystick functions if the specified port is out of bounds, or not attached.
pub const EOUTOFBOUND: u8 = 1;
/// The error value returned by joystick functions if the joysticks Mutex was poisoned
pub const EPOISONLOCK: u8 = 2;
/// The error value returned by joystick functions if the given driver station is NULL
pub const ENOTFOUND: u8 = 3;

fn code(result: DsResult<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(DsError::LockPoisoned) => EPOISONLOCK,
        Err(DsError::NotFound) => ENOTFOUND,
        Err(_) => EOUTOFBOUND,
    }
}

unsafe fn handle<'a>(ds: *const DriverStation) -> DsResult<&'a DriverStation> {
    ds.as_ref().ok_or(DsError::NotFound)
}

unsafe fn with_ds(
    ds: *const DriverStation,
    f: impl FnOnce(&DriverStation) -> DsResult<()>,
) -> u8 {
    code(handle(ds).and_then(f))
}

/// Attaches a joystick to `port`, its values are sent to the robot from the next packet on.
/// After calling this function, `port` can be used in the set_* functions to update values from the joystick
///
/// Returns:
/// `EOUTOFBOUND` if the specified port is greater than 5 (RIO only supports 6 joysticks)
/// `EPOISONLOCK` if the Mutex that stores the joysticks data was poisoned.
/// `ENOTFOUND` if ds is NULL
/// 0 if the operation was a success.
#[no_mangle]
pub unsafe extern "C" fn DS_Joystick_attach(ds: *const DriverStation, port: usize) -> u8 {
    with_ds(ds, |ds| ds.joysticks().attach(port))
}

/// Detaches a joystick, clearing all of its values
/// After calling this function, `port` should **not** be used with set_* functions until it is attached again
///
/// Returns:
/// `EOUTOFBOUND` if the specified port is greater than 5. (RIO only supports 6 joysticks).
/// `EPOISONLOCK` if the Mutex that stores the joystick data was poisoned.
/// `ENOTFOUND` if ds is NULL
/// 0 if the operation was a success
#[no_mangle]
pub unsafe extern "C" fn DS_Joystick_detach(ds: *const DriverStation, port: usize) -> u8 {
    with_ds(ds, |ds| ds.joysticks().detach(port))
}

/// Updates the value of a button associated with the joystick on port `port`.
/// This function should only be used if `port` has been registered with `DS_Joystick_attach`
///
/// Returns:
/// `EOUTOFBOUND` if `port` is out of bounds or not attached
/// `EPOISONLOCK` if the Mutex that stores joystick data was poisoned.
/// `ENOTFOUND` if ds is NULL
/// 0 if the operation was a success
#[no_mangle]
pub unsafe extern "C" fn DS_Joystick_set_button(
    ds: *const DriverStation,
    port: usize,
    button: u8,
    pressed: bool,
) -> u8 {
    with_ds(ds, |ds| ds.joysticks().set_button(port, button, pressed))
}

/// Updates the value of an axis associated with the joystick on port `port`
/// This function should only be used if `port` has been registered with `DS_Joystick_attach`
///
/// Returns:
/// `EOUTOFBOUND` if `port` is out of bounds or not attached
/// `EPOISONLOCK` if the Mutex that stores joystick data was poisoned
/// `ENOTFOUND` if ds is NULL
#[no_mangle]
pub unsafe extern "C" fn DS_Joystick_set_axis(
    ds: *const DriverStation,
    port: usize,
    axis: u8,
    value: f32,
) -> u8 {
    with_ds(ds, |ds| ds.joysticks().set_axis(port, axis, value))
}

/// Updates the value of a POV, or d-pad associated with the joystick on port `port`
/// This function should only be used if `port` has been registered with `DS_Joystick_attach`
///
/// Returns:
/// `EOUTOFBOUND` if `port` is out of bounds or not attached
/// `EPOISONLOCK` if the Mutex that stores joystick data was poisoned
/// `ENOTFOUND` if ds is NULL
#[no_mangle]
pub unsafe extern "C" fn DS_Joystick_set_pov(
    ds: *const DriverStation,
    port: usize,
    pov: u8,
    value: i16,
) -> u8 {
    with_ds(ds, |ds| ds.joysticks().set_pov(port, pov, value))
}

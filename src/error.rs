use failure::Fail;

/// Errors returned to callers of the driver station API.
///
/// Network failures never show up here, they are retried inside the connection threads.
#[derive(Debug, Clone, PartialEq, Fail)]
pub enum DsError {
    /// The joystick port is greater than 5, or no joystick is attached at that port
    #[fail(display = "joystick port {} is out of bounds or not attached", port)]
    OutOfBounds { port: usize },
    /// A thread panicked while holding the joystick lock, the stored values can't be trusted
    #[fail(display = "joystick lock was poisoned by a panicking thread")]
    LockPoisoned,
    /// The game specific message was too long or contained unsupported characters
    #[fail(display = "invalid game specific message: {}", _0)]
    InvalidMessage(String),
    /// The driver station handle is absent or has been destroyed
    #[fail(display = "driver station not found")]
    NotFound,
}

pub type DsResult<T> = std::result::Result<T, DsError>;

use std::error;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The device is not connected or stopped responding.
    Disconnected,

    /// The device did not communicate within the given time limit.
    ///
    /// This does not indicate any error on the device side per se. The timeout
    /// duration may have been lower than nominal communication.
    Timeout,

    /// One or multiple parameters were incorrect.
    InvalidInput,
}

#[derive(Debug)]
pub struct DeviceError {
    /// Device name.
    pub device: String,
    /// Error kind.
    pub kind: ErrorKind,
}

impl DeviceError {
    pub fn new(device: impl ToString, kind: ErrorKind) -> Self {
        Self {
            device: device.to_string(),
            kind,
        }
    }

    pub fn disconnected(device: impl ToString) -> Self {
        Self::new(device, ErrorKind::Disconnected)
    }

    pub fn invalid_input(device: impl ToString) -> Self {
        Self::new(device, ErrorKind::InvalidInput)
    }
}

impl std::fmt::Display for DeviceError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::result::Result<(), std::fmt::Error> {
        match &self.kind {
            ErrorKind::Disconnected => write!(f, "{}: device disconnected", self.device),
            ErrorKind::Timeout => write!(f, "{}: communication timeout", self.device),
            ErrorKind::InvalidInput => write!(f, "{}: invalid device parameters", self.device),
        }
    }
}

impl error::Error for DeviceError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        None
    }
}

use crate::config::PidGains;

/// PID controller.
#[derive(Clone, Debug)]
pub struct Pid {
    /// Proportional gain
    kp: f64,
    /// Integral gain
    ki: f64,
    /// Derivative gain
    kd: f64,
    /// Last error value
    last_error: Option<f64>,
    /// Integral of error
    integral: f64,
}

impl Pid {
    /// Constructor to create a new PID controller
    pub fn new(kp: f64, ki: f64, kd: f64) -> Pid {
        Pid {
            kp,
            ki,
            kd,
            last_error: None,
            integral: 0.0,
        }
    }

    /// Method to update the PID controller based on the current error
    ///
    /// The derivative term is zero on the first update after a reset.
    pub fn update(&mut self, error: f64, dt: f64) -> f64 {
        // Calculate integral of error
        self.integral += error * dt;

        // Calculate derivative of error
        let derivative = match self.last_error {
            Some(last_error) if dt > 0.0 => (error - last_error) / dt,
            _ => 0.0,
        };

        // Remember this error for next time
        self.last_error = Some(error);

        // Calculate control output
        self.kp * error + self.ki * self.integral + self.kd * derivative
    }

    /// Clear the controller state.
    pub fn reset(&mut self) {
        self.last_error = None;
        self.integral = 0.0;
    }
}

impl From<PidGains> for Pid {
    fn from(gains: PidGains) -> Self {
        Self::new(gains.kp, gains.ki, gains.kd)
    }
}

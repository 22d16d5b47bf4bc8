use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    /// Bound on the accumulated integral; zero disables the bound.
    pub integral_limit: f64,
    /// Bound on the magnitude of the output; zero disables the bound.
    pub output_limit: f64,
}

#[derive(Copy, Clone, Debug)]
pub struct Pid {
    gains: PidGains,
    integral_decay: f64,
    prev_error: Option<f64>,
    integral: f64,
}

impl Pid {
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            integral_decay: 0.995,
            prev_error: None,
            integral: 0.0,
        }
    }

    pub fn next(&mut self, error: f64, dt: f64) -> f64 {
        let g = self.gains;
        self.integral *= self.integral_decay;
        self.integral += error * dt;
        if g.integral_limit > 0.0 {
            self.integral = self.integral.clamp(-g.integral_limit, g.integral_limit);
        }

        let derivative = match self.prev_error {
            Some(prev) if dt > 0.0 => (error - prev) / dt,
            _ => 0.0,
        };

        self.prev_error = Some(error);
        let out = (g.kp * error) + (g.ki * self.integral) + (g.kd * derivative);
        if g.output_limit > 0.0 {
            out.clamp(-g.output_limit, g.output_limit)
        } else {
            out
        }
    }

    pub fn reset(&mut self) {
        self.prev_error = None;
        self.integral = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn proportional_only() {
        let mut pid = Pid::new(PidGains {
            kp: 0.5,
            ..PidGains::default()
        });
        assert_relative_eq!(pid.next(4.0, 0.02), 2.0);
        assert_relative_eq!(pid.next(-2.0, 0.02), -1.0);
    }

    #[test]
    fn derivative_needs_a_previous_error() {
        let mut pid = Pid::new(PidGains {
            kd: 1.0,
            ..PidGains::default()
        });
        assert_relative_eq!(pid.next(1.0, 0.5), 0.0);
        assert_relative_eq!(pid.next(2.0, 0.5), 2.0);
        pid.reset();
        assert_relative_eq!(pid.next(5.0, 0.5), 0.0);
    }

    #[test]
    fn output_and_integral_are_bounded() {
        let mut pid = Pid::new(PidGains {
            kp: 10.0,
            ki: 1.0,
            integral_limit: 0.1,
            output_limit: 0.25,
            ..PidGains::default()
        });
        assert_relative_eq!(pid.next(100.0, 1.0), 0.25);
        assert_relative_eq!(pid.next(-100.0, 1.0), -0.25);

        let mut integral_only = Pid::new(PidGains {
            ki: 1.0,
            integral_limit: 0.1,
            ..PidGains::default()
        });
        for _ in 0..10 {
            integral_only.next(1.0, 1.0);
        }
        assert_relative_eq!(integral_only.next(1.0, 1.0), 0.1);
    }
}

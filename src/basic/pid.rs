use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

impl PidGains {
    pub const fn new(kp: f32, ki: f32, kd: f32) -> Self {
        PidGains { kp, ki, kd }
    }

    pub fn is_finite(&self) -> bool {
        self.kp.is_finite() && self.ki.is_finite() && self.kd.is_finite()
    }

    pub fn has_negative(&self) -> bool {
        self.kp < 0.0 || self.ki < 0.0 || self.kd < 0.0
    }
}

/// Textbook PID on a scalar error signal.
///
/// The integral is unbounded and the derivative is a plain finite difference
/// against the previous error, which starts at zero. A non-zero first error
/// therefore produces a one-off derivative spike unless the controller is
/// built with [`PIDController::seeded`].
#[derive(Debug, Clone)]
pub struct PIDController {
    kp: f32,
    ki: f32,
    kd: f32,

    last_err: f32,
    i_err: f32, //integration of err

    seed_last_err: bool,
    primed: bool,
}

impl PIDController {
    /// `dt` must be strictly positive.
    pub fn calculate(&mut self, err: f32, dt: f32) -> f32 {
        debug_assert!(dt > 0.0, "pid step must be positive, got {dt}");
        if self.seed_last_err && !self.primed {
            self.last_err = err;
        }
        self.primed = true;

        self.i_err += err * dt;
        let out = err * self.kp + self.i_err * self.ki + (err - self.last_err) / dt * self.kd;
        self.last_err = err;
        out
    }

    pub fn new(kp: f32, ki: f32, kd: f32) -> Self {
        PIDController {
            kp,
            ki,
            kd,
            last_err: 0.0,
            i_err: 0.0,
            seed_last_err: false,
            primed: false,
        }
    }

    pub fn with_gains(gains: PidGains) -> Self {
        Self::new(gains.kp, gains.ki, gains.kd)
    }

    /// Use the first observed error as the previous error, so the first call
    /// has no derivative kick.
    pub fn seeded(mut self) -> Self {
        self.seed_last_err = true;
        self
    }

    pub fn gains(&self) -> PidGains {
        PidGains::new(self.kp, self.ki, self.kd)
    }

    pub fn integral(&self) -> f32 {
        self.i_err
    }

    pub fn last_error(&self) -> f32 {
        self.last_err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        let tol = 1e-5 * a.abs().max(b.abs()).max(1.0);
        assert!((a - b).abs() <= tol, "{a} != {b}");
    }

    #[test]
    fn test_p_only() {
        let mut pid = PIDController::new(2.5, 0.0, 0.0);
        for (err, dt) in [(1.0, 0.02), (-3.0, 0.5), (0.0, 1.0), (42.0, 0.001)] {
            assert_close(pid.calculate(err, dt), err * 2.5);
        }
    }

    #[test]
    fn test_integral_accumulates_linearly() {
        let mut pid = PIDController::new(0.0, 0.7, 0.0);
        let (err, dt) = (3.0, 0.02);
        assert_close(pid.calculate(err, dt), err * dt * 0.7);
        assert_close(pid.calculate(err, dt), 2.0 * err * dt * 0.7);
        assert_close(pid.integral(), 2.0 * err * dt);
    }

    #[test]
    fn test_derivative_first_call_spike() {
        let mut pid = PIDController::new(0.0, 0.0, 0.1);
        let out = pid.calculate(5.0, 0.02);
        assert_close(out, (5.0 - 0.0) / 0.02 * 0.1);
        assert_eq!(pid.last_error(), 5.0);
    }

    #[test]
    fn test_derivative_steady_state() {
        let mut pid = PIDController::new(0.0, 0.0, 0.3);
        pid.calculate(-7.0, 0.02);
        assert_eq!(pid.calculate(-7.0, 0.02), 0.0);
    }

    #[test]
    fn test_seeded_has_no_spike() {
        let mut pid = PIDController::new(1.0, 0.0, 0.5).seeded();
        assert_close(pid.calculate(4.0, 0.02), 4.0);
        // only the first call is seeded
        assert_close(pid.calculate(6.0, 0.02), 6.0 + (6.0 - 4.0) / 0.02 * 0.5);
    }

    #[test]
    fn test_zero_gains() {
        let mut pid = PIDController::with_gains(PidGains::default());
        for i in 0..100 {
            let err = (i as f32 * 0.37).sin() * 100.0;
            assert_eq!(pid.calculate(err, 0.02), 0.0);
        }
    }

    #[test]
    fn test_gains_roundtrip() {
        let g = PidGains::new(9.244681, 0.0, 0.06382979);
        assert_eq!(PIDController::with_gains(g).gains(), g);
        assert!(!g.has_negative());
        assert!(PidGains::new(1.0, -0.1, 0.0).has_negative());
        assert!(!PidGains::new(f32::NAN, 0.0, 0.0).is_finite());
    }
}

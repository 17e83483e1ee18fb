use crate::{
    basic::{
        pid::PIDController,
        rotation::{delta_angle, normalize_degree},
    },
    msg_define::{Axis, Vector3},
    param::ShipParams,
};

/// Sensor and actuator side of a rigid body, as the ship loop sees it.
pub trait PhysicsBody {
    /// Orientation about `axis`, degree in [0, 360).
    fn orientation_angle(&self, axis: Axis) -> f32;
    /// Angular velocity about `axis`, rad/s.
    fn angular_velocity(&self, axis: Axis) -> f32;
    /// Torque in the body frame, applied over the next physics step.
    fn apply_torque_impulse(&mut self, torque: Vector3);
    /// Hard cap on angular speed, rad/s.
    fn set_max_angular_speed(&mut self, speed: f32);
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TorqueOutput {
    pub angle_term: f32,
    pub velocity_term: f32,
}

impl TorqueOutput {
    #[inline]
    pub fn total(&self) -> f32 {
        self.angle_term + self.velocity_term
    }
}

/// Turns a body about one axis toward a target angle.
///
/// Two controllers run in cascade each tick: `angle_controller` works on the
/// shortest signed angle between body and target, `velocity_controller` drives
/// the angular velocity about the same axis to zero. Their outputs are summed
/// into one torque along the controlled axis.
#[derive(Debug, Clone)]
pub struct ShipController {
    axis: Axis,
    max_angular_speed: f32,
    turn_speed_scale: f32,

    target_angle: f32,
    turn_input: f32,

    angle_controller: PIDController,
    velocity_controller: PIDController,
    last_output: TorqueOutput,
}

impl ShipController {
    pub fn new(params: &ShipParams) -> Self {
        let mut angle_controller = PIDController::with_gains(params.angle);
        let mut velocity_controller = PIDController::with_gains(params.velocity);
        if params.seed_derivative {
            angle_controller = angle_controller.seeded();
            velocity_controller = velocity_controller.seeded();
        }
        ShipController {
            axis: params.axis,
            max_angular_speed: params.max_angular_speed,
            turn_speed_scale: params.turn_speed_scale,
            target_angle: 0.0,
            turn_input: 0.0,
            angle_controller,
            velocity_controller,
            last_output: TorqueOutput::default(),
        }
    }

    /// Must run once before the first tick. Takes the current orientation as
    /// target so the body does not snap on the first tick.
    pub fn on_init<B: PhysicsBody + ?Sized>(&mut self, body: &mut B) {
        self.target_angle = normalize_degree(body.orientation_angle(self.axis));
        body.set_max_angular_speed(self.max_angular_speed);
        tracing::debug!(
            axis = ?self.axis,
            target_angle = self.target_angle,
            max_angular_speed = self.max_angular_speed,
            "ship controller initialised"
        );
    }

    pub fn on_fixed_tick<B: PhysicsBody + ?Sized>(&mut self, body: &mut B, dt: f32) {
        self.target_angle =
            normalize_degree(self.target_angle + self.turn_input * self.turn_speed_scale * dt);

        let angle_err = delta_angle(body.orientation_angle(self.axis), self.target_angle);
        let angle_term = self.angle_controller.calculate(angle_err, dt);

        let velocity_err = -body.angular_velocity(self.axis);
        let velocity_term = self.velocity_controller.calculate(velocity_err, dt);

        self.last_output = TorqueOutput {
            angle_term,
            velocity_term,
        };
        body.apply_torque_impulse(self.axis.unit() * self.last_output.total());

        tracing::trace!(angle_err, velocity_err, angle_term, velocity_term, "ship tick");
    }

    /// Latest turn command, read at the next tick.
    pub fn set_turn_input(&mut self, input: f32) {
        self.turn_input = input;
    }

    pub fn turn_input(&self) -> f32 {
        self.turn_input
    }

    pub fn set_target_angle(&mut self, angle: f32) {
        self.target_angle = normalize_degree(angle);
    }

    pub fn target_angle(&self) -> f32 {
        self.target_angle
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn last_output(&self) -> TorqueOutput {
        self.last_output
    }

    pub fn angle_controller(&self) -> &PIDController {
        &self.angle_controller
    }

    pub fn velocity_controller(&self) -> &PIDController {
        &self.velocity_controller
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        basic::pid::PidGains,
        param::{BodyParams, ANGLE_GAINS, VELOCITY_GAINS},
        sim_body::SimBody,
    };

    // records what the loop does to it, never moves
    #[derive(Default)]
    struct FakeBody {
        angle: f32,
        rate: f32,
        max_speed: Option<f32>,
        torques: Vec<Vector3>,
    }

    impl PhysicsBody for FakeBody {
        fn orientation_angle(&self, _axis: Axis) -> f32 {
            self.angle
        }
        fn angular_velocity(&self, _axis: Axis) -> f32 {
            self.rate
        }
        fn apply_torque_impulse(&mut self, torque: Vector3) {
            self.torques.push(torque);
        }
        fn set_max_angular_speed(&mut self, speed: f32) {
            self.max_speed = Some(speed);
        }
    }

    fn params(angle: PidGains, velocity: PidGains) -> ShipParams {
        ShipParams {
            angle,
            velocity,
            ..ShipParams::default()
        }
    }

    #[test]
    fn test_init_holds_current_orientation() {
        let mut body = FakeBody {
            angle: 123.0,
            ..Default::default()
        };
        let mut ship = ShipController::new(&ShipParams::default());
        ship.on_init(&mut body);
        assert_eq!(ship.target_angle(), 123.0);
        assert_eq!(body.max_speed, Some(7.0));

        // no error, no rate: nothing to do
        ship.on_fixed_tick(&mut body, 0.02);
        assert_eq!(body.torques.len(), 1);
        assert_eq!(body.torques[0], Vector3::default());
    }

    #[test]
    fn test_turn_input_moves_target() {
        let mut body = FakeBody {
            angle: 350.0,
            ..Default::default()
        };
        let mut ship = ShipController::new(&ShipParams::default());
        ship.on_init(&mut body);
        ship.set_turn_input(0.5);
        for _ in 0..10 {
            ship.on_fixed_tick(&mut body, 0.02);
        }
        // 0.5 * 180 deg/s * 0.2 s = 18 deg, wrapped past 360
        assert!((ship.target_angle() - 8.0).abs() < 1e-3, "{}", ship.target_angle());
    }

    #[test]
    fn test_angle_stage_takes_short_way() {
        let mut body = FakeBody {
            angle: 350.0,
            ..Default::default()
        };
        let p = params(PidGains::new(2.0, 0.0, 0.0), PidGains::default());
        let mut ship = ShipController::new(&p);
        ship.on_init(&mut body);
        ship.set_target_angle(10.0);
        ship.on_fixed_tick(&mut body, 0.02);
        // +20 deg the short way, not -340
        assert!((ship.last_output().angle_term - 40.0).abs() < 1e-3);
        assert!((body.torques[0].z - 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_velocity_stage_damps() {
        let mut body = FakeBody {
            rate: 2.0,
            ..Default::default()
        };
        let p = params(PidGains::default(), PidGains::new(3.0, 0.0, 0.0));
        let mut ship = ShipController::new(&p);
        ship.on_init(&mut body);
        ship.on_fixed_tick(&mut body, 0.02);
        assert_eq!(ship.last_output().angle_term, 0.0);
        assert_eq!(ship.last_output().velocity_term, -6.0);
        assert_eq!(body.torques[0].z, -6.0);
    }

    #[test]
    fn test_cascade_is_plain_sum() {
        let mut body = FakeBody {
            angle: 30.0,
            rate: -0.7,
            ..Default::default()
        };
        let mut ship = ShipController::new(&ShipParams::default());
        ship.on_init(&mut body);
        ship.set_target_angle(75.0);

        let mut angle_pid = PIDController::with_gains(ANGLE_GAINS);
        let mut velocity_pid = PIDController::with_gains(VELOCITY_GAINS);
        for i in 0..20 {
            body.angle = 30.0 + i as f32;
            body.rate = -0.7 + 0.05 * i as f32;
            ship.on_fixed_tick(&mut body, 0.02);

            let a = angle_pid.calculate(delta_angle(body.angle, 75.0), 0.02);
            let v = velocity_pid.calculate(-body.rate, 0.02);
            assert_eq!(ship.last_output().angle_term, a);
            assert_eq!(ship.last_output().velocity_term, v);
            assert_eq!(body.torques[i].z, a + v);
            assert_eq!(body.torques[i].x, 0.0);
            assert_eq!(body.torques[i].y, 0.0);
        }
    }

    #[test]
    fn test_torque_on_configured_axis() {
        let mut body = FakeBody::default();
        let p = ShipParams {
            axis: Axis::X,
            ..params(PidGains::new(1.0, 0.0, 0.0), PidGains::default())
        };
        let mut ship = ShipController::new(&p);
        ship.on_init(&mut body);
        ship.set_target_angle(45.0);
        ship.on_fixed_tick(&mut body, 0.02);
        assert_eq!(body.torques[0].to_array(), [45.0, 0.0, 0.0]);
    }

    #[test]
    fn test_seeded_first_tick() {
        let mut body = FakeBody::default();
        let p = ShipParams {
            seed_derivative: true,
            ..params(PidGains::new(0.0, 0.0, 1.0), PidGains::default())
        };
        let mut ship = ShipController::new(&p);
        ship.on_init(&mut body);
        ship.set_target_angle(90.0);
        ship.on_fixed_tick(&mut body, 0.02);
        assert_eq!(ship.last_output().angle_term, 0.0);
    }

    #[test]
    fn test_converges_to_target() {
        let ship_params = ShipParams::default();
        let mut body = SimBody::new(&BodyParams::default(), ship_params.axis);
        let mut ship = ShipController::new(&ship_params);
        ship.on_init(&mut body);
        ship.set_target_angle(90.0);

        let dt = 1.0 / 50.0;
        let mut history = Vec::new();
        for _ in 0..500 {
            ship.on_fixed_tick(&mut body, dt);
            body.step(dt);
            history.push((
                body.orientation_angle(Axis::Z),
                body.angular_velocity(Axis::Z),
            ));
        }

        // settled and staying settled: no sustained oscillation
        for (angle, rate) in &history[250..] {
            assert!(delta_angle(*angle, 90.0).abs() < 1.0, "angle {angle}");
            assert!(rate.abs() < 0.01, "rate {rate}");
        }
        let overshoot = history
            .iter()
            .map(|(a, _)| delta_angle(90.0, *a))
            .fold(f32::MIN, f32::max);
        assert!(overshoot < 5.0, "overshoot {overshoot}");
    }
}

use quaternion_core::{Quaternion as Q, Vector3 as V3};

use crate::{
    basic::rotation::{from_axis_degree, get_twist_degree},
    msg_define::{Axis, Vector3},
    param::BodyParams,
    ship_control::PhysicsBody,
};

/// Rigid body with a scalar moment of inertia, integrated in fixed steps.
///
/// Angular velocity is kept in the body frame. Torque handed in through
/// [`PhysicsBody::apply_torque_impulse`] accumulates until the next
/// [`SimBody::step`] consumes it.
#[derive(Debug, Clone)]
pub struct SimBody {
    q: Q<f32>,
    omega: V3<f32>,
    inertia: f32,
    angular_drag: f32,
    max_angular_speed: f32,
    torque: V3<f32>,
}

const MIN_STEP_ANGLE: f32 = 1e-9;

impl SimBody {
    pub fn new(params: &BodyParams, axis: Axis) -> Self {
        SimBody {
            q: from_axis_degree(axis.unit().to_array(), params.initial_angle),
            omega: (axis.unit() * params.initial_angular_velocity).to_array(),
            inertia: params.inertia,
            angular_drag: params.angular_drag,
            max_angular_speed: f32::INFINITY,
            torque: [0.0; 3],
        }
    }

    pub fn step(&mut self, dt: f32) {
        let accel = quaternion_core::scale(dt / self.inertia, self.torque);
        self.omega = quaternion_core::add(self.omega, accel);
        self.omega = quaternion_core::scale(1.0 / (1.0 + dt * self.angular_drag), self.omega);

        let mut speed = quaternion_core::norm(self.omega);
        if speed > self.max_angular_speed {
            self.omega = quaternion_core::scale(self.max_angular_speed / speed, self.omega);
            speed = self.max_angular_speed;
        }

        let step_angle = speed * dt;
        if step_angle > MIN_STEP_ANGLE {
            let axis = quaternion_core::scale(1.0 / speed, self.omega);
            let dq = quaternion_core::from_axis_angle(axis, step_angle);
            self.q = quaternion_core::normalize(quaternion_core::mul(self.q, dq));
        }

        self.torque = [0.0; 3];
    }
}

impl PhysicsBody for SimBody {
    fn orientation_angle(&self, axis: Axis) -> f32 {
        get_twist_degree(self.q, axis.unit().to_array())
    }

    fn angular_velocity(&self, axis: Axis) -> f32 {
        quaternion_core::dot(self.omega, axis.unit().to_array())
    }

    fn apply_torque_impulse(&mut self, torque: Vector3) {
        self.torque = quaternion_core::add(self.torque, torque.to_array());
    }

    fn set_max_angular_speed(&mut self, speed: f32) {
        self.max_angular_speed = speed;
    }
}

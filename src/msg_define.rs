use std::ops::Mul;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    #[inline]
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl Mul<f32> for Vector3 {
    type Output = Vector3;
    fn mul(self, k: f32) -> Vector3 {
        Vector3 {
            x: self.x * k,
            y: self.y * k,
            z: self.z * k,
        }
    }
}

/// Body-local rotation axis a controller acts on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    #[default]
    Z,
}

impl Axis {
    pub fn unit(self) -> Vector3 {
        match self {
            Axis::X => Vector3 { x: 1.0, y: 0.0, z: 0.0 },
            Axis::Y => Vector3 { x: 0.0, y: 1.0, z: 0.0 },
            Axis::Z => Vector3 { x: 0.0, y: 0.0, z: 1.0 },
        }
    }
}

// One fixed tick of the ship loop, as seen from outside.
// angles in degree, angular velocity in rad/s
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickSample {
    pub tick: u64,
    pub time: f32,
    pub angle: f32,
    pub target_angle: f32,
    pub angular_velocity: f32,
    pub turn_input: f32,
    pub angle_term: f32,
    pub velocity_term: f32,
    pub torque: f32,
}

impl TickSample {
    pub fn wave(&self) -> [f32; 4] {
        [self.angle, self.target_angle, self.angular_velocity, self.torque]
    }
}

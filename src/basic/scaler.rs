/// Maps a raw reading onto a command range: separate gains for positive and
/// negative inputs, an offset, a symmetric deadband around zero and a clamp.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default = "Scaler::rc_channel")]
pub struct Scaler {
    pub scale_p: f32,
    pub scale_n: f32,
    pub offset: f32,
    pub deadband: f32,
    pub min: f32,
    pub max: f32,
}

impl Scaler {
    /// RC style channel (-1000..1000) onto a unit turn command.
    pub fn rc_channel() -> Self {
        Self {
            scale_p: 0.001,
            scale_n: 0.001,
            offset: 0.0,
            deadband: 20.0,
            min: -1.0,
            max: 1.0,
        }
    }

    pub fn scale(&self, input: f32) -> f32 {
        if input.abs() <= self.deadband {
            return self.offset.clamp(self.min, self.max);
        }
        let scale_k = if input > 0.0 { self.scale_p } else { self.scale_n };
        let ret = scale_k * input + self.offset;
        ret.clamp(self.min, self.max)
    }
}

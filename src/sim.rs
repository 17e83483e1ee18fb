use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    manual_ctrl::AxisInput,
    msg_define::TickSample,
    param::PilotParams,
    scheduler::FixedTick,
    ship_control::{PhysicsBody, ShipController},
    sim_body::SimBody,
    utils::{trace::TraceRecorder, udp_scope::UdpScope},
};

/// One ship: simulated body, its rotation loop and the input feeding it.
///
/// Per tick the latest input is sampled, the loop applies its torque and the
/// body then integrates one step.
pub struct ShipSim {
    body: SimBody,
    ship: ShipController,
    input: Arc<AxisInput>,
    telemetry: Arc<Mutex<TickSample>>,
    recorder: Option<TraceRecorder>,
    scope: Option<UdpScope>,
    ticks: u64,
    time: f32,
}

impl ShipSim {
    pub fn new(params: &PilotParams, input: Arc<AxisInput>) -> Self {
        ShipSim {
            body: SimBody::new(&params.body, params.ship.axis),
            ship: ShipController::new(&params.ship),
            input,
            telemetry: Arc::new(Mutex::new(TickSample::default())),
            recorder: None,
            scope: None,
            ticks: 0,
            time: 0.0,
        }
    }

    pub fn with_recorder(mut self) -> Self {
        self.recorder = Some(TraceRecorder::new());
        self
    }

    pub fn with_scope(mut self, scope: UdpScope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn ship(&self) -> &ShipController {
        &self.ship
    }

    pub fn ship_mut(&mut self) -> &mut ShipController {
        &mut self.ship
    }

    /// Shared handle on the latest sample, for readers on other threads.
    pub fn telemetry(&self) -> Arc<Mutex<TickSample>> {
        self.telemetry.clone()
    }

    pub fn recorder(&self) -> Option<&TraceRecorder> {
        self.recorder.as_ref()
    }

    fn publish(&self, sample: TickSample) {
        *self.telemetry.lock().unwrap_or_else(PoisonError::into_inner) = sample;
    }

    fn sample(&self) -> TickSample {
        let axis = self.ship.axis();
        let out = self.ship.last_output();
        TickSample {
            tick: self.ticks,
            time: self.time,
            angle: self.body.orientation_angle(axis),
            target_angle: self.ship.target_angle(),
            angular_velocity: self.body.angular_velocity(axis),
            turn_input: self.ship.turn_input(),
            angle_term: out.angle_term,
            velocity_term: out.velocity_term,
            torque: out.total(),
        }
    }
}

impl FixedTick for ShipSim {
    fn on_init(&mut self) {
        self.ship.on_init(&mut self.body);
        let sample = self.sample();
        self.publish(sample);
    }

    fn on_fixed_tick(&mut self, dt: f32) {
        self.ship.set_turn_input(self.input.sample());
        self.ship.on_fixed_tick(&mut self.body, dt);
        self.body.step(dt);
        self.ticks += 1;
        self.time += dt;

        let sample = self.sample();
        if let Some(scope) = &self.scope {
            if let Err(e) = scope.send_wave(&sample.wave()) {
                tracing::warn!("scope send failed: {e}");
            }
        }
        if let Some(recorder) = &mut self.recorder {
            recorder.record(sample);
        }
        self.publish(sample);
    }
}

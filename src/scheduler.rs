use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::{Duration, Instant},
};

/// Lifecycle of anything driven by the fixed step loop.
pub trait FixedTick {
    /// Called once, before the first tick.
    fn on_init(&mut self);
    /// `dt` is the constant step in seconds.
    fn on_fixed_tick(&mut self, dt: f32);
}

/// Invokes one node at a constant step, strictly one tick after another.
///
/// Lock-step by default: ticks run back to back. With `realtime` each tick
/// waits for its deadline on the wall clock, like a periodic control thread.
pub struct FixedStepScheduler {
    dt: f32,
    realtime: bool,
    ticks: u64,
    initialised: bool,
    start: Option<Instant>,
}

impl FixedStepScheduler {
    /// `step_hz` must be positive; parameters are validated on load.
    pub fn new(step_hz: f32) -> Self {
        debug_assert!(step_hz > 0.0);
        FixedStepScheduler {
            dt: 1.0 / step_hz,
            realtime: false,
            ticks: 0,
            initialised: false,
            start: None,
        }
    }

    pub fn realtime(mut self, enable: bool) -> Self {
        self.realtime = enable;
        self
    }

    /// Ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Run `on_init` now if no tick has initialised the node yet.
    pub fn init<T: FixedTick + ?Sized>(&mut self, node: &mut T) {
        if !self.initialised {
            node.on_init();
            self.initialised = true;
        }
    }

    pub fn run_for<T: FixedTick + ?Sized>(&mut self, node: &mut T, ticks: u64) {
        for _ in 0..ticks {
            self.tick(node);
        }
    }

    pub fn run_until<T: FixedTick + ?Sized>(&mut self, node: &mut T, stop: &AtomicBool) {
        while !stop.load(Ordering::Relaxed) {
            self.tick(node);
        }
    }

    fn tick<T: FixedTick + ?Sized>(&mut self, node: &mut T) {
        self.init(node);
        node.on_fixed_tick(self.dt);
        self.ticks += 1;
        if self.realtime {
            self.schedule_until_next();
        }
    }

    fn schedule_until_next(&mut self) {
        let start = *self.start.get_or_insert_with(Instant::now);
        let deadline = start + Duration::from_secs_f64(self.ticks as f64 * self.dt as f64);
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        } else if now - deadline > Duration::from_secs_f32(self.dt) {
            tracing::warn!("fixed tick {} overran by {:?}", self.ticks, now - deadline);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Probe {
        events: Vec<String>,
    }

    impl FixedTick for Probe {
        fn on_init(&mut self) {
            self.events.push("init".to_string());
        }
        fn on_fixed_tick(&mut self, dt: f32) {
            self.events.push(format!("tick {dt}"));
        }
    }

    #[test]
    fn test_init_once_then_ticks() {
        let mut probe = Probe::default();
        let mut sched = FixedStepScheduler::new(50.0);
        sched.run_for(&mut probe, 3);
        sched.run_for(&mut probe, 2);
        assert_eq!(sched.ticks(), 5);
        assert_eq!(probe.events[0], "init");
        assert_eq!(probe.events.len(), 6);
        assert!(probe.events[1..].iter().all(|e| e == "tick 0.02"));
    }

    #[test]
    fn test_explicit_init() {
        let mut probe = Probe::default();
        let mut sched = FixedStepScheduler::new(50.0);
        sched.init(&mut probe);
        sched.init(&mut probe);
        sched.run_for(&mut probe, 1);
        assert_eq!(probe.events, vec!["init".to_string(), "tick 0.02".to_string()]);
    }

    #[test]
    fn test_no_ticks_no_init() {
        let mut probe = Probe::default();
        FixedStepScheduler::new(50.0).run_for(&mut probe, 0);
        assert!(probe.events.is_empty());
    }

    #[test]
    fn test_run_until_stop() {
        struct StopAfter<'a> {
            n: u32,
            stop: &'a AtomicBool,
        }
        impl FixedTick for StopAfter<'_> {
            fn on_init(&mut self) {}
            fn on_fixed_tick(&mut self, _dt: f32) {
                self.n += 1;
                if self.n == 7 {
                    self.stop.store(true, Ordering::Relaxed);
                }
            }
        }

        let stop = AtomicBool::new(false);
        let mut node = StopAfter { n: 0, stop: &stop };
        let mut sched = FixedStepScheduler::new(100.0);
        sched.run_until(&mut node, &stop);
        assert_eq!(sched.ticks(), 7);
    }

    #[test]
    fn test_realtime_pacing() {
        let mut probe = Probe::default();
        let mut sched = FixedStepScheduler::new(200.0).realtime(true);
        let begin = Instant::now();
        sched.run_for(&mut probe, 10);
        // 10 ticks of 5 ms, the first deadline is one step after the first tick
        assert!(begin.elapsed() >= Duration::from_millis(40));
    }
}

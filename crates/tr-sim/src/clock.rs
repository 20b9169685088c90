//! Simulated time source and discrete-event scheduler.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use tracing::debug;
use tr_core::Real;

use crate::error::{SimError, SimResult};
use crate::events::{SimEvent, validate_schedule_time};

/// Handle for a scheduled event, usable for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventHandle(u64);

/// What the sampling loop needs from a clock.
pub trait TimeSource {
    /// Current simulated time in seconds.
    fn now(&self) -> Real;

    /// False once the simulation has finished; no events fire afterwards.
    fn is_running(&self) -> bool;

    /// Schedule `event` at absolute time `at` (not before `now`).
    fn schedule_at(&mut self, at: Real, event: SimEvent) -> SimResult<EventHandle>;

    /// Cancel a pending event. Returns false if it already fired or was unknown.
    fn cancel(&mut self, handle: EventHandle) -> bool;
}

#[derive(Debug)]
struct Pending {
    time: Real,
    handle: EventHandle,
    event: SimEvent,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    // Time first, then scheduling order for ties.
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then(self.handle.cmp(&other.handle))
    }
}

/// Single-threaded discrete-event scheduler.
///
/// Events fire in time order; events at the same time fire in the order they were
/// scheduled. Events later than the stop time never fire.
#[derive(Debug)]
pub struct Simulator {
    now: Real,
    stop_time: Option<Real>,
    queue: BinaryHeap<Reverse<Pending>>,
    pending: HashSet<EventHandle>,
    next_handle: u64,
    finished: bool,
    dispatched: u64,
}

impl Simulator {
    pub fn new(start: Real) -> SimResult<Self> {
        let start = tr_core::ensure_finite(start, "simulation start time")?;
        Ok(Self {
            now: start,
            stop_time: None,
            queue: BinaryHeap::new(),
            pending: HashSet::new(),
            next_handle: 0,
            finished: false,
            dispatched: 0,
        })
    }

    /// Bound the simulation: no event later than `time` will fire.
    pub fn stop_at(&mut self, time: Real) -> SimResult<()> {
        let time = validate_schedule_time(self.now, time)?;
        self.stop_time = Some(time);
        Ok(())
    }

    pub fn stop_time(&self) -> Option<Real> {
        self.stop_time
    }

    /// Number of events dispatched so far.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Number of live (not cancelled, not fired) events.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Pop the next live event, advancing `now` to its time.
    ///
    /// Returns `None` and marks the simulation finished once the queue is exhausted
    /// or the next event lies beyond the stop time.
    pub fn next_event(&mut self) -> Option<(Real, SimEvent)> {
        if self.finished {
            return None;
        }
        while let Some(Reverse(next)) = self.queue.pop() {
            if !self.pending.remove(&next.handle) {
                // cancelled
                continue;
            }
            if self.stop_time.is_some_and(|stop| next.time > stop) {
                break;
            }
            self.now = next.time;
            self.dispatched += 1;
            return Some((next.time, next.event));
        }
        self.finish();
        None
    }

    /// Dispatch events to `handler` until the simulation finishes.
    pub fn run(&mut self, mut handler: impl FnMut(&mut Self, SimEvent)) {
        while let Some((time, event)) = self.next_event() {
            debug!(time, ?event, "dispatch");
            handler(self, event);
        }
    }

    fn finish(&mut self) {
        if let Some(stop) = self.stop_time {
            self.now = self.now.max(stop);
        }
        self.queue.clear();
        self.pending.clear();
        self.finished = true;
        debug!(time = self.now, dispatched = self.dispatched, "simulation finished");
    }
}

impl TimeSource for Simulator {
    fn now(&self) -> Real {
        self.now
    }

    fn is_running(&self) -> bool {
        !self.finished
    }

    fn schedule_at(&mut self, at: Real, event: SimEvent) -> SimResult<EventHandle> {
        if self.finished {
            return Err(SimError::InvalidArg {
                what: "simulation already finished",
            });
        }
        let time = validate_schedule_time(self.now, at)?;
        let handle = EventHandle(self.next_handle);
        self.next_handle += 1;
        self.pending.insert(handle);
        self.queue.push(Reverse(Pending {
            time,
            handle,
            event,
        }));
        Ok(handle)
    }

    fn cancel(&mut self, handle: EventHandle) -> bool {
        self.pending.remove(&handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tr_core::DeviceId;

    fn ev(i: u32) -> SimEvent {
        SimEvent::Sample(DeviceId::from_index(i))
    }

    #[test]
    fn events_fire_in_time_then_insertion_order() {
        let mut sim = Simulator::new(0.0).unwrap();
        sim.schedule_at(1.0, ev(0)).unwrap();
        sim.schedule_at(0.5, ev(1)).unwrap();
        sim.schedule_at(1.0, ev(2)).unwrap();

        let mut fired = Vec::new();
        sim.run(|s, e| fired.push((s.now(), e)));
        assert_eq!(fired, vec![(0.5, ev(1)), (1.0, ev(0)), (1.0, ev(2))]);
        assert!(!sim.is_running());
    }

    #[test]
    fn cancelled_event_never_fires() {
        let mut sim = Simulator::new(0.0).unwrap();
        let h = sim.schedule_at(1.0, ev(0)).unwrap();
        sim.schedule_at(2.0, ev(1)).unwrap();
        assert!(sim.cancel(h));
        assert!(!sim.cancel(h));

        let mut fired = Vec::new();
        sim.run(|_, e| fired.push(e));
        assert_eq!(fired, vec![ev(1)]);
    }

    #[test]
    fn events_after_stop_time_are_dropped() {
        let mut sim = Simulator::new(0.0).unwrap();
        sim.stop_at(1.0).unwrap();
        sim.schedule_at(1.0, ev(0)).unwrap();
        sim.schedule_at(1.5, ev(1)).unwrap();

        let mut fired = Vec::new();
        sim.run(|_, e| fired.push(e));
        assert_eq!(fired, vec![ev(0)]);
        assert_eq!(sim.now(), 1.0);
        assert_eq!(sim.pending_len(), 0);
    }

    #[test]
    fn handler_can_reschedule() {
        let mut sim = Simulator::new(0.0).unwrap();
        sim.stop_at(2.0).unwrap();
        sim.schedule_at(0.0, ev(0)).unwrap();

        let mut times = Vec::new();
        sim.run(|s, e| {
            times.push(s.now());
            let next = s.now() + 0.5;
            s.schedule_at(next, e).unwrap();
        });
        assert_eq!(times, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        assert_eq!(sim.dispatched(), 5);
    }

    #[test]
    fn scheduling_in_the_past_fails() {
        let mut sim = Simulator::new(3.0).unwrap();
        assert!(matches!(
            sim.schedule_at(2.0, ev(0)),
            Err(SimError::ScheduleInPast { .. })
        ));
    }

    #[test]
    fn finished_simulator_rejects_new_events() {
        let mut sim = Simulator::new(0.0).unwrap();
        sim.run(|_, _| {});
        assert!(!sim.is_running());
        assert!(sim.schedule_at(1.0, ev(0)).is_err());
    }
}

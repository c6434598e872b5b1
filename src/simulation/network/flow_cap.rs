use crate::simulation::network::capacity::SegmentCapacity;

/// Accumulates flow capacity of a segment over simulation time steps. Capacity which is not used
/// during a time step is not carried over, except for overdrafts: a vehicle with a pce larger than
/// the remaining capacity may still leave, and the resulting negative capacity has to be paid off
/// in the following time steps.
#[derive(Debug, Clone)]
pub struct Flowcap {
    last_update_time: u32,
    accumulated_capacity: f64,
    capacity_per_time_step: f64,
}

impl Flowcap {
    pub fn new(capacity_per_time_step: f64) -> Flowcap {
        Flowcap {
            last_update_time: 0,
            accumulated_capacity: capacity_per_time_step,
            capacity_per_time_step,
        }
    }

    pub fn from_segment(segment: &SegmentCapacity) -> Flowcap {
        Flowcap::new(segment.simulated_flow_capacity)
    }

    /**
    Updates the accumulated capacity if the time has advanced.
     */
    pub fn update_capacity(&mut self, now: u32) {
        if self.last_update_time < now {
            let time_steps = (now - self.last_update_time) as f64;
            let acc_flow_cap = time_steps * self.capacity_per_time_step + self.accumulated_capacity;
            self.accumulated_capacity = f64::min(acc_flow_cap, self.capacity_per_time_step);
            self.last_update_time = now;
        }
    }

    pub fn has_capacity(&self) -> bool {
        self.accumulated_capacity > 1e-10
    }

    pub fn consume_capacity(&mut self, by: f64) {
        self.accumulated_capacity -= by;
    }

    pub fn capacity(&self) -> f64 {
        self.capacity_per_time_step
    }
}

#[cfg(test)]
mod tests {
    use crate::simulation::network::capacity::SegmentCapacity;
    use crate::simulation::network::flow_cap::Flowcap;

    #[test]
    fn from_segment() {
        let segment = SegmentCapacity {
            length: 105.,
            number_of_lanes: 1.,
            storage_capacity: 14.,
            simulated_flow_capacity: 0.25,
        };
        let cap = Flowcap::from_segment(&segment);
        assert_eq!(0.25, cap.capacity());
        assert!(cap.has_capacity());
    }

    #[test]
    fn flowcap_consume_capacity() {
        let mut flowcap = Flowcap::new(10.);
        assert!(flowcap.has_capacity());

        flowcap.consume_capacity(20.0);
        assert!(!flowcap.has_capacity());
    }

    #[test]
    fn flowcap_max_capacity_s() {
        let mut flowcap = Flowcap::new(10.);

        flowcap.update_capacity(20);

        assert_eq!(10.0, flowcap.accumulated_capacity);
        assert_eq!(20, flowcap.last_update_time);
    }

    #[test]
    fn flowcap_acc_capacity() {
        let mut flowcap = Flowcap::new(0.25);
        assert!(flowcap.has_capacity());

        // accumulated_capacity should be at -0.75 after this.
        flowcap.consume_capacity(1.0);
        assert!(!flowcap.has_capacity());

        // accumulated_capacity should be at -0.5
        flowcap.update_capacity(1);
        assert!(!flowcap.has_capacity());

        // accumulated_capacity should be at 0.0
        flowcap.update_capacity(3);
        assert!(!flowcap.has_capacity());

        // accumulated capacity should be at 0.25, capped at one time step
        flowcap.update_capacity(5);
        assert!(flowcap.has_capacity());
        assert_eq!(0.25, flowcap.accumulated_capacity);
    }

    #[test]
    fn flowcap_same_time_step_does_not_refill() {
        let mut flowcap = Flowcap::new(0.5);
        flowcap.update_capacity(3);
        flowcap.consume_capacity(1.0);

        flowcap.update_capacity(3);
        assert!(!flowcap.has_capacity());
    }
}

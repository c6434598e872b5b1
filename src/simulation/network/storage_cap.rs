use crate::simulation::network::capacity::SegmentCapacity;

/// StorageCap tracks changes in storage capacity for a segment of a link.
/// First of all it stores the maximum available storage capacity of the segment.
/// Also, consumed and released capacity during a simulation time step is tracked.
/// Once the time step is finished, the temporary bookkeeping can be applied to the overall
/// consumed capacity by using the 'apply_updates' method.
///
/// Consumed capacity can be queried immediately via 'currently_used', while released capacity
/// is treated separately. This is because we want vehicles which enter a segment consume capacity
/// immediately, but capacity freed by vehicles leaving a segment should only take effect in the
/// next simulation time step.
#[derive(Debug, Clone)]
pub struct StorageCap {
    max: f64,
    released: f64,
    consumed: f64,
    used: f64,
}

impl StorageCap {
    pub fn new(max: f64) -> Self {
        Self {
            max,
            released: 0.0,
            consumed: 0.0,
            used: 0.0,
        }
    }

    pub fn from_segment(segment: &SegmentCapacity) -> Self {
        // the segment needs to hold at least the vehicles of one time step. Otherwise, a segment
        // which is shorter than a vehicle would never accept anything.
        StorageCap::new(segment.storage_capacity.max(segment.simulated_flow_capacity))
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn currently_used(&self) -> f64 {
        self.used + self.consumed
    }

    pub fn released(&self) -> f64 {
        self.released
    }

    /// Consumes storage capacity on a segment
    ///
    /// This method should be called when a vehicle enters a segment.
    ///
    /// # Parameters
    /// * 'value' storage capacity to be consumed
    pub fn consume(&mut self, value: f64) {
        self.consumed += value;
    }

    /// Releases storage capacity on a segment
    ///
    /// This method should be called when a vehicle leaves a segment
    pub fn release(&mut self, value: f64) {
        self.released += value;
    }

    /// Applies consumed and released capacity during a simulated time step to the state of the storage capacity.
    /// Resets the released and consumed variables.
    pub fn apply_updates(&mut self) {
        self.used = 0f64.max(self.currently_used() - self.released);
        self.released = 0.0;
        self.consumed = 0.0;
    }

    /// Tests whether there is storage capacity available on the segment.
    pub fn is_available(&self) -> bool {
        let available_cap = self.max - self.currently_used();
        available_cap > 0.0
    }
}

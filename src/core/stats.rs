//! Simulation counters for debug overlays and logs

/// Running totals since the simulation was created
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationStats {
    /// Ticks simulated
    pub ticks: u64,
    /// Simulated seconds
    pub elapsed: f64,
    /// Perception passes run
    pub perception_passes: u64,
    /// Rays cast by perception (occlusion and field-of-view fans)
    pub rays_cast: u64,
    /// Doors enemies asked to open
    pub door_requests: u64,
    /// Patrol steps refused by the collision oracle
    pub collisions: u64,
}

impl SimulationStats {
    /// Create zeroed stats
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one tick
    pub fn record_tick(&mut self, dt: f32) {
        self.ticks += 1;
        self.elapsed += f64::from(dt);
    }

    /// Average rays per perception pass
    #[must_use]
    pub fn rays_per_pass(&self) -> f32 {
        if self.perception_passes == 0 {
            return 0.0;
        }
        self.rays_cast as f32 / self.perception_passes as f32
    }

    /// Get a formatted stats string
    #[must_use]
    pub fn format_stats(&self) -> String {
        format!(
            "Tick {} ({:.2}s) | Perception: {} passes, {:.1} rays/pass | Doors requested: {} | Blocked steps: {}",
            self.ticks,
            self.elapsed,
            self.perception_passes,
            self.rays_per_pass(),
            self.door_requests,
            self.collisions
        )
    }
}

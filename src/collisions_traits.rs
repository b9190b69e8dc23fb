use crate::kinematic_traits::Configuration;

/// A trait for detecting collisions of the active arm while the companion arm is at
/// some known configuration, and for measuring the clearance between the two arms.
///
/// # Requirements
/// - Implementations of this trait must be `Send` and `Sync` for concurrent safety.
pub trait CollisionDetector: Send + Sync {
    /// Checks whether the active arm at `active` collides with itself, with the static
    /// environment or with the companion arm at `companion`.
    ///
    /// # Returns
    /// * `true` if any collision occurs, otherwise `false`.
    fn collides(&self, active: &Configuration, companion: &Configuration) -> bool;

    /// Closest distance between the two arms, meters. Zero if they touch or penetrate.
    fn clearance(&self, active: &Configuration, companion: &Configuration) -> f64;

    /// Closest distance between the tool of the active arm and the companion arm.
    /// Detectors without a separate tool model report the whole arm clearance.
    fn tool_clearance(&self, active: &Configuration, companion: &Configuration) -> f64 {
        self.clearance(active, companion)
    }
}

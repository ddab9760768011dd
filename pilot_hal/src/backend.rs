//! Device bundle produced by a backend factory.

use pilot_common::hal::device::{Actuator, InputSource, MotionControl, Pneumatic};
use pilot_common::hal::display::DisplaySurface;

/// Every collaborator the control unit needs, as trait objects.
///
/// Ownership moves into the control unit's `RobotContext`, which decides
/// how each device is shared between threads.
pub struct Backend {
    /// Name of the driver that built this bundle (e.g. "simulation").
    pub driver: &'static str,
    /// Drivetrain and odometry.
    pub chassis: Box<dyn MotionControl>,
    /// Mechanism actuators, in `[mechanism] actuators` order.
    pub mechanism: Vec<Box<dyn Actuator>>,
    pub left_wing: Box<dyn Pneumatic>,
    pub right_wing: Box<dyn Pneumatic>,
    /// Primary operator controller.
    pub controller: Box<dyn InputSource>,
    /// Brain screen.
    pub display: Box<dyn DisplaySurface>,
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.mechanism.iter().map(|a| a.name()).collect();
        f.debug_struct("Backend")
            .field("driver", &self.driver)
            .field("mechanism", &names)
            .field("left_wing_extended", &self.left_wing.is_extended())
            .field("right_wing_extended", &self.right_wing.is_extended())
            .finish_non_exhaustive()
    }
}

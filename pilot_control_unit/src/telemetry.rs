//! Telemetry loop: live pose on the brain screen.
//!
//! Started once during `initialize` and left running for the rest of the
//! program. Each iteration samples the pose once, formats x, y and heading
//! to three decimals and sends the three label updates to the display
//! service. It stops only when the display service shuts down.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use pilot_common::hal::device::PoseSource;
use pilot_common::hal::display::{Align, ElementId, LabelText, Placement, fit_fmt};
use pilot_common::hal::error::DisplayError;
use pilot_common::robot::pose::Pose;
use tracing::{debug, info, warn};

use crate::cycle::Pacer;
use crate::display::DisplayHandle;

/// Thread name of the telemetry loop.
pub const THREAD_NAME: &str = "telemetry";

pub const X_PLACEMENT: Placement = Placement::new(Align::LeftMid, 0, 20);
pub const Y_PLACEMENT: Placement = Placement::new(Align::LeftMid, 0, 50);
pub const HEADING_PLACEMENT: Placement = Placement::new(Align::LeftMid, 0, 80);

/// `["X: …", "Y: …", "Theta: …"]`, three decimals each.
pub fn format_pose(pose: &Pose) -> [LabelText; 3] {
    [
        fit_fmt(format_args!("X: {:.3}", pose.x)),
        fit_fmt(format_args!("Y: {:.3}", pose.y)),
        fit_fmt(format_args!("Theta: {:.3}", pose.heading)),
    ]
}

/// The three pose labels. They live for the whole program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryLabels {
    pub x: ElementId,
    pub y: ElementId,
    pub heading: ElementId,
}

impl TelemetryLabels {
    pub fn create(display: &DisplayHandle) -> Result<Self, DisplayError> {
        Ok(Self {
            x: display.create_label(X_PLACEMENT)?,
            y: display.create_label(Y_PLACEMENT)?,
            heading: display.create_label(HEADING_PLACEMENT)?,
        })
    }

    /// Remove the three labels from the screen.
    pub fn destroy(&self, display: &DisplayHandle) -> Result<(), DisplayError> {
        for id in self.ids() {
            display.destroy(id)?;
        }
        Ok(())
    }

    fn ids(&self) -> [ElementId; 3] {
        [self.x, self.y, self.heading]
    }
}

pub struct TelemetryLoop {
    source: Arc<dyn PoseSource>,
    display: DisplayHandle,
    labels: TelemetryLabels,
    pacer: Pacer,
    iterations: u64,
}

impl TelemetryLoop {
    pub fn new(
        source: Arc<dyn PoseSource>,
        display: DisplayHandle,
        labels: TelemetryLabels,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            display,
            labels,
            pacer: Pacer::new(THREAD_NAME, interval),
            iterations: 0,
        }
    }

    #[inline]
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// One iteration without the sleep: sample, format, push.
    pub fn tick(&mut self) -> Result<Pose, DisplayError> {
        let pose = self.source.pose();
        for (id, text) in self.labels.ids().into_iter().zip(format_pose(&pose)) {
            self.display.set_fitted(id, text)?;
        }
        self.iterations += 1;
        Ok(pose)
    }

    /// Tick every interval until the display service stops.
    /// Returns the number of iterations completed.
    pub fn run(mut self) -> u64 {
        info!(
            interval_ms = self.pacer.period().as_millis() as u64,
            "Telemetry loop started"
        );
        loop {
            self.pacer.begin();
            match self.tick() {
                Ok(_) => {}
                Err(DisplayError::ServiceStopped) => break,
                Err(e) => warn!(error = %e, "Telemetry update failed"),
            }
            self.pacer.finish();
        }
        let stats = self.pacer.stats();
        debug!(
            avg_us = stats.avg_cycle_us(),
            max_us = stats.max_cycle_us,
            overruns = stats.overruns,
            "Telemetry cycle statistics"
        );
        info!(iterations = self.iterations, "Telemetry loop stopped");
        self.iterations
    }

    /// Run on a dedicated thread.
    pub fn spawn(self) -> io::Result<JoinHandle<u64>> {
        thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || self.run())
    }
}

impl std::fmt::Debug for TelemetryLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryLoop")
            .field("labels", &self.labels)
            .field("interval", &self.pacer.period())
            .field("iterations", &self.iterations)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayService;
    use parking_lot::Mutex;
    use pilot_common::robot::config::RobotConfig;
    use pilot_hal::drivers::simulation;

    /// Replays a fixed pose sequence, repeating the last one.
    struct ScriptedPose {
        poses: Mutex<Vec<Pose>>,
    }

    impl PoseSource for ScriptedPose {
        fn pose(&self) -> Pose {
            let mut poses = self.poses.lock();
            if poses.len() > 1 {
                poses.remove(0)
            } else {
                poses[0]
            }
        }
    }

    #[test]
    fn formats_three_decimals() {
        let [x, y, heading] = format_pose(&Pose::new(1.23456, -0.5, 359.9996));
        assert_eq!(x.as_str(), "X: 1.235");
        assert_eq!(y.as_str(), "Y: -0.500");
        assert_eq!(heading.as_str(), "Theta: 360.000");
    }

    #[test]
    fn huge_values_are_truncated() {
        let [x, ..] = format_pose(&Pose::new(1e40, 0.0, 0.0));
        assert_eq!(x.len(), pilot_common::consts::LABEL_TEXT_CAPACITY);
        assert!(x.starts_with("X: 1000"));
    }

    #[test]
    fn each_tick_reflects_its_own_sample() {
        let (backend, probe) = simulation::build(&RobotConfig::default()).unwrap();
        let service = DisplayService::spawn(backend.display, Duration::from_millis(2)).unwrap();
        let display = service.handle();
        let labels = TelemetryLabels::create(&display).unwrap();

        let poses = vec![
            Pose::new(0.0, 0.0, 0.0),
            Pose::new(1.0, 2.0, 90.0),
            Pose::new(-3.25, 4.5, 180.125),
        ];
        let source = Arc::new(ScriptedPose {
            poses: Mutex::new(poses.clone()),
        });
        let mut telemetry = TelemetryLoop::new(
            source,
            display.clone(),
            labels,
            Duration::from_millis(20),
        );

        for expected in &poses {
            assert_eq!(telemetry.tick().unwrap(), *expected);
            display.sync().unwrap();
            let [x, y, heading] = format_pose(expected);
            assert_eq!(probe.display.text(labels.x).unwrap(), x.as_str());
            assert_eq!(probe.display.text(labels.y).unwrap(), y.as_str());
            assert_eq!(probe.display.text(labels.heading).unwrap(), heading.as_str());
        }
        assert_eq!(telemetry.iterations(), 3);
        assert_eq!(probe.display.text_writes(), 9);
    }

    #[test]
    fn thread_exits_when_display_stops() {
        let (backend, _probe) = simulation::build(&RobotConfig::default()).unwrap();
        let service = DisplayService::spawn(backend.display, Duration::from_millis(2)).unwrap();
        let display = service.handle();
        let labels = TelemetryLabels::create(&display).unwrap();
        let source = Arc::new(ScriptedPose {
            poses: Mutex::new(vec![Pose::ORIGIN]),
        });
        let handle = TelemetryLoop::new(source, display, labels, Duration::from_millis(5))
            .spawn()
            .unwrap();

        thread::sleep(Duration::from_millis(30));
        service.shutdown();
        let iterations = handle.join().unwrap();
        assert!(iterations >= 1);
    }

    #[test]
    fn destroy_removes_all_labels() {
        let (backend, probe) = simulation::build(&RobotConfig::default()).unwrap();
        let service = DisplayService::spawn(backend.display, Duration::from_millis(2)).unwrap();
        let display = service.handle();
        let labels = TelemetryLabels::create(&display).unwrap();
        display.sync().unwrap();
        assert_eq!(probe.display.element_count(), 3);

        labels.destroy(&display).unwrap();
        display.sync().unwrap();
        assert_eq!(probe.display.element_count(), 0);
    }
}

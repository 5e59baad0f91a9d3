//! Application layer: actors, reconciliation and the distribution loop

pub mod actor;
pub mod distribution;
pub mod reconciler;

pub use actor::{ActorHandle, ActorReport, ControlMessage, Enqueue};
pub use distribution::{
    ChangeNotifier, DistributionLoop, DistroHandle, DistroSignals, LoopExit, RegistrationsChanged,
    ShutdownReason,
};
pub use reconciler::{FanOut, ReconcileSummary, Reconciler};

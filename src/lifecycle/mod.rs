//! Buildpack lifecycle contract
//!
//! Detect writes a build plan; build reads the resolved plan, contributes
//! layers under the layers directory and may declare launch processes.

pub mod plan;
pub mod platform;
pub mod result;

pub use plan::{
    BuildPlan, BuildPlanProvide, BuildPlanRequire, BuildpackPlan, BuildpackPlanEntry,
    DetectResult, PlanEntryResolver,
};
pub use platform::Platform;
pub use result::{BuildResult, ProcessDefinition};

/// Exit code of a passing detect or a completed build
pub const SUCCESS: u8 = 0;
/// Exit code of a detect that does not apply
pub const DETECT_FAIL: u8 = 100;
/// Exit code of any error
pub const ERROR: u8 = 1;

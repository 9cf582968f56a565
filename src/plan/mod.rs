//! Load planning: distribution, subfeed projection, overload detection, and
//! the system summary.

pub mod assignment;
pub mod distribute;
pub mod overload;
pub mod projection;
pub mod summary;

pub use assignment::{Assignment, PduLoad};
pub use distribute::{DistributionResult, STEP_KW, distribute};
pub use overload::{LoadBand, Warning, WarningCategory, advisories, overload_check};
pub use projection::{SharingMode, SubfeedLoad, subfeed_loads};
pub use summary::{PlanSummary, SystemStatus};

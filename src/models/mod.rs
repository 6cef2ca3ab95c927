pub mod event;
pub mod git;
pub mod hook;
pub mod session;
pub mod snapshot;

pub use event::{LogEvent, MessageContent};
pub use git::GitInfo;
pub use hook::HookJson;
pub use session::{SessionScan, SessionSize, SessionSummary, SizeLevel};
pub use snapshot::UsageSnapshot;

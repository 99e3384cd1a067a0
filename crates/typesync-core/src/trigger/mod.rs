//! Trigger source implementations
//!
//! Two mutually exclusive sources of regeneration requests:
//! - [`IntervalTrigger`]: periodic timer (`UPDATE_INTERVAL` configured)
//! - [`WatchTrigger`]: recursive filesystem watcher (default)
//!
//! Both yield [`crate::TriggerEvent`] streams and stop when the stream is
//! dropped.

pub mod interval;
pub mod watch;

pub use interval::IntervalTrigger;
pub use watch::WatchTrigger;

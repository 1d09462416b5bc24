//! Convenience re-exports for harness users.

pub use crate::assert;
pub use crate::errors::{AssertResult, Failure};
pub use crate::registry::{Harness, Suite};
pub use crate::report::{ConsoleSink, Level, LogBuffer, LogSink};
pub use crate::runner::RunSummary;
pub use crate::stub::{Stub, TestCtx};
pub use crate::value::{deep_equal, Value};

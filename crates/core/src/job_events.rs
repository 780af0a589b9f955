//! Event type names published on the event bus as jobs move through
//! their lifecycle.

/// A pending record was written and the job was queued.
pub const EVENT_JOB_STARTED: &str = "job.started";

/// The pipeline finished and the record is `complete`.
pub const EVENT_JOB_COMPLETED: &str = "job.completed";

/// The pipeline hit an unexpected error; the record is `failed`.
pub const EVENT_JOB_FAILED: &str = "job.failed";

/// A poll handed a completed job's payload to the active item.
pub const EVENT_JOB_PROMOTED: &str = "job.promoted";

/// The reaper removed a stale record.
pub const EVENT_JOB_EVICTED: &str = "job.evicted";

/// A job finished after its record was already gone; the result was dropped.
pub const EVENT_JOB_DISCARDED: &str = "job.discarded";

use chrono::{DateTime, Utc};

use super::{with_controller, CliResult};

/// Tick to `now` and print the report.
pub fn status(now: DateTime<Utc>) -> CliResult {
    with_controller(now, |_, _| Ok(None))
}

pub fn lock(now: DateTime<Utc>) -> CliResult {
    with_controller(now, |ctl, _| Ok(Some(ctl.lock())))
}

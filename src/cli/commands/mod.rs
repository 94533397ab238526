//! CLI command implementations
//!
//! Every command returns a process exit code:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Run completed, some entities failed to export |
//! | 2 | Configuration error |
//! | 3 | Halted by the integrity gate |
//! | 4 | Database unreachable |
//! | 5 | Fatal error |

pub mod check;
pub mod export;
pub mod init;
pub mod validate;

use crate::adapters::audit_file::DailyFileEventLog;
use crate::config::VigilConfig;
use crate::core::audit::{CompositeEventLog, TracingEventLog};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PARTIAL: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;
pub const EXIT_HALTED: i32 = 3;
pub const EXIT_CONNECTIVITY: i32 = 4;
pub const EXIT_FATAL: i32 = 5;

/// Audit trail for a command: the daily audit file (when enabled) plus tracing
pub fn build_event_log(config: &VigilConfig) -> CompositeEventLog {
    let log = CompositeEventLog::new().with(TracingEventLog);
    if config.audit.enabled {
        log.with(DailyFileEventLog::new(&config.audit.log_dir))
    } else {
        log
    }
}

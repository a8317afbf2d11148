//! Session / Suite / Case / Check 四层上下文
//!
//! 每一层是一个扁平的记录：开始时即可读取身份信息，结论类字段在结束前查询会得到
//! `UsageFault`。子级上下文持有父级的共享引用，生命周期不超过创建它的作用域。

mod case;
mod check;
mod fault;
mod session;
mod stats;
mod suite;

pub use case::{CaseContext, Verdict};
pub use check::CheckContext;
pub use fault::{Fault, FaultKind};
pub use session::SessionContext;
pub use stats::{CaseStats, CheckStats};
pub use suite::{DEFAULT_SUITE, SuiteContext};

pub(crate) use suite::SuiteSummary;

use chrono::{DateTime, Local};
use std::time::{Duration, Instant};

/// 结束时间戳
#[derive(Debug, Clone, Copy)]
struct Finish {
    finished_at: DateTime<Local>,
    elapsed: Duration,
}

impl Finish {
    fn since(started: Instant) -> Self {
        Self {
            finished_at: Local::now(),
            elapsed: started.elapsed(),
        }
    }
}

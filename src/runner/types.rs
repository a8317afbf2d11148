use serde::Serialize;
use std::time::Duration;

use crate::check::{Abort, Location};
use crate::context::{CaseStats, CheckStats, Fault, SessionContext};

/// 一次运行的最终结果
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub session_name: String,
    pub stats: CaseStats,
    pub checks: CheckStats,
    pub suites_total: usize,
    pub suites_executed: usize,
    pub suites_errored: usize,
    pub fatal: Option<Fault>,
    pub elapsed: Duration,
    pub all_passed: bool,
}

impl RunSummary {
    pub(crate) fn from_session(session: &SessionContext) -> Self {
        Self {
            session_name: session.name().to_string(),
            stats: session.stats().copied().unwrap_or_default(),
            checks: session.checks().copied().unwrap_or_default(),
            suites_total: session.suites_total(),
            suites_executed: session.suites_executed().unwrap_or_default(),
            suites_errored: session.suites_errored().unwrap_or_default(),
            fatal: session.fatal_error().ok().flatten().cloned(),
            elapsed: session.elapsed().unwrap_or_default(),
            all_passed: session.is_passed().unwrap_or(false),
        }
    }

    /// 进程退出码：全部通过为 0，否则为 1
    pub fn exit_code(&self) -> i32 {
        if self.all_passed { 0 } else { 1 }
    }
}

/// Case 内部的 SANITY 失败向外层扩散
#[derive(Debug, Clone)]
pub(crate) struct Escalation {
    pub abort: Abort,
    pub fault: Fault,
}

/// 单个 Case 的执行结果
#[derive(Debug, Clone)]
pub(crate) struct CaseReport {
    pub passed: bool,
    pub checks: CheckStats,
    pub escalation: Option<Escalation>,
}

/// Suite 体中声明过的 Case
#[derive(Debug, Clone)]
pub(crate) struct Declared {
    pub name: String,
    pub location: Location,
}

/// 一轮重放中目标位置的结果
#[derive(Debug)]
pub(crate) enum PassCase {
    Filtered,
    Ran(CaseReport),
}

/// 一轮重放触发的 Suite / Session 中止
#[derive(Debug, Clone)]
pub(crate) struct Halt {
    pub abort: Abort,
    pub fault: Fault,
    /// 目标 Case 执行之前（Setup 阶段）触发
    pub on_start: bool,
}

#[derive(Debug)]
pub(crate) struct PassOutcome {
    pub case: Option<PassCase>,
    pub halt: Option<Halt>,
}

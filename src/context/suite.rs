use chrono::{DateTime, Local};
use std::time::{Duration, Instant};

use crate::check::Location;
use crate::context::{CaseStats, CheckStats, Fault, Finish, SessionContext};
use crate::error::UsageFault;

/// 独立 Case 所在的默认 Suite 名称
pub const DEFAULT_SUITE: &str = "DEFAULT";

/// Suite 结束后交给 Session 汇总的数据
#[derive(Debug, Clone, Default)]
pub(crate) struct SuiteSummary {
    pub stats: CaseStats,
    pub checks: CheckStats,
    pub error_on_start: bool,
    pub aborted: bool,
}

/// 一个 Suite 的上下文
#[derive(Debug)]
pub struct SuiteContext<'a> {
    session: &'a SessionContext,
    index: usize,
    name: String,
    location: Option<Location>,
    started_at: DateTime<Local>,
    started: Instant,

    stats: CaseStats,
    checks: CheckStats,
    startup_fault: Option<Fault>,
    abort_fault: Option<Fault>,
    finish: Option<Finish>,
}

impl<'a> SuiteContext<'a> {
    pub(crate) fn begin(
        session: &'a SessionContext,
        index: usize,
        name: impl Into<String>,
        location: Option<Location>,
    ) -> Self {
        Self {
            session,
            index,
            name: name.into(),
            location,
            started_at: Local::now(),
            started: Instant::now(),
            stats: CaseStats::default(),
            checks: CheckStats::default(),
            startup_fault: None,
            abort_fault: None,
            finish: None,
        }
    }

    /// 所属 Session
    pub fn session(&self) -> &SessionContext {
        self.session
    }

    /// 在 Session 中的序号（DEFAULT 为 0）
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// DEFAULT Suite 没有源码位置
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_SUITE && self.location.is_none()
    }

    pub fn is_finalized(&self) -> bool {
        self.finish.is_some()
    }

    fn finished(&self, field: &'static str) -> Result<&Finish, UsageFault> {
        self.finish.as_ref().ok_or(UsageFault::new("suite", field))
    }

    pub fn finished_at(&self) -> Result<DateTime<Local>, UsageFault> {
        Ok(self.finished("finished_at")?.finished_at)
    }

    pub fn elapsed(&self) -> Result<Duration, UsageFault> {
        Ok(self.finished("elapsed")?.elapsed)
    }

    pub fn stats(&self) -> Result<&CaseStats, UsageFault> {
        self.finished("stats")?;
        Ok(&self.stats)
    }

    pub fn checks(&self) -> Result<&CheckStats, UsageFault> {
        self.finished("checks")?;
        Ok(&self.checks)
    }

    /// Setup 阶段失败（SANITY suite/session 或 panic），没有正常的通过/失败统计
    pub fn is_error_on_start(&self) -> Result<bool, UsageFault> {
        self.finished("is_error_on_start")?;
        Ok(self.startup_fault.is_some())
    }

    pub fn startup_fault(&self) -> Result<Option<&Fault>, UsageFault> {
        self.finished("startup_fault")?;
        Ok(self.startup_fault.as_ref())
    }

    /// Case 或 Teardown 阶段触发的中止
    pub fn abort_fault(&self) -> Result<Option<&Fault>, UsageFault> {
        self.finished("abort_fault")?;
        Ok(self.abort_fault.as_ref())
    }

    pub fn is_passed(&self) -> Result<bool, UsageFault> {
        self.finished("is_passed")?;
        Ok(self.startup_fault.is_none() && self.abort_fault.is_none() && self.stats.failed == 0)
    }

    pub fn is_failed(&self) -> Result<bool, UsageFault> {
        self.finished("is_failed")?;
        Ok(self.startup_fault.is_none() && (self.abort_fault.is_some() || self.stats.failed > 0))
    }

    pub(crate) fn set_total(&mut self, total: usize) {
        self.stats.total = total;
    }

    pub(crate) fn record_case(&mut self, passed: bool, checks: &CheckStats) {
        self.stats.record(passed);
        self.checks.absorb(checks);
    }

    pub(crate) fn record_errored(&mut self) {
        self.stats.errored += 1;
    }

    pub(crate) fn record_skipped(&mut self) {
        self.stats.skipped += 1;
    }

    pub(crate) fn fail_on_start(&mut self, fault: Fault) {
        self.startup_fault.get_or_insert(fault);
    }

    pub(crate) fn abort(&mut self, fault: Fault) {
        self.abort_fault.get_or_insert(fault);
    }

    pub(crate) fn finish(&mut self) {
        if self.finish.is_none() {
            self.finish = Some(Finish::since(self.started));
        }
    }

    pub(crate) fn summary(&self) -> SuiteSummary {
        SuiteSummary {
            stats: self.stats,
            checks: self.checks,
            error_on_start: self.startup_fault.is_some(),
            aborted: self.abort_fault.is_some(),
        }
    }
}

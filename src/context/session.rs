use chrono::{DateTime, Local};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::context::suite::SuiteSummary;
use crate::context::{CaseStats, CheckStats, Fault, Finish};
use crate::error::UsageFault;

/// 整个测试运行的上下文
///
/// 开始时即可读取的字段：名称、id、开始时间、Suite 总数。
/// 其余字段要等 Session 结束后才能读取，否则返回 `UsageFault`。
#[derive(Debug)]
pub struct SessionContext {
    id: Uuid,
    name: String,
    started_at: DateTime<Local>,
    started: Instant,
    suites_total: usize,
    fail_on_startup_fault: bool,

    stats: CaseStats,
    checks: CheckStats,
    suites_executed: usize,
    suites_errored: usize,
    fatal: Option<Fault>,
    finish: Option<Finish>,
}

impl SessionContext {
    pub(crate) fn start(
        name: Option<String>,
        suites_total: usize,
        fail_on_startup_fault: bool,
    ) -> Self {
        let started_at = Local::now();
        let name = name.unwrap_or_else(|| {
            format!("session {}", started_at.format("%Y-%m-%d %H:%M:%S"))
        });

        Self {
            id: Uuid::new_v4(),
            name,
            started_at,
            started: Instant::now(),
            suites_total,
            fail_on_startup_fault,
            stats: CaseStats::default(),
            checks: CheckStats::default(),
            suites_executed: 0,
            suites_errored: 0,
            fatal: None,
            finish: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Session 名称（未配置时由开始时间生成）
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// 发现的 Suite 数量（包含 DEFAULT）
    pub fn suites_total(&self) -> usize {
        self.suites_total
    }

    pub fn is_finalized(&self) -> bool {
        self.finish.is_some()
    }

    fn finished(&self, field: &'static str) -> Result<&Finish, UsageFault> {
        self.finish
            .as_ref()
            .ok_or(UsageFault::new("session", field))
    }

    pub fn finished_at(&self) -> Result<DateTime<Local>, UsageFault> {
        Ok(self.finished("finished_at")?.finished_at)
    }

    /// 总执行时间
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

    pub fn suites_executed(&self) -> Result<usize, UsageFault> {
        self.finished("suites_executed")?;
        Ok(self.suites_executed)
    }

    /// 启动失败或被中止的 Suite 数量
    pub fn suites_errored(&self) -> Result<usize, UsageFault> {
        self.finished("suites_errored")?;
        Ok(self.suites_errored)
    }

    /// SANITY (session) 失败的详情
    pub fn fatal_error(&self) -> Result<Option<&Fault>, UsageFault> {
        self.finished("fatal_error")?;
        Ok(self.fatal.as_ref())
    }

    pub fn is_passed(&self) -> Result<bool, UsageFault> {
        self.finished("is_passed")?;
        Ok(self.all_passed())
    }

    pub fn is_failed(&self) -> Result<bool, UsageFault> {
        self.finished("is_failed")?;
        Ok(!self.all_passed())
    }

    fn all_passed(&self) -> bool {
        let strict_ok =
            !self.fail_on_startup_fault || (self.stats.errored == 0 && self.suites_errored == 0);
        self.stats.failed == 0 && self.fatal.is_none() && strict_ok
    }

    pub(crate) fn is_halted(&self) -> bool {
        self.fatal.is_some()
    }

    pub(crate) fn record_suite(&mut self, summary: &SuiteSummary) {
        self.stats.absorb(&summary.stats);
        self.checks.absorb(&summary.checks);
        self.suites_executed += 1;
        if summary.error_on_start || summary.aborted {
            self.suites_errored += 1;
        }
    }

    pub(crate) fn mark_fatal(&mut self, fault: Fault) {
        self.fatal.get_or_insert(fault);
    }

    pub(crate) fn finish(&mut self) {
        if self.finish.is_none() {
            self.finish = Some(Finish::since(self.started));
        }
    }
}

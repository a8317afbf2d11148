use serde::Serialize;
use std::time::{Duration, Instant};

use crate::check::Location;
use crate::context::{CheckStats, Fault, SuiteContext};
use crate::error::UsageFault;

/// Case 的结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Passed,
    Failed,
    /// 测试体没有执行（例如重复注册）
    ErrorOnStart,
}

#[derive(Debug)]
struct CaseResult {
    verdict: Verdict,
    checks: CheckStats,
    fault: Option<Fault>,
    elapsed: Duration,
}

/// 一个 Case 的上下文
#[derive(Debug)]
pub struct CaseContext<'a> {
    suite: &'a SuiteContext<'a>,
    index: usize,
    name: String,
    location: Location,
    started: Instant,
    result: Option<CaseResult>,
}

impl<'a> CaseContext<'a> {
    pub(crate) fn begin(
        suite: &'a SuiteContext<'a>,
        index: usize,
        name: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            suite,
            index,
            name: name.into(),
            location,
            started: Instant::now(),
            result: None,
        }
    }

    /// 所属 Suite
    pub fn suite(&self) -> &SuiteContext<'a> {
        self.suite
    }

    /// 在 Suite 中声明的位置
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn is_finalized(&self) -> bool {
        self.result.is_some()
    }

    fn result(&self, field: &'static str) -> Result<&CaseResult, UsageFault> {
        self.result.as_ref().ok_or(UsageFault::new("case", field))
    }

    pub fn verdict(&self) -> Result<Verdict, UsageFault> {
        Ok(self.result("verdict")?.verdict)
    }

    pub fn is_passed(&self) -> Result<bool, UsageFault> {
        Ok(self.result("is_passed")?.verdict == Verdict::Passed)
    }

    pub fn is_failed(&self) -> Result<bool, UsageFault> {
        Ok(self.result("is_failed")?.verdict == Verdict::Failed)
    }

    pub fn is_error_on_start(&self) -> Result<bool, UsageFault> {
        Ok(self.result("is_error_on_start")?.verdict == Verdict::ErrorOnStart)
    }

    pub fn checks(&self) -> Result<&CheckStats, UsageFault> {
        Ok(&self.result("checks")?.checks)
    }

    /// 终止 Case 的失败；没有终止性失败时为第一个 EXPECT 失败
    pub fn fault(&self) -> Result<Option<&Fault>, UsageFault> {
        Ok(self.result("fault")?.fault.as_ref())
    }

    pub fn elapsed(&self) -> Result<Duration, UsageFault> {
        Ok(self.result("elapsed")?.elapsed)
    }

    pub(crate) fn finish(&mut self, failed: bool, checks: CheckStats, fault: Option<Fault>) {
        let verdict = if failed {
            Verdict::Failed
        } else {
            Verdict::Passed
        };
        self.result = Some(CaseResult {
            verdict,
            checks,
            fault,
            elapsed: self.started.elapsed(),
        });
    }

    pub(crate) fn fail_on_start(&mut self, fault: Fault) {
        self.result = Some(CaseResult {
            verdict: Verdict::ErrorOnStart,
            checks: CheckStats::default(),
            fault: Some(fault),
            elapsed: Duration::ZERO,
        });
    }
}

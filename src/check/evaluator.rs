use crate::check::types::{Abort, CheckInvocation, Flow, Severity};
use crate::context::{CheckStats, Fault};

/// 检查之后的控制流
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    AbortCase,
    AbortSuite,
    AbortSession,
}

impl Control {
    pub fn abort(self) -> Option<Abort> {
        match self {
            Self::Continue => None,
            Self::AbortCase => Some(Abort::Case),
            Self::AbortSuite => Some(Abort::Suite),
            Self::AbortSession => Some(Abort::Session),
        }
    }

    /// 转换为可以用 `?` 传播的 `Flow`
    pub fn into_flow(self) -> Flow {
        match self.abort() {
            Some(abort) => Err(abort),
            None => Ok(()),
        }
    }
}

impl From<Abort> for Control {
    fn from(abort: Abort) -> Self {
        match abort {
            Abort::Case => Self::AbortCase,
            Abort::Suite => Self::AbortSuite,
            Abort::Session => Self::AbortSession,
        }
    }
}

/// 一次检查的判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub severity: Severity,
    pub passed: bool,
    /// 是否通知 Reporter
    pub reported: bool,
    /// 是否计入检查统计
    pub counted: bool,
    /// 是否将所在 Case 标记为失败
    pub fails_case: bool,
    pub control: Control,
}

/// 按严重级别判定一次检查
///
/// | 级别 | 通过 | 失败 |
/// |---|---|---|
/// | EXPECT | 记录，继续 | 记录，Case 失败，继续 |
/// | ASSERT | 记录，继续 | 记录，Case 失败，中止 Case |
/// | SANITY (case) | 继续 | Case 失败，中止 Case |
/// | SANITY (suite) | 继续 | 中止 Suite |
/// | SANITY (session) | 继续 | 中止 Session |
///
/// SANITY 检查既不通知 Reporter 也不计入统计。
pub fn decide(severity: Severity, outcome: bool) -> Decision {
    let reported = !severity.is_sanity();

    if outcome {
        return Decision {
            severity,
            passed: true,
            reported,
            counted: reported,
            fails_case: false,
            control: Control::Continue,
        };
    }

    let control = severity
        .abort_scope()
        .map(Control::from)
        .unwrap_or(Control::Continue);

    Decision {
        severity,
        passed: false,
        reported,
        counted: reported,
        fails_case: true,
        control,
    }
}

/// 单个 Case 执行期间的检查状态
#[derive(Debug, Default)]
pub struct CaseState {
    checks: CheckStats,
    failed: bool,
    fault: Option<Fault>,
    aborted: Option<Abort>,
}

impl CaseState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 将判定结果折叠进状态
    pub fn record(&mut self, decision: &Decision, check: &CheckInvocation) {
        if decision.counted {
            self.checks.record(decision.passed);
        }
        if decision.fails_case {
            self.fail_with(Fault::from_check(decision.severity, check));
        }
        if let Some(abort) = decision.control.abort() {
            self.aborted.get_or_insert(abort);
        }
    }

    /// 标记失败；Case 只会失败一次，终止性的失败优先于 EXPECT 失败
    pub fn fail_with(&mut self, fault: Fault) {
        self.failed = true;
        let replace = match &self.fault {
            None => true,
            Some(existing) => !existing.is_terminating() && fault.is_terminating(),
        };
        if replace {
            self.fault = Some(fault);
        }
    }

    /// 已经发出的中止信号
    pub fn aborted(&self) -> Option<Abort> {
        self.aborted
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn checks(&self) -> CheckStats {
        self.checks
    }

    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    pub fn into_fault(self) -> Option<Fault> {
        self.fault
    }
}

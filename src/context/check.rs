use crate::check::{CheckInvocation, Location, Operand, Operands, Severity};
use crate::context::CaseContext;
use crate::error::UsageFault;

/// 一次检查的上下文，只在一对 before/after 通知期间存在
#[derive(Debug)]
pub struct CheckContext<'a> {
    case: &'a CaseContext<'a>,
    severity: Severity,
    invocation: &'a CheckInvocation,
    finalized: bool,
}

impl<'a> CheckContext<'a> {
    pub(crate) fn begin(
        case: &'a CaseContext<'a>,
        severity: Severity,
        invocation: &'a CheckInvocation,
    ) -> Self {
        Self {
            case,
            severity,
            invocation,
            finalized: false,
        }
    }

    /// 所属 Case
    pub fn case(&self) -> &CaseContext<'a> {
        self.case
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// 条件的源码文本
    pub fn condition(&self) -> &str {
        &self.invocation.condition
    }

    pub fn operands(&self) -> Option<&Operands> {
        self.invocation.operands.as_ref()
    }

    pub fn arguments(&self) -> &[Operand] {
        &self.invocation.arguments
    }

    pub fn location(&self) -> Location {
        self.invocation.location
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn is_passed(&self) -> Result<bool, UsageFault> {
        if !self.finalized {
            return Err(UsageFault::new("check", "is_passed"));
        }
        Ok(self.invocation.outcome)
    }

    pub fn is_failed(&self) -> Result<bool, UsageFault> {
        Ok(!self.is_passed().map_err(|_| UsageFault::new("check", "is_failed"))?)
    }

    /// 期望值（比较运算时为 `op rhs`）
    pub fn expected(&self) -> Result<Option<String>, UsageFault> {
        if !self.finalized {
            return Err(UsageFault::new("check", "expected"));
        }
        Ok(self.invocation.expected())
    }

    /// 实际值（比较运算时为左值）
    pub fn actual(&self) -> Result<Option<&str>, UsageFault> {
        if !self.finalized {
            return Err(UsageFault::new("check", "actual"));
        }
        Ok(self.invocation.actual())
    }

    pub(crate) fn finish(&mut self) {
        self.finalized = true;
    }
}

use serde::Serialize;
use std::any::Any;
use std::fmt;

use crate::check::{Abort, CheckInvocation, Location, Severity};

/// 测试结果层面的失败分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// EXPECT 失败，Case 继续执行
    ExpectationFailure,
    /// ASSERT 失败，中止当前 Case
    AssertionFailure,
    /// SANITY 失败，中止对应作用域
    SanityFailure(Abort),
    /// 测试体内未捕获的 panic
    UncaughtFault,
    /// Suite 或 Case 在测试体执行之前就失败了
    StartupFault,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExpectationFailure => write!(f, "expectation failure"),
            Self::AssertionFailure => write!(f, "assertion failure"),
            Self::SanityFailure(scope) => write!(f, "sanity failure ({})", scope),
            Self::UncaughtFault => write!(f, "uncaught fault"),
            Self::StartupFault => write!(f, "startup fault"),
        }
    }
}

/// 失败详情
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fault {
    pub kind: FaultKind,
    pub message: String,
    pub location: Option<Location>,
}

impl Fault {
    pub fn new(kind: FaultKind, message: impl Into<String>, location: Option<Location>) -> Self {
        Self {
            kind,
            message: message.into(),
            location,
        }
    }

    /// 由失败的检查生成
    pub fn from_check(severity: Severity, check: &CheckInvocation) -> Self {
        let kind = match severity {
            Severity::Expect => FaultKind::ExpectationFailure,
            Severity::Assert => FaultKind::AssertionFailure,
            Severity::SanityCase => FaultKind::SanityFailure(Abort::Case),
            Severity::SanitySuite => FaultKind::SanityFailure(Abort::Suite),
            Severity::SanitySession => FaultKind::SanityFailure(Abort::Session),
        };

        let message = match &check.operands {
            Some(o) => format!(
                "Expected {} {} {}, but got {}",
                o.lhs.text, o.op, o.rhs.rendered, o.lhs.rendered
            ),
            None if !check.arguments.is_empty() => {
                let rendered: Vec<&str> =
                    check.arguments.iter().map(|a| a.rendered.as_str()).collect();
                format!(
                    "Condition failed: {} with ({})",
                    check.condition,
                    rendered.join(", ")
                )
            }
            None => format!("Condition failed: {}", check.condition),
        };

        Self::new(kind, message, Some(check.location))
    }

    /// 由 panic payload 生成
    pub fn uncaught(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            format!("panicked: {}", s)
        } else if let Some(s) = payload.downcast_ref::<String>() {
            format!("panicked: {}", s)
        } else {
            "panicked with unknown panic payload".to_string()
        };
        Self::new(FaultKind::UncaughtFault, message, None)
    }

    pub fn startup(message: impl Into<String>, location: Option<Location>) -> Self {
        Self::new(FaultKind::StartupFault, message, location)
    }

    /// 除 EXPECT 以外的失败都会终止所在的 Case
    pub fn is_terminating(&self) -> bool {
        self.kind != FaultKind::ExpectationFailure
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(location) = &self.location {
            write!(f, " ({})", location)?;
        }
        Ok(())
    }
}

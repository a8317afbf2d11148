use chrono::{DateTime, Local};
use serde::Serialize;
use std::io::Write;
use uuid::Uuid;

use crate::check::{Location, Operand, Operands, Severity};
use crate::context::{
    CaseContext, CaseStats, CheckContext, CheckStats, Fault, SessionContext, SuiteContext, Verdict,
};
use crate::error::{Result, RuunitError};
use crate::reporter::Reporter;

/// 一行 JSON 对应的事件
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Record<'a> {
    SessionStart {
        id: Uuid,
        name: &'a str,
        started_at: DateTime<Local>,
        suites_total: usize,
    },
    SessionEnd {
        id: Uuid,
        name: &'a str,
        passed: bool,
        stats: &'a CaseStats,
        checks: &'a CheckStats,
        suites_executed: usize,
        suites_errored: usize,
        elapsed_ms: u128,
        #[serde(skip_serializing_if = "Option::is_none")]
        fatal: Option<&'a Fault>,
    },
    SuiteStart {
        suite: &'a str,
        index: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        location: Option<Location>,
    },
    SuiteEnd {
        suite: &'a str,
        passed: bool,
        error_on_start: bool,
        stats: &'a CaseStats,
        checks: &'a CheckStats,
        elapsed_ms: u128,
        #[serde(skip_serializing_if = "Option::is_none")]
        startup_fault: Option<&'a Fault>,
        #[serde(skip_serializing_if = "Option::is_none")]
        abort_fault: Option<&'a Fault>,
    },
    CaseStart {
        suite: &'a str,
        case: &'a str,
        index: usize,
        location: Location,
    },
    CaseEnd {
        suite: &'a str,
        case: &'a str,
        verdict: Verdict,
        checks: &'a CheckStats,
        elapsed_ms: u128,
        #[serde(skip_serializing_if = "Option::is_none")]
        fault: Option<&'a Fault>,
    },
    CheckStart {
        suite: &'a str,
        case: &'a str,
        severity: Severity,
        condition: &'a str,
        location: Location,
    },
    CheckEnd {
        suite: &'a str,
        case: &'a str,
        severity: Severity,
        passed: bool,
        condition: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        operands: Option<&'a Operands>,
        #[serde(skip_serializing_if = "<[Operand]>::is_empty")]
        arguments: &'a [Operand],
        location: Location,
    },
    FatalError {
        fault: &'a Fault,
    },
    Step {
        suite: &'a str,
        case: &'a str,
        text: &'a str,
    },
    Message {
        suite: &'a str,
        case: &'a str,
        text: &'a str,
    },
}

/// JSON Lines 输出，每个事件一行
///
/// 写入失败之后不再输出，第一个错误可以通过 [`JsonReporter::finish`] 取回。
pub struct JsonReporter<W: Write> {
    out: W,
    error: Option<RuunitError>,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// 结束输出，返回底层 writer 或第一个写入错误
    pub fn finish(mut self) -> Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn write(&mut self, record: &Record<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn emit(&mut self, record: Result<Record<'_>>) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = record.and_then(|record| self.write(&record)) {
            tracing::warn!(error = %err, "json reporter stopped");
            self.error = Some(err);
        }
    }
}

fn session_end<'a>(session: &'a SessionContext) -> Result<Record<'a>> {
    Ok(Record::SessionEnd {
        id: session.id(),
        name: session.name(),
        passed: session.is_passed()?,
        stats: session.stats()?,
        checks: session.checks()?,
        suites_executed: session.suites_executed()?,
        suites_errored: session.suites_errored()?,
        elapsed_ms: session.elapsed()?.as_millis(),
        fatal: session.fatal_error()?,
    })
}

fn suite_end<'a>(suite: &'a SuiteContext<'_>) -> Result<Record<'a>> {
    Ok(Record::SuiteEnd {
        suite: suite.name(),
        passed: suite.is_passed()?,
        error_on_start: suite.is_error_on_start()?,
        stats: suite.stats()?,
        checks: suite.checks()?,
        elapsed_ms: suite.elapsed()?.as_millis(),
        startup_fault: suite.startup_fault()?,
        abort_fault: suite.abort_fault()?,
    })
}

fn case_end<'a>(case: &'a CaseContext<'_>) -> Result<Record<'a>> {
    Ok(Record::CaseEnd {
        suite: case.suite().name(),
        case: case.name(),
        verdict: case.verdict()?,
        checks: case.checks()?,
        elapsed_ms: case.elapsed()?.as_millis(),
        fault: case.fault()?,
    })
}

fn check_end<'a>(check: &'a CheckContext<'_>) -> Result<Record<'a>> {
    Ok(Record::CheckEnd {
        suite: check.case().suite().name(),
        case: check.case().name(),
        severity: check.severity(),
        passed: check.is_passed()?,
        condition: check.condition(),
        operands: check.operands(),
        arguments: check.arguments(),
        location: check.location(),
    })
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn on_session_start(&mut self, session: &SessionContext) {
        let record = Record::SessionStart {
            id: session.id(),
            name: session.name(),
            started_at: session.started_at(),
            suites_total: session.suites_total(),
        };
        self.emit(Ok(record));
    }

    fn on_session_end(&mut self, session: &SessionContext) {
        self.emit(session_end(session));
        if self.error.is_none()
            && let Err(err) = self.out.flush()
        {
            self.error = Some(err.into());
        }
    }

    fn on_suite_start(&mut self, suite: &SuiteContext<'_>) {
        let record = Record::SuiteStart {
            suite: suite.name(),
            index: suite.index(),
            location: suite.location(),
        };
        self.emit(Ok(record));
    }

    fn on_suite_end(&mut self, suite: &SuiteContext<'_>) {
        self.emit(suite_end(suite));
    }

    fn on_case_start(&mut self, case: &CaseContext<'_>) {
        let record = Record::CaseStart {
            suite: case.suite().name(),
            case: case.name(),
            index: case.index(),
            location: case.location(),
        };
        self.emit(Ok(record));
    }

    fn on_case_end(&mut self, case: &CaseContext<'_>) {
        self.emit(case_end(case));
    }

    fn on_check_start(&mut self, check: &CheckContext<'_>) {
        let record = Record::CheckStart {
            suite: check.case().suite().name(),
            case: check.case().name(),
            severity: check.severity(),
            condition: check.condition(),
            location: check.location(),
        };
        self.emit(Ok(record));
    }

    fn on_check_end(&mut self, check: &CheckContext<'_>) {
        self.emit(check_end(check));
    }

    fn on_fatal_error(&mut self, fault: &Fault) {
        self.emit(Ok(Record::FatalError { fault }));
    }

    fn on_step(&mut self, case: &CaseContext<'_>, text: &str) {
        let record = Record::Step {
            suite: case.suite().name(),
            case: case.name(),
            text,
        };
        self.emit(Ok(record));
    }

    fn on_message(&mut self, case: &CaseContext<'_>, text: &str) {
        let record = Record::Message {
            suite: case.suite().name(),
            case: case.name(),
            text,
        };
        self.emit(Ok(record));
    }
}

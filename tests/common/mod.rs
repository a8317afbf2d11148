#![allow(dead_code)]

use ruunit::context::CaseStats;
use ruunit::{
    CaseContext, CheckContext, Fault, FaultKind, Reporter, SessionContext, Severity,
    SuiteContext, Verdict,
};

/// Reporter 收到的事件
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    SessionStart {
        name: String,
    },
    SessionEnd {
        passed: bool,
    },
    SuiteStart {
        suite: String,
    },
    SuiteEnd {
        suite: String,
        passed: bool,
        error_on_start: bool,
        aborted: bool,
        stats: CaseStats,
    },
    CaseStart {
        suite: String,
        case: String,
    },
    CaseEnd {
        suite: String,
        case: String,
        verdict: Verdict,
        fault: Option<FaultKind>,
        message: Option<String>,
    },
    CheckStart {
        case: String,
        condition: String,
    },
    CheckEnd {
        case: String,
        condition: String,
        severity: Severity,
        passed: bool,
    },
    Fatal {
        kind: FaultKind,
    },
    Step {
        text: String,
    },
    Message {
        text: String,
    },
}

/// 记录所有事件的 Reporter
///
/// 同时检查结论类字段在结束之前确实不可读取。
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub events: Vec<Event>,
    /// 结束前读取结论字段时没有得到 UsageFault 的次数
    pub leaked_early_reads: usize,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suite_end(&self, name: &str) -> Option<&Event> {
        self.events
            .iter()
            .find(|e| matches!(e, Event::SuiteEnd { suite, .. } if suite == name))
    }

    pub fn case_end(&self, suite_name: &str, case_name: &str) -> Option<&Event> {
        self.events.iter().find(|e| {
            matches!(e, Event::CaseEnd { suite, case, .. } if suite == suite_name && case == case_name)
        })
    }

    pub fn verdict(&self, suite: &str, case: &str) -> Option<Verdict> {
        match self.case_end(suite, case)? {
            Event::CaseEnd { verdict, .. } => Some(*verdict),
            _ => None,
        }
    }

    pub fn suite_names(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::SuiteStart { suite } => Some(suite.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn cases_started(&self, suite_name: &str) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::CaseStart { suite, case } if suite == suite_name => Some(case.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn check_ends(&self) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::CheckEnd { .. }))
            .collect()
    }

    /// 事件严格嵌套：session ⊃ suite ⊃ case ⊃ check
    pub fn assert_nesting(&self) {
        let mut stack: Vec<&'static str> = Vec::new();
        for event in &self.events {
            match event {
                Event::SessionStart { .. } => {
                    assert!(stack.is_empty(), "session started inside {:?}", stack);
                    stack.push("session");
                }
                Event::SuiteStart { .. } => {
                    assert_eq!(stack.last(), Some(&"session"));
                    stack.push("suite");
                }
                Event::CaseStart { .. } => {
                    assert_eq!(stack.last(), Some(&"suite"));
                    stack.push("case");
                }
                Event::CheckStart { .. } => {
                    assert_eq!(stack.last(), Some(&"case"));
                    stack.push("check");
                }
                Event::CheckEnd { .. } => assert_eq!(stack.pop(), Some("check")),
                Event::CaseEnd { .. } => assert_eq!(stack.pop(), Some("case")),
                Event::SuiteEnd { .. } => assert_eq!(stack.pop(), Some("suite")),
                Event::SessionEnd { .. } => assert_eq!(stack.pop(), Some("session")),
                Event::Fatal { .. } => assert_eq!(stack.last(), Some(&"session")),
                Event::Step { .. } | Event::Message { .. } => {
                    assert_eq!(stack.last(), Some(&"case"))
                }
            }
        }
        assert!(stack.is_empty(), "unterminated scopes: {:?}", stack);
    }
}

impl Reporter for RecordingReporter {
    fn on_session_start(&mut self, session: &SessionContext) {
        if session.is_passed().is_ok() || session.stats().is_ok() {
            self.leaked_early_reads += 1;
        }
        self.events.push(Event::SessionStart {
            name: session.name().to_string(),
        });
    }

    fn on_session_end(&mut self, session: &SessionContext) {
        self.events.push(Event::SessionEnd {
            passed: session.is_passed().unwrap(),
        });
    }

    fn on_suite_start(&mut self, suite: &SuiteContext<'_>) {
        if suite.is_passed().is_ok() || suite.elapsed().is_ok() {
            self.leaked_early_reads += 1;
        }
        self.events.push(Event::SuiteStart {
            suite: suite.name().to_string(),
        });
    }

    fn on_suite_end(&mut self, suite: &SuiteContext<'_>) {
        self.events.push(Event::SuiteEnd {
            suite: suite.name().to_string(),
            passed: suite.is_passed().unwrap(),
            error_on_start: suite.is_error_on_start().unwrap(),
            aborted: suite.abort_fault().unwrap().is_some(),
            stats: *suite.stats().unwrap(),
        });
    }

    fn on_case_start(&mut self, case: &CaseContext<'_>) {
        if case.is_passed().is_ok() || case.verdict().is_ok() {
            self.leaked_early_reads += 1;
        }
        self.events.push(Event::CaseStart {
            suite: case.suite().name().to_string(),
            case: case.name().to_string(),
        });
    }

    fn on_case_end(&mut self, case: &CaseContext<'_>) {
        let fault = case.fault().unwrap();
        self.events.push(Event::CaseEnd {
            suite: case.suite().name().to_string(),
            case: case.name().to_string(),
            verdict: case.verdict().unwrap(),
            fault: fault.map(|f| f.kind),
            message: fault.map(|f| f.message.clone()),
        });
    }

    fn on_check_start(&mut self, check: &CheckContext<'_>) {
        if check.is_passed().is_ok() {
            self.leaked_early_reads += 1;
        }
        self.events.push(Event::CheckStart {
            case: check.case().name().to_string(),
            condition: check.condition().to_string(),
        });
    }

    fn on_check_end(&mut self, check: &CheckContext<'_>) {
        self.events.push(Event::CheckEnd {
            case: check.case().name().to_string(),
            condition: check.condition().to_string(),
            severity: check.severity(),
            passed: check.is_passed().unwrap(),
        });
    }

    fn on_fatal_error(&mut self, fault: &Fault) {
        self.events.push(Event::Fatal { kind: fault.kind });
    }

    fn on_step(&mut self, _case: &CaseContext<'_>, text: &str) {
        self.events.push(Event::Step {
            text: text.to_string(),
        });
    }

    fn on_message(&mut self, _case: &CaseContext<'_>, text: &str) {
        self.events.push(Event::Message {
            text: text.to_string(),
        });
    }
}

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;
use std::thread;
use tracing::{debug, error, warn};

use crate::check::{
    Abort, CaseState, CheckInvocation, Flow, Location, Severity, decide,
};
use crate::context::{CaseContext, CheckContext, Fault, FaultKind, SuiteContext};
use crate::reporter::Reporter;
use crate::runner::filter::Filter;
use crate::runner::types::{CaseReport, Declared, Escalation, Halt, PassCase, PassOutcome};

thread_local! {
    /// 当前线程是否处于 [`catch_panic`] 之内
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
}

/// 安装一次全局 panic hook：被捕获的 panic 只写 debug 日志，其余交给原来的 hook
fn install_panic_hook() {
    static INSTALLED: Once = Once::new();
    INSTALLED.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CAPTURING.with(Cell::get) {
                debug!(%info, "panic captured");
            } else {
                previous(info);
            }
        }));
    });
}

/// 执行 `f` 并捕获 panic，不向 stderr 输出默认的 panic 信息
pub(crate) fn catch_panic<R>(f: impl FnOnce() -> R) -> thread::Result<R> {
    install_panic_hook();
    let outer = CAPTURING.with(|c| c.replace(true));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    CAPTURING.with(|c| c.set(outer));
    result
}

/// 正在执行的 Case，测试体通过它发起检查
pub struct CaseRun<'r> {
    case: &'r CaseContext<'r>,
    reporter: &'r mut dyn Reporter,
    state: CaseState,
}

impl<'r> CaseRun<'r> {
    pub(crate) fn new(case: &'r CaseContext<'r>, reporter: &'r mut dyn Reporter) -> Self {
        Self {
            case,
            reporter,
            state: CaseState::new(),
        }
    }

    /// 当前 Case 的上下文
    pub fn context(&self) -> &CaseContext<'r> {
        self.case
    }

    /// 按严重级别执行一次检查
    ///
    /// 已经发出中止信号之后，后续检查不再求值，直接返回同一个中止信号。
    pub fn check(&mut self, severity: Severity, invocation: CheckInvocation) -> Flow {
        if let Some(abort) = self.state.aborted() {
            debug!(
                case = self.case.name(),
                condition = %invocation.condition,
                "check skipped after abort"
            );
            return Err(abort);
        }

        let decision = decide(severity, invocation.outcome);

        if decision.reported {
            let mut check = CheckContext::begin(self.case, severity, &invocation);
            self.reporter.on_check_start(&check);
            check.finish();
            self.reporter.on_check_end(&check);
        }

        if !decision.passed && severity.is_sanity() {
            warn!(
                case = self.case.name(),
                severity = %severity,
                condition = %invocation.condition,
                location = %invocation.location,
                "sanity check failed"
            );
        }

        self.state.record(&decision, &invocation);
        decision.control.into_flow()
    }

    /// EXPECT：失败时 Case 失败，但继续执行
    pub fn expect(&mut self, invocation: CheckInvocation) {
        let _ = self.check(Severity::Expect, invocation);
    }

    /// ASSERT：失败时中止当前 Case
    pub fn assert(&mut self, invocation: CheckInvocation) -> Flow {
        self.check(Severity::Assert, invocation)
    }

    /// SANITY：失败时中止当前 Case，不输出
    pub fn sanity(&mut self, invocation: CheckInvocation) -> Flow {
        self.check(Severity::SanityCase, invocation)
    }

    pub fn sanity_for_suite(&mut self, invocation: CheckInvocation) -> Flow {
        self.check(Severity::SanitySuite, invocation)
    }

    pub fn sanity_for_session(&mut self, invocation: CheckInvocation) -> Flow {
        self.check(Severity::SanitySession, invocation)
    }

    /// 报告测试步骤
    pub fn step(&mut self, text: &str) {
        self.reporter.on_step(self.case, text);
    }

    /// 报告一条消息
    pub fn message(&mut self, text: &str) {
        self.reporter.on_message(self.case, text);
    }

    /// 目前为止是否已经失败
    pub fn is_failed(&self) -> bool {
        self.state.is_failed()
    }
}

/// 执行一个 Case：通知 Reporter，捕获 panic，最终确定结论
pub(crate) fn execute_case<F>(
    suite: &SuiteContext<'_>,
    reporter: &mut dyn Reporter,
    index: usize,
    name: &str,
    location: Location,
    body: F,
) -> CaseReport
where
    F: FnOnce(&mut CaseRun<'_>) -> Flow,
{
    let mut case = CaseContext::begin(suite, index, name, location);
    debug!(suite = suite.name(), case = name, index, "case started");
    reporter.on_case_start(&case);

    let (mut state, result) = {
        let mut run = CaseRun::new(&case, &mut *reporter);
        let result = catch_panic(|| body(&mut run));
        (run.state, result)
    };

    let signaled = match result {
        Ok(Ok(())) => None,
        Ok(Err(abort)) => {
            if !state.is_failed() {
                // 测试体主动返回中止信号，但没有失败的检查
                state.fail_with(Fault::new(
                    FaultKind::AssertionFailure,
                    format!("case body aborted the {}", abort),
                    Some(location),
                ));
            }
            Some(abort)
        }
        Err(payload) => {
            let fault = Fault::uncaught(&*payload);
            error!(suite = suite.name(), case = name, %fault, "uncaught fault in case");
            state.fail_with(fault);
            None
        }
    };

    let abort = state.aborted().or(signaled);
    let failed = state.is_failed();
    let checks = state.checks();
    let fault = state.into_fault();

    let escalation = match abort {
        Some(abort @ (Abort::Suite | Abort::Session)) => {
            // 越过 Case 边界的只能是对应作用域的 SanityFailure
            let fault = match &fault {
                Some(fault) if fault.kind == FaultKind::SanityFailure(abort) => fault.clone(),
                _ => Fault::new(
                    FaultKind::SanityFailure(abort),
                    format!("case '{}' aborted the {}", name, abort),
                    Some(location),
                ),
            };
            Some(Escalation { abort, fault })
        }
        _ => None,
    };

    case.finish(failed, checks, fault);
    debug!(suite = suite.name(), case = name, passed = !failed, "case finished");
    reporter.on_case_end(&case);

    CaseReport {
        passed: !failed,
        checks,
        escalation,
    }
}

/// 报告一个无法执行的 Case（重复名称、重放时未到达等）
pub(crate) fn report_startup_fault(
    suite: &SuiteContext<'_>,
    reporter: &mut dyn Reporter,
    index: usize,
    name: &str,
    location: Location,
    fault: Fault,
) {
    warn!(suite = suite.name(), case = name, %fault, "case failed on start");
    let mut case = CaseContext::begin(suite, index, name, location);
    reporter.on_case_start(&case);
    case.fail_on_start(fault);
    reporter.on_case_end(&case);
}

/// Suite 体的一次重放
///
/// `case(..)` 只在目标位置执行测试体，其余位置只记录名称和位置。
pub struct SuiteRun<'r> {
    suite: &'r SuiteContext<'r>,
    reporter: &'r mut dyn Reporter,
    filter: &'r dyn Filter,
    declared: &'r mut Vec<Declared>,
    target: usize,
    position: usize,
    teardown_on_setup_abort: bool,
    case: Option<PassCase>,
    halt: Option<Halt>,
}

impl<'r> SuiteRun<'r> {
    pub(crate) fn new(
        suite: &'r SuiteContext<'r>,
        reporter: &'r mut dyn Reporter,
        filter: &'r dyn Filter,
        declared: &'r mut Vec<Declared>,
        target: usize,
        teardown_on_setup_abort: bool,
    ) -> Self {
        Self {
            suite,
            reporter,
            filter,
            declared,
            target,
            position: 0,
            teardown_on_setup_abort,
            case: None,
            halt: None,
        }
    }

    /// 当前 Suite 的上下文
    pub fn context(&self) -> &SuiteContext<'r> {
        self.suite
    }

    /// 声明一个 Case；只有目标位置会执行 `body`
    #[track_caller]
    pub fn case<F>(&mut self, name: &str, body: F)
    where
        F: FnOnce(&mut CaseRun<'_>) -> Flow,
    {
        let location = Location::caller();
        let index = self.position;
        self.position += 1;

        if index >= self.declared.len() {
            self.declared.push(Declared {
                name: name.to_string(),
                location,
            });
        }

        if index != self.target || self.case.is_some() || self.halt.is_some() {
            return;
        }

        if !self.filter.accepts(self.suite.name(), name) {
            debug!(suite = self.suite.name(), case = name, "case filtered out");
            self.case = Some(PassCase::Filtered);
            return;
        }

        let report = execute_case(
            self.suite,
            &mut *self.reporter,
            index,
            name,
            location,
            body,
        );
        if let Some(escalation) = &report.escalation {
            self.latch(Halt {
                abort: escalation.abort,
                fault: escalation.fault.clone(),
                on_start: false,
            });
        }
        self.case = Some(PassCase::Ran(report));
    }

    /// SANITY (suite)：在 Setup / Teardown 中使用，失败时中止整个 Suite
    pub fn sanity_for_suite(&mut self, invocation: CheckInvocation) -> Flow {
        self.sanity(Severity::SanitySuite, invocation)
    }

    /// SANITY (session)：失败时中止整个 Session
    pub fn sanity_for_session(&mut self, invocation: CheckInvocation) -> Flow {
        self.sanity(Severity::SanitySession, invocation)
    }

    fn sanity(&mut self, severity: Severity, invocation: CheckInvocation) -> Flow {
        let decision = decide(severity, invocation.outcome);
        let Some(abort) = decision.control.abort() else {
            return Ok(());
        };

        let on_start = self.case.is_none();
        let fault = Fault::from_check(severity, &invocation);
        warn!(
            suite = self.suite.name(),
            severity = %severity,
            phase = phase(on_start),
            %fault,
            "suite sanity check failed"
        );
        self.latch(Halt {
            abort,
            fault,
            on_start,
        });

        if on_start && self.teardown_on_setup_abort {
            // 继续执行 Teardown，后续的 case(..) 都不会执行
            Ok(())
        } else {
            Err(abort)
        }
    }

    /// 记录中止；更大作用域的中止优先
    fn latch(&mut self, halt: Halt) {
        let replace = match &self.halt {
            None => true,
            Some(existing) => halt.abort > existing.abort,
        };
        if replace {
            self.halt = Some(halt);
        }
    }

    /// 结束本轮重放，`result` 是 Suite 体的返回值
    pub(crate) fn finish(mut self, result: thread::Result<Flow>) -> PassOutcome {
        let on_start = self.case.is_none();

        match result {
            Ok(Ok(())) => {}
            Ok(Err(abort)) => {
                if self.halt.is_none() {
                    let abort = abort.max(Abort::Suite);
                    self.latch(Halt {
                        abort,
                        fault: Fault::new(
                            FaultKind::SanityFailure(abort),
                            format!("suite body aborted the {}", abort),
                            self.suite.location(),
                        ),
                        on_start,
                    });
                }
            }
            Err(payload) => {
                let fault = Fault::uncaught(&*payload);
                error!(
                    suite = self.suite.name(),
                    phase = phase(on_start),
                    %fault,
                    "uncaught fault in suite body"
                );
                if self.halt.is_none() {
                    self.halt = Some(Halt {
                        abort: Abort::Suite,
                        fault,
                        on_start,
                    });
                }
            }
        }

        PassOutcome {
            case: self.case,
            halt: self.halt,
        }
    }
}

fn phase(on_start: bool) -> &'static str {
    if on_start { "setup" } else { "teardown" }
}

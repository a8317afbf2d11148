use std::collections::HashSet;
use tracing::{debug, error, info, warn};

use crate::check::Abort;
use crate::config::RunConfig;
use crate::context::{DEFAULT_SUITE, Fault, SessionContext, SuiteContext, SuiteSummary};
use crate::registry::{HasLocation, HasName, Registry, TestCase, TestSuite};
use crate::reporter::Reporter;
use crate::runner::filter::{AcceptAll, Filter};
use crate::runner::replay::{SuiteRun, catch_panic, execute_case, report_startup_fault};
use crate::runner::types::{Declared, PassCase, RunSummary};

/// 测试引擎：按注册顺序执行注册表中的全部单元
pub struct TestEngine<'a> {
    registry: &'a Registry,
    config: RunConfig,
    filter: Box<dyn Filter + 'a>,
}

impl<'a> TestEngine<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            config: RunConfig::default(),
            filter: Box::new(AcceptAll),
        }
    }

    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_filter(mut self, filter: impl Filter + 'a) -> Self {
        self.filter = Box::new(filter);
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// 执行整个 Session
    pub fn run(&self, reporter: &mut dyn Reporter) -> RunSummary {
        let mut session = SessionContext::start(
            self.config.session_name.clone(),
            self.registry.suites_total(),
            self.config.fail_on_startup_fault,
        );
        info!(
            session = session.name(),
            suites = session.suites_total(),
            "test session started"
        );
        reporter.on_session_start(&session);

        let mut seen: HashSet<&str> = HashSet::new();

        // 独立 Case 组成的 DEFAULT Suite 最先执行
        if self.registry.case_count() > 0 {
            seen.insert(DEFAULT_SUITE);
            if self.filter.accepts_suite(DEFAULT_SUITE) {
                let (summary, fatal) = self.run_default_suite(&session, reporter);
                session.record_suite(&summary);
                if let Some(fault) = fatal {
                    halt_session(&mut session, reporter, fault);
                }
            } else {
                debug!(suite = DEFAULT_SUITE, "suite filtered out");
            }
        }

        for (offset, suite) in self.registry.suites().enumerate() {
            if session.is_halted() {
                break;
            }
            if !self.filter.accepts_suite(suite.name()) {
                debug!(suite = suite.name(), "suite filtered out");
                continue;
            }

            let fresh = seen.insert(suite.name());
            let (summary, fatal) = self.run_suite(&session, offset + 1, suite, fresh, reporter);
            session.record_suite(&summary);
            if let Some(fault) = fatal {
                halt_session(&mut session, reporter, fault);
            }
        }

        session.finish();
        let summary = RunSummary::from_session(&session);
        info!(
            session = session.name(),
            executed = summary.stats.executed,
            passed = summary.stats.passed,
            failed = summary.stats.failed,
            errored = summary.stats.errored,
            skipped = summary.stats.skipped,
            all_passed = summary.all_passed,
            "test session finished"
        );
        reporter.on_session_end(&session);
        summary
    }

    /// 执行 DEFAULT Suite：每个独立 Case 单独执行
    fn run_default_suite(
        &self,
        session: &SessionContext,
        reporter: &mut dyn Reporter,
    ) -> (SuiteSummary, Option<Fault>) {
        let mut suite = SuiteContext::begin(session, 0, DEFAULT_SUITE, None);
        suite.set_total(self.registry.case_count());
        info!(suite = DEFAULT_SUITE, cases = self.registry.case_count(), "suite started");
        reporter.on_suite_start(&suite);

        let mut names: HashSet<&str> = HashSet::new();
        let mut fatal = None;

        for (index, unit) in self.registry.cases().enumerate() {
            let name = unit.name();

            if !names.insert(name) {
                let fault = Fault::startup(
                    format!("duplicate case name '{}'", name),
                    Some(unit.location()),
                );
                report_startup_fault(&suite, reporter, index, name, unit.location(), fault);
                suite.record_errored();
                continue;
            }

            if !self.filter.accepts(DEFAULT_SUITE, name) {
                debug!(suite = DEFAULT_SUITE, case = name, "case filtered out");
                suite.record_skipped();
                continue;
            }

            let report = execute_case(&suite, reporter, index, name, unit.location(), |run| {
                unit.run(run)
            });
            suite.record_case(report.passed, &report.checks);

            if let Some(escalation) = report.escalation {
                match escalation.abort {
                    Abort::Session => {
                        suite.abort(escalation.fault.clone());
                        fatal = Some(escalation.fault);
                        break;
                    }
                    _ => {
                        // 独立 Case 自成一个作用域，DEFAULT 继续执行
                        warn!(
                            suite = DEFAULT_SUITE,
                            case = name,
                            fault = %escalation.fault,
                            "suite-scope abort in a standalone case"
                        );
                    }
                }
            }
        }

        end_suite(suite, reporter, fatal)
    }

    /// 按重放算法执行一个 Suite
    ///
    /// 第一轮（目标位置 0）发现全部 Case，之后每个位置各重放一次 Suite 体。
    fn run_suite(
        &self,
        session: &SessionContext,
        index: usize,
        unit: &'static dyn TestSuite,
        fresh: bool,
        reporter: &mut dyn Reporter,
    ) -> (SuiteSummary, Option<Fault>) {
        let mut suite = SuiteContext::begin(session, index, unit.name(), Some(unit.location()));
        info!(suite = unit.name(), location = %unit.location(), "suite started");
        reporter.on_suite_start(&suite);

        if !fresh {
            let fault = Fault::startup(
                format!("duplicate suite name '{}'", unit.name()),
                Some(unit.location()),
            );
            warn!(suite = unit.name(), %fault, "suite failed on start");
            suite.fail_on_start(fault);
            return end_suite(suite, reporter, None);
        }

        let mut declared: Vec<Declared> = Vec::new();
        let mut fatal = None;
        let mut target = 0;

        loop {
            if target > 0 {
                if target >= declared.len() {
                    break;
                }

                let current = &declared[target];

                // 重复的 Case 名称不执行
                if declared[..target].iter().any(|d| d.name == current.name) {
                    let fault = Fault::startup(
                        format!("duplicate case name '{}'", current.name),
                        Some(current.location),
                    );
                    report_startup_fault(
                        &suite,
                        reporter,
                        target,
                        &current.name,
                        current.location,
                        fault,
                    );
                    suite.record_errored();
                    target += 1;
                    continue;
                }

                // 被过滤的位置不需要重放
                if !self.filter.accepts(suite.name(), &current.name) {
                    debug!(suite = suite.name(), case = %current.name, "case filtered out");
                    suite.record_skipped();
                    target += 1;
                    continue;
                }
            }

            debug!(suite = suite.name(), target, "replay pass");
            let outcome = {
                let mut run = SuiteRun::new(
                    &suite,
                    &mut *reporter,
                    &*self.filter,
                    &mut declared,
                    target,
                    self.config.teardown_on_setup_abort,
                );
                let result = catch_panic(|| unit.run(&mut run));
                run.finish(result)
            };

            match outcome.case {
                Some(PassCase::Ran(report)) => suite.record_case(report.passed, &report.checks),
                Some(PassCase::Filtered) => suite.record_skipped(),
                None if outcome.halt.is_none() && target < declared.len() => {
                    // Suite 体在这一轮没有走到目标位置
                    let missed = &declared[target];
                    let fault = Fault::startup(
                        format!("case '{}' was not reached during replay", missed.name),
                        Some(missed.location),
                    );
                    report_startup_fault(
                        &suite,
                        reporter,
                        target,
                        &missed.name,
                        missed.location,
                        fault,
                    );
                    suite.record_errored();
                }
                None => {}
            }

            if let Some(halt) = outcome.halt {
                if halt.on_start {
                    warn!(suite = suite.name(), fault = %halt.fault, "suite failed on start");
                    suite.fail_on_start(halt.fault.clone());
                } else {
                    warn!(suite = suite.name(), fault = %halt.fault, "suite aborted");
                    suite.abort(halt.fault.clone());
                }
                if halt.abort == Abort::Session {
                    fatal = Some(halt.fault);
                }
                break;
            }

            target += 1;
        }

        suite.set_total(declared.len());
        end_suite(suite, reporter, fatal)
    }
}

fn end_suite(
    mut suite: SuiteContext<'_>,
    reporter: &mut dyn Reporter,
    fatal: Option<Fault>,
) -> (SuiteSummary, Option<Fault>) {
    suite.finish();
    let summary = suite.summary();
    info!(
        suite = suite.name(),
        total = summary.stats.total,
        passed = summary.stats.passed,
        failed = summary.stats.failed,
        errored = summary.stats.errored,
        skipped = summary.stats.skipped,
        "suite finished"
    );
    reporter.on_suite_end(&suite);
    (summary, fatal)
}

fn halt_session(session: &mut SessionContext, reporter: &mut dyn Reporter, fault: Fault) {
    error!(session = session.name(), %fault, "session aborted");
    reporter.on_fatal_error(&fault);
    session.mark_fatal(fault);
}

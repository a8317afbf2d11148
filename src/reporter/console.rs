use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};
use std::fmt::Display;
use std::io::Write;
use std::time::Duration;

use crate::context::{
    CaseContext, CaseStats, CheckContext, Fault, FaultKind, SessionContext, SuiteContext, Verdict,
};
use crate::reporter::Reporter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SuiteStatus {
    Passed,
    Failed,
    ErrorOnStart,
    Aborted,
}

impl SuiteStatus {
    fn label(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::ErrorOnStart => "error on start",
            Self::Aborted => "aborted",
        }
    }

    fn color(&self) -> Color {
        match self {
            Self::Passed => Color::Green,
            Self::Failed | Self::Aborted => Color::Red,
            Self::ErrorOnStart => Color::Yellow,
        }
    }
}

/// 汇总表中的一行
#[derive(Debug, Clone)]
struct SuiteRow {
    name: String,
    stats: CaseStats,
    elapsed: Duration,
    status: SuiteStatus,
}

/// 终端输出
///
/// 每个 Case 一行结论；失败的检查总是输出，verbose 模式下也输出通过的检查和步骤。
/// Session 结束时打印统计和每个 Suite 的汇总表。
pub struct ConsoleReporter<W: Write> {
    out: W,
    verbose: bool,
    /// 当前 Case 的检查、步骤和消息，在 Case 结论之后输出
    details: Vec<String>,
    rows: Vec<SuiteRow>,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self {
            out,
            verbose,
            details: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    // 输出失败不影响测试执行
    fn line(&mut self, text: impl Display) {
        let _ = writeln!(self.out, "{}", text);
    }

    fn flush_details(&mut self) {
        for detail in std::mem::take(&mut self.details) {
            self.line(detail);
        }
    }

    fn print_summary(&mut self, session: &SessionContext) {
        let (Ok(stats), Ok(checks), Ok(elapsed), Ok(passed)) = (
            session.stats(),
            session.checks(),
            session.elapsed(),
            session.is_passed(),
        ) else {
            return;
        };

        self.line(format!("\n{}", "━".repeat(50)));
        self.line("Summary".bold());
        self.line("━".repeat(50));

        let mut parts = vec![format!("{} passed", stats.passed.to_string().green())];
        if stats.failed > 0 {
            parts.push(format!("{} failed", stats.failed.to_string().red()));
        }
        if stats.errored > 0 {
            parts.push(format!("{} errored", stats.errored.to_string().yellow()));
        }
        if stats.skipped > 0 {
            parts.push(format!("{} skipped", stats.skipped.to_string().dimmed()));
        }
        parts.push(format!("{} total", stats.total));
        self.line(format!("  {}: {}", "Tests".bold(), parts.join(", ")));

        if checks.total() > 0 {
            if checks.failed == 0 {
                self.line(format!(
                    "  {}: {} passed, {} total",
                    "Checks".bold(),
                    checks.passed.to_string().green(),
                    checks.total()
                ));
            } else {
                self.line(format!(
                    "  {}: {} passed, {} failed, {} total",
                    "Checks".bold(),
                    checks.passed.to_string().green(),
                    checks.failed.to_string().red(),
                    checks.total()
                ));
            }
        }

        if let (Ok(executed), Ok(errored)) = (session.suites_executed(), session.suites_errored())
        {
            self.line(format!(
                "  {}: {} executed, {} errored, {} total",
                "Suites".bold(),
                executed,
                errored,
                session.suites_total()
            ));
        }

        self.line(format!(
            "  {}: {:.3}s",
            "Duration".bold(),
            elapsed.as_secs_f64()
        ));

        if !self.rows.is_empty() {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL).set_header(vec![
                "Suite", "Total", "Passed", "Failed", "Errored", "Skipped", "Duration", "Status",
            ]);

            for row in &self.rows {
                table.add_row(vec![
                    Cell::new(&row.name).add_attribute(Attribute::Bold),
                    Cell::new(row.stats.total),
                    Cell::new(row.stats.passed),
                    Cell::new(row.stats.failed),
                    Cell::new(row.stats.errored),
                    Cell::new(row.stats.skipped),
                    Cell::new(format!("{}ms", row.elapsed.as_millis())),
                    Cell::new(row.status.label()).fg(row.status.color()),
                ]);
            }
            self.line(format!("\n{}", table));
        }

        let verdict = if passed {
            "PASSED".green().bold()
        } else {
            "FAILED".red().bold()
        };
        self.line(format!("\n  {}: {}\n", session.name(), verdict));
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn on_session_start(&mut self, session: &SessionContext) {
        self.line(format!(
            "\nRunning {} suites in {}...\n",
            session.suites_total(),
            session.name().bold()
        ));
    }

    fn on_session_end(&mut self, session: &SessionContext) {
        self.print_summary(session);
        let _ = self.out.flush();
    }

    fn on_suite_start(&mut self, suite: &SuiteContext<'_>) {
        match suite.location() {
            Some(location) => self.line(format!(
                "{} {}",
                suite.name().bold(),
                location.to_string().dimmed()
            )),
            None => self.line(suite.name().bold()),
        }
    }

    fn on_suite_end(&mut self, suite: &SuiteContext<'_>) {
        let (Ok(stats), Ok(elapsed)) = (suite.stats(), suite.elapsed()) else {
            return;
        };

        let status = if let Ok(Some(fault)) = suite.startup_fault() {
            self.line(format!(
                " {} suite failed on start: {}",
                "⊘".yellow(),
                fault
            ));
            SuiteStatus::ErrorOnStart
        } else if let Ok(Some(fault)) = suite.abort_fault() {
            self.line(format!(" {} suite aborted: {}", "✗".red(), fault));
            SuiteStatus::Aborted
        } else if stats.failed > 0 {
            SuiteStatus::Failed
        } else {
            SuiteStatus::Passed
        };

        self.rows.push(SuiteRow {
            name: suite.name().to_string(),
            stats: *stats,
            elapsed,
            status,
        });
        self.line("");
    }

    fn on_case_start(&mut self, _case: &CaseContext<'_>) {
        self.details.clear();
    }

    fn on_case_end(&mut self, case: &CaseContext<'_>) {
        let elapsed = case.elapsed().map(|d| d.as_millis()).unwrap_or_default();

        match case.verdict() {
            Ok(Verdict::Passed) => self.line(format!(
                " {} [{}] {} ({}ms)",
                "✓".green(),
                case.index(),
                case.name(),
                elapsed
            )),
            Ok(Verdict::Failed) => {
                self.line(format!(
                    " {} [{}] {} ({}ms)",
                    "✗".red(),
                    case.index(),
                    case.name(),
                    elapsed
                ));
                // 失败的检查已经在明细里了，只补充没有对应检查的失败
                if let Ok(Some(fault)) = case.fault()
                    && (self.details.is_empty() || fault.kind == FaultKind::UncaughtFault)
                {
                    self.line(format!("   {}: {}", "Error".red().bold(), fault));
                }
            }
            Ok(Verdict::ErrorOnStart) => {
                self.line(format!(
                    " {} [{}] {} {}",
                    "⊘".yellow(),
                    case.index(),
                    case.name(),
                    "(error on start)".dimmed()
                ));
                if let Ok(Some(fault)) = case.fault() {
                    self.line(format!("   {}: {}", "Error".red().bold(), fault));
                }
            }
            Err(_) => self.line(format!(" ? [{}] {}", case.index(), case.name())),
        }

        self.flush_details();
    }

    fn on_check_start(&mut self, _check: &CheckContext<'_>) {}

    fn on_check_end(&mut self, check: &CheckContext<'_>) {
        let passed = check.is_passed().unwrap_or(false);
        if passed && !self.verbose {
            return;
        }

        let symbol = if passed { "✓".green() } else { "✗".red() };
        self.details.push(format!(
            "     {} {} {}",
            symbol,
            check.severity().as_str().dimmed(),
            check.condition()
        ));

        if passed {
            return;
        }

        if let (Ok(Some(expected)), Ok(Some(actual))) = (check.expected(), check.actual()) {
            self.details.push(format!(
                "       {}",
                format!("expected {}, got {}", expected, actual).red()
            ));
        } else if !check.arguments().is_empty() {
            let rendered: Vec<&str> = check
                .arguments()
                .iter()
                .map(|a| a.rendered.as_str())
                .collect();
            self.details.push(format!(
                "       {}",
                format!("with ({})", rendered.join(", ")).red()
            ));
        }
        self.details
            .push(format!("       at {}", check.location().to_string().dimmed()));
    }

    fn on_fatal_error(&mut self, fault: &Fault) {
        self.line(format!("\n{}: {}\n", "FATAL".red().bold(), fault));
    }

    fn on_step(&mut self, _case: &CaseContext<'_>, text: &str) {
        if self.verbose {
            self.details.push(format!("     {} {}", "→".cyan(), text));
        }
    }

    fn on_message(&mut self, _case: &CaseContext<'_>, text: &str) {
        self.details.push(format!("     {}", text));
    }
}

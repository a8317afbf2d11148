use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;

use crate::config::{ConfigLoader, ConfigOverrides, ReporterKind, RunConfig};
use crate::context::DEFAULT_SUITE;
use crate::registry::{HasLocation, HasName, Registry};
use crate::reporter::{ConsoleReporter, JsonReporter};
use crate::runner::{PatternFilter, TestEngine};

pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// 全部通过
pub const EXIT_SUCCESS: i32 = 0;
/// 有失败的 Case 或 Session 中止
pub const EXIT_FAILURE: i32 = 1;
/// 参数或配置错误
pub const EXIT_USAGE: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "ruunit", version, about = "Run the registered unit tests", long_about = None)]
pub struct Cli {
    /// 过滤表达式：suite 正则[/case 正则]
    #[arg(short, long)]
    pub filter: Option<String>,

    /// 输出格式
    #[arg(short, long, value_enum)]
    pub reporter: Option<ReporterKind>,

    /// 输出所有检查
    #[arg(short, long)]
    pub verbose: bool,

    /// 配置文件路径（缺省时自动查找 ruunit.toml）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub session_name: Option<String>,

    /// Setup 中 SANITY 失败后仍然执行 Teardown
    #[arg(long)]
    pub teardown_on_setup_abort: bool,

    /// 启动失败也视为运行失败
    #[arg(long)]
    pub fail_on_startup_fault: bool,

    /// 只列出注册的 Suite 和 Case，不执行
    #[arg(long)]
    pub list: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            session_name: self.session_name.clone(),
            verbose: self.verbose,
            reporter: self.reporter,
            filter: self.filter.clone(),
            teardown_on_setup_abort: self.teardown_on_setup_abort,
            fail_on_startup_fault: self.fail_on_startup_fault,
        }
    }

    /// 配置文件 + 命令行覆盖
    fn load_config(&self) -> Result<RunConfig> {
        let config = match &self.config {
            Some(path) => ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ConfigLoader::find_and_load()
                .context("Failed to load ruunit.toml")?
                .unwrap_or_default(),
        };
        Ok(ConfigLoader::merge(config, self.overrides()))
    }
}

/// 测试程序入口：解析参数，执行注册表中的全部单元，返回进程退出码
///
/// ```no_run
/// # let registry = ruunit::Registry::new();
/// std::process::exit(ruunit::cli::run_tests(&registry, std::env::args_os()));
/// ```
pub fn run_tests<I, T>(registry: &Registry, args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    run_tests_with_output(registry, args, &mut io::stdout())
}

/// 同 [`run_tests`]，报告写入 `out`
pub fn run_tests_with_output<I, T>(registry: &Registry, args: I, out: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help / --version 也走这里
            return if e.use_stderr() {
                EXIT_USAGE
            } else {
                EXIT_SUCCESS
            };
        }
    };

    crate::logger::init_logger();

    match execute(registry, &cli, out) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            EXIT_USAGE
        }
    }
}

fn execute(registry: &Registry, cli: &Cli, out: &mut dyn Write) -> Result<i32> {
    let config = cli.load_config()?;

    if cli.list {
        list_units(registry, out)?;
        return Ok(EXIT_SUCCESS);
    }

    let filter = config
        .filter
        .as_deref()
        .map(PatternFilter::parse)
        .transpose()
        .context("Invalid --filter")?;

    let mut engine = TestEngine::new(registry).with_config(config);
    if let Some(filter) = filter {
        engine = engine.with_filter(filter);
    }

    let summary = match engine.config().reporter {
        ReporterKind::Console => {
            let verbose = engine.config().verbose;
            engine.run(&mut ConsoleReporter::new(&mut *out, verbose))
        }
        ReporterKind::Json => {
            let mut reporter = JsonReporter::new(&mut *out);
            let summary = engine.run(&mut reporter);
            reporter.finish().context("Failed to write JSON report")?;
            summary
        }
    };

    Ok(summary.exit_code())
}

/// 列出注册的单元
fn list_units(registry: &Registry, out: &mut dyn Write) -> Result<()> {
    if registry.case_count() > 0 {
        writeln!(out, "{}", DEFAULT_SUITE.bold())?;
        for case in registry.cases() {
            writeln!(
                out,
                "  {} {}",
                case.name(),
                case.location().to_string().dimmed()
            )?;
        }
    }

    for suite in registry.suites() {
        writeln!(
            out,
            "{} {}",
            suite.name().bold(),
            suite.location().to_string().dimmed()
        )?;
    }

    writeln!(
        out,
        "\n{} cases, {} suites",
        registry.case_count(),
        registry.suite_count()
    )?;
    Ok(())
}

use serde::Deserialize;

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReporterKind {
    /// 彩色终端输出
    #[default]
    Console,
    /// JSON Lines
    Json,
}

/// 运行配置
///
/// 配置文件示例:
/// ```toml
/// session_name = "nightly"
/// verbose = true
/// reporter = "json"
/// filter = "Vec/size"
/// teardown_on_setup_abort = false
/// fail_on_startup_fault = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Session 名称，缺省时按开始时间生成
    pub session_name: Option<String>,

    /// 输出所有检查，而不只是失败的检查
    pub verbose: bool,

    pub reporter: ReporterKind,

    /// `suite[/case]` 正则过滤表达式
    pub filter: Option<String>,

    /// Setup 阶段 SANITY (suite/session) 失败后仍然执行 Teardown
    pub teardown_on_setup_abort: bool,

    /// 启动失败（重复名称等）也使整个运行失败
    pub fail_on_startup_fault: bool,
}

/// 命令行覆盖项，优先级高于配置文件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub session_name: Option<String>,
    pub verbose: bool,
    pub reporter: Option<ReporterKind>,
    pub filter: Option<String>,
    pub teardown_on_setup_abort: bool,
    pub fail_on_startup_fault: bool,
}

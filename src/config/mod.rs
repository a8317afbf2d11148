/// 配置模块 - 从 ruunit.toml 和命令行参数构造运行配置
mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{ConfigOverrides, ReporterKind, RunConfig};

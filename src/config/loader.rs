use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::types::{ConfigOverrides, RunConfig};
use crate::error::{Result, RuunitError};

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    pub const CONFIG_FILE: &'static str = "ruunit.toml";

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<RunConfig> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            RuunitError::Config(format!("无法读取配置文件 {}: {}", path.display(), e))
        })?;

        let config = toml::from_str(&content)?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// 查找并加载配置文件
    /// 查找顺序：
    /// 1. 当前目录及其父目录
    /// 2. 用户配置目录 ~/.config/ruunit/
    ///
    /// 没有找到文件时返回 `Ok(None)`；找到但读取或解析失败时返回错误。
    pub fn find_and_load() -> Result<Option<RunConfig>> {
        Self::find().map(Self::load_from_path).transpose()
    }

    /// 查找配置文件路径
    pub fn find() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_upwards(&current).or_else(Self::user_config_path)
    }

    /// 从 `start` 开始逐级向上查找
    pub fn find_upwards(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(Self::CONFIG_FILE))
            .find(|path| path.is_file())
    }

    fn user_config_path() -> Option<PathBuf> {
        let path = dirs::home_dir()?
            .join(".config")
            .join("ruunit")
            .join(Self::CONFIG_FILE);
        path.is_file().then_some(path)
    }

    /// 应用命令行覆盖
    pub fn merge(mut config: RunConfig, overrides: ConfigOverrides) -> RunConfig {
        if overrides.session_name.is_some() {
            config.session_name = overrides.session_name;
        }
        if let Some(reporter) = overrides.reporter {
            config.reporter = reporter;
        }
        if overrides.filter.is_some() {
            config.filter = overrides.filter;
        }
        // 开关只能由命令行打开
        config.verbose |= overrides.verbose;
        config.teardown_on_setup_abort |= overrides.teardown_on_setup_abort;
        config.fail_on_startup_fault |= overrides.fail_on_startup_fault;
        config
    }
}

use tracing_subscriber::{EnvFilter, fmt};

/// 初始化日志系统
///
/// 支持通过 RUST_LOG 环境变量控制日志级别
/// 默认级别: warn（避免与 Reporter 的输出混在一起）
///
/// 示例:
/// - RUST_LOG=ruunit=debug cargo run --example vec_suite
/// - RUST_LOG=trace cargo test
///
/// 可以重复调用；已经安装过全局 subscriber 时返回 false。
pub fn init_logger() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let installed = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!("Logger initialized");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_is_idempotent() {
        init_logger();
        assert!(!init_logger());
    }
}

//! 可观测性：tracing 订阅器初始化

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 安装 fmt 层 + EnvFilter；RUST_LOG 未设置或无法解析时回退到 info
///
/// 重复调用不会 panic（第二次安装静默失败）
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_init_twice_is_harmless() {
        super::init();
        super::init();
        tracing::info!("observability initialized");
    }
}

// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// - RUST_LOG 控制级别（默认 info）
// - LISTING_LOADER_LOG_FORMAT=json 输出 JSON 行
// ==========================================

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

/// 日志格式环境变量
pub const LOG_FORMAT_ENV: &str = "LISTING_LOADER_LOG_FORMAT";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// 解析环境变量值；未设置或无法识别时为 Text
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 初始化日志系统（格式取自 LISTING_LOADER_LOG_FORMAT）
///
/// # 示例
/// ```no_run
/// use listing_loader::logging;
/// logging::init();
/// ```
pub fn init() {
    let format = LogFormat::parse(std::env::var(LOG_FORMAT_ENV).ok().as_deref());
    init_with_format(format);
}

/// 按指定格式初始化
///
/// 两种格式都带上当前 span 的字段（入库运行的 run_id）；
/// 文本格式在 span 结束时额外输出耗时。
pub fn init_with_format(format: LogFormat) {
    match format {
        LogFormat::Text => fmt()
            .with_env_filter(default_filter())
            .with_target(true)
            .with_line_number(true)
            .with_span_events(FmtSpan::CLOSE)
            .init(),
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(default_filter())
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .with_line_number(true)
            .init(),
    }
}

/// 初始化测试环境的日志系统（debug 级别，重复调用无副作用）
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

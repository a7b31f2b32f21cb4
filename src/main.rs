// ==========================================
// 二手车挂牌数据入库 - 命令行入口
// ==========================================
// 运行一次完整入库：提交返回 0，任何错误返回 1
// ==========================================

use anyhow::Context;
use listing_loader::{logging, LoadPipeline, LoadSummary, PipelineConfig, UniversalSourceReader};
use std::process::ExitCode;

fn main() -> ExitCode {
    // .env 不存在时忽略
    let dotenv = dotenvy::dotenv();

    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} v{}", listing_loader::APP_NAME, listing_loader::VERSION);
    tracing::info!("==================================================");
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "已加载 .env");
    }

    match run() {
        Ok(summary) => {
            tracing::info!(
                run_id = %summary.run_id,
                inserted = summary.total_inserted(),
                "入库完成"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("入库失败: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<LoadSummary> {
    let config = PipelineConfig::from_env().context("配置加载失败")?;
    tracing::info!(
        database = %config.database.path.display(),
        schema = %config.database.schema,
        batch_size = config.batch_size,
        "配置加载完成"
    );

    let pipeline = LoadPipeline::new(&config, UniversalSourceReader);
    let summary = pipeline.run()?;
    Ok(summary)
}

use std::path::PathBuf;

use anyhow::Result;
use lighthouse_batch::{logger, App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init();

    // 加载配置（第一个命令行参数可指定输入文件）
    let config = Config::load()?.with_input_file(std::env::args().nth(1).map(PathBuf::from));

    // 初始化并运行应用
    let _summary = App::initialize(config)?.run().await?;

    Ok(())
}

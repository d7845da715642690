use anyhow::Result;
use clap::Parser;
use dymo_label_gen::{logger, App, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置（文件、环境变量、命令行合并后再初始化日志）
    let config = cli.into_config()?;

    // 初始化日志
    logger::init(config.verbose_logging);

    let json_report = config.json_report;

    // 初始化并运行应用
    let report = App::initialize(config).await?.run().await?;

    if json_report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

use clap::Parser;
use pdf_risk_analyzer::utils::{logger, validation::Validate};
use pdf_risk_analyzer::{Application, CliConfig, Command, ServiceConfig, UploadedDocument};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_logger(cli.verbose);
    }

    // 載入配置：設定檔 → 環境變數 → 命令列
    let mut config = ServiceConfig::load(cli.config.as_deref())?;
    let command = cli.command.clone().unwrap_or(Command::Serve {
        host: None,
        port: None,
    });

    if let Command::Serve { host, port } = &command {
        if let Some(host) = host {
            config.server.host = host.clone();
        }
        if let Some(port) = port {
            config.server.port = *port;
        }
    }

    if cli.verbose {
        tracing::debug!("Service config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let app = Application::build(config)?;

    match command {
        Command::Serve { .. } => {
            tracing::info!("Starting pdf-risk-analyzer");
            app.serve().await?;
        }
        Command::Analyze { file } => {
            let bytes = std::fs::read(&file)?;
            let filename = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            match app.service().analyze(UploadedDocument::new(filename, bytes)).await {
                Ok(result) => {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                }
                Err(failure) => {
                    tracing::error!(
                        stage = %failure.stage,
                        category = ?failure.error.category(),
                        "{}",
                        failure.error
                    );
                    eprintln!("❌ {}", failure.error);
                    // 用戶輸入錯誤與服務端錯誤使用不同退出碼
                    let exit_code = if failure.error.status_code() < 500 { 2 } else { 1 };
                    std::process::exit(exit_code);
                }
            }
        }
    }

    Ok(())
}

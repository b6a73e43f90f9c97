use anyhow::Context;
use clap::Parser;
use product_authenticity_gateway::utils::{logger, validation::Validate};
use product_authenticity_gateway::{api, AppConfig, LedgerGateway, ServerArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();

    // .env 不存在時直接略過
    let dotenv_loaded = dotenv::from_path(&args.env_file).is_ok();

    let config = AppConfig::load(&args).context("failed to load configuration")?;

    // 初始化日誌
    if config.server.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_server_logger(args.verbose);
    }

    tracing::info!("Starting product authenticity gateway");
    if dotenv_loaded {
        tracing::debug!("Loaded environment from {}", args.env_file.display());
    }
    if args.verbose {
        tracing::debug!("Resolved config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    // 合約 ID 或金鑰缺少時仍然啟動，由各請求回報 500
    if config.ledger.contract_id().is_none() {
        tracing::warn!("⚠️ SOROBAN_CONTRACT_ID is not set; ledger endpoints will fail");
    }
    if config.ledger.operator_public_key().is_none() {
        tracing::warn!("⚠️ ALICE_PUBLIC_KEY is not set; write endpoints will fail");
    }

    let bind_address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;

    tracing::info!(
        "🚀 Listening on http://{} (client: {}, network: {}, source: {})",
        listener.local_addr()?,
        config.ledger.client,
        config.ledger.network,
        config.ledger.source
    );

    let gateway = LedgerGateway::with_soroban_cli(config.ledger);
    api::serve(listener, gateway).await.context("server error")?;

    tracing::info!("✅ Server stopped");
    Ok(())
}

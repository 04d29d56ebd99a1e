use market_server::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 设置环境 (dotenv, 日志)
    let _log_guard = setup_environment();

    print_banner();
    tracing::info!("🛒 Market Server starting...");

    // 2. 加载配置
    let config = Config::from_env();
    if config.is_production() && std::env::var("JWT_SECRET").is_err() {
        tracing::error!("JWT_SECRET must be set in production");
        return Err("JWT_SECRET must be set in production".into());
    }

    // 3. 初始化服务器状态
    let state = ServerState::initialize(&config).await?;

    // 4. 启动 HTTP 服务器
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}

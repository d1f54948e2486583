#[tokio::main]
async fn main() -> shakespeare_bot::error::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("shakespeare_bot=info"),
    )
    .init();

    let Some(token) = std::env::args().nth(1) else {
        println!("usage: shakespeare-bot <TOKEN>");
        return Ok(());
    };

    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        log::debug!("TLS crypto provider already installed");
    }

    log::info!("Starting shakespeare-bot");
    match shakespeare_bot::run(token).await {
        Ok(()) => {
            log::info!("Bot shut down successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Bot encountered an error: {}", e);
            Err(e)
        }
    }
}

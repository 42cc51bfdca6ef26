use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use netbridge::config::load_config;
use netbridge::session::{LoggingHandler, Session};
use netbridge::utils::logging;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let settings = match load_config() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            std::process::exit(1);
        }
    };

    logging::init(&settings.log.level);
    info!(
        network = %settings.network.id,
        host = %settings.broker.host,
        "starting network bridge"
    );

    let session = match Session::connect(&settings).await {
        Ok(session) => session,
        Err(err) => {
            error!(error = %err, "failed to connect to broker");
            std::process::exit(1);
        }
    };

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, shutting down");
                cancel.cancel();
            }
        });
    }

    if let Err(err) = session.run(LoggingHandler, cancel).await {
        error!(error = %err, "bridge terminated");
        std::process::exit(1);
    }
}

use hotel_ops::infrastructure::telemetry::{init_telemetry, init_tracing};
use tracing::error;

#[tokio::main]
async fn main() {
    init_tracing();
    init_telemetry();

    if let Err(err) = hotel_ops::start_server().await {
        error!("server failed to start: {err}");
        std::process::exit(1);
    }
}

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use parklot::config::LotConfig;
use parklot::console::{self, ConsoleError};
use parklot::engine::{Clock, Engine, ManualClock, SystemClock};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    parklot::observability::init_tracing();

    let config = LotConfig::from_env()?;
    parklot::observability::init(config.metrics_port)?;

    let manual = config.manual_clock.then(|| Arc::new(ManualClock::new(0)));
    let clock: Arc<dyn Clock> = match &manual {
        Some(c) => c.clone() as Arc<dyn Clock>,
        None => Arc::new(SystemClock),
    };
    let engine = Engine::from_config(&config, clock)?;
    info!("  hourly rate: {}", config.hourly_rate);
    info!("  clock: {}", if manual.is_some() { "manual" } else { "system" });
    info!("  metrics: {}", config.metrics_port.map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics")));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let reply = match console::parse_command(&line) {
            Ok(cmd) => console::execute(&engine, manual.as_deref(), cmd).await,
            Err(ConsoleError::Empty) => continue,
            Err(e) => Err(e),
        };
        let out = match reply {
            Ok(text) => format!("{text}\n"),
            Err(e) => format!("error: {e}\n"),
        };
        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
    }

    info!("stdin closed, {} tickets still active", engine.active_count());
    Ok(())
}

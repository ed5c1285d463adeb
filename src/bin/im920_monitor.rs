//! IM920 link monitor
//! Opens a modem, optionally transmits one payload, then logs every frame received

use im920_rs::codec::{decode, encode_to_string};
use im920_rs::link::{shared, spawn_frame_pump, Im920, SendPolicy};
use im920_rs::{LinkConfig, PayloadSize};
use std::env;
use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))?;

    let format_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(format_layer)
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 || args.len() > 4 {
        eprintln!("Usage: {} <port|config.json> <payload-size> [hex-payload]", args[0]);
        eprintln!("Example: {} /dev/ttyUSB0 4 12345678", args[0]);
        std::process::exit(1);
    }

    let config = if args[1].ends_with(".json") {
        LinkConfig::load(&args[1])?
    } else {
        LinkConfig::new(args[1].as_str())
    };
    let size = PayloadSize::new(args[2].parse()?)?;

    tracing::info!("IM920 Link Monitor");
    tracing::info!("Port: {} @ {} baud", config.port, config.baud_rate);
    tracing::info!("Frame size: {}", size);

    let mut modem = Im920::open(&config)?;
    modem.on_data_not_received(
        Box::new(|| tracing::warn!("No data from modem")),
        config.not_received_interval(),
    );

    if let Some(hex) = args.get(3) {
        let mut raw = [0u8; 64];
        let len = decode(hex.as_bytes(), &mut raw)?;
        modem.send_bytes(&raw[..len], SendPolicy::DelayForCarrierSense)?;
        tracing::info!("Sent {}", encode_to_string(&raw[..len]));
    }

    let modem = shared(modem);
    let mut pump = spawn_frame_pump(modem, size, config.poll_interval(), 32);

    loop {
        tokio::select! {
            frame = pump.recv() => {
                let Some(frame) = frame else { break };
                match frame.header {
                    Some(header) => tracing::info!("[{}] {}", header, encode_to_string(&frame.payload)),
                    None => tracing::info!("{}", encode_to_string(&frame.payload)),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    pump.shutdown().await?;
    Ok(())
}

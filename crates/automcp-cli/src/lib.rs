//! `automcp-bridge`: process-level glue between stdio and a device agent.
//!
//! Relays line-delimited frames between standard input/output and the
//! WebSocket transport. Lines typed before the connection is established
//! are queued and flushed once it is up; every inbound frame is forwarded
//! verbatim to standard output. Logs go to stderr so stdout stays a clean
//! frame stream.

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use automcp_transport::{InboundFrame, Transport, WebSocketTransport, websocket::DEFAULT_WS_PORT};

/// Relay line-delimited frames between stdio and a device agent.
#[derive(Debug, Parser)]
#[command(name = "automcp-bridge", version, about)]
pub struct Args {
    /// Device agent host.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// WebSocket port of the device agent.
    #[arg(long, default_value_t = DEFAULT_WS_PORT)]
    pub ws_port: u16,
}

/// Entry point used by the binary.
pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    bridge(&args).await
}

/// Run the relay until stdin or the connection ends.
async fn bridge(args: &Args) -> anyhow::Result<()> {
    let url = format!("ws://{}:{}", args.host, args.ws_port);
    let transport = WebSocketTransport::new(url.clone());

    // Start draining stdin immediately; the channel holds lines typed
    // before the connection is up.
    let (line_tx, mut line_rx) = mpsc::channel::<String>(1024);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line_tx.send(line).await.is_err() {
                break;
            }
        }
    });

    transport
        .connect()
        .await
        .with_context(|| format!("connecting to {url}"))?;
    tracing::info!(%url, "bridge connected");

    let mut stdout = tokio::io::stdout();
    loop {
        tokio::select! {
            line = line_rx.recv() => match line {
                Some(line) => {
                    transport.send(line).await.context("forwarding frame")?;
                }
                None => {
                    tracing::info!("stdin closed, shutting down");
                    break;
                }
            },
            frame = transport.receive() => match frame {
                Some(InboundFrame::Text(text)) => {
                    stdout.write_all(text.as_bytes()).await?;
                    stdout.write_all(b"\n").await?;
                    stdout.flush().await?;
                }
                Some(InboundFrame::Closed { reason }) => {
                    tracing::info!(%reason, "connection closed");
                    break;
                }
                None => break,
            },
        }
    }

    transport.close().await.ok();
    Ok(())
}

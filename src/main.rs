use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use tokio_util::sync::CancellationToken;

use wol_send::common::ETH_HDR_LEN;
use wol_send::config::{Config, DEFAULT_CONFIG_PATH};
use wol_send::layer2::{default_interface, find_interface};
use wol_send::{build_magic_packet, FrameSource, MacAddr, MagicPacket, Sender};

/// Wake a device on the local network with a layer 2 magic packet.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Hardware address of the device to wake, or a host alias from the config file
    target: String,

    /// Interface to broadcast on [default: from config, else first usable interface]
    #[arg(short, long)]
    interface: Option<String>,

    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Frame source address, or `interface` to use the interface's own address
    #[arg(short, long)]
    source: Option<FrameSource>,

    /// Number of times to broadcast the packet
    #[arg(short = 'n', long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    count: u32,

    /// Pause between broadcasts in milliseconds
    #[arg(long, default_value_t = 100)]
    interval: u64,

    /// Print the frame as hex instead of sending it
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[arg(short, long, default_value_t = false, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        if self.quiet { return LevelFilter::Error; }
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Checks an encoded frame carries a well-formed magic packet and returns its target.
fn verify_frame(frame: &[u8]) -> Result<MacAddr> {
    let payload = frame.get(ETH_HDR_LEN..).unwrap_or_default();
    MagicPacket::parse(payload)
        .map(|pkt| pkt.target())
        .ok_or_else(|| anyhow!("encoded frame does not carry a valid magic packet"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Cli::parse();
    SimpleLogger::new()
        .with_level(opts.log_level())
        .init()
        .context("failed to initialize logger")?;

    let cfg = Config::load(&opts.config)?;
    let target = cfg.resolve_target(&opts.target)?;

    let iface = match opts.interface.as_deref().or(cfg.interface.as_deref()) {
        Some(name) => find_interface(name)?,
        None => default_interface()?,
    };
    log::debug!("using interface '{}'", iface.name);

    let source = opts.source.or(cfg.source).unwrap_or_default();
    let sender = Sender::default().with_source(source);
    let pkt = build_magic_packet(target);

    if opts.dry_run {
        let frame = sender.frame_for(&pkt, &iface)?;
        let recovered = verify_frame(&frame)?;
        log::debug!("frame of {} bytes wakes {}", frame.len(), recovered);
        println!("{}", to_hex(&frame));
        return Ok(());
    }

    let cancel_token: CancellationToken = CancellationToken::new();
    let sigint_token = cancel_token.clone();

    ctrlc::set_handler(move || {
        log::info!("received SIGINT");
        sigint_token.cancel();
    }).context("failed to install SIGINT handler")?;

    let sender = Arc::new(sender);
    let interval = Duration::from_millis(opts.interval);

    for i in 0..opts.count {
        if i > 0 {
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                _ = tokio::time::sleep(interval) => {},
            }
        }
        if cancel_token.is_cancelled() { break; }

        let (sender, pkt, iface) = (sender.clone(), pkt.clone(), iface.clone());
        tokio::task::spawn_blocking(move || sender.send(&pkt, &iface))
            .await
            .context("send task panicked")?
            .with_context(|| format!("failed to wake {}", target))?;
    }

    Ok(())
}

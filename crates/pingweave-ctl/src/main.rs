//! pingweave-ctl — agent-side client for the pingweave control plane.

use anyhow::{Context, Result};

use pingweave_core::config::PingweaveConfig;

mod cmd;

use cmd::http::Controller;

fn print_usage() {
    println!("Usage: pingweave-ctl [--host <host>] [--port <port>] <command>");
    println!();
    println!("Commands:");
    println!("  pinglist                               Show the current pinglist");
    println!("  address-store                          List registered RDMA addresses");
    println!("  register <ip> <gid> <lid> <qpn> <dtime>  Register one address");
    println!("  sync [--once]                          Run the agent sync loop");
    println!();
    println!("Options:");
    println!("  --host <host>   Control-plane host (default: controller.host from config)");
    println!("  --port <port>   Control-plane port (default: controller.port_control from config)");
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = PingweaveConfig::load().unwrap_or_else(|e| {
        tracing::error!(error = %e, "error reading configuration, using defaults");
        PingweaveConfig::default()
    });

    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut controller = Controller {
        host: config.controller.host.clone(),
        port: config.controller.port_control,
    };
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--host" => {
                i += 1;
                controller.host = args.get(i).context("--host requires a value")?.clone();
            }
            "--port" => {
                i += 1;
                controller.port = args
                    .get(i)
                    .context("--port requires a value")?
                    .parse()
                    .context("--port must be a number")?;
            }
            other => remaining.push(other),
        }
        i += 1;
    }

    match remaining.as_slice() {
        ["pinglist"] => cmd::pinglist::cmd_pinglist(&controller).await,
        ["address-store"] | [] => cmd::address::cmd_address_store(&controller).await,
        ["register", ip, gid, lid, qpn, dtime] => {
            cmd::address::cmd_register(&controller, [*ip, *gid, *lid, *qpn, *dtime]).await
        }
        ["sync"] => cmd::sync::cmd_sync(&controller, &config, false).await,
        ["sync", "--once"] => cmd::sync::cmd_sync(&controller, &config, true).await,
        ["help"] | ["--help"] | ["-h"] => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

//! murk -- AWG profile sync controller for the mesh daemon.
//!
//! Usage:
//!   murk peers                      # Probe peers, show AWG status per host
//!   murk sync <hostname>            # Apply a peer's profile, bounce tunnel
//!   murk local                      # Local node's own profile status
//!   murk profile <hostname>         # Show a peer's probed profile
//!   murk status                     # Discovery summary and last message

use clap::{Parser, Subcommand};
use murk_client::LocalApiClient;
use murk_ctl::config::CtlConfig;
use murk_ctl::{expand_tilde, load_token};
use murk_model::SyncTimeout;
use murk_sync::SyncOrchestrator;

#[derive(Parser)]
#[command(name = "murk", about = "AWG profile sync controller for the mesh daemon")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "~/.murk/config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe all peers and show which carry an AWG profile
    Peers,
    /// Fetch a peer's AWG profile, apply it locally, bounce the tunnel
    Sync {
        /// Hostname of the source peer
        hostname: String,
        /// Apply timeout in seconds (1-60)
        #[arg(long)]
        timeout: Option<SyncTimeout>,
    },
    /// Show whether the local node carries a non-default AWG profile
    Local,
    /// Show the probed AWG profile of one peer
    Profile {
        /// Hostname of the peer
        hostname: String,
    },
    /// Show discovery summary, in-progress marker, and last message
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "murk=info,murk_sync=info,murk_client=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config_path = expand_tilde(&cli.config);
    let cfg = CtlConfig::load_or_default(&config_path)?;

    let token = load_token(&expand_tilde(&cfg.api.token_file))?;
    let client = LocalApiClient::new(cfg.base_url(), token);
    let orch = SyncOrchestrator::with_settle(client, cfg.settle());

    match cli.command {
        Commands::Peers => {
            orch.refresh_peers().await;
            let index = orch.status_index().await;
            let mut hosts: Vec<_> = index.statuses().iter().collect();
            hosts.sort_by(|a, b| a.0.cmp(b.0));
            for (hostname, has_profile) in hosts {
                let marker = if *has_profile { "awg" } else { "-" };
                println!("{hostname:<32} {marker}");
            }
            println!("{}", orch.status_message().await.unwrap_or_default());
        }
        Commands::Sync { hostname, timeout } => {
            orch.refresh_peers().await;
            let timeout = timeout.or_else(|| cfg.sync_timeout().ok());
            let outcome = orch.sync_from_peer(&hostname, timeout).await;
            println!("{}", outcome.message());
            if !outcome.applied() {
                std::process::exit(1);
            }
        }
        Commands::Local => {
            let has = orch.refresh_local_status().await;
            if has {
                println!("local node carries a non-default AWG profile");
            } else {
                println!("local node has no AWG profile");
            }
        }
        Commands::Profile { hostname } => {
            orch.refresh_peers().await;
            match orch.peer_result(&hostname).await {
                Some(result) => match result.config {
                    Some(profile) => {
                        println!("{}", serde_json::to_string_pretty(&profile)?);
                    }
                    None => {
                        eprintln!("peer {hostname} has no AWG profile");
                        std::process::exit(1);
                    }
                },
                None => {
                    eprintln!("peer {hostname} was not probed");
                    std::process::exit(1);
                }
            }
        }
        Commands::Status => {
            orch.refresh_peers().await;
            orch.refresh_local_status().await;
            let summary = orch.status_index().await.summary();
            println!(
                "peers probed: {} ({} with AWG config)",
                summary.queried, summary.with_profile
            );
            println!(
                "local profile: {}",
                if orch.local_has_profile() { "set" } else { "none" }
            );
            match orch.in_progress().await {
                Some(hostname) => println!("sync in progress: {hostname}"),
                None => println!("no sync in progress"),
            }
            if let Some(message) = orch.status_message().await {
                println!("last message: {message}");
            }
        }
    }

    Ok(())
}

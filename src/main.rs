use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::time::Duration;

use link_state_sim::{Network, SimulationConfig};

#[derive(Parser)]
#[command(name = "link-state-sim", about = "Run a link-state routing simulation over a saved topology")]
struct Cli {
    /// Topology file ({"nodes": [...], "links": [{source, target, cost}]})
    #[arg(long)]
    topology: PathBuf,

    /// Simulation settings (JSON); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep routers running this long after the initial flood settles
    #[arg(long, default_value_t = 0)]
    settle_ms: u64,

    /// Print the next hop from SRC towards DST
    #[arg(long, num_args = 2, value_names = ["SRC", "DST"])]
    route: Option<Vec<String>>,

    /// Print routing tables as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    let network = Network::with_config(config);
    network
        .load_from_file(&cli.topology)
        .await
        .with_context(|| format!("loading topology {}", cli.topology.display()))?;

    network.start_all().await;
    network.settle().await;
    if cli.settle_ms > 0 {
        tokio::time::sleep(Duration::from_millis(cli.settle_ms)).await;
        network.settle().await;
    }
    info!("Network converged");

    for router in network.routers().await {
        let table = router.get_routing_table().await;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                "router": router.id,
                "routes": table.iter().map(|(_, entry)| entry).collect::<Vec<_>>(),
            }))?);
            continue;
        }

        println!("=== {} ===", router.id);
        for (destination, entry) in table.iter() {
            println!("  {:<10} via {:<10} cost {}", destination, entry.next_hop, entry.distance);
        }
    }

    if let Some(route) = &cli.route {
        let (src, dst) = (&route[0], &route[1]);
        let router = network
            .router(src)
            .await
            .with_context(|| format!("unknown router {}", src))?;
        match router.forward_packet(dst).await {
            Some(next_hop) => println!("{} -> {}: next hop {}", src, dst, next_hop),
            None => println!("{} -> {}: unreachable", src, dst),
        }
    }

    network.stop_all().await;
    Ok(())
}

use std::env;
use std::process;

use flow_index::{FlowIndex, IndexConfig};
use tracing::{error, info};

const ROAD_FLOWS: [(&str, u32); 7] = [
    ("A", 50),
    ("B", 30),
    ("C", 70),
    ("D", 20),
    ("E", 40),
    ("F", 60),
    ("G", 80),
];

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let config = match env::args().nth(1) {
        Some(path) => match IndexConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load config from {}: {}", path, e);
                process::exit(1);
            }
        },
        None => IndexConfig::new(),
    };
    info!(?config, "starting road-flow simulation");

    let mut index = FlowIndex::with_config(config);
    for (road, flow) in ROAD_FLOWS {
        println!("\nAdding road {} (flow={})", road, flow);
        index.add(road.to_string(), flow);
        println!("In-order: {}", index.inorder_string());
        println!("{}", "-".repeat(40));
    }

    println!("\nRoads lighter than 60:");
    for entry in index.query_below(&60) {
        println!("  {} (flow={})", entry.key, entry.weight);
    }

    if let Some(closed) = index.remove(&50) {
        println!("\nClosed road {} (flow={})", closed.key, closed.weight);
    }
    println!("In-order: {}", index.inorder_string());
}

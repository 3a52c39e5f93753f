use std::fs::File;
use std::io::BufWriter;
use clap::Parser;
use log::info;
use lemons_examples::options::MarketOptions;
use lemons_examples::setup::{build_simulation, setup_logger};

fn main() -> Result<(), anyhow::Error>{

    let options = MarketOptions::parse();
    setup_logger(&options)?;

    let mut simulation = build_simulation(&options)?;
    info!("Running {} epochs of market with {} pairs, model: {:?}", options.epochs, options.n_pairs, options.model);
    let reports = simulation.run_epochs(options.epochs)?;

    if let Some(last) = reports.last(){
        info!("Final epoch: seller payoff {:.3}, buyer payoff {:.3}, honest {:.3}, trust {:.3}",
            last.statistics.sellers.payoff, last.statistics.buyers.payoff,
            last.statistics.sellers.honest_fraction, last.statistics.buyers.trust_fraction);
    }

    if let Some(path) = &options.json_file{
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &reports)?;
        info!("Epoch reports written to {}", path.display());
    }

    Ok(())
}

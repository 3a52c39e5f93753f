use lemons_core::domain::Role;
use lemons_core::features::FEATURE_LEN;
use lemons_core::error::SetupError;
use lemons_market::game::MarketGameBuilder;
use lemons_market::simulation::MarketSimulation;
use lemons_rl::model::{LinearValueModel, MlpValueModel, ValueModel};
use crate::options::{MarketOptions, ModelSelect};

pub fn setup_logger(options: &MarketOptions) -> Result<(), fern::InitError> {
    let dispatch  = fern::Dispatch::new()

        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(options.log_level)
        .level_for("lemons_market", options.market_log_level)
        .level_for("lemons_rl", options.rl_log_level)
        .level_for("lemons_core", options.core_log_level);

    match &options.log_file{
        None => dispatch.chain(std::io::stdout()),
        Some(f) => dispatch.chain(fern::log_file(f)?)
    }

        .apply()?;
    Ok(())
}

fn value_model(options: &MarketOptions, seed: u64) -> Box<dyn ValueModel>{
    match options.model{
        ModelSelect::Linear => Box::new(LinearValueModel::new(FEATURE_LEN, options.learning_rate, seed)),
        ModelSelect::Mlp => Box::new(MlpValueModel::new(FEATURE_LEN, options.hidden_width, options.learning_rate, seed)),
    }
}

/// Creates simulation with `n_pairs` sellers and buyers using model selected in options.
pub fn build_simulation(options: &MarketOptions) -> Result<MarketSimulation<Box<dyn ValueModel>>, SetupError>{
    let config = options.simulation_config()?;
    let n_pairs = config.n_pairs as u64;
    let base_seed = config.seed;
    let game = MarketGameBuilder::new(config)
        .populate(|role, i| {
            let offset = match role{
                Role::Seller => i as u64,
                Role::Buyer => n_pairs + i as u64,
            };
            let seed = base_seed.map(|s| s.wrapping_mul(31).wrapping_add(offset))
                .unwrap_or_else(rand::random::<u64>);
            value_model(options, seed)
        })?
        .build()?;
    Ok(MarketSimulation::new(game))
}

#[cfg(test)]
mod tests{
    use clap::Parser;
    use crate::options::MarketOptions;
    use crate::setup::build_simulation;

    #[test]
    fn mlp_simulation_runs_epoch(){
        let options = MarketOptions::parse_from([
            "market_for_lemons", "-m", "mlp", "-H", "8", "-n", "2", "-i", "5", "-p", "2", "-f", "2", "-s", "3"
        ]);
        let mut simulation = build_simulation(&options).unwrap();
        let reports = simulation.run_epochs(1).unwrap();
        assert_eq!(reports[0].fit.len(), 4);
        assert_eq!(simulation.game().logs().len(), 2);
    }
}

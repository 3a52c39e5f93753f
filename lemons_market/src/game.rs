use log::{debug, trace, warn};
use ndarray::ArrayView1;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use lemons_core::domain::{CarType, Decision, MarketView, OpenTrade, Role, Trade};
use lemons_core::error::{GameError, LemonsError, SetupError};
use lemons_rl::agent::MarketAgent;
use lemons_rl::model::ValueModel;
use crate::config::SimulationConfig;
use crate::env::{generate_pairing, PairingTable};

/// Record of one finished game: pairing and trajectory of every pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameLog{
    game: usize,
    pairing: PairingTable,
    trajectories: Vec<Vec<Trade>>,
}

impl GameLog{
    pub fn new(game: usize, pairing: PairingTable, trajectories: Vec<Vec<Trade>>) -> Result<Self, GameError>{
        if trajectories.len() != pairing.n_pairs(){
            return Err(GameError::PairingSizeMismatch {table: pairing.n_pairs(), agents: trajectories.len()});
        }
        Ok(Self{game, pairing, trajectories})
    }

    pub fn game(&self) -> usize{
        self.game
    }

    pub fn pairing(&self) -> &PairingTable{
        &self.pairing
    }

    pub fn n_pairs(&self) -> usize{
        self.trajectories.len()
    }

    /// Trajectories indexed by seller.
    pub fn trajectories(&self) -> &[Vec<Trade>]{
        &self.trajectories
    }

    pub fn seller_trajectory(&self, seller: usize) -> Option<&[Trade]>{
        self.trajectories.get(seller).map(|t| t.as_slice())
    }

    pub fn buyer_trajectory(&self, buyer: usize) -> Option<&[Trade]>{
        self.pairing.seller_of(buyer).and_then(|s| self.seller_trajectory(s))
    }

    pub fn trajectory_of(&self, role: Role, agent: usize) -> Option<&[Trade]>{
        match role{
            Role::Seller => self.seller_trajectory(agent),
            Role::Buyer => self.buyer_trajectory(agent),
        }
    }
}

/// Plays all iterations of one pair and returns its trajectory. Game is not closed for agents.
/// In every iteration seller acts first seeing only completed trades, then buyer acts seeing
/// completed trades and price just quoted.
fn play_pair<M: ValueModel>(
    seller: &mut MarketAgent<M>,
    buyer: &mut MarketAgent<M>,
    cars: ArrayView1<CarType>) -> Result<Vec<Trade>, LemonsError>{

    let mut trajectory: Vec<Trade> = Vec::with_capacity(cars.len());
    for car in cars.iter(){
        let open = OpenTrade::new(*car);
        let price = seller.action(&MarketView::new(&trajectory, open))?;
        let open = open.with_price(price);
        let decision = Decision::try_from_value(buyer.action(&MarketView::new(&trajectory, open))?)?;
        let trade = open.close(decision).ok_or(GameError::PriceNotQuoted)?;
        trace!("Seller {} and buyer {}: {}", seller.id(), buyer.id(), trade);
        trajectory.push(trade);
    }
    Ok(trajectory)
}

/// Game engine holding sellers, buyers and history of played games.
///
/// Pairs do not share any state, so with a thread pool they are played in parallel. Each pair
/// keeps seller-before-buyer order in every iteration.
pub struct MarketGame<M: ValueModel>{
    sellers: Vec<MarketAgent<M>>,
    buyers: Vec<MarketAgent<M>>,
    config: SimulationConfig,
    rng: StdRng,
    thread_pool: Option<rayon::ThreadPool>,
    logs: Vec<GameLog>,
}

impl<M: ValueModel> MarketGame<M>{

    pub fn config(&self) -> &SimulationConfig{
        &self.config
    }

    pub fn n_pairs(&self) -> usize{
        self.sellers.len()
    }

    pub fn sellers(&self) -> &[MarketAgent<M>]{
        &self.sellers
    }

    pub fn buyers(&self) -> &[MarketAgent<M>]{
        &self.buyers
    }

    pub fn sellers_mut(&mut self) -> &mut [MarketAgent<M>]{
        &mut self.sellers
    }

    pub fn buyers_mut(&mut self) -> &mut [MarketAgent<M>]{
        &mut self.buyers
    }

    pub(crate) fn agents_and_pool_mut(&mut self) -> (Vec<&mut MarketAgent<M>>, Option<&rayon::ThreadPool>){
        let agents = self.sellers.iter_mut().chain(self.buyers.iter_mut()).collect();
        (agents, self.thread_pool.as_ref())
    }

    /// Logs of all games played so far.
    pub fn logs(&self) -> &[GameLog]{
        &self.logs
    }

    pub fn take_logs(&mut self) -> Vec<GameLog>{
        std::mem::take(&mut self.logs)
    }

    /// Draws pairing for next game from configured distribution.
    pub fn generate_pairing(&mut self) -> Result<PairingTable, SetupError>{
        generate_pairing(self.sellers.len(), self.config.n_iterations, &self.config.car_distribution, &mut self.rng)
    }

    /// Plays one game with random pairing.
    pub fn play_game(&mut self) -> Result<&GameLog, LemonsError>{
        let pairing = self.generate_pairing()?;
        self.run_game(pairing)
    }

    /// Plays one game with given pairing. Every agent ends game exactly once, with trajectory
    /// of its pair. When any pair fails, game is aborted for all agents and nothing is stored.
    pub fn run_game(&mut self, pairing: PairingTable) -> Result<&GameLog, LemonsError>{
        let n_pairs = self.sellers.len();
        if pairing.n_pairs() != n_pairs{
            return Err(GameError::PairingSizeMismatch {table: pairing.n_pairs(), agents: n_pairs}.into());
        }
        if !pairing.is_bijection(){
            return Err(GameError::PairingNotBijective {pairs: n_pairs}.into());
        }
        let game = self.logs.len();
        debug!("Starting game {game} with pairing {pairing}");

        let mut buyer_slots: Vec<Option<&mut MarketAgent<M>>> = self.buyers.iter_mut().map(Some).collect();
        let mut pairs = self.sellers.iter_mut().enumerate().map(|(s, seller)|{
            let buyer = pairing.buyer_of(s)
                .and_then(|b| buyer_slots.get_mut(b))
                .and_then(|slot| slot.take())
                .ok_or(GameError::PairingNotBijective {pairs: n_pairs})?;
            let cars = pairing.cars_of(s).ok_or(GameError::PairingSizeMismatch {table: pairing.n_pairs(), agents: n_pairs})?;
            Ok::<_, GameError>((seller, buyer, cars))
        }).collect::<Result<Vec<_>, GameError>>()?;

        let played = match &self.thread_pool{
            Some(pool) => pool.install(||{
                pairs.par_iter_mut()
                    .map(|(seller, buyer, cars)| play_pair(seller, buyer, cars.view()))
                    .collect::<Result<Vec<_>, LemonsError>>()
            }),
            None => pairs.iter_mut()
                .map(|(seller, buyer, cars)| play_pair(seller, buyer, cars.view()))
                .collect::<Result<Vec<_>, LemonsError>>()
        };
        let trajectories = match played{
            Ok(trajectories) => trajectories,
            Err(e) => {
                warn!("Game {game} aborted: {e}");
                for (seller, buyer, _) in pairs.iter_mut(){
                    seller.abort_game();
                    buyer.abort_game();
                }
                return Err(e);
            }
        };

        // Every agent closes the game, even if some other fails.
        let mut closed: Result<(), LemonsError> = Ok(());
        for ((seller, buyer, _), trajectory) in pairs.iter_mut().zip(trajectories.iter()){
            for agent in [&mut **seller, &mut **buyer]{
                if let Err(e) = agent.end_game(trajectory){
                    closed = closed.and(Err(e));
                }
            }
        }
        closed?;

        let log = GameLog::new(game, pairing, trajectories)?;
        debug!("Game {game} finished, trades: {}", log.trajectories().iter()
            .map(|t| t.iter().filter(|trade| trade.is_trade()).count()).sum::<usize>());
        self.logs.push(log);
        Ok(&self.logs[game])
    }
}

/// Builder collecting agents of [`MarketGame`].
pub struct MarketGameBuilder<M: ValueModel>{
    sellers: Vec<MarketAgent<M>>,
    buyers: Vec<MarketAgent<M>>,
    config: SimulationConfig,
    thread_pool: Option<rayon::ThreadPool>,
}

impl<M: ValueModel> MarketGameBuilder<M>{

    pub fn new(config: SimulationConfig) -> Self{
        Self{
            sellers: Vec::new(),
            buyers: Vec::new(),
            config,
            thread_pool: None,
        }
    }

    pub fn add_seller(&mut self, agent: MarketAgent<M>) -> Result<(), SetupError>{
        if agent.role() != Role::Seller{
            return Err(SetupError::illegal_parameter("role", agent.role(), "expected seller"));
        }
        self.sellers.push(agent);
        Ok(())
    }

    pub fn add_buyer(&mut self, agent: MarketAgent<M>) -> Result<(), SetupError>{
        if agent.role() != Role::Buyer{
            return Err(SetupError::illegal_parameter("role", agent.role(), "expected buyer"));
        }
        self.buyers.push(agent);
        Ok(())
    }

    pub fn with_seller(mut self, agent: MarketAgent<M>) -> Result<Self, SetupError>{
        self.add_seller(agent)?;
        Ok(self)
    }

    pub fn with_buyer(mut self, agent: MarketAgent<M>) -> Result<Self, SetupError>{
        self.add_buyer(agent)?;
        Ok(self)
    }

    /// Uses given pool instead of one built from `threads` of config.
    pub fn with_thread_pool(mut self, pool: rayon::ThreadPool) -> Self{
        self.thread_pool = Some(pool);
        self
    }

    /// Adds `n_pairs` sellers and buyers with default strategies, softmax temperature and
    /// discounted targets from config. `model` creates value model for agent of given role and index.
    /// With seed in config every agent gets its own derived seed.
    pub fn populate<F: FnMut(Role, usize) -> M>(mut self, mut model: F) -> Result<Self, SetupError>{
        let targets = self.config.targets()?;
        let n = self.config.n_pairs;
        for i in 0..n{
            let mut agent = MarketAgent::new_seller(i, model(Role::Seller, i), self.config.alpha, targets)?;
            if let Some(seed) = self.config.seed{
                agent = agent.with_seed(seed.wrapping_add(1 + i as u64));
            }
            self.add_seller(agent)?;
        }
        for i in 0..n{
            let mut agent = MarketAgent::new_buyer(i, model(Role::Buyer, i), self.config.alpha, targets)?;
            if let Some(seed) = self.config.seed{
                agent = agent.with_seed(seed.wrapping_add(1 + (n + i) as u64));
            }
            self.add_buyer(agent)?;
        }
        Ok(self)
    }

    pub fn build(self) -> Result<MarketGame<M>, SetupError>{
        self.config.validate()?;
        if self.sellers.len() != self.buyers.len(){
            return Err(SetupError::PlayerCountMismatch {sellers: self.sellers.len(), buyers: self.buyers.len()});
        }
        if self.sellers.len() != self.config.n_pairs{
            return Err(SetupError::illegal_parameter("n_pairs", self.config.n_pairs,
                &format!("game has {} pairs of agents", self.sellers.len())));
        }
        let thread_pool = match (self.thread_pool, self.config.threads){
            (Some(pool), _) => Some(pool),
            (None, Some(threads)) => Some(rayon::ThreadPoolBuilder::new().num_threads(threads).build()
                .map_err(|e| SetupError::illegal_parameter("threads", threads, &e.to_string()))?),
            (None, None) => None,
        };
        let rng = match self.config.seed{
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(MarketGame{
            sellers: self.sellers,
            buyers: self.buyers,
            config: self.config,
            rng,
            thread_pool,
            logs: Vec::new(),
        })
    }
}

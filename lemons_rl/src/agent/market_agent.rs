use std::fmt::{Debug, Formatter};
use ndarray::{concatenate, Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use lemons_core::domain::{MarketView, Role, Trade, PRICE_THRESHOLD};
use lemons_core::error::{DataError, LearningError, LemonsError, SetupError};
use lemons_core::features::{ACTION_SLOT, FEATURE_LEN};
use lemons_core::target::{DiscountedTargets, TargetFunction};
use crate::agent::{FitSummary, GameMemory};
use crate::model::{mean_squared_error, FitConfig, ValueModel};
use crate::policy::ActionSelector;

/// Prices seller may quote by default: `1, 2, ..., 12`.
pub fn default_seller_strategies() -> Vec<f32>{
    (1..=12).map(|p| p as f32).collect()
}

/// Decisions buyer may take: decline (`0`) and buy (`1`).
pub fn default_buyer_strategies() -> Vec<f32>{
    vec![0.0, 1.0]
}

/// Learning participant of the market, either seller or buyer.
///
/// In every iteration agent scores each candidate action with its value model, samples one
/// from softmax distribution over predictions and remembers feature row of the sampled
/// action. At the end of game rows are paired with targets computed from full trajectory
/// and stored in [`GameMemory`], which is later used by [`fit`](MarketAgent::fit).
pub struct MarketAgent<M: ValueModel>{
    id: usize,
    role: Role,
    strategies: Vec<f32>,
    model: M,
    selector: ActionSelector,
    target: Box<dyn TargetFunction>,
    current_features: Vec<Array1<f32>>,
    memory: GameMemory,
    explore_enabled: bool,
    rng: StdRng,
}

impl<M: ValueModel> MarketAgent<M>{

    /// Creates agent with softmax policy of temperature `alpha`.
    /// Buyer's strategies must be subset of `{0, 1}`.
    pub fn new(
        id: usize,
        role: Role,
        strategies: Vec<f32>,
        model: M,
        alpha: f64,
        target: Box<dyn TargetFunction>) -> Result<Self, SetupError>{

        if strategies.is_empty(){
            return Err(SetupError::EmptyStrategySet(role.to_string()));
        }
        if let Some(bad) = strategies.iter().find(|s| !s.is_finite()){
            return Err(SetupError::illegal_parameter("strategy", bad, "expected finite value"));
        }
        if role == Role::Buyer{
            if let Some(bad) = strategies.iter().find(|s| **s != 0.0 && **s != 1.0){
                return Err(SetupError::IllegalBuyerStrategy(*bad));
            }
        }
        if !(alpha > 0.0 && alpha.is_finite()){
            return Err(SetupError::illegal_parameter("alpha", alpha, "expected positive finite value"));
        }
        Ok(Self{
            id,
            role,
            strategies,
            model,
            selector: ActionSelector::Boltzmann {alpha},
            target,
            current_features: Vec::new(),
            memory: GameMemory::new(),
            explore_enabled: true,
            rng: StdRng::from_os_rng(),
        })
    }

    /// Seller with default price set and discounted targets.
    pub fn new_seller(id: usize, model: M, alpha: f64, targets: DiscountedTargets) -> Result<Self, SetupError>{
        Self::new(id, Role::Seller, default_seller_strategies(), model, alpha, Box::new(targets))
    }

    /// Buyer with default decision set and discounted targets.
    pub fn new_buyer(id: usize, model: M, alpha: f64, targets: DiscountedTargets) -> Result<Self, SetupError>{
        Self::new(id, Role::Buyer, default_buyer_strategies(), model, alpha, Box::new(targets))
    }

    /// Replaces random generator with seeded one.
    pub fn with_seed(mut self, seed: u64) -> Self{
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn id(&self) -> usize{
        self.id
    }

    pub fn role(&self) -> Role{
        self.role
    }

    pub fn strategies(&self) -> &[f32]{
        &self.strategies
    }

    pub fn selector(&self) -> &ActionSelector{
        &self.selector
    }

    pub fn model(&self) -> &M{
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M{
        &mut self.model
    }

    pub fn memory(&self) -> &GameMemory{
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut GameMemory{
        &mut self.memory
    }

    /// Number of actions taken in the game being played.
    pub fn pending_actions(&self) -> usize{
        self.current_features.len()
    }

    /// Switch exploring on and off. Without exploration agent always takes action with
    /// highest predicted payoff.
    pub fn switch_explore(&mut self, enabled: bool){
        self.explore_enabled = enabled;
    }

    pub fn is_exploring(&self) -> bool{
        self.explore_enabled
    }

    /// Actions agent may take in this view. Seller handed a peach may only quote prices above
    /// [`PRICE_THRESHOLD`].
    pub fn candidate_actions(&self, view: &MarketView) -> Result<Vec<f32>, LemonsError>{
        let candidates: Vec<f32> = match self.role{
            Role::Seller if view.current.car_type.is_peach() => self.strategies.iter()
                .copied()
                .filter(|s| *s > PRICE_THRESHOLD)
                .collect(),
            _ => self.strategies.clone()
        };
        if candidates.is_empty(){
            return Err(LemonsError::NoActionAvailable {
                context: format!("{} {} has no strategy for {}", self.role, self.id, view.current.car_type)
            })
        }
        Ok(candidates)
    }

    /// Selects action for current iteration and records its feature row.
    pub fn action(&mut self, view: &MarketView) -> Result<f32, LemonsError>{
        let mut features = self.role.extract_features(view)?;
        let candidates = self.candidate_actions(view)?;

        let mut batch = Array2::<f32>::zeros((candidates.len(), FEATURE_LEN));
        for (mut row, candidate) in batch.rows_mut().into_iter().zip(candidates.iter()){
            row.assign(&features);
            row[ACTION_SLOT] = *candidate;
        }
        let predictions = self.model.predict(batch.view())?;
        if predictions.len() != candidates.len(){
            return Err(DataError::LengthMismatch {
                left: candidates.len(),
                right: predictions.len(),
                context: "candidate actions and model predictions".into(),
            }.into())
        }
        let predictions = predictions.to_vec();
        let index = self.selector.select_index(&predictions, &mut self.rng, self.explore_enabled)
            .ok_or_else(|| LemonsError::NoActionAvailable {
                context: format!("{} {} could not sample action", self.role, self.id)
            })?;
        let action = candidates[index];

        #[cfg(feature = "log_trace")]
        log::trace!("{} {}: candidates {:?}, predictions {:?}, selected {}", self.role, self.id, candidates, predictions, action);

        features[ACTION_SLOT] = action;
        self.current_features.push(features);
        Ok(action)
    }

    /// Closes game: computes targets for full trajectory and stores them with recorded
    /// feature rows. Buffer of current game is emptied even if bookkeeping check fails.
    pub fn end_game(&mut self, trajectory: &[Trade]) -> Result<(), LemonsError>{
        let rows = std::mem::take(&mut self.current_features);
        if rows.len() != trajectory.len(){
            #[cfg(feature = "log_error")]
            log::error!("{} {} recorded {} actions, but trajectory has {} steps", self.role, self.id, rows.len(), trajectory.len());
            return Err(DataError::LengthMismatch {
                left: rows.len(),
                right: trajectory.len(),
                context: format!("feature rows and trajectory steps of {} {}", self.role, self.id),
            }.into())
        }
        let targets = self.target.targets_for(self.role, trajectory);
        if targets.len() != trajectory.len(){
            return Err(DataError::LengthMismatch {
                left: targets.len(),
                right: trajectory.len(),
                context: format!("targets and trajectory steps of {} {}", self.role, self.id),
            }.into())
        }
        let flat: Vec<f32> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        let features = Array2::from_shape_vec((rows.len(), FEATURE_LEN), flat)?;
        let _game = self.memory.push(features, targets)?;

        #[cfg(feature = "log_debug")]
        log::debug!("{} {} finished game {} with {} steps", self.role, self.id, _game, trajectory.len());
        Ok(())
    }

    /// Drops actions recorded in the game being played, nothing is stored in memory.
    /// Used when game could not be finished.
    pub fn abort_game(&mut self){
        #[cfg(feature = "log_debug")]
        log::debug!("{} {} aborts game after {} actions", self.role, self.id, self.current_features.len());
        self.current_features.clear();
    }

    /// Trains value model on examples of the most recent `n_games` games.
    ///
    /// Examples are shuffled and `holdout_fraction` of them (rounded up, but leaving at least one
    /// for training) is kept away from training to measure error on unseen data.
    pub fn fit(&mut self, n_games: usize, config: &FitConfig) -> Result<FitSummary, LemonsError>{
        config.validate()?;
        let (x, y) = {
            let games = self.memory.recent(n_games)?;
            if games.is_empty(){
                return Err(LearningError::NoTrainingData.into());
            }
            let feature_views: Vec<ArrayView2<f32>> = games.iter().map(|g| g.features().view()).collect();
            let target_views: Vec<ArrayView1<f32>> = games.iter().map(|g| g.targets().view()).collect();
            (concatenate(Axis(0), &feature_views)?, concatenate(Axis(0), &target_views)?)
        };
        if x.nrows() != y.len(){
            return Err(DataError::LengthMismatch {
                left: x.nrows(),
                right: y.len(),
                context: format!("training features and targets of {} {}", self.role, self.id),
            }.into())
        }
        let examples = y.len();
        if examples == 0{
            return Err(LearningError::NoTrainingData.into());
        }

        let mut indices: Vec<usize> = (0..examples).collect();
        indices.shuffle(&mut self.rng);
        let holdout_size = ((examples as f64 * config.holdout_fraction).ceil() as usize).min(examples - 1);
        let (holdout_idx, train_idx) = indices.split_at(holdout_size);

        let x_train = x.select(Axis(0), train_idx);
        let y_train = y.select(Axis(0), train_idx);
        self.model.fit(x_train.view(), y_train.view(), config)?;
        let train_mse = mean_squared_error(self.model.predict(x_train.view())?.view(), y_train.view());

        let holdout_mse = if holdout_idx.is_empty(){
            None
        } else {
            let x_holdout = x.select(Axis(0), holdout_idx);
            let y_holdout = y.select(Axis(0), holdout_idx);
            Some(mean_squared_error(self.model.predict(x_holdout.view())?.view(), y_holdout.view()))
        };

        #[cfg(feature = "log_info")]
        log::info!("{} {} fitted on {} examples: train mse = {:.2}, holdout mse = {:?}",
            self.role, self.id, examples, train_mse, holdout_mse);

        Ok(FitSummary::new(self.id, self.role, n_games, examples, train_idx.len(), holdout_size, train_mse, holdout_mse))
    }
}

impl<M: ValueModel> Debug for MarketAgent<M>{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketAgent")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("strategies", &self.strategies)
            .field("selector", &self.selector)
            .field("games", &self.memory.len())
            .field("pending_actions", &self.current_features.len())
            .finish()
    }
}

#[cfg(test)]
mod tests{
    use ndarray::{Array1, ArrayView1, ArrayView2};
    use lemons_core::domain::{CarType, Decision, MarketView, OpenTrade, Role, Trade};
    use lemons_core::error::{DataError, LearningError, LemonsError, SetupError};
    use lemons_core::features::ACTION_SLOT;
    use lemons_core::target::DiscountedTargets;
    use crate::agent::MarketAgent;
    use crate::error::LemonsRlError;
    use crate::model::{FitConfig, LinearValueModel, ValueModel};

    /// Model preferring larger action values.
    struct ActionValue;

    impl ValueModel for ActionValue{
        fn fit(&mut self, _x: ArrayView2<f32>, _y: ArrayView1<f32>, _config: &FitConfig) -> Result<(), LemonsRlError> {
            Ok(())
        }

        fn predict(&self, x: ArrayView2<f32>) -> Result<Array1<f32>, LemonsRlError> {
            Ok(x.column(ACTION_SLOT).to_owned())
        }
    }

    fn seller() -> MarketAgent<LinearValueModel>{
        MarketAgent::new_seller(0, LinearValueModel::new(10, 0.01, 0), 1.0, DiscountedTargets::default())
            .unwrap().with_seed(1)
    }

    fn buyer() -> MarketAgent<LinearValueModel>{
        MarketAgent::new_buyer(0, LinearValueModel::new(10, 0.01, 0), 1.0, DiscountedTargets::default())
            .unwrap().with_seed(2)
    }

    fn play_game(seller: &mut MarketAgent<LinearValueModel>, buyer: &mut MarketAgent<LinearValueModel>, cars: &[CarType]) -> Vec<Trade>{
        let mut trades = Vec::new();
        for car in cars{
            let open = OpenTrade::new(*car);
            let price = seller.action(&MarketView::new(&trades, open)).unwrap();
            let open = open.with_price(price);
            let decision = buyer.action(&MarketView::new(&trades, open)).unwrap();
            trades.push(open.close(Decision::try_from_value(decision).unwrap()).unwrap());
        }
        seller.end_game(&trades).unwrap();
        buyer.end_game(&trades).unwrap();
        trades
    }

    #[test]
    fn constructor_validation(){
        let model = || LinearValueModel::new(10, 0.01, 0);
        let t = || Box::new(DiscountedTargets::default());
        assert!(matches!(MarketAgent::new(0, Role::Seller, vec![], model(), 1.0, t()), Err(SetupError::EmptyStrategySet(_))));
        assert!(matches!(MarketAgent::new(0, Role::Buyer, vec![0.0, 2.0], model(), 1.0, t()), Err(SetupError::IllegalBuyerStrategy(_))));
        assert!(matches!(MarketAgent::new(0, Role::Seller, vec![1.0], model(), 0.0, t()), Err(SetupError::IllegalParameter {..})));
        assert!(MarketAgent::new(0, Role::Seller, vec![1.0, 7.0], model(), 0.5, t()).is_ok());
    }

    #[test]
    fn seller_with_peach_prices_above_threshold(){
        let mut seller = seller();
        let view = MarketView::new(&[], OpenTrade::new(CarType::Peach));
        assert_eq!(seller.candidate_actions(&view).unwrap(), vec![6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
        for _ in 0..100{
            let price = seller.action(&view).unwrap();
            assert!(price > 5.0 && price <= 12.0 && price.fract() == 0.0);
        }
        let view = MarketView::new(&[], OpenTrade::new(CarType::Lemon));
        assert_eq!(seller.candidate_actions(&view).unwrap().len(), 12);
    }

    #[test]
    fn seller_without_high_prices_has_no_action_for_peach(){
        let seller = MarketAgent::new(0, Role::Seller, vec![1.0, 2.0], LinearValueModel::new(10, 0.01, 0),
                                      1.0, Box::new(DiscountedTargets::default())).unwrap();
        let view = MarketView::new(&[], OpenTrade::new(CarType::Peach));
        assert!(matches!(seller.candidate_actions(&view), Err(LemonsError::NoActionAvailable {..})));
    }

    #[test]
    fn buyer_acts_only_after_price(){
        let mut buyer = buyer();
        let view = MarketView::new(&[], OpenTrade::new(CarType::Lemon));
        assert!(buyer.action(&view).is_err());
        let d = buyer.action(&MarketView::new(&[], OpenTrade::new(CarType::Lemon).with_price(3.0))).unwrap();
        assert!(d == 0.0 || d == 1.0);
    }

    #[test]
    fn greedy_agent_takes_best_action(){
        let mut seller = MarketAgent::new(0, Role::Seller, vec![1.0, 4.0, 9.0], ActionValue, 1.0,
                                          Box::new(DiscountedTargets::default())).unwrap();
        seller.switch_explore(false);
        let view = MarketView::new(&[], OpenTrade::new(CarType::Lemon));
        assert_eq!(seller.action(&view).unwrap(), 9.0);
    }

    #[test]
    fn end_game_stores_examples(){
        let mut s = seller();
        let mut b = buyer();
        let cars = [CarType::Peach, CarType::Lemon, CarType::Peach];
        let trades = play_game(&mut s, &mut b, &cars);
        assert_eq!(s.memory().len(), 1);
        let game = &s.memory().games()[0];
        assert_eq!(game.features().nrows(), 3);
        assert_eq!(game.targets().len(), 3);
        for (row, trade) in game.features().rows().into_iter().zip(trades.iter()){
            assert_eq!(row[ACTION_SLOT], trade.price);
            assert_eq!(row[1], trade.car_type.as_f32());
        }
        let game = &b.memory().games()[0];
        for (row, trade) in game.features().rows().into_iter().zip(trades.iter()){
            assert_eq!(row[ACTION_SLOT], trade.decision.as_f32());
            assert_eq!(row[1], trade.price);
        }
        assert_eq!(s.pending_actions(), 0);
    }

    #[test]
    fn end_game_rejects_mismatched_trajectory(){
        let mut s = seller();
        s.action(&MarketView::new(&[], OpenTrade::new(CarType::Lemon))).unwrap();
        let trades = [
            Trade::new(CarType::Lemon, 2.0, Decision::Bought),
            Trade::new(CarType::Lemon, 2.0, Decision::Bought),
        ];
        let err = s.end_game(&trades).unwrap_err();
        assert!(matches!(err, LemonsError::Data {error: DataError::LengthMismatch {left: 1, right: 2, ..}}));
        assert_eq!(s.pending_actions(), 0);
        assert!(s.memory().is_empty());
    }

    #[test]
    fn aborted_game_leaves_no_trace(){
        let mut s = seller();
        let mut b = buyer();
        s.action(&MarketView::new(&[], OpenTrade::new(CarType::Lemon))).unwrap();
        s.abort_game();
        assert_eq!(s.pending_actions(), 0);
        play_game(&mut s, &mut b, &[CarType::Lemon, CarType::Peach]);
        assert_eq!(s.memory().len(), 1);
        assert_eq!(s.memory().games()[0].len(), 2);
    }

    #[test]
    fn fit_requires_history(){
        let mut s = seller();
        let mut b = buyer();
        play_game(&mut s, &mut b, &[CarType::Lemon; 4]);
        let err = s.fit(2, &FitConfig::default()).unwrap_err();
        assert_eq!(err, LemonsError::Learning {error: LearningError::InsufficientHistory {requested: 2, recorded: 1}});
    }

    #[test]
    fn fit_reports_split(){
        let mut s = seller();
        let mut b = buyer();
        for _ in 0..5{
            play_game(&mut s, &mut b, &[CarType::Lemon, CarType::Peach, CarType::Peach, CarType::Lemon]);
        }
        let summary = s.fit(3, &FitConfig::default()).unwrap();
        assert_eq!(summary.examples(), 12);
        assert_eq!(summary.holdout_size(), 2);
        assert_eq!(summary.train_size(), 10);
        assert!(summary.holdout_mse().is_some());
        assert!(s.model().is_fitted());

        let config = FitConfig{holdout_fraction: 0.0, ..FitConfig::default()};
        let summary = b.fit(1, &config).unwrap();
        assert_eq!(summary.holdout_mse(), None);
        assert_eq!(summary.train_size(), 4);
    }

    #[test]
    fn custom_target_function(){
        let target = |_role: Role, trajectory: &[Trade]| Array1::from_elem(trajectory.len(), 7.0f32);
        let mut s = MarketAgent::new(3, Role::Seller, vec![6.0], LinearValueModel::new(10, 0.01, 0), 1.0, Box::new(target)).unwrap();
        let view = MarketView::new(&[], OpenTrade::new(CarType::Peach));
        assert_eq!(s.action(&view).unwrap(), 6.0);
        s.end_game(&[Trade::new(CarType::Peach, 6.0, Decision::Declined)]).unwrap();
        assert_eq!(s.memory().games()[0].targets().to_vec(), vec![7.0]);
    }
}

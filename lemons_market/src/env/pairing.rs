use std::fmt::{Display, Formatter};
use ndarray::{Array2, ArrayView1};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use lemons_core::domain::CarType;
use lemons_core::error::{GameError, SetupError};
use crate::config::CarDistribution;

/// Pairing of sellers with buyers for one game, together with car types handed to sellers.
/// > It follows:
/// 1. Seller `i` plays the whole game with buyer `buyers[i]`.
/// 2. Mapping of sellers to buyers is a bijection.
/// 3. `car_types[[iteration, i]]` is the car seller `i` gets in given iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairingTable{
    buyers: Vec<usize>,
    car_types: Array2<CarType>,
}

impl PairingTable{

    /// Creates table from explicit pairing. `car_types` must have shape `[iterations, buyers.len()]`.
    pub fn new(buyers: Vec<usize>, car_types: Array2<CarType>) -> Result<Self, GameError>{
        if car_types.ncols() != buyers.len(){
            return Err(GameError::PairingSizeMismatch {table: car_types.ncols(), agents: buyers.len()});
        }
        let table = Self{buyers, car_types};
        if !table.is_bijection(){
            return Err(GameError::PairingNotBijective {pairs: table.n_pairs()});
        }
        Ok(table)
    }

    pub fn n_pairs(&self) -> usize{
        self.buyers.len()
    }

    pub fn n_iterations(&self) -> usize{
        self.car_types.nrows()
    }

    pub fn buyers(&self) -> &[usize]{
        &self.buyers
    }

    pub fn car_types(&self) -> &Array2<CarType>{
        &self.car_types
    }

    pub fn buyer_of(&self, seller: usize) -> Option<usize>{
        self.buyers.get(seller).copied()
    }

    pub fn seller_of(&self, buyer: usize) -> Option<usize>{
        self.buyers.iter().position(|b| *b == buyer)
    }

    /// Cars handed to seller in consecutive iterations.
    pub fn cars_of(&self, seller: usize) -> Option<ArrayView1<'_, CarType>>{
        (seller < self.n_pairs()).then(|| self.car_types.column(seller))
    }

    pub fn is_bijection(&self) -> bool{
        let mut seen = vec![false; self.buyers.len()];
        for b in &self.buyers{
            match seen.get_mut(*b){
                Some(s) if !*s => *s = true,
                _ => return false,
            }
        }
        true
    }
}

impl Display for PairingTable{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (seller, buyer) in self.buyers.iter().enumerate(){
            write!(f, "[{seller} -> {buyer}]")?;
        }
        Ok(())
    }
}

/// Draws random pairing: buyers are a uniformly shuffled permutation of sellers' indices
/// (seller `i` may end up with buyer `i`, they are different agents) and every cell of car
/// table is drawn independently from `distribution`.
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use lemons_market::config::CarDistribution;
/// use lemons_market::env::generate_pairing;
/// let mut rng = StdRng::seed_from_u64(1);
/// let table = generate_pairing(4, 20, &CarDistribution::default(), &mut rng).unwrap();
/// assert!(table.is_bijection());
/// assert_eq!(table.car_types().shape(), &[20, 4]);
/// ```
pub fn generate_pairing<R: Rng + ?Sized>(
    n_pairs: usize,
    n_iterations: usize,
    distribution: &CarDistribution,
    rng: &mut R) -> Result<PairingTable, SetupError>{

    if n_pairs == 0{
        return Err(SetupError::illegal_parameter("n_pairs", n_pairs, "expected at least one pair"));
    }
    let mut buyers: Vec<usize> = (0..n_pairs).collect();
    buyers.shuffle(rng);
    let car_types = Array2::from_shape_fn((n_iterations, n_pairs), |_| distribution.sample(rng));
    Ok(PairingTable{buyers, car_types})
}

#[cfg(test)]
mod tests{
    use ndarray::Array2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use lemons_core::domain::CarType;
    use lemons_core::error::GameError;
    use crate::config::CarDistribution;
    use crate::env::{generate_pairing, PairingTable};

    #[test]
    fn generated_pairing_is_bijection(){
        let mut rng = StdRng::seed_from_u64(17);
        for n in 1..30{
            let table = generate_pairing(n, 3, &CarDistribution::default(), &mut rng).unwrap();
            assert!(table.is_bijection());
            for seller in 0..n{
                let buyer = table.buyer_of(seller).unwrap();
                assert_eq!(table.seller_of(buyer), Some(seller));
            }
        }
    }

    #[test]
    fn zero_pairs_rejected(){
        let mut rng = StdRng::seed_from_u64(0);
        assert!(generate_pairing(0, 3, &CarDistribution::default(), &mut rng).is_err());
    }

    #[test]
    fn car_frequencies_follow_distribution(){
        let mut rng = StdRng::seed_from_u64(5);
        let table = generate_pairing(50, 200, &CarDistribution::default(), &mut rng).unwrap();
        let peaches = table.car_types().iter().filter(|c| **c == CarType::Peach).count();
        let share = peaches as f64 / 10_000.0;
        assert!((share - 0.75).abs() < 0.03);
    }

    #[test]
    fn explicit_table_validation(){
        let cars = Array2::from_elem((2, 3), CarType::Lemon);
        assert!(PairingTable::new(vec![2, 0, 1], cars.clone()).is_ok());
        assert_eq!(PairingTable::new(vec![0, 0, 1], cars.clone()), Err(GameError::PairingNotBijective {pairs: 3}));
        assert_eq!(PairingTable::new(vec![0, 3, 1], cars.clone()), Err(GameError::PairingNotBijective {pairs: 3}));
        assert_eq!(PairingTable::new(vec![0, 1], cars), Err(GameError::PairingSizeMismatch {table: 3, agents: 2}));
    }
}

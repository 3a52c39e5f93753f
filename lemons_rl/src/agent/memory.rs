use getset::{CopyGetters, Getters};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use lemons_core::error::{DataError, LearningError};
use lemons_core::features::FEATURE_LEN;

/// Training examples collected by agent in one game.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters, Serialize, Deserialize)]
pub struct GameExamples{
    /// Number of game in agent's memory (counting from `0`, never reused).
    #[getset(get_copy = "pub")]
    game: usize,
    /// One feature row per action taken, with action written into action slot.
    #[getset(get = "pub")]
    features: Array2<f32>,
    /// Target value for every feature row.
    #[getset(get = "pub")]
    targets: Array1<f32>,
}

impl GameExamples{
    pub fn len(&self) -> usize{
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool{
        self.targets.is_empty()
    }
}

/// Append only log of per game examples owned by single agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameMemory{
    games: Vec<GameExamples>,
    next_game: usize,
}

impl GameMemory{

    pub fn new() -> Self{
        Self::default()
    }

    /// Appends examples of finished game and returns its number.
    /// Rows of features must match targets one to one.
    pub fn push(&mut self, features: Array2<f32>, targets: Array1<f32>) -> Result<usize, DataError>{
        if features.nrows() != targets.len(){
            return Err(DataError::LengthMismatch {
                left: features.nrows(),
                right: targets.len(),
                context: "feature rows and targets of game".into(),
            })
        }
        if features.ncols() != FEATURE_LEN{
            return Err(DataError::FeatureWidth {expected: FEATURE_LEN, got: features.ncols()})
        }
        let game = self.next_game;
        self.games.push(GameExamples{game, features, targets});
        self.next_game += 1;
        Ok(game)
    }

    /// Most recent `n` games, oldest first.
    pub fn recent(&self, n: usize) -> Result<&[GameExamples], LearningError>{
        if n > self.games.len(){
            return Err(LearningError::InsufficientHistory {
                requested: n,
                recorded: self.games.len(),
            })
        }
        Ok(&self.games[self.games.len() - n..])
    }

    pub fn games(&self) -> &[GameExamples]{
        &self.games
    }

    pub fn len(&self) -> usize{
        self.games.len()
    }

    pub fn is_empty(&self) -> bool{
        self.games.is_empty()
    }

    pub fn total_examples(&self) -> usize{
        self.games.iter().map(|g| g.len()).sum()
    }

    /// Forgets stored games. Numbering continues.
    pub fn clear(&mut self){
        self.games.clear();
    }
}

#[cfg(test)]
mod tests{
    use ndarray::{Array1, Array2};
    use lemons_core::error::{DataError, LearningError};
    use lemons_core::features::FEATURE_LEN;
    use crate::agent::GameMemory;

    #[test]
    fn recent_requires_enough_games(){
        let mut memory = GameMemory::new();
        for n in 1..=3{
            memory.push(Array2::zeros((n, FEATURE_LEN)), Array1::zeros(n)).unwrap();
        }
        assert_eq!(memory.recent(2).unwrap().iter().map(|g| g.game()).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(memory.recent(4), Err(LearningError::InsufficientHistory {requested: 4, recorded: 3}));
        assert_eq!(memory.total_examples(), 6);
    }

    #[test]
    fn numbering_survives_clear(){
        let mut memory = GameMemory::new();
        memory.push(Array2::zeros((1, FEATURE_LEN)), Array1::zeros(1)).unwrap();
        memory.clear();
        assert!(memory.is_empty());
        let n = memory.push(Array2::zeros((1, FEATURE_LEN)), Array1::zeros(1)).unwrap();
        assert_eq!(n, 1);
    }

    #[test]
    fn mismatched_lengths_are_rejected(){
        let mut memory = GameMemory::new();
        let err = memory.push(Array2::zeros((3, FEATURE_LEN)), Array1::zeros(2)).unwrap_err();
        assert!(matches!(err, DataError::LengthMismatch {left: 3, right: 2, ..}));
        let err = memory.push(Array2::zeros((2, 4)), Array1::zeros(2)).unwrap_err();
        assert_eq!(err, DataError::FeatureWidth {expected: FEATURE_LEN, got: 4});
        assert!(memory.is_empty());
    }
}

pub mod crash;
pub mod dice;
pub mod types;

pub use crash::RoundScheduler;
pub use dice::DiceResolver;
pub use types::*;

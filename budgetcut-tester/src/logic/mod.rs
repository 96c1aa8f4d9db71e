pub mod game_tester;
pub mod policy;
pub mod reports;
pub mod simulation;
pub mod tester;

pub use game_tester::GameTester;
pub use policy::GameplayStrategy;
pub use tester::*;

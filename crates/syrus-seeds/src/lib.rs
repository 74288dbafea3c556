pub mod corpus;
pub mod engine;
pub mod error;
pub mod rng;

pub use engine::{draw, ExpectationViolation, ExpectationViolationKind, SeedPackage};
pub use error::{Result, SeedError};
pub use rng::{EntropyRngSource, FixedRngSource, RngSource};

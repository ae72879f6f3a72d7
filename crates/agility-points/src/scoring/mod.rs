pub mod domain;
pub mod evaluator;
pub mod lifetime;
pub mod multiq;
pub mod resolver;
pub mod rules;

pub use domain::{Dog, QStatus, Run, Trial};
pub use evaluator::{EvaluatedRun, Rate, RunEvaluator};
pub use lifetime::{LifetimeKind, LifetimePointAccumulator, LifetimeTally, Subtotal};
pub use multiq::{MultiQOccurrence, MultiQSummary, MultiQTracker};
pub use resolver::ScoringResolver;
pub use rules::{Configuration, ScoringRule, ScoringStyle, ScoringType};

//! Typed rule descriptions: create rules, change records, and plans.

mod change;
mod condition;
mod create;
mod plan;

pub use change::ChangeRecord;
pub use condition::{Condition, ConditionalValue, Pattern, Predicate};
pub use create::CreateRule;
pub use plan::HarmonisationPlan;

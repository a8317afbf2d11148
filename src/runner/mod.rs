pub mod executor;
pub mod filter;
pub mod replay;
pub mod types;

pub use executor::TestEngine;
pub use filter::{AcceptAll, Filter, PatternFilter};
pub use replay::{CaseRun, SuiteRun};
pub use types::RunSummary;

pub mod check;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod logger;
pub mod registry;
pub mod reporter;
pub mod runner;

// Re-export commonly used types
pub use check::{Abort, CheckInvocation, CompareOp, Flow, Location, Operand, Severity};
pub use config::{ReporterKind, RunConfig};
pub use context::{
    CaseContext, CheckContext, Fault, FaultKind, SessionContext, SuiteContext, Verdict,
};
pub use error::{Result, RuunitError, UsageFault};
pub use registry::{Case, CaseEntry, Registry, Suite, SuiteEntry, TestCase, TestSuite};
pub use reporter::Reporter;
pub use runner::{CaseRun, Filter, RunSummary, SuiteRun, TestEngine};

/// 检查模块 - 严重级别、检查输入与判定逻辑
mod evaluator;
mod predicate;
mod types;

pub use evaluator::{CaseState, Control, Decision, decide};
pub use predicate::{is_between, is_near};
pub use types::{Abort, CheckInvocation, CompareOp, Flow, Location, Operand, Operands, Severity};

//! Reporter 协议
//!
//! 引擎在自己的线程上同步调用这些方法，调用顺序严格嵌套：
//!
//! ```text
//! session_start
//!   suite_start
//!     case_start
//!       check_start check_end ...
//!     case_end
//!   suite_end
//! session_end
//! ```
//!
//! 上下文以引用传入，Reporter 不能在对应的 `*_end` 调用之后继续持有它们。

pub mod console;
pub mod json;

pub use console::ConsoleReporter;
pub use json::JsonReporter;

use crate::context::{CaseContext, CheckContext, Fault, SessionContext, SuiteContext};

/// 测试进度观察者
pub trait Reporter {
    fn on_session_start(&mut self, session: &SessionContext);

    fn on_session_end(&mut self, session: &SessionContext);

    fn on_suite_start(&mut self, suite: &SuiteContext<'_>);

    fn on_suite_end(&mut self, suite: &SuiteContext<'_>);

    fn on_case_start(&mut self, case: &CaseContext<'_>);

    fn on_case_end(&mut self, case: &CaseContext<'_>);

    fn on_check_start(&mut self, check: &CheckContext<'_>);

    fn on_check_end(&mut self, check: &CheckContext<'_>);

    /// SANITY (session) 失败，整个 Session 无法继续
    fn on_fatal_error(&mut self, fault: &Fault);

    /// 测试步骤说明
    fn on_step(&mut self, _case: &CaseContext<'_>, _text: &str) {}

    /// 测试体输出的消息
    fn on_message(&mut self, _case: &CaseContext<'_>, _text: &str) {}
}

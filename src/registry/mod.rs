/// 注册表模块 - 在运行前收集测试单元
mod list;
mod unit;

pub use list::{CaseEntry, Iter, Registered, Registry, RegistryError, SuiteEntry, UnitList};
pub use unit::{Case, HasLocation, HasName, Suite, TestCase, TestSuite};

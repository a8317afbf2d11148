use crate::check::{Flow, Location};
use crate::runner::{CaseRun, SuiteRun};

/// 有名称的测试单元
pub trait HasName {
    fn name(&self) -> &str;
}

/// 有源码位置的测试单元
pub trait HasLocation {
    fn location(&self) -> Location;
}

/// 独立 Case（属于 DEFAULT Suite）
pub trait TestCase: HasName + HasLocation + Sync {
    fn run(&self, case: &mut CaseRun<'_>) -> Flow;
}

/// 带共享 Setup / Teardown 的 Suite
///
/// `run` 会对每个 Case 位置各调用一次：`case(..)` 之前的语句是 Setup，之后的是
/// Teardown，只有与当前目标位置对应的 `case(..)` 会真正执行。
pub trait TestSuite: HasName + HasLocation + Sync {
    fn run(&self, suite: &mut SuiteRun<'_>) -> Flow;
}

/// 以函数作为测试体的独立 Case，可以声明为 `static`
pub struct Case {
    name: &'static str,
    location: Location,
    body: fn(&mut CaseRun<'_>) -> Flow,
}

impl Case {
    pub const fn new(
        name: &'static str,
        location: Location,
        body: fn(&mut CaseRun<'_>) -> Flow,
    ) -> Self {
        Self {
            name,
            location,
            body,
        }
    }
}

impl HasName for Case {
    fn name(&self) -> &str {
        self.name
    }
}

impl HasLocation for Case {
    fn location(&self) -> Location {
        self.location
    }
}

impl TestCase for Case {
    fn run(&self, case: &mut CaseRun<'_>) -> Flow {
        (self.body)(case)
    }
}

/// 以函数作为 Suite 体的 Suite，可以声明为 `static`
pub struct Suite {
    name: &'static str,
    location: Location,
    body: fn(&mut SuiteRun<'_>) -> Flow,
}

impl Suite {
    pub const fn new(
        name: &'static str,
        location: Location,
        body: fn(&mut SuiteRun<'_>) -> Flow,
    ) -> Self {
        Self {
            name,
            location,
            body,
        }
    }
}

impl HasName for Suite {
    fn name(&self) -> &str {
        self.name
    }
}

impl HasLocation for Suite {
    fn location(&self) -> Location {
        self.location
    }
}

impl TestSuite for Suite {
    fn run(&self, suite: &mut SuiteRun<'_>) -> Flow {
        (self.body)(suite)
    }
}

/// 当前源码位置，可用于 `static` 初始化
#[macro_export]
macro_rules! location {
    () => {
        $crate::check::Location::new(file!(), line!())
    };
}

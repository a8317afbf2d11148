use std::fmt;
use std::marker::PhantomData;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::registry::unit::{HasName, TestCase, TestSuite};

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("测试单元 '{0}' 已经注册过")]
    AlreadyRegistered(String),
}

/// 注册节点
///
/// 节点本身就是链表的一环（`next` 只能设置一次），所以注册过程不需要分配内存。
/// 节点通常声明为 `static`。
pub struct Registered<T: ?Sized + 'static> {
    unit: &'static T,
    next: OnceLock<&'static Registered<T>>,
    linked: AtomicBool,
}

impl<T: ?Sized + 'static> Registered<T> {
    pub const fn new(unit: &'static T) -> Self {
        Self {
            unit,
            next: OnceLock::new(),
            linked: AtomicBool::new(false),
        }
    }

    pub fn unit(&self) -> &'static T {
        self.unit
    }
}

/// 独立 Case 的注册节点
pub type CaseEntry = Registered<dyn TestCase>;

/// Suite 的注册节点
pub type SuiteEntry = Registered<dyn TestSuite>;

/// 按注册顺序排列的单元链表
pub struct UnitList<T: ?Sized + 'static> {
    head: Option<&'static Registered<T>>,
    tail: Option<&'static Registered<T>>,
    len: usize,
}

impl<T: ?Sized + HasName + 'static> UnitList<T> {
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// 追加到链表末尾；同一个节点只能注册一次
    pub fn push(&mut self, entry: &'static Registered<T>) -> Result<(), RegistryError> {
        if entry.linked.swap(true, Ordering::AcqRel) {
            return Err(RegistryError::AlreadyRegistered(
                entry.unit.name().to_string(),
            ));
        }

        match self.tail {
            Some(tail) => {
                if tail.next.set(entry).is_err() {
                    return Err(RegistryError::AlreadyRegistered(
                        tail.unit.name().to_string(),
                    ));
                }
            }
            None => self.head = Some(entry),
        }

        self.tail = Some(entry);
        self.len += 1;
        Ok(())
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head,
            remaining: self.len,
            _list: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T: ?Sized + HasName + 'static> Default for UnitList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// 只读遍历，可以多次、嵌套调用
pub struct Iter<'a, T: ?Sized + 'static> {
    next: Option<&'static Registered<T>>,
    remaining: usize,
    _list: PhantomData<&'a UnitList<T>>,
}

impl<T: ?Sized + 'static> Iterator for Iter<'_, T> {
    type Item = &'static T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next?;
        self.remaining -= 1;
        self.next = current.next.get().copied();
        Some(current.unit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

/// 测试单元注册表
///
/// 由启动例程显式调用 `register_*` 填充，之后只读。注册顺序即执行顺序。
#[derive(Default)]
pub struct Registry {
    cases: UnitList<dyn TestCase>,
    suites: UnitList<dyn TestSuite>,
}

impl Registry {
    pub const fn new() -> Self {
        Self {
            cases: UnitList::new(),
            suites: UnitList::new(),
        }
    }

    /// 注册独立 Case（DEFAULT Suite）
    pub fn register_case(&mut self, entry: &'static CaseEntry) -> Result<(), RegistryError> {
        self.cases.push(entry)
    }

    /// 注册 Suite
    pub fn register_suite(&mut self, entry: &'static SuiteEntry) -> Result<(), RegistryError> {
        self.suites.push(entry)
    }

    pub fn cases(&self) -> Iter<'_, dyn TestCase> {
        self.cases.iter()
    }

    pub fn suites(&self) -> Iter<'_, dyn TestSuite> {
        self.suites.iter()
    }

    pub fn for_each_case<F: FnMut(&'static dyn TestCase)>(&self, f: F) {
        self.cases().for_each(f);
    }

    pub fn for_each_suite<F: FnMut(&'static dyn TestSuite)>(&self, f: F) {
        self.suites().for_each(f);
    }

    pub fn case_count(&self) -> usize {
        self.cases.len()
    }

    pub fn suite_count(&self) -> usize {
        self.suites.len()
    }

    /// Suite 总数，有独立 Case 时包含 DEFAULT
    pub fn suites_total(&self) -> usize {
        self.suites.len() + usize::from(!self.cases.is_empty())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("cases", &self.cases.len())
            .field("suites", &self.suites.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{Flow, Location};
    use crate::registry::unit::{Case, HasLocation, Suite};

    fn noop_case(_: &mut crate::runner::CaseRun<'_>) -> Flow {
        Ok(())
    }

    fn noop_suite(_: &mut crate::runner::SuiteRun<'_>) -> Flow {
        Ok(())
    }

    #[test]
    fn test_registration_preserves_order() {
        static FIRST: Case = Case::new("first", Location::new("a.rs", 1), noop_case);
        static SECOND: Case = Case::new("second", Location::new("a.rs", 2), noop_case);
        static THIRD: Case = Case::new("third", Location::new("a.rs", 3), noop_case);
        static FIRST_ENTRY: CaseEntry = CaseEntry::new(&FIRST);
        static SECOND_ENTRY: CaseEntry = CaseEntry::new(&SECOND);
        static THIRD_ENTRY: CaseEntry = CaseEntry::new(&THIRD);

        let mut registry = Registry::new();
        registry.register_case(&FIRST_ENTRY).unwrap();
        registry.register_case(&SECOND_ENTRY).unwrap();
        registry.register_case(&THIRD_ENTRY).unwrap();

        let names: Vec<&str> = registry.cases().map(|c| c.name()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);

        // 可以重复遍历
        let mut again = Vec::new();
        registry.for_each_case(|c| again.push(c.location().line));
        assert_eq!(again, vec![1, 2, 3]);
        assert_eq!(registry.suites_total(), 1);
    }

    #[test]
    fn test_double_registration_is_rejected() {
        static ONLY: Suite = Suite::new("only", Location::new("b.rs", 1), noop_suite);
        static ONLY_ENTRY: SuiteEntry = SuiteEntry::new(&ONLY);

        let mut registry = Registry::new();
        registry.register_suite(&ONLY_ENTRY).unwrap();
        let err = registry.register_suite(&ONLY_ENTRY).unwrap_err();

        assert_eq!(err, RegistryError::AlreadyRegistered("only".to_string()));
        assert_eq!(registry.suite_count(), 1);
        assert_eq!(registry.suites().count(), 1);
    }

    #[test]
    fn test_node_cannot_join_two_registries() {
        static SHARED: Case = Case::new("shared", Location::new("c.rs", 1), noop_case);
        static SHARED_ENTRY: CaseEntry = CaseEntry::new(&SHARED);

        let mut first = Registry::new();
        let mut second = Registry::new();
        first.register_case(&SHARED_ENTRY).unwrap();
        assert!(second.register_case(&SHARED_ENTRY).is_err());
        assert_eq!(second.suites_total(), 0);
    }
}

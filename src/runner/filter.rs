use regex::Regex;

use crate::error::{Result, RuunitError};

/// 选择要执行的 Suite 和 Case
pub trait Filter {
    /// 返回 false 时整个 Suite 不会进入（没有任何事件）
    fn accepts_suite(&self, _suite: &str) -> bool {
        true
    }

    /// 返回 false 的 Case 不会执行，计为 skipped
    fn accepts(&self, suite: &str, case: &str) -> bool;
}

impl<F> Filter for F
where
    F: Fn(&str, &str) -> bool,
{
    fn accepts(&self, suite: &str, case: &str) -> bool {
        self(suite, case)
    }
}

/// 接受所有 Case
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Filter for AcceptAll {
    fn accepts(&self, _suite: &str, _case: &str) -> bool {
        true
    }
}

/// `suite[/case]` 形式的正则过滤器
///
/// 两部分都按正则搜索（不要求整体匹配），case 部分省略时接受 Suite 中的全部 Case。
#[derive(Debug, Clone)]
pub struct PatternFilter {
    suite: Regex,
    case: Option<Regex>,
}

impl PatternFilter {
    pub fn parse(pattern: &str) -> Result<Self> {
        let (suite, case) = match pattern.split_once('/') {
            Some((suite, case)) => (suite, Some(case)),
            None => (pattern, None),
        };

        let suite = Regex::new(if suite.is_empty() { ".*" } else { suite })
            .map_err(RuunitError::InvalidFilter)?;
        let case = case
            .filter(|c| !c.is_empty())
            .map(Regex::new)
            .transpose()
            .map_err(RuunitError::InvalidFilter)?;

        Ok(Self { suite, case })
    }
}

impl Filter for PatternFilter {
    fn accepts_suite(&self, suite: &str) -> bool {
        self.suite.is_match(suite)
    }

    fn accepts(&self, suite: &str, case: &str) -> bool {
        self.suite.is_match(suite) && self.case.as_ref().is_none_or(|re| re.is_match(case))
    }
}

use serde::Serialize;

/// Case 统计
///
/// 不变式：`passed + failed == executed`，`executed + errored + skipped <= total`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CaseStats {
    /// 发现的 Case 数量
    pub total: usize,
    /// 实际执行并得到结论的 Case 数量
    pub executed: usize,
    pub passed: usize,
    pub failed: usize,
    /// 启动失败（StartupFault），不计入 passed / failed
    pub errored: usize,
    /// 被过滤器排除
    pub skipped: usize,
}

impl CaseStats {
    /// 记录一个 Case 的结论
    pub fn record(&mut self, passed: bool) {
        self.executed += 1;
        if passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }

    /// 累加子级统计
    pub fn absorb(&mut self, other: &CaseStats) {
        self.total += other.total;
        self.executed += other.executed;
        self.passed += other.passed;
        self.failed += other.failed;
        self.errored += other.errored;
        self.skipped += other.skipped;
    }

    pub fn is_consistent(&self) -> bool {
        self.passed + self.failed == self.executed
            && self.executed + self.errored + self.skipped <= self.total
    }
}

/// 检查统计（只统计 EXPECT 和 ASSERT）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CheckStats {
    pub passed: usize,
    pub failed: usize,
}

impl CheckStats {
    pub fn record(&mut self, passed: bool) {
        if passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn absorb(&mut self, other: &CheckStats) {
        self.passed += other.passed;
        self.failed += other.failed;
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed
    }
}

use serde::{Serialize, Serializer};
use std::fmt;

/// 被中止的作用域
///
/// 用作测试体的控制信号：`Flow` 的错误分支。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Abort {
    /// 仅中止当前 Case
    Case,
    /// 中止当前 Suite 剩余的所有 Case
    Suite,
    /// 中止整个 Session
    Session,
}

impl Abort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Case => "case",
            Self::Suite => "suite",
            Self::Session => "session",
        }
    }
}

impl fmt::Display for Abort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 测试体和 Suite 体的返回值，`?` 即可向上传播中止信号
pub type Flow = Result<(), Abort>;

/// 检查的严重级别（从弱到强）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Expect,
    Assert,
    SanityCase,
    SanitySuite,
    SanitySession,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expect => "EXPECT",
            Self::Assert => "ASSERT",
            Self::SanityCase => "SANITY",
            Self::SanitySuite => "SANITY_FOR_SUITE",
            Self::SanitySession => "SANITY_FOR_SESSION",
        }
    }

    /// SANITY 检查既不输出也不计入统计
    pub fn is_sanity(&self) -> bool {
        matches!(
            self,
            Self::SanityCase | Self::SanitySuite | Self::SanitySession
        )
    }

    /// 失败时中止的作用域
    pub fn abort_scope(&self) -> Option<Abort> {
        match self {
            Self::Expect => None,
            Self::Assert | Self::SanityCase => Some(Abort::Case),
            Self::SanitySuite => Some(Abort::Suite),
            Self::SanitySession => Some(Abort::Session),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 源码位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub file: &'static str,
    pub line: u32,
}

impl Location {
    pub const fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }

    /// 调用方所在的位置
    #[track_caller]
    pub fn caller() -> Self {
        let caller = std::panic::Location::caller();
        Self {
            file: caller.file(),
            line: caller.line(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// 比较运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equal,          // ==
    NotEqual,       // !=
    Less,           // <
    LessOrEqual,    // <=
    Greater,        // >
    GreaterOrEqual, // >=
}

impl CompareOp {
    /// 从字符串解析运算符
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "==" => Some(Self::Equal),
            "!=" => Some(Self::NotEqual),
            "<" => Some(Self::Less),
            "<=" => Some(Self::LessOrEqual),
            ">" => Some(Self::Greater),
            ">=" => Some(Self::GreaterOrEqual),
            _ => None,
        }
    }

    /// 转换为字符串表示
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
        }
    }

    /// 对两个值执行比较
    pub fn apply<L, R>(&self, lhs: &L, rhs: &R) -> bool
    where
        L: PartialOrd<R> + ?Sized,
        R: ?Sized,
    {
        match self {
            Self::Equal => lhs == rhs,
            Self::NotEqual => lhs != rhs,
            Self::Less => lhs < rhs,
            Self::LessOrEqual => lhs <= rhs,
            Self::Greater => lhs > rhs,
            Self::GreaterOrEqual => lhs >= rhs,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for CompareOp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// 被检查的操作数：源码文本 + 运行时的值
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operand {
    pub text: String,
    pub rendered: String,
}

impl Operand {
    pub fn new(text: impl Into<String>, rendered: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rendered: rendered.into(),
        }
    }
}

/// 比较表达式 `lhs op rhs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operands {
    pub op: CompareOp,
    pub lhs: Operand,
    pub rhs: Operand,
}

/// 一次 EXPECT / ASSERT / SANITY 的输入
///
/// 由表达式捕获层构造；引擎只关心 `outcome`，不关心它是如何算出来的。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckInvocation {
    /// 条件是否成立
    pub outcome: bool,

    /// 条件的源码文本
    pub condition: String,

    /// 使用比较运算符时的左右操作数
    pub operands: Option<Operands>,

    /// 使用谓词函数时的参数
    pub arguments: Vec<Operand>,

    pub location: Location,
}

impl CheckInvocation {
    /// 仅有布尔结果和条件文本
    #[track_caller]
    pub fn new(outcome: bool, condition: impl Into<String>) -> Self {
        Self {
            outcome,
            condition: condition.into(),
            operands: None,
            arguments: Vec::new(),
            location: Location::caller(),
        }
    }

    /// 比较两个值并记录两侧的文本与渲染结果
    #[track_caller]
    pub fn compare<L, R>(lhs_text: &str, lhs: &L, op: CompareOp, rhs_text: &str, rhs: &R) -> Self
    where
        L: PartialOrd<R> + fmt::Debug + ?Sized,
        R: fmt::Debug + ?Sized,
    {
        let outcome = op.apply(lhs, rhs);
        Self {
            outcome,
            condition: format!("{} {} {}", lhs_text, op, rhs_text),
            operands: Some(Operands {
                op,
                lhs: Operand::new(lhs_text, format!("{:?}", lhs)),
                rhs: Operand::new(rhs_text, format!("{:?}", rhs)),
            }),
            arguments: Vec::new(),
            location: Location::caller(),
        }
    }

    /// 谓词调用，例如 `is_near(y, 3.0, 0.1)`
    #[track_caller]
    pub fn predicate(name: &str, arguments: Vec<Operand>, outcome: bool) -> Self {
        let texts: Vec<&str> = arguments.iter().map(|a| a.text.as_str()).collect();
        Self {
            outcome,
            condition: format!("{}({})", name, texts.join(", ")),
            operands: None,
            arguments,
            location: Location::caller(),
        }
    }

    /// 覆盖源码位置
    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// 期望描述（比较运算时为 `op rhs`）
    pub fn expected(&self) -> Option<String> {
        self.operands
            .as_ref()
            .map(|o| format!("{} {}", o.op, o.rhs.rendered))
    }

    /// 实际值（比较运算时为左值的渲染结果）
    pub fn actual(&self) -> Option<&str> {
        self.operands.as_ref().map(|o| o.lhs.rendered.as_str())
    }
}

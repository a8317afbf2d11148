//! 运行方式: cargo run --example vec_suite -- --verbose

use ruunit::check::{CompareOp, is_near};
use ruunit::{
    Case, CaseEntry, CaseRun, CheckInvocation, Flow, Operand, Registry, Suite, SuiteEntry,
    SuiteRun, location,
};

fn vec_suite(s: &mut SuiteRun<'_>) -> Flow {
    // Setup：每个 Case 都会重新执行
    let mut v = vec![10, 20, 31];
    s.sanity_for_suite(CheckInvocation::new(!v.is_empty(), "!v.is_empty()"))?;

    s.case("size", |t| {
        t.expect(CheckInvocation::compare(
            "v.len()",
            &v.len(),
            CompareOp::Equal,
            "3",
            &3usize,
        ));
        t.expect(CheckInvocation::new(!v.is_empty(), "!v.is_empty()"));
        Ok(())
    });

    s.case("push", |t| {
        t.step("push 42");
        v.push(42);
        t.assert(CheckInvocation::compare(
            "v.last()",
            &v.last(),
            CompareOp::Equal,
            "Some(&42)",
            &Some(&42),
        ))?;
        t.expect(CheckInvocation::compare(
            "v.len()",
            &v.len(),
            CompareOp::Equal,
            "4",
            &4usize,
        ));
        Ok(())
    });

    s.case("clear", |t| {
        v.clear();
        // 故意失败，演示 ASSERT 中止
        t.assert(CheckInvocation::new(!v.is_empty(), "!v.is_empty()"))?;
        t.message("not reached");
        Ok(())
    });

    // Teardown
    drop(v);
    Ok(())
}

fn float_math(t: &mut CaseRun<'_>) -> Flow {
    let y = 0.1 + 0.2;
    t.expect(CheckInvocation::predicate(
        "is_near",
        vec![
            Operand::new("y", format!("{}", y)),
            Operand::new("0.3", "0.3"),
            Operand::new("1e-9", "1e-9"),
        ],
        is_near(y, 0.3, 1e-9),
    ));
    Ok(())
}

static VEC: Suite = Suite::new("Vec", location!(), vec_suite);
static FLOAT_MATH: Case = Case::new("float_math", location!(), float_math);

static VEC_ENTRY: SuiteEntry = SuiteEntry::new(&VEC);
static FLOAT_MATH_ENTRY: CaseEntry = CaseEntry::new(&FLOAT_MATH);

fn main() -> ruunit::Result<()> {
    let mut registry = Registry::new();
    registry.register_case(&FLOAT_MATH_ENTRY)?;
    registry.register_suite(&VEC_ENTRY)?;

    std::process::exit(ruunit::cli::run_tests(&registry, std::env::args_os()));
}

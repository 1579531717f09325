//! End-to-end checks of the compile-then-invoke pipeline.
//!
//! Each test goes through the public [`Compiler`] front door, so these
//! exercise lexing, parsing, binding and lowering together.

use textlambda::{CompileErrorKind, Compiler, DataType, Decimal, Signature, Value};

fn compiler() -> Compiler {
    Compiler::with_standard_library()
        .unwrap()
        .namespace("System")
}

/// Compile a parameterless expression and run it once.
fn eval(source: &str) -> Value {
    compiler()
        .compile(source, &Signature::new())
        .unwrap_or_else(|e| panic!("failed to compile {source:?}: {e}"))
        .invoke(&[])
        .unwrap_or_else(|e| panic!("failed to run {source:?}: {e}"))
}

fn compile_error(source: &str, signature: &Signature) -> CompileErrorKind {
    match compiler().compile(source, signature) {
        Ok(_) => panic!("{source:?} should not compile"),
        Err(err) => err.kind(),
    }
}

// =============================================================================
// Literals
// =============================================================================

#[test]
fn test_numeric_literals() {
    assert_eq!(eval("42"), Value::Int(42));
    assert_eq!(eval("3000000000"), Value::Long(3_000_000_000));
    assert_eq!(eval("10L"), Value::Long(10));
    assert_eq!(eval("7u"), Value::UInt(7));
    assert_eq!(eval("7UL"), Value::ULong(7));
    assert_eq!(eval("0xFF"), Value::Int(255));
    assert_eq!(eval("1.5d"), Value::Double(1.5));
    assert_eq!(eval(".5"), Value::Double(0.5));
    assert_eq!(eval("1e3"), Value::Double(1000.0));
    assert_eq!(eval("2f"), Value::Float(2.0));
    assert_eq!(eval("2.50m"), Value::Decimal(Decimal::new(250, 2)));
}

#[test]
fn test_text_literals() {
    assert_eq!(eval("'c'"), Value::Char('c'));
    assert_eq!(eval("'\\n'"), Value::Char('\n'));
    assert_eq!(eval("\"hi\\tthere\""), Value::string("hi\tthere"));
    assert_eq!(eval("\"\\u0041\""), Value::string("A"));
    assert_eq!(eval("@\"C:\\dir\""), Value::string("C:\\dir"));
    assert_eq!(eval("@\"say \"\"hi\"\"\""), Value::string("say \"hi\""));
}

#[test]
fn test_keyword_literals() {
    assert_eq!(eval("true"), Value::Bool(true));
    assert_eq!(eval("false"), Value::Bool(false));
    assert_eq!(eval("null"), Value::Null);
}

#[test]
fn test_comments_are_skipped() {
    assert_eq!(eval("1 + /* two */ 2 // three"), Value::Int(3));
}

// =============================================================================
// Operators
// =============================================================================

#[test]
fn test_precedence() {
    assert_eq!(eval("2+3*4"), Value::Int(14));
    assert_eq!(eval("(2+3)*4"), Value::Int(20));
    assert_eq!(eval("10 - 4 - 3"), Value::Int(3));
    assert_eq!(eval("1 + 2 < 4 && 3 > 2"), Value::Bool(true));
    assert_eq!(eval("1 << 2 + 1"), Value::Int(8));
    assert_eq!(eval("6 & 3 | 8"), Value::Int(10));
}

#[test]
fn test_integer_arithmetic_wraps() {
    assert_eq!(eval("int.MaxValue + 1"), Value::Int(i32::MIN));
    assert_eq!(eval("-7 / 2"), Value::Int(-3));
    assert_eq!(eval("-7 % 2"), Value::Int(-1));
}

#[test]
fn test_unary_operators() {
    assert_eq!(eval("-(2 + 3)"), Value::Int(-5));
    assert_eq!(eval("!true"), Value::Bool(false));
    assert_eq!(eval("~0"), Value::Int(-1));
    assert_eq!(eval("+4"), Value::Int(4));
}

#[test]
fn test_string_concatenation() {
    assert_eq!(eval("\"a\"+1"), Value::string("a1"));
    assert_eq!(eval("1 + \"a\""), Value::string("1a"));
    assert_eq!(eval("\"x\" + true"), Value::string("xTrue"));
}

#[test]
fn test_equality() {
    assert_eq!(eval("\"ab\" == \"a\" + \"b\""), Value::Bool(true));
    assert_eq!(eval("1 != 1"), Value::Bool(false));
    assert_eq!(eval("\"a\" == null"), Value::Bool(false));
}

#[test]
fn test_ternary() {
    assert_eq!(eval("true?1:2"), Value::Int(1));
    assert_eq!(eval("false ? 1 : 2.5"), Value::Double(2.5));
    assert_eq!(eval("1 > 2 ? \"a\" : 2 > 1 ? \"b\" : \"c\""), Value::string("b"));
}

#[test]
fn test_null_coalescing() {
    let f = compiler()
        .compile(
            "n ?? 5",
            &Signature::new().named("n", DataType::nullable(DataType::INT)),
        )
        .unwrap();
    assert_eq!(f.invoke(&[Value::Null]), Ok(Value::Int(5)));
    assert_eq!(f.invoke(&[Value::Int(3)]), Ok(Value::Int(3)));
    assert_eq!(f.return_type(), &DataType::INT);
}

// =============================================================================
// Casts and Promotion
// =============================================================================

#[test]
fn test_cast_or_group() {
    assert_eq!(eval("(int)3.9"), Value::Int(3));
    assert_eq!(eval("(long)2 * 3"), Value::Long(6));
    assert_eq!(eval("(double)(1 + 2) / 2"), Value::Double(1.5));

    let f = compiler()
        .compile("(x)", &Signature::new().named("x", DataType::INT))
        .unwrap();
    assert_eq!(f.invoke(&[Value::Int(9)]), Ok(Value::Int(9)));
}

#[test]
fn test_numeric_promotion() {
    let f = compiler()
        .compile(
            "(x, y) => x + y",
            &Signature::new().param(DataType::INT).param(DataType::DOUBLE),
        )
        .unwrap();
    assert_eq!(f.return_type(), &DataType::DOUBLE);
    assert_eq!(
        f.invoke(&[Value::Int(2), Value::Double(0.25)]),
        Ok(Value::Double(2.25))
    );

    assert_eq!(eval("1 + 2L"), Value::Long(3));
    assert_eq!(eval("1.5f + 1"), Value::Float(2.5));
    assert_eq!(eval("1m + 1"), Value::Decimal(Decimal::from(2)));
}

#[test]
fn test_comparisons_do_not_promote() {
    assert_eq!(compile_error("1 < 2.0", &Signature::new()), CompileErrorKind::TypeMismatch);
    assert_eq!(eval("(double)1 < 2.0"), Value::Bool(true));
}

// =============================================================================
// Lambda Headers
// =============================================================================

#[test]
fn test_headerless_names() {
    let f = compiler()
        .compile(
            "x * 2 + arg1",
            &Signature::new().named("x", DataType::INT).param(DataType::INT),
        )
        .unwrap();
    assert_eq!(f.invoke(&[Value::Int(4), Value::Int(1)]), Ok(Value::Int(9)));
}

#[test]
fn test_header_renames_parameters() {
    let f = compiler()
        .compile(
            "(a, b) => a - b",
            &Signature::new().named("x", DataType::INT).named("y", DataType::INT),
        )
        .unwrap();
    assert_eq!(f.invoke(&[Value::Int(5), Value::Int(3)]), Ok(Value::Int(2)));
    let names: Vec<_> = f.parameters().iter().map(|p| p.name.to_string()).collect();
    assert_eq!(names, ["a", "b"]);
}

#[test]
fn test_typed_header_over_untyped_signature() {
    let f = compiler()
        .compile("(int a, double b) => a * b", &Signature::untyped(2))
        .unwrap();
    assert_eq!(f.return_type(), &DataType::DOUBLE);
    assert_eq!(
        f.invoke(&[Value::Int(3), Value::Double(0.5)]),
        Ok(Value::Double(1.5))
    );
}

#[test]
fn test_header_defines_inferred_signature() {
    let f = compiler()
        .compile("(int a, double b) => a * b", &Signature::inferred())
        .unwrap();
    assert_eq!(f.return_type(), &DataType::DOUBLE);
    assert_eq!(f.parameters().len(), 2);
    assert_eq!(
        f.invoke(&[Value::Int(3), Value::Double(0.5)]),
        Ok(Value::Double(1.5))
    );

    let identity = compiler().compile("x => x", &Signature::inferred()).unwrap();
    assert_eq!(identity.return_type(), &DataType::Object);
    assert_eq!(identity.invoke(&[Value::Int(7)]), Ok(Value::Int(7)));
    assert_eq!(
        identity.invoke(&[Value::string("s")]),
        Ok(Value::string("s"))
    );
    assert!(identity.invoke(&[]).is_err());

    let constant = compiler().compile("2 * 21", &Signature::inferred()).unwrap();
    assert_eq!(constant.invoke(&[]), Ok(Value::Int(42)));
}

#[test]
fn test_single_parameter_without_parentheses() {
    let f = compiler()
        .compile("x => x * x", &Signature::new().param(DataType::LONG))
        .unwrap();
    assert_eq!(f.invoke(&[Value::Long(12)]), Ok(Value::Long(144)));
}

#[test]
fn test_header_must_match_signature() {
    let sig = Signature::new().param(DataType::INT);
    assert_eq!(compile_error("(a, b) => a", &sig), CompileErrorKind::SignatureMismatch);
    assert_eq!(
        compile_error("(double a) => a", &sig),
        CompileErrorKind::SignatureMismatch
    );
}

// =============================================================================
// Result Conversion
// =============================================================================

#[test]
fn test_declared_return_type_widens_the_body() {
    let f = compiler()
        .compile("1 + 2", &Signature::new().returns(DataType::DOUBLE))
        .unwrap();
    assert_eq!(f.invoke(&[]), Ok(Value::Double(3.0)));

    let boxed = compiler()
        .compile("1 + 2", &Signature::new().returns(DataType::Object))
        .unwrap();
    assert_eq!(boxed.invoke(&[]), Ok(Value::Int(3)));
}

#[test]
fn test_declared_return_type_never_narrows() {
    assert_eq!(
        compile_error("1.5", &Signature::new().returns(DataType::INT)),
        CompileErrorKind::TypeMismatch
    );
}

// =============================================================================
// Default Instance
// =============================================================================

#[test]
fn test_default_instance_member_access() {
    let f = compiler()
        .default_instance(DataType::String)
        .compile("Length*2", &Signature::new())
        .unwrap();
    assert_eq!(f.parameters().len(), 1);
    assert_eq!(f.invoke(&[Value::string("abcd")]), Ok(Value::Int(8)));
}

#[test]
fn test_default_instance_method_call() {
    let f = compiler()
        .default_instance(DataType::String)
        .compile("ToUpper() + Substring(1)", &Signature::new())
        .unwrap();
    assert_eq!(f.invoke(&[Value::string("ab")]), Ok(Value::string("ABb")));
}

#[test]
fn test_first_parameter_as_default_instance() {
    let f = compiler()
        .first_parameter_is_default_instance(true)
        .compile(
            "Contains(\"b\") ? Length : 0",
            &Signature::new().param(DataType::String),
        )
        .unwrap();
    assert_eq!(f.invoke(&[Value::string("abc")]), Ok(Value::Int(3)));
    assert_eq!(f.invoke(&[Value::string("xyz")]), Ok(Value::Int(0)));
}

// =============================================================================
// Static Members and Namespaces
// =============================================================================

#[test]
fn test_static_members() {
    assert_eq!(eval("Math.Max(2, 7)"), Value::Int(7));
    assert_eq!(eval("Math.Sqrt(16.0)"), Value::Double(4.0));
    assert_eq!(eval("Math.PI > 3.14"), Value::Bool(true));
    assert_eq!(eval("int.Parse(\"12\") + 1"), Value::Int(13));
    assert_eq!(eval("String.IsNullOrEmpty(\"\")"), Value::Bool(true));
}

#[test]
fn test_qualified_names_need_no_namespace() {
    let f = Compiler::with_standard_library()
        .unwrap()
        .compile("System.Math.Abs(-2)", &Signature::new())
        .unwrap();
    assert_eq!(f.invoke(&[]), Ok(Value::Int(2)));

    let err = Compiler::with_standard_library()
        .unwrap()
        .compile("Math.Abs(-2)", &Signature::new())
        .unwrap_err();
    assert_eq!(err.kind(), CompileErrorKind::TypeNotFound);
}

// =============================================================================
// Pipeline Properties
// =============================================================================

#[test]
fn test_unmatched_bracket() {
    let err = compiler().compile("(1+2", &Signature::new()).unwrap_err();
    assert_eq!(err.kind(), CompileErrorKind::UnmatchedBracket);
}

#[test]
fn test_compilation_is_idempotent() {
    let sig = Signature::new().param(DataType::DOUBLE).param(DataType::INT);
    let source = "(x, n) => Math.Pow(x, 2.0) * n - x / 3";
    let first = compiler().compile(source, &sig).unwrap();
    let second = compiler().compile(source, &sig).unwrap();
    for (x, n) in [(1.5, 2), (-3.0, 3), (0.0, 0)] {
        let args = [Value::Double(x), Value::Int(n)];
        assert_eq!(first.invoke(&args), second.invoke(&args));
    }
}

#[test]
fn test_compiled_function_outlives_compiler() {
    let f = {
        let compiler = compiler();
        compiler
            .compile("s => s.Length", &Signature::new().param(DataType::String))
            .unwrap()
    };
    assert_eq!(f.invoke(&[Value::string("abc")]), Ok(Value::Int(3)));
}

#[test]
fn test_typed_call() {
    let f = compiler()
        .compile_typed::<(f64, f64), f64>("(x, y) => Math.Sqrt(x * x + y * y)")
        .unwrap();
    assert_eq!(f.call((3.0, 4.0)), Ok(5.0));

    let nullable = compiler()
        .compile_typed::<(Option<i32>,), i32>("n => n ?? -1")
        .unwrap();
    assert_eq!(nullable.call((None,)), Ok(-1));
    assert_eq!(nullable.call((Some(4),)), Ok(4));
}

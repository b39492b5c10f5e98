use super::*;
use pretty_assertions::assert_eq;

#[test]
fn location_display_omits_unknown_file() {
    let loc = SourceLocation::line(2, 4, 30);
    assert_eq!(loc.to_string(), "@2:4-2:30");
    assert_eq!(loc.with_file("main.flux").to_string(), "main.flux@2:4-2:30");
}

#[test]
fn symbols_compare_by_content() {
    let a = Symbol::new("tables");
    let b = Symbol::from(String::from("tables"));
    assert_eq!(a, b);
    assert!(a == "tables");
    assert_eq!(format!("{a:?}"), "Symbol(\"tables\")");
}

#[test]
fn regexp_equality_is_by_pattern() {
    let a = Regexp::new("^a+$").unwrap();
    let b = Regexp::new("^a+$").unwrap();
    assert_eq!(a, b);
    assert!(a.is_match("aaa"));
    assert_eq!(a.to_string(), "/^a+$/");
    assert!(Regexp::new("(").is_err());
}

#[test]
fn operator_precedence_orders_arithmetic_over_comparison() {
    assert!(BinaryOp::Pow.precedence() > BinaryOp::Mul.precedence());
    assert!(BinaryOp::Mul.precedence() > BinaryOp::Add.precedence());
    assert!(BinaryOp::Add.precedence() > BinaryOp::Eq.precedence());
    assert!(BinaryOp::Eq.precedence() > LogicalOp::And.precedence());
    assert!(LogicalOp::And.precedence() > LogicalOp::Or.precedence());
}

#[test]
fn duration_from_units_and_display() {
    let d = Duration::from_units(&[
        (1, DurationUnit::Hour),
        (30, DurationUnit::Minute),
    ])
    .unwrap();
    assert_eq!(d.to_string(), "1h30m");

    let d = Duration::from_units(&[(1, DurationUnit::Year), (2, DurationUnit::Month)]).unwrap();
    assert_eq!(d, Duration { months: 14, nanoseconds: 0 });
    assert_eq!(d.to_string(), "1y2mo");

    assert_eq!(Duration::ZERO.to_string(), "0ns");
    let neg = Duration::from_nanos(5_000_000_000).checked_neg().unwrap();
    assert_eq!(neg.to_string(), "-5s");
}

#[test]
fn duration_overflow_is_reported() {
    assert_eq!(Duration::from_units(&[(i64::MAX, DurationUnit::Week)]), None);
    assert_eq!(Duration::from_nanos(i64::MAX).checked_add(Duration::from_nanos(1)), None);
}

#[path = "../src/weight.rs"]
mod weight;

use weight::{parse_weight, parse_weight_detailed, WeightParse};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn percent_expressions_take_the_largest_percentage() {
    for (text, expected) in [
        ("25%", 0.25),
        ("Quiz [20%]", 0.20),
        ("10% - 30%", 0.30),
        ("30%/10%", 0.30),
        ("100%", 1.0),
    ] {
        let (w, rule) = parse_weight_detailed(text);
        assert!(close(w, expected), "{text}: {w}");
        assert_eq!(rule, WeightParse::Percent, "{text}");
    }
}

#[test]
fn weighted_choice_divides_by_fifty() {
    for (text, expected) in [("a*3%", 0.06), ("a*5%", 0.10), ("a*0.5%", 0.01)] {
        let (w, rule) = parse_weight_detailed(text);
        assert!(close(w, expected), "{text}: {w}");
        assert_eq!(rule, WeightParse::WeightedChoice);
    }
}

#[test]
fn ungraded_and_garbage_are_zero() {
    assert_eq!(parse_weight_detailed(" UNGRADED "), (0.0, WeightParse::Ungraded));
    assert_eq!(parse_weight_detailed("tbd").0, 0.0);
    assert_eq!(parse_weight_detailed("").0, 0.0);
}

#[test]
fn results_stay_in_unit_interval() {
    for text in ["250%", "-5%", "a*80%", "0.4", "40", "12.5", "1e9", "--%", "%%%"] {
        let w = parse_weight(text);
        assert!((0.0..=1.0).contains(&w), "{text}: {w}");
    }
}

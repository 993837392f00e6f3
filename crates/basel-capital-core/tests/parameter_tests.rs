use basel_capital_core::parameters::{builtin, CorrelationRule, CreWeight, Regime};
use basel_capital_core::{
    Approach, CapitalCalculator, CapitalError, Exposure, ExposureClass, Jurisdiction,
    ParameterRegistry, ParameterSet,
};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

/// A collaborator-maintained table for a jurisdiction with no built-in set.
const JP_YAML: &str = r#"
jurisdiction: JP
version: fsa-2024
regime: BaselIII
effective_from: 2024-03-31
description: Illustrative house table
pd_floor: "0.0005"
lgd_floors:
  unsecured: "0.25"
  financial: "0"
  receivables: "0.10"
  real_estate: "0.10"
  other_physical: "0.15"
  intangibles: "0.25"
supervisory_lgd:
  senior:
    Corporate: "0.40"
    Bank: "0.45"
    Sovereign: "0.45"
  subordinated: "0.75"
output_floor_pct: "0.60"
correlation:
  Corporate: { rule: pd_weighted, lower: "0.12", upper: "0.24", decay: "50" }
  Bank: { rule: pd_weighted, lower: "0.12", upper: "0.24", decay: "50" }
  Sovereign: { rule: fixed, value: "0.20" }
large_fi_multiplier: "1.25"
rwa_scaling_factor: "1"
capital_ratio: "0.08"
standardized:
  sovereign: { AAA_AA: "0", A: "0.20", BBB: "0.50", BB: "1", B: "1", BELOW_B: "1.50", UNRATED: "1" }
  bank: { AAA_AA: "0.20", A: "0.30", BBB: "0.50", BB: "1", B: "1", BELOW_B: "1.50", UNRATED: "0.40" }
  corporate: { AAA_AA: "0.20", A: "0.50", BBB: "0.75", BB: "1", B: "1.50", BELOW_B: "1.50", UNRATED: "1" }
  retail: { qualifying: "0.75", other: "1" }
  residential_mortgage: { qualifying: "0.35", other: "1" }
  other: "1"
  cre_general:
    - { max_ltv: "0.60", weight: { kind: lesser_of_counterparty, cap: "0.60" } }
    - { weight: { kind: counterparty } }
  cre_income_producing:
    - { max_ltv: "0.60", weight: { kind: fixed, risk_weight: "0.70" } }
    - { max_ltv: "0.80", weight: { kind: fixed, risk_weight: "0.90" } }
    - { weight: { kind: fixed, risk_weight: "1.10" } }
"#;

fn jp_set() -> ParameterSet {
    serde_yaml::from_str(JP_YAML).unwrap()
}

#[test]
fn test_yaml_parameter_set_loads() {
    let set = jp_set();
    assert_eq!(set.jurisdiction, Jurisdiction::Other("JP".into()));
    assert_eq!(set.regime, Regime::BaselIII);
    assert_eq!(set.output_floor_pct, dec!(0.60));
    assert_eq!(
        set.correlation[&ExposureClass::Sovereign],
        CorrelationRule::Fixed { value: dec!(0.20) }
    );
    assert_eq!(
        set.standardized.cre_general[1].weight,
        CreWeight::Counterparty
    );
    set.validate().unwrap();
}

#[test]
fn test_yaml_set_drives_calculation() {
    let registry = ParameterRegistry::builtin().with_sets(vec![jp_set()]).unwrap();
    let calc = CapitalCalculator::new(registry);

    let mut exp = Exposure::new(
        ExposureClass::Sovereign,
        Approach::FoundationIrb,
        dec!(1_000_000),
        dec!(2.5),
    );
    exp.jurisdiction = Jurisdiction::from_code("jp");
    exp.pd = Some(dec!(0.01));
    let result = calc.calculate(&exp, "fsa-2024").unwrap();
    let irb = result.figures().unwrap().irb.clone().unwrap();
    assert_eq!(irb.correlation, dec!(0.20));
    assert_eq!(result.parameter_key.to_string(), "JP/fsa-2024");
}

#[test]
fn test_custom_set_missing_class_fails_resolution() {
    let mut set = jp_set();
    set.correlation.remove(&ExposureClass::Bank);
    let registry = ParameterRegistry::from_sets(vec![set]).unwrap();
    let calc = CapitalCalculator::new(registry);

    let mut exp = Exposure::new(
        ExposureClass::Bank,
        Approach::FoundationIrb,
        dec!(1_000_000),
        dec!(2.5),
    );
    exp.jurisdiction = Jurisdiction::from_code("JP");
    exp.pd = Some(dec!(0.01));
    assert!(matches!(
        calc.calculate(&exp, "fsa-2024"),
        Err(CapitalError::ParameterResolution { .. })
    ));
}

#[test]
fn test_malformed_yaml_set_rejected_at_registration() {
    let mut set = jp_set();
    set.standardized.cre_income_producing.pop();
    match ParameterRegistry::from_sets(vec![set]).unwrap_err() {
        CapitalError::InvalidParameterSet { key, .. } => assert_eq!(key, "JP/fsa-2024"),
        other => panic!("Expected InvalidParameterSet, got {:?}", other),
    }
}

#[test]
fn test_builtin_sets_listed_with_summaries() {
    let registry = ParameterRegistry::builtin();
    let summaries = registry.summaries();
    assert_eq!(summaries.len(), builtin::all().len());
    let versions: Vec<&str> = summaries.iter().map(|s| s.version.as_str()).collect();
    for expected in [
        "basel2",
        "basel3-final",
        "us-advanced-2013",
        "us-bcbs-baseline",
        "osfi-car-2024",
        "crr3-2025",
    ] {
        assert!(versions.contains(&expected), "missing {}", expected);
    }
}

#[test]
fn test_latest_version_per_jurisdiction() {
    let registry = ParameterRegistry::builtin();
    assert_eq!(
        registry.latest_version(&Jurisdiction::US),
        Some("us-bcbs-baseline")
    );
    assert_eq!(
        registry.latest_version(&Jurisdiction::BCBS),
        Some("basel3-final")
    );
}

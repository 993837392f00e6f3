use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{builtin, ClassParameters, ParameterKey, ParameterSet, Regime};
use crate::error::CapitalError;
use crate::exposure::ExposureClass;
use crate::types::Jurisdiction;
use crate::CapitalResult;

/// Read-only collection of validated parameter sets keyed by
/// (jurisdiction, version).
///
/// Sets are stored behind `Arc`, so a resolved snapshot stays valid and
/// unchanged for as long as a calculation holds it, and the registry can be
/// shared across threads without locking.
#[derive(Debug, Clone, Default)]
pub struct ParameterRegistry {
    sets: BTreeMap<ParameterKey, Arc<ParameterSet>>,
}

/// Listing entry for one registered set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSetSummary {
    pub jurisdiction: Jurisdiction,
    pub version: String,
    pub regime: Regime,
    pub effective_from: chrono::NaiveDate,
    pub description: String,
}

impl ParameterRegistry {
    /// Registry holding every built-in set.
    pub fn builtin() -> Self {
        let sets = builtin::all()
            .into_iter()
            .map(|set| (set.key(), Arc::new(set)))
            .collect();
        ParameterRegistry { sets }
    }

    /// Registry holding only the given sets. Each is validated; duplicate
    /// keys are rejected rather than silently overwritten.
    pub fn from_sets(sets: Vec<ParameterSet>) -> CapitalResult<Self> {
        ParameterRegistry::default().with_sets(sets)
    }

    /// Add collaborator-supplied sets on top of this registry.
    pub fn with_sets(mut self, sets: Vec<ParameterSet>) -> CapitalResult<Self> {
        for set in sets {
            set.validate()?;
            let key = set.key();
            if self.sets.contains_key(&key) {
                return Err(CapitalError::InvalidParameterSet {
                    key: key.to_string(),
                    reason: "a parameter set with this jurisdiction and version is already registered"
                        .into(),
                });
            }
            tracing::debug!(%key, "registered parameter set");
            self.sets.insert(key, Arc::new(set));
        }
        Ok(self)
    }

    /// Snapshot for (jurisdiction, version). Never falls back to another
    /// version or jurisdiction.
    pub fn resolve(
        &self,
        jurisdiction: &Jurisdiction,
        version: &str,
    ) -> CapitalResult<Arc<ParameterSet>> {
        let key = ParameterKey::new(jurisdiction.clone(), version);
        self.sets
            .get(&key)
            .cloned()
            .ok_or_else(|| CapitalError::ParameterResolution {
                jurisdiction: jurisdiction.to_string(),
                version: version.to_string(),
                reason: "no parameter set registered for this jurisdiction and version".into(),
            })
    }

    /// IRB constants for one exposure class under (jurisdiction, version).
    pub fn resolve_class(
        &self,
        jurisdiction: &Jurisdiction,
        version: &str,
        class: ExposureClass,
    ) -> CapitalResult<ClassParameters> {
        self.resolve(jurisdiction, version)?.class_parameters(class)
    }

    /// Most recently effective version registered for a jurisdiction.
    pub fn latest_version(&self, jurisdiction: &Jurisdiction) -> Option<&str> {
        self.sets
            .values()
            .filter(|s| &s.jurisdiction == jurisdiction)
            .max_by_key(|s| s.effective_from)
            .map(|s| s.version.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &ParameterKey> {
        self.sets.keys()
    }

    pub fn summaries(&self) -> Vec<ParameterSetSummary> {
        self.sets
            .values()
            .map(|s| ParameterSetSummary {
                jurisdiction: s.jurisdiction.clone(),
                version: s.version.clone(),
                regime: s.regime,
                effective_from: s.effective_from,
                description: s.description.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_builtin_registry_resolves_each_set() {
        let registry = ParameterRegistry::builtin();
        assert_eq!(registry.len(), builtin::all().len());
        let set = registry.resolve(&Jurisdiction::CAN, "osfi-car-2024").unwrap();
        assert_eq!(set.output_floor_pct, dec!(0.675));
    }

    #[test]
    fn test_unknown_version_is_an_error_not_a_default() {
        let registry = ParameterRegistry::builtin();
        let err = registry
            .resolve(&Jurisdiction::US, "basel3-final")
            .unwrap_err();
        match err {
            CapitalError::ParameterResolution {
                jurisdiction,
                version,
                ..
            } => {
                assert_eq!(jurisdiction, "US");
                assert_eq!(version, "basel3-final");
            }
            other => panic!("Expected ParameterResolution, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_jurisdiction_fails() {
        let registry = ParameterRegistry::builtin();
        let jp = Jurisdiction::from_code("jp");
        assert!(registry.resolve(&jp, "basel3-final").is_err());
        assert_eq!(registry.latest_version(&jp), None);
    }

    #[test]
    fn test_duplicate_set_rejected() {
        let result = ParameterRegistry::builtin().with_sets(vec![builtin::eu_crr3_2025()]);
        assert!(matches!(
            result,
            Err(CapitalError::InvalidParameterSet { .. })
        ));
    }

    #[test]
    fn test_custom_set_registered_alongside_builtin() {
        let mut custom = builtin::eu_crr3_2025();
        custom.version = "crr3-2026".into();
        custom.output_floor_pct = dec!(0.55);
        custom.effective_from = chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let registry = ParameterRegistry::builtin().with_sets(vec![custom]).unwrap();
        assert_eq!(registry.latest_version(&Jurisdiction::EU), Some("crr3-2026"));
        let class = registry
            .resolve_class(&Jurisdiction::EU, "crr3-2026", ExposureClass::Bank)
            .unwrap();
        assert_eq!(class.output_floor_pct, dec!(0.55));
    }

    #[test]
    fn test_invalid_custom_set_rejected() {
        let mut custom = builtin::bcbs_basel3_final();
        custom.version = "broken".into();
        custom.capital_ratio = dec!(0);
        assert!(ParameterRegistry::from_sets(vec![custom]).is_err());
    }

    #[test]
    fn test_registry_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ParameterRegistry>();
        assert_send_sync::<Arc<ParameterSet>>();
    }
}

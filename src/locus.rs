//! The locus entity: an ordered collection of alleles with summary
//! statistics.

use std::cell::RefCell;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::allele::Allele;
use crate::block::{BlockCommon, BlockParams, BlockType, IdSource};
use crate::derived::{read_or_cache, Derived};
use crate::error::LeapdnaError;
use crate::traits::ToLeapdna;
use crate::Frequency;

/// The allele name used to absorb residual frequency mass.
pub const RARE_ALLELE_NAME: &str = "rare";

/// A locus: a named, insertion-ordered collection of alleles, plus the
/// summary statistics expected heterozygosity, sample size, and observed
/// heterozygosity.
///
/// Expected heterozygosity and sample size are derived from the alleles
/// on first read and cached; an explicitly assigned value always wins.
/// Observed heterozygosity cannot be derived and is simply stored.
#[derive(Clone, Debug)]
pub struct Locus {
    pub common: BlockCommon,
    name: String,
    alleles: IndexMap<String, Allele>,
    anonymous_ids: IdSource,
    h_exp: RefCell<Derived<Frequency>>,
    sample_size: RefCell<Derived<u64>>,
    h_obs: Option<Frequency>,
}

impl Locus {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            common: BlockCommon::default(),
            name: name.into(),
            alleles: IndexMap::new(),
            anonymous_ids: IdSource::new(),
            h_exp: RefCell::new(Derived::Unset),
            sample_size: RefCell::new(Derived::Unset),
            h_obs: None,
        }
    }

    pub fn with_alleles(
        name: impl Into<String>,
        alleles: impl IntoIterator<Item = Allele>,
    ) -> Self {
        let mut locus = Self::new(name);
        for allele in alleles {
            locus.add_allele(allele);
        }
        locus
    }

    pub fn from_params(params: LocusParams, alleles: Vec<Allele>) -> Result<Self, LeapdnaError> {
        params.common.expect_type(BlockType::Locus)?;
        let mut locus = Self::with_alleles(params.name, alleles);
        locus.common = BlockCommon::from_params(params.common);
        locus.set_h_exp(params.h_exp)?;
        locus.set_sample_size(params.sample_size)?;
        locus.set_h_obs(params.h_obs)?;
        Ok(locus)
    }

    /// The locus name. This is also its identity in a study, fixed at
    /// construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add an allele, keyed by its identity; an anonymous allele is keyed
    /// by a generated identifier. Re-adding an existing key replaces the
    /// stored allele without moving its position.
    pub fn add_allele(&mut self, allele: Allele) {
        let key = match allele.identity() {
            Some(identity) => identity.to_string(),
            None => loop {
                let candidate = self.anonymous_ids.next_id();
                if !self.alleles.contains_key(&candidate) {
                    break candidate;
                }
            },
        };
        self.alleles.insert(key, allele);
    }

    pub fn alleles(&self) -> &IndexMap<String, Allele> {
        &self.alleles
    }

    pub fn get_allele(&self, name: &str) -> Option<&Allele> {
        self.alleles.get(name)
    }

    pub fn get_allele_mut(&mut self, name: &str) -> Option<&mut Allele> {
        self.alleles.get_mut(name)
    }

    /// The allele keys, in insertion order.
    pub fn allele_names(&self) -> Vec<String> {
        self.alleles.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.alleles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alleles.is_empty()
    }

    /// The frequency of the named allele. Fails when the allele is
    /// absent; an allele without a frequency yields `Ok(None)`.
    pub fn get_frequency(&self, allele_name: &str) -> Result<Option<Frequency>, LeapdnaError> {
        let allele =
            self.alleles
                .get(allele_name)
                .ok_or_else(|| LeapdnaError::MissingAllele {
                    locus: self.name.clone(),
                    allele: allele_name.to_string(),
                })?;
        Ok(allele.frequency)
    }

    /// Expected heterozygosity: `1 - sum(f^2)` over the present allele
    /// frequencies, derived on first read and cached. Later edits to the
    /// alleles do not recompute a cached value; clear with
    /// [`Locus::set_h_exp`]`(None)` to derive afresh.
    pub fn h_exp(&self) -> Frequency {
        read_or_cache(&self.h_exp, || self.calculate_h_exp())
    }

    fn calculate_h_exp(&self) -> Frequency {
        let sum_squares: Frequency = self
            .alleles
            .values()
            .filter_map(|a| a.frequency)
            .map(|f| f * f)
            .sum();
        1.0 - sum_squares
    }

    /// Assign or clear the expected heterozygosity. Values outside
    /// `[0, 1]` are rejected and the previous state is kept.
    pub fn set_h_exp(&mut self, value: Option<Frequency>) -> Result<(), LeapdnaError> {
        if let Some(v) = value {
            if !(0.0..=1.0).contains(&v) {
                return Err(LeapdnaError::InvalidHExp(v));
            }
        }
        self.h_exp.get_mut().assign(value);
        Ok(())
    }

    /// Total sample size: the sum of the present allele counts, derived
    /// on first read and cached.
    pub fn sample_size(&self) -> u64 {
        read_or_cache(&self.sample_size, || self.calculate_sample_size())
    }

    fn calculate_sample_size(&self) -> u64 {
        self.alleles.values().filter_map(|a| a.count).sum()
    }

    /// Assign or clear the sample size. Negative values are rejected and
    /// the previous state is kept.
    pub fn set_sample_size(&mut self, value: Option<i64>) -> Result<(), LeapdnaError> {
        let value = match value {
            Some(v) if v < 0 => return Err(LeapdnaError::InvalidSampleSize(v)),
            Some(v) => Some(v as u64),
            None => None,
        };
        self.sample_size.get_mut().assign(value);
        Ok(())
    }

    /// Observed heterozygosity, if assigned. There is nothing to derive
    /// it from.
    pub fn h_obs(&self) -> Option<Frequency> {
        self.h_obs
    }

    /// Assign or clear the observed heterozygosity. Values outside
    /// `[0, 1]` are rejected and the previous state is kept.
    pub fn set_h_obs(&mut self, value: Option<Frequency>) -> Result<(), LeapdnaError> {
        if let Some(v) = value {
            if !(0.0..=1.0).contains(&v) {
                return Err(LeapdnaError::InvalidHObs(v));
            }
        }
        self.h_obs = value;
        Ok(())
    }

    /// The sum of the present allele frequencies; alleles without one
    /// count as zero.
    pub fn allele_frequency_sum(&self) -> Frequency {
        self.alleles.values().filter_map(|a| a.frequency).sum()
    }

    /// Divide every present frequency by the current sum. Alleles without
    /// a frequency stay without one. The division is unconditional; a
    /// zero sum yields non-finite frequencies.
    pub fn normalize_allele_frequencies(&mut self) {
        let total = self.allele_frequency_sum();
        for allele in self.alleles.values_mut() {
            if let Some(frequency) = allele.frequency.as_mut() {
                *frequency /= total;
            }
        }
    }

    /// Top up the locus with a `rare` allele holding the residual
    /// frequency, when the present frequencies sum below one.
    pub fn add_rare_allele(&mut self) {
        let remainder = 1.0 - self.allele_frequency_sum();
        if remainder > 0.0 {
            self.add_allele(Allele::new(RARE_ALLELE_NAME).with_frequency(remainder));
        }
    }
}

/// The fields of a locus block as decoded off the wire. The `alleles`
/// values are decoded separately, so nested tags can be dispatched.
#[derive(Clone, Debug, Deserialize)]
pub struct LocusParams {
    #[serde(flatten)]
    pub common: BlockParams,
    pub name: String,
    pub alleles: Option<Vec<Value>>,
    pub h_exp: Option<Frequency>,
    pub sample_size: Option<i64>,
    pub h_obs: Option<Frequency>,
}

impl ToLeapdna for Locus {
    /// Emits the locus name and alleles. The statistics are transient;
    /// the interchange format has no locus-level statistic fields.
    fn to_leapdna(&self, top_level: bool) -> Value {
        let mut map = self.common.to_leapdna_map(BlockType::Locus, top_level);
        map.insert("name".to_string(), Value::String(self.name.clone()));
        map.insert(
            "alleles".to_string(),
            Value::Array(self.alleles.values().map(|a| a.to_leapdna(false)).collect()),
        );
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn th01() -> Locus {
        Locus::with_alleles(
            "TH01",
            vec![
                Allele::new("6").with_frequency(0.2).with_count(120),
                Allele::new("9.3").with_frequency(0.8).with_count(480),
            ],
        )
    }

    #[test]
    fn test_h_exp_derivation() {
        let locus = th01();
        assert!((locus.h_exp() - 0.32).abs() < 1e-12);
    }

    #[test]
    fn test_h_exp_missing_frequency_counts_as_zero() {
        let locus = Locus::with_alleles(
            "FGA",
            vec![Allele::new("20").with_frequency(0.5), Allele::new("21")],
        );
        assert!((locus.h_exp() - 0.75).abs() < 1e-12);
        // no alleles at all: 1 - 0
        assert_eq!(Locus::new("empty").h_exp(), 1.0);
    }

    #[test]
    fn test_h_exp_cache_is_sticky() {
        let mut locus = th01();
        let first = locus.h_exp();
        locus.add_allele(Allele::new("7").with_frequency(0.5));
        assert_eq!(locus.h_exp(), first);
        // clearing drops the cache and derives from the current alleles
        locus.set_h_exp(None).unwrap();
        assert!(locus.h_exp() < first);
    }

    #[test]
    fn test_h_exp_explicit_and_validation() {
        let mut locus = th01();
        locus.set_h_exp(Some(0.9)).unwrap();
        assert_eq!(locus.h_exp(), 0.9);

        let err = locus.set_h_exp(Some(1.5)).unwrap_err();
        assert!(matches!(err, LeapdnaError::InvalidHExp(v) if v == 1.5));
        assert!(locus.set_h_exp(Some(f64::NAN)).is_err());
        // failed assignment left the previous value in place
        assert_eq!(locus.h_exp(), 0.9);
    }

    #[test]
    fn test_sample_size() {
        let mut locus = th01();
        assert_eq!(locus.sample_size(), 600);

        locus.set_sample_size(Some(1000)).unwrap();
        assert_eq!(locus.sample_size(), 1000);

        let err = locus.set_sample_size(Some(-4)).unwrap_err();
        assert!(matches!(err, LeapdnaError::InvalidSampleSize(-4)));
        assert_eq!(locus.sample_size(), 1000);
    }

    #[test]
    fn test_h_obs_is_not_derived() {
        let mut locus = th01();
        assert_eq!(locus.h_obs(), None);
        locus.set_h_obs(Some(0.4)).unwrap();
        assert_eq!(locus.h_obs(), Some(0.4));
        assert!(locus.set_h_obs(Some(-0.1)).is_err());
        assert_eq!(locus.h_obs(), Some(0.4));
        locus.set_h_obs(None).unwrap();
        assert_eq!(locus.h_obs(), None);
    }

    #[test]
    fn test_get_frequency() {
        let locus = th01();
        assert_eq!(locus.get_frequency("6").unwrap(), Some(0.2));

        let err = locus.get_frequency("31.2").unwrap_err();
        assert!(matches!(
            err,
            LeapdnaError::MissingAllele { locus, allele }
                if locus == "TH01" && allele == "31.2"
        ));

        let locus = Locus::with_alleles("FGA", vec![Allele::new("20")]);
        assert_eq!(locus.get_frequency("20").unwrap(), None);
    }

    #[test]
    fn test_normalize() {
        let mut locus = Locus::with_alleles(
            "D3S1358",
            vec![
                Allele::new("14").with_frequency(0.2),
                Allele::new("15").with_frequency(0.6),
                Allele::new("16"),
            ],
        );
        locus.normalize_allele_frequencies();
        assert!((locus.get_frequency("14").unwrap().unwrap() - 0.25).abs() < 1e-12);
        assert!((locus.get_frequency("15").unwrap().unwrap() - 0.75).abs() < 1e-12);
        assert_eq!(locus.get_frequency("16").unwrap(), None);
    }

    #[test]
    fn test_normalize_zero_sum() {
        let mut locus =
            Locus::with_alleles("FGA", vec![Allele::new("20").with_frequency(0.0)]);
        locus.normalize_allele_frequencies();
        assert!(locus.get_frequency("20").unwrap().unwrap().is_nan());
    }

    #[test]
    fn test_add_rare_allele() {
        let mut locus = Locus::with_alleles(
            "TH01",
            vec![
                Allele::new("6").with_frequency(0.2),
                Allele::new("7").with_frequency(0.3),
            ],
        );
        locus.add_rare_allele();
        assert_eq!(locus.get_frequency(RARE_ALLELE_NAME).unwrap(), Some(0.5));

        // already complete: no rare allele appears
        let mut complete = Locus::with_alleles(
            "TPOX",
            vec![
                Allele::new("8").with_frequency(0.5),
                Allele::new("11").with_frequency(0.5),
            ],
        );
        complete.add_rare_allele();
        assert!(complete.get_allele(RARE_ALLELE_NAME).is_none());
    }

    #[test]
    fn test_anonymous_allele_keys() {
        let mut locus = Locus::new("D18S51");
        locus.add_allele(Allele::unnamed().with_frequency(0.1));
        locus.add_allele(Allele::unnamed().with_frequency(0.2));
        assert_eq!(locus.allele_names(), vec!["block#1", "block#2"]);

        // an explicit id occupying the next candidate is skipped over
        let mut taken = Locus::new("D21S11");
        let mut explicit = Allele::unnamed();
        explicit.common.id = Some("block#1".to_string());
        taken.add_allele(explicit);
        taken.add_allele(Allele::unnamed());
        assert_eq!(taken.allele_names(), vec!["block#1", "block#2"]);
    }

    #[test]
    fn test_read_preserves_order_and_replaces_in_place() {
        let mut locus = th01();
        locus.add_allele(Allele::new("6").with_frequency(0.9));
        assert_eq!(locus.len(), 2);
        assert_eq!(locus.allele_names(), vec!["6", "9.3"]);
        assert_eq!(locus.get_frequency("6").unwrap(), Some(0.9));
    }

    #[test]
    fn test_from_params_applies_statistics() {
        let params: LocusParams = serde_json::from_value(serde_json::json!({
            "type": "locus",
            "name": "TH01",
            "h_exp": 0.5,
            "sample_size": 300,
            "h_obs": 0.45,
        }))
        .unwrap();
        let locus = Locus::from_params(params, vec![Allele::new("6")]).unwrap();
        assert_eq!(locus.h_exp(), 0.5);
        assert_eq!(locus.sample_size(), 300);
        assert_eq!(locus.h_obs(), Some(0.45));
    }

    #[test]
    fn test_from_params_rejects_bad_statistics() {
        let params: LocusParams = serde_json::from_value(serde_json::json!({
            "name": "TH01",
            "sample_size": -1,
        }))
        .unwrap();
        assert!(matches!(
            Locus::from_params(params, Vec::new()),
            Err(LeapdnaError::InvalidSampleSize(-1))
        ));
    }
}

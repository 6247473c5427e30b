//! The study aggregate: a collection of loci with their frequency data.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::allele::Allele;
use crate::block::{BlockCommon, BlockParams, BlockType};
use crate::error::LeapdnaError;
use crate::locus::Locus;
use crate::matrix::{transpose, union, Datum, Matrix};
use crate::traits::ToLeapdna;
use crate::Frequency;

/// A study: an insertion-ordered collection of loci keyed by name, plus
/// free-form metadata.
#[derive(Clone, Debug, Default)]
pub struct Study {
    pub common: BlockCommon,
    loci: IndexMap<String, Locus>,
    /// Free-form study metadata, carried through interchange untouched.
    pub metadata: Option<Value>,
}

impl Study {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_loci(loci: impl IntoIterator<Item = Locus>) -> Self {
        let mut study = Self::new();
        for locus in loci {
            study.add_locus(locus);
        }
        study
    }

    pub fn from_params(params: StudyParams, loci: Vec<Locus>) -> Result<Self, LeapdnaError> {
        params.common.expect_type(BlockType::Study)?;
        let mut study = Self::with_loci(loci);
        study.common = BlockCommon::from_params(params.common);
        study.metadata = params.metadata;
        Ok(study)
    }

    /// Add a locus, keyed by its name. Re-adding an existing name
    /// replaces the stored locus without moving its position.
    pub fn add_locus(&mut self, locus: Locus) {
        self.loci.insert(locus.name().to_string(), locus);
    }

    pub fn loci(&self) -> &IndexMap<String, Locus> {
        &self.loci
    }

    pub fn loci_mut(&mut self) -> &mut IndexMap<String, Locus> {
        &mut self.loci
    }

    pub fn get_locus(&self, name: &str) -> Option<&Locus> {
        self.loci.get(name)
    }

    pub fn get_locus_mut(&mut self, name: &str) -> Option<&mut Locus> {
        self.loci.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.loci.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loci.is_empty()
    }

    /// The locus names, in insertion order.
    pub fn all_locus_names(&self) -> Vec<String> {
        self.loci.keys().cloned().collect()
    }

    /// Every allele name appearing in any locus, in first-seen order.
    pub fn all_allele_names(&self) -> Vec<String> {
        let per_locus: Vec<Vec<String>> =
            self.loci.values().map(|locus| locus.allele_names()).collect();
        union(&per_locus)
    }

    /// The frequency of an allele at a locus, with 0 standing in for an
    /// allele that is absent or has no usable frequency.
    pub fn get_frequency(
        &self,
        locus_name: &str,
        allele_name: &str,
    ) -> Result<Frequency, LeapdnaError> {
        self.get_frequency_or(locus_name, allele_name, 0.0)
    }

    /// Like [`Study::get_frequency`], with a caller-chosen default. A
    /// missing locus is an error; a missing allele, or one whose
    /// frequency is absent or zero, yields the default.
    pub fn get_frequency_or(
        &self,
        locus_name: &str,
        allele_name: &str,
        default: Frequency,
    ) -> Result<Frequency, LeapdnaError> {
        let locus = self
            .loci
            .get(locus_name)
            .ok_or_else(|| LeapdnaError::MissingLocus(locus_name.to_string()))?;
        match locus.get_allele(allele_name).and_then(|a| a.frequency) {
            Some(f) if f != 0.0 && !f.is_nan() => Ok(f),
            _ => Ok(default),
        }
    }

    /// Normalize every locus independently.
    pub fn normalize_allele_frequencies(&mut self) {
        for locus in self.loci.values_mut() {
            locus.normalize_allele_frequencies();
        }
    }

    /// Top up every locus with a `rare` allele where frequencies sum
    /// below one.
    pub fn add_rare_alleles(&mut self) {
        for locus in self.loci.values_mut() {
            locus.add_rare_allele();
        }
    }

    /// Project the study onto a frequency matrix: a header row of locus
    /// names, a header column of allele names, and every absent
    /// combination filled with 0.
    pub fn to_matrix(&self) -> Matrix {
        let locus_names = self.all_locus_names();
        let allele_names = self.all_allele_names();

        let mut header: Vec<Datum> = Vec::with_capacity(locus_names.len() + 1);
        header.push(Datum::from(""));
        header.extend(locus_names.iter().map(|name| Datum::from(name.clone())));

        let mut matrix = vec![header];
        for allele_name in &allele_names {
            let mut row: Vec<Datum> = Vec::with_capacity(locus_names.len() + 1);
            row.push(Datum::from(allele_name.clone()));
            for locus_name in &locus_names {
                // locus names come from the study itself, so the lookup
                // cannot miss
                let frequency = self
                    .get_frequency(locus_name, allele_name)
                    .unwrap_or_default();
                row.push(Datum::from(frequency));
            }
            matrix.push(row);
        }
        matrix
    }

    /// The inverse of [`Study::to_matrix`]: rebuild a study from a
    /// labeled frequency matrix. Blank cells (empty strings or numeric
    /// zeros) contribute no allele; a string cell that does not parse as
    /// a number fails, naming the offending literal. An empty matrix
    /// yields an empty study.
    pub fn from_matrix(matrix: &[Vec<Datum>]) -> Result<Self, LeapdnaError> {
        if matrix.is_empty() {
            return Ok(Self::new());
        }

        let columns = transpose(matrix);
        let locus_names: Vec<String> =
            matrix[0].iter().skip(1).map(|d| d.to_string()).collect();
        let allele_names: Vec<String> = columns
            .first()
            .map(|col| col.iter().skip(1).map(|d| d.to_string()).collect())
            .unwrap_or_default();

        let mut study = Self::new();
        for (column, locus_name) in columns.iter().skip(1).zip(&locus_names) {
            let mut locus = Locus::new(locus_name.clone());
            for (cell, allele_name) in column.iter().skip(1).zip(&allele_names) {
                if cell.is_blank() {
                    continue;
                }
                let frequency = match cell {
                    Datum::Num(n) => *n,
                    Datum::Str(s) => s
                        .trim()
                        .parse::<Frequency>()
                        .ok()
                        .filter(|f| !f.is_nan())
                        .ok_or_else(|| LeapdnaError::InvalidFrequencyValue(s.clone()))?,
                };
                locus.add_allele(Allele::new(allele_name.clone()).with_frequency(frequency));
            }
            study.add_locus(locus);
        }
        Ok(study)
    }
}

/// The fields of a study block as decoded off the wire. The `loci`
/// values are decoded separately, so nested tags can be dispatched.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct StudyParams {
    #[serde(flatten)]
    pub common: BlockParams,
    pub loci: Option<Vec<Value>>,
    pub metadata: Option<Value>,
}

impl ToLeapdna for Study {
    fn to_leapdna(&self, top_level: bool) -> Value {
        let mut map = self.common.to_leapdna_map(BlockType::Study, top_level);
        if !self.loci.is_empty() {
            map.insert(
                "loci".to_string(),
                Value::Array(self.loci.values().map(|l| l.to_leapdna(false)).collect()),
            );
        }
        if let Some(metadata) = &self.metadata {
            map.insert("metadata".to_string(), metadata.clone());
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn two_locus_study() -> Study {
        Study::with_loci(vec![
            Locus::with_alleles(
                "L1",
                vec![
                    Allele::new("a").with_frequency(0.2),
                    Allele::new("b").with_frequency(0.8),
                ],
            ),
            Locus::with_alleles(
                "L2",
                vec![
                    Allele::new("b").with_frequency(0.5),
                    Allele::new("c").with_frequency(0.5),
                ],
            ),
        ])
    }

    fn datum_rows(matrix: &Matrix) -> Vec<Vec<String>> {
        matrix
            .iter()
            .map(|row| row.iter().map(|d| d.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_name_projections() {
        let study = two_locus_study();
        assert_eq!(study.all_locus_names(), vec!["L1", "L2"]);
        assert_eq!(study.all_allele_names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_get_frequency() {
        let study = two_locus_study();
        assert_eq!(study.get_frequency("L1", "a").unwrap(), 0.2);
        // missing allele falls back to the default
        assert_eq!(study.get_frequency("L1", "c").unwrap(), 0.0);
        assert_eq!(study.get_frequency_or("L1", "c", 0.125).unwrap(), 0.125);

        assert!(matches!(
            study.get_frequency("D13S317", "9"),
            Err(LeapdnaError::MissingLocus(name)) if name == "D13S317"
        ));
    }

    #[test]
    fn test_get_frequency_zero_is_defaulted() {
        let mut study = two_locus_study();
        study
            .get_locus_mut("L1")
            .unwrap()
            .get_allele_mut("a")
            .unwrap()
            .frequency = Some(0.0);
        assert_eq!(study.get_frequency_or("L1", "a", 0.25).unwrap(), 0.25);
    }

    #[test]
    fn test_to_matrix() {
        let study = two_locus_study();
        let expected = vec![
            vec!["".to_string(), "L1".into(), "L2".into()],
            vec!["a".to_string(), "0.2".into(), "0".into()],
            vec!["b".to_string(), "0.8".into(), "0.5".into()],
            vec!["c".to_string(), "0".into(), "0.5".into()],
        ];
        assert_eq!(datum_rows(&study.to_matrix()), expected);
    }

    #[test]
    fn test_from_matrix() {
        let matrix: Matrix = vec![
            vec!["".into(), "L1".into(), "L2".into()],
            vec!["a".into(), 0.2.into(), 0.0.into()],
            vec!["b".into(), 0.8.into(), 0.5.into()],
            vec!["c".into(), 0.0.into(), 0.5.into()],
        ];
        let study = Study::from_matrix(&matrix).unwrap();
        assert_eq!(study.all_locus_names(), vec!["L1", "L2"]);
        assert_eq!(study.get_frequency("L1", "b").unwrap(), 0.8);
        // zero cells contribute no allele
        assert!(study.get_locus("L1").unwrap().get_allele("c").is_none());
        assert!(study.get_locus("L2").unwrap().get_allele("a").is_none());
    }

    #[test]
    fn test_from_matrix_string_cells() {
        let matrix: Matrix = vec![
            vec!["".into(), "L1".into()],
            vec!["a".into(), "0.25".into()],
            // the string "0" is a real (zero-frequency) observation
            vec!["b".into(), "0".into()],
        ];
        let study = Study::from_matrix(&matrix).unwrap();
        assert_eq!(study.get_locus("L1").unwrap().get_frequency("a").unwrap(), Some(0.25));
        assert_eq!(study.get_locus("L1").unwrap().get_frequency("b").unwrap(), Some(0.0));
    }

    #[test]
    fn test_from_matrix_rejects_garbage() {
        let matrix: Matrix = vec![
            vec!["".into(), "L1".into()],
            vec!["a".into(), "lots".into()],
        ];
        assert!(matches!(
            Study::from_matrix(&matrix),
            Err(LeapdnaError::InvalidFrequencyValue(cell)) if cell == "lots"
        ));
    }

    #[test]
    fn test_from_matrix_empty() {
        let study = Study::from_matrix(&[]).unwrap();
        assert!(study.is_empty());
    }

    #[test]
    fn test_matrix_round_trip() {
        let study = two_locus_study();
        let rebuilt = Study::from_matrix(&study.to_matrix()).unwrap();
        assert_eq!(rebuilt.to_matrix(), study.to_matrix());
    }

    #[test]
    fn test_fan_out_operations() {
        let mut study = Study::with_loci(vec![
            Locus::with_alleles("L1", vec![Allele::new("a").with_frequency(0.5)]),
            Locus::with_alleles("L2", vec![Allele::new("b").with_frequency(0.25)]),
        ]);
        study.add_rare_alleles();
        assert_eq!(study.get_frequency("L1", "rare").unwrap(), 0.5);
        assert_eq!(study.get_frequency("L2", "rare").unwrap(), 0.75);

        let mut study = Study::with_loci(vec![Locus::with_alleles(
            "L1",
            vec![
                Allele::new("a").with_frequency(0.2),
                Allele::new("b").with_frequency(0.6),
            ],
        )]);
        study.normalize_allele_frequencies();
        assert!((study.get_frequency("L1", "a").unwrap() - 0.25).abs() < 1e-12);
        assert!((study.get_frequency("L1", "b").unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_emission() {
        let mut study = Study::new();
        study.metadata = Some(json!({ "population": "CEU" }));
        // an empty study emits no loci key at all
        assert_eq!(
            study.to_leapdna(true),
            json!({
                "type": "study",
                "version": "1",
                "metadata": { "population": "CEU" },
            })
        );

        let study = two_locus_study();
        let value = study.to_leapdna(false);
        assert_eq!(value["type"], "study");
        assert_eq!(value["loci"].as_array().unwrap().len(), 2);
        assert_eq!(value["loci"][0]["name"], "L1");
        assert_eq!(value["loci"][0]["alleles"][1]["frequency"], 0.8);
    }

    #[test]
    fn test_replacing_locus_keeps_position() {
        let mut study = two_locus_study();
        study.add_locus(Locus::with_alleles(
            "L1",
            vec![Allele::new("z").with_frequency(1.0)],
        ));
        assert_eq!(study.all_locus_names(), vec!["L1", "L2"]);
        assert_eq!(study.get_frequency("L1", "z").unwrap(), 1.0);
        assert_eq!(study.get_frequency("L1", "a").unwrap(), 0.0);
    }
}

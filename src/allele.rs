//! The allele entity and its three designation kinds.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::block::{BlockCommon, BlockParams, BlockType};
use crate::error::LeapdnaError;
use crate::sequence::{Sequence, SequenceParams};
use crate::traits::ToLeapdna;
use crate::Frequency;

/// How an allele was designated.
#[derive(Clone, Debug)]
pub enum AlleleDesignation {
    /// A plain named designation.
    Plain,
    /// A capillary electrophoresis (fragment length) designation.
    Ce,
    /// A full sequence-level designation.
    Sequence(Sequence),
}

/// A single allele: a name, an optional population frequency and
/// observation count, and its designation.
///
/// The name is fixed at construction; collections key alleles by
/// [`Allele::identity`], so renaming a stored allele would silently
/// desynchronize it from its key.
#[derive(Clone, Debug)]
pub struct Allele {
    pub common: BlockCommon,
    name: Option<String>,
    /// Relative population frequency. Not validated here; sums and
    /// normalization work with whatever is present.
    pub frequency: Option<Frequency>,
    /// Number of observations behind the frequency.
    pub count: Option<u64>,
    designation: AlleleDesignation,
}

impl Allele {
    /// A plain named allele.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            common: BlockCommon::default(),
            name: Some(name.into()),
            frequency: None,
            count: None,
            designation: AlleleDesignation::Plain,
        }
    }

    /// An allele with no name; collections key it by a generated id.
    pub fn unnamed() -> Self {
        Self {
            common: BlockCommon::default(),
            name: None,
            frequency: None,
            count: None,
            designation: AlleleDesignation::Plain,
        }
    }

    /// A capillary electrophoresis designated allele.
    pub fn ce(name: impl Into<String>) -> Self {
        Self {
            designation: AlleleDesignation::Ce,
            ..Self::new(name)
        }
    }

    /// A sequence-designated allele. Its name is always the sequence's
    /// name.
    pub fn from_sequence(sequence: Sequence) -> Self {
        Self {
            common: BlockCommon::default(),
            name: sequence.name.clone(),
            frequency: None,
            count: None,
            designation: AlleleDesignation::Sequence(sequence),
        }
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn from_params(params: AlleleParams) -> Result<Self, LeapdnaError> {
        params.common.expect_type(BlockType::Allele)?;
        Ok(Self::assemble(params, AlleleDesignation::Plain))
    }

    /// Like [`Allele::from_params`], for the `ce_allele` tag. The fields
    /// are the same; only the designation differs.
    pub fn ce_from_params(params: AlleleParams) -> Result<Self, LeapdnaError> {
        params.common.expect_type(BlockType::CeAllele)?;
        Ok(Self::assemble(params, AlleleDesignation::Ce))
    }

    pub fn seq_from_params(params: SequenceAlleleParams) -> Result<Self, LeapdnaError> {
        params.allele.common.expect_type(BlockType::SeqAllele)?;
        let sequence = Sequence::from_params(params.sequence)?;
        Ok(Self::assemble(
            params.allele,
            AlleleDesignation::Sequence(sequence),
        ))
    }

    fn assemble(params: AlleleParams, designation: AlleleDesignation) -> Self {
        let AlleleParams {
            common,
            name,
            frequency,
            count,
        } = params;
        // a sequence-designated allele is named by its sequence
        let name = match &designation {
            AlleleDesignation::Sequence(sequence) => sequence.name.clone(),
            _ => name,
        };
        Self {
            common: BlockCommon::from_params(common),
            name,
            frequency,
            count,
            designation,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn designation(&self) -> &AlleleDesignation {
        &self.designation
    }

    /// The sequence behind a sequence-designated allele.
    pub fn sequence(&self) -> Option<&Sequence> {
        match &self.designation {
            AlleleDesignation::Sequence(sequence) => Some(sequence),
            _ => None,
        }
    }

    /// The identity collections key this allele by: the name when
    /// present, else the explicit block id.
    pub fn identity(&self) -> Option<&str> {
        self.name.as_deref().or(self.common.id.as_deref())
    }

    /// The wire tag for this allele's designation.
    pub fn block_type(&self) -> BlockType {
        match self.designation {
            AlleleDesignation::Plain => BlockType::Allele,
            AlleleDesignation::Ce => BlockType::CeAllele,
            AlleleDesignation::Sequence(_) => BlockType::SeqAllele,
        }
    }
}

/// The fields of an `allele` or `ce_allele` block as decoded off the
/// wire.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AlleleParams {
    #[serde(flatten)]
    pub common: BlockParams,
    #[serde(default, deserialize_with = "deserialize_loose_name")]
    pub name: Option<String>,
    pub frequency: Option<Frequency>,
    pub count: Option<u64>,
}

/// The fields of a `seq_allele` block as decoded off the wire.
#[derive(Clone, Debug, Deserialize)]
pub struct SequenceAlleleParams {
    #[serde(flatten)]
    pub allele: AlleleParams,
    pub sequence: SequenceParams,
}

/// Allele names are occasionally written as bare numbers (`9.3` rather
/// than `"9.3"`); accept those and keep them as strings.
fn deserialize_loose_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(name)) => Ok(Some(name)),
        Some(Value::Number(name)) => Ok(Some(name.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid allele name: {}",
            other
        ))),
    }
}

impl ToLeapdna for Allele {
    fn to_leapdna(&self, top_level: bool) -> Value {
        let mut map = self.common.to_leapdna_map(self.block_type(), top_level);
        if let Some(name) = &self.name {
            map.insert("name".to_string(), Value::String(name.clone()));
        }
        if let Some(frequency) = self.frequency {
            map.insert("frequency".to_string(), Value::from(frequency));
        }
        if let Some(count) = self.count {
            map.insert("count".to_string(), Value::from(count));
        }
        if let AlleleDesignation::Sequence(sequence) = &self.designation {
            map.insert("sequence".to_string(), sequence.to_leapdna(false));
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_prefers_name() {
        let allele = Allele::new("9.3");
        assert_eq!(allele.identity(), Some("9.3"));

        let mut allele = Allele::unnamed();
        assert_eq!(allele.identity(), None);
        allele.common.id = Some("a-17".to_string());
        assert_eq!(allele.identity(), Some("a-17"));

        let mut named = Allele::new("9.3");
        named.common.id = Some("a-17".to_string());
        assert_eq!(named.identity(), Some("9.3"));
    }

    #[test]
    fn test_builders() {
        let allele = Allele::new("12").with_frequency(0.25).with_count(50);
        assert_eq!(allele.frequency, Some(0.25));
        assert_eq!(allele.count, Some(50));
    }

    #[test]
    fn test_designation_tags() {
        assert_eq!(Allele::new("a").block_type(), BlockType::Allele);
        assert_eq!(Allele::ce("12.2").block_type(), BlockType::CeAllele);
        let seq_allele = Allele::from_sequence(Sequence::with_name("vWA:14"));
        assert_eq!(seq_allele.block_type(), BlockType::SeqAllele);
    }

    #[test]
    fn test_sequence_allele_named_by_sequence() {
        let params: SequenceAlleleParams = serde_json::from_value(json!({
            "type": "seq_allele",
            "name": "ignored",
            "frequency": 0.1,
            "sequence": { "type": "sequence", "name": "D21S11:29" },
        }))
        .unwrap();
        let allele = Allele::seq_from_params(params).unwrap();
        assert_eq!(allele.name(), Some("D21S11:29"));
        assert_eq!(allele.frequency, Some(0.1));
        assert!(allele.sequence().is_some());
    }

    #[test]
    fn test_wrong_tag_rejected() {
        let params: AlleleParams =
            serde_json::from_value(json!({ "type": "ce_allele", "name": "8" })).unwrap();
        assert!(Allele::ce_from_params(params.clone()).is_ok());
        assert!(matches!(
            Allele::from_params(params),
            Err(LeapdnaError::BlockTypeMismatch {
                expected: BlockType::Allele,
                found: BlockType::CeAllele,
            })
        ));
    }

    #[test]
    fn test_numeric_name_accepted() {
        let params: AlleleParams =
            serde_json::from_value(json!({ "name": 9.3, "frequency": 0.05 })).unwrap();
        let allele = Allele::from_params(params).unwrap();
        assert_eq!(allele.name(), Some("9.3"));
    }

    #[test]
    fn test_emission() {
        let allele = Allele::ce("12.2").with_frequency(0.125).with_count(25);
        assert_eq!(
            allele.to_leapdna(false),
            json!({
                "type": "ce_allele",
                "name": "12.2",
                "frequency": 0.125,
                "count": 25,
            })
        );
    }

    #[test]
    fn test_sequence_allele_emission_nests_sequence() {
        let mut sequence = Sequence::with_name("vWA:14");
        sequence.repeating_region_bracketed = Some("[TCTA]14".to_string());
        let allele = Allele::from_sequence(sequence).with_frequency(0.2);
        let value = allele.to_leapdna(true);
        assert_eq!(value["type"], "seq_allele");
        assert_eq!(value["name"], "vWA:14");
        // nested blocks never carry the version
        assert_eq!(value["sequence"]["type"], "sequence");
        assert!(value["sequence"].get("version").is_none());
        assert_eq!(value["sequence"]["repeating_region_seq"], "TCTA".repeat(14));
    }
}

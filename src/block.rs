//! Shared structure of leapdna blocks: the type tag, the fields every
//! block carries, and identifier generation for anonymous blocks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::LeapdnaError;
use crate::traits::ToLeapdna;

/// The version of the leapdna format written by this crate.
pub const LEAPDNA_VERSION: &str = "1";

/// The closed set of block kinds in the leapdna interchange format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Block,
    Sequence,
    Allele,
    CeAllele,
    SeqAllele,
    Locus,
    Study,
}

impl BlockType {
    /// The wire tag for this block kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Block => "block",
            BlockType::Sequence => "sequence",
            BlockType::Allele => "allele",
            BlockType::CeAllele => "ce_allele",
            BlockType::SeqAllele => "seq_allele",
            BlockType::Locus => "locus",
            BlockType::Study => "study",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = LeapdnaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "block" => Ok(BlockType::Block),
            "sequence" => Ok(BlockType::Sequence),
            "allele" => Ok(BlockType::Allele),
            "ce_allele" => Ok(BlockType::CeAllele),
            "seq_allele" => Ok(BlockType::SeqAllele),
            "locus" => Ok(BlockType::Locus),
            "study" => Ok(BlockType::Study),
            _ => Err(LeapdnaError::UnknownBlockType(s.to_string())),
        }
    }
}

/// Fields every leapdna block carries.
#[derive(Clone, Debug)]
pub struct BlockCommon {
    /// Explicitly assigned identifier, if any.
    pub id: Option<String>,
    /// Format version the block was authored against.
    pub version: String,
    /// Metadata reserved for the format itself.
    pub leapdna: Option<Value>,
    /// Free-form user metadata, carried through untouched.
    pub user: Option<Value>,
}

impl Default for BlockCommon {
    fn default() -> Self {
        Self {
            id: None,
            version: LEAPDNA_VERSION.to_string(),
            leapdna: None,
            user: None,
        }
    }
}

impl BlockCommon {
    pub(crate) fn from_params(params: BlockParams) -> Self {
        Self {
            id: params.id,
            version: params
                .version
                .unwrap_or_else(|| LEAPDNA_VERSION.to_string()),
            leapdna: params.leapdna,
            user: params.user,
        }
    }

    /// Start the wire form of a block: the type tag, plus the explicit id
    /// and user metadata when present. Top-level blocks also carry the
    /// format version and reserved metadata.
    pub(crate) fn to_leapdna_map(
        &self,
        block_type: BlockType,
        top_level: bool,
    ) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(
            "type".to_string(),
            Value::String(block_type.as_str().to_string()),
        );
        if let Some(id) = &self.id {
            map.insert("id".to_string(), Value::String(id.clone()));
        }
        if let Some(user) = &self.user {
            map.insert("user".to_string(), user.clone());
        }
        if top_level {
            map.insert("version".to_string(), Value::String(self.version.clone()));
            if let Some(leapdna) = &self.leapdna {
                map.insert("leapdna".to_string(), leapdna.clone());
            }
        }
        map
    }
}

/// The shared block fields as decoded off the wire.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BlockParams {
    #[serde(rename = "type")]
    pub block_type: Option<BlockType>,
    pub id: Option<String>,
    pub version: Option<String>,
    pub leapdna: Option<Value>,
    pub user: Option<Value>,
}

impl BlockParams {
    /// Check a supplied type tag against the kind being constructed. A
    /// missing tag passes; a tag for a different kind does not.
    pub fn expect_type(&self, expected: BlockType) -> Result<(), LeapdnaError> {
        match self.block_type {
            None => Ok(()),
            Some(found) if found == expected => Ok(()),
            Some(found) => Err(LeapdnaError::BlockTypeMismatch { expected, found }),
        }
    }
}

/// A bare metadata block, with no payload beyond the shared fields.
#[derive(Clone, Debug, Default)]
pub struct Block {
    pub common: BlockCommon,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_params(params: BlockParams) -> Result<Self, LeapdnaError> {
        params.expect_type(BlockType::Block)?;
        Ok(Self {
            common: BlockCommon::from_params(params),
        })
    }

    /// The explicit identifier, if one was assigned.
    pub fn id(&self) -> Option<&str> {
        self.common.id.as_deref()
    }
}

impl ToLeapdna for Block {
    fn to_leapdna(&self, top_level: bool) -> Value {
        Value::Object(self.common.to_leapdna_map(BlockType::Block, top_level))
    }
}

/// Generates identifiers for blocks with neither a name nor an explicit
/// id. Each collection keying anonymous blocks owns its own source, so
/// generated identifiers are unique within that collection without any
/// global state.
#[derive(Clone, Debug, Default)]
pub struct IdSource {
    next: usize,
}

impl IdSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next generated identifier: `block#1`, `block#2`, ...
    pub fn next_id(&mut self) -> String {
        self.next += 1;
        format!("block#{}", self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_type_tags() {
        assert_eq!(BlockType::CeAllele.to_string(), "ce_allele");
        assert_eq!("seq_allele".parse::<BlockType>().unwrap(), BlockType::SeqAllele);
        assert!(matches!(
            "bogus".parse::<BlockType>(),
            Err(LeapdnaError::UnknownBlockType(tag)) if tag == "bogus"
        ));
    }

    #[test]
    fn test_expect_type() {
        let params = BlockParams::default();
        assert!(params.expect_type(BlockType::Locus).is_ok());

        let params = BlockParams {
            block_type: Some(BlockType::Study),
            ..Default::default()
        };
        assert!(params.expect_type(BlockType::Study).is_ok());
        let err = params.expect_type(BlockType::Locus).unwrap_err();
        assert!(matches!(
            err,
            LeapdnaError::BlockTypeMismatch {
                expected: BlockType::Locus,
                found: BlockType::Study,
            }
        ));
    }

    #[test]
    fn test_version_defaults() {
        let block = Block::new();
        assert_eq!(block.common.version, LEAPDNA_VERSION);

        let params: BlockParams = serde_json::from_value(json!({ "type": "block" })).unwrap();
        let block = Block::from_params(params).unwrap();
        assert_eq!(block.common.version, "1");
    }

    #[test]
    fn test_block_round_trip() {
        let input = json!({
            "type": "block",
            "id": "b1",
            "version": "3",
            "leapdna": { "generator": "someapp" },
            "user": { "note": "hello" },
        });
        let params: BlockParams = serde_json::from_value(input.clone()).unwrap();
        let block = Block::from_params(params).unwrap();
        assert_eq!(block.to_leapdna(true), input);
    }

    #[test]
    fn test_nested_emission_omits_version() {
        let block = Block::new();
        let value = block.to_leapdna(false);
        assert_eq!(value, json!({ "type": "block" }));
    }

    #[test]
    fn test_id_source() {
        let mut ids = IdSource::new();
        assert_eq!(ids.next_id(), "block#1");
        assert_eq!(ids.next_id(), "block#2");
        let mut other = IdSource::new();
        assert_eq!(other.next_id(), "block#1");
    }
}

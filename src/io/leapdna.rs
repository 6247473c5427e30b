//! Reading and writing the leapdna JSON interchange format.
//!
//! A leapdna file is a single JSON object tagged with a `type` field.
//! [`load_leapdna`] dispatches on that tag and returns the decoded block
//! as a [`LeapdnaBlock`]; [`dump_leapdna`] serializes any block back to
//! its wire form.

use std::path::PathBuf;

use serde_json::Value;

use crate::allele::Allele;
use crate::block::{Block, BlockType};
use crate::error::LeapdnaError;
use crate::io::file::InputFile;
use crate::locus::{Locus, LocusParams};
use crate::sequence::Sequence;
use crate::study::{Study, StudyParams};
use crate::traits::ToLeapdna;

/// A decoded leapdna block of any kind.
///
/// The three allele tags (`allele`, `ce_allele`, `seq_allele`) all decode
/// to [`Allele`]; the designation is recovered from the tag.
#[derive(Clone, Debug)]
pub enum LeapdnaBlock {
    Block(Block),
    Sequence(Sequence),
    Allele(Allele),
    Locus(Locus),
    Study(Study),
}

impl LeapdnaBlock {
    /// The wire tag this block serializes under.
    pub fn block_type(&self) -> BlockType {
        match self {
            LeapdnaBlock::Block(_) => BlockType::Block,
            LeapdnaBlock::Sequence(_) => BlockType::Sequence,
            LeapdnaBlock::Allele(allele) => allele.block_type(),
            LeapdnaBlock::Locus(_) => BlockType::Locus,
            LeapdnaBlock::Study(_) => BlockType::Study,
        }
    }

    /// Unwrap a block expected to be a study.
    pub fn into_study(self) -> Result<Study, LeapdnaError> {
        match self {
            LeapdnaBlock::Study(study) => Ok(study),
            other => Err(LeapdnaError::BlockTypeMismatch {
                expected: BlockType::Study,
                found: other.block_type(),
            }),
        }
    }
}

impl ToLeapdna for LeapdnaBlock {
    fn to_leapdna(&self, top_level: bool) -> Value {
        match self {
            LeapdnaBlock::Block(block) => block.to_leapdna(top_level),
            LeapdnaBlock::Sequence(sequence) => sequence.to_leapdna(top_level),
            LeapdnaBlock::Allele(allele) => allele.to_leapdna(top_level),
            LeapdnaBlock::Locus(locus) => locus.to_leapdna(top_level),
            LeapdnaBlock::Study(study) => study.to_leapdna(top_level),
        }
    }
}

/// Read the `type` tag off a JSON object.
fn block_type_of(value: &Value) -> Result<BlockType, LeapdnaError> {
    match value.get("type").and_then(Value::as_str) {
        Some(tag) => tag.parse(),
        None => Err(LeapdnaError::MissingBlockType),
    }
}

fn allele_from_value(value: Value) -> Result<Allele, LeapdnaError> {
    match block_type_of(&value)? {
        BlockType::Allele => Allele::from_params(serde_json::from_value(value)?),
        BlockType::CeAllele => Allele::ce_from_params(serde_json::from_value(value)?),
        BlockType::SeqAllele => Allele::seq_from_params(serde_json::from_value(value)?),
        found => Err(LeapdnaError::BlockTypeMismatch {
            expected: BlockType::Allele,
            found,
        }),
    }
}

fn locus_from_value(value: Value) -> Result<Locus, LeapdnaError> {
    let mut params: LocusParams = serde_json::from_value(value)?;
    let allele_values = params.alleles.take().unwrap_or_default();
    let mut alleles = Vec::with_capacity(allele_values.len());
    for allele_value in allele_values {
        alleles.push(allele_from_value(allele_value)?);
    }
    Locus::from_params(params, alleles)
}

fn study_from_value(value: Value) -> Result<Study, LeapdnaError> {
    let mut params: StudyParams = serde_json::from_value(value)?;
    let locus_values = params.loci.take().unwrap_or_default();
    let mut loci = Vec::with_capacity(locus_values.len());
    for locus_value in locus_values {
        match block_type_of(&locus_value)? {
            BlockType::Locus => loci.push(locus_from_value(locus_value)?),
            found => {
                return Err(LeapdnaError::BlockTypeMismatch {
                    expected: BlockType::Locus,
                    found,
                })
            }
        }
    }
    Study::from_params(params, loci)
}

/// Decode a JSON value already parsed from a leapdna file.
pub fn load_leapdna_value(value: Value) -> Result<LeapdnaBlock, LeapdnaError> {
    match block_type_of(&value)? {
        BlockType::Block => Ok(LeapdnaBlock::Block(Block::from_params(
            serde_json::from_value(value)?,
        )?)),
        BlockType::Sequence => Ok(LeapdnaBlock::Sequence(Sequence::from_params(
            serde_json::from_value(value)?,
        )?)),
        BlockType::Allele | BlockType::CeAllele | BlockType::SeqAllele => {
            Ok(LeapdnaBlock::Allele(allele_from_value(value)?))
        }
        BlockType::Locus => Ok(LeapdnaBlock::Locus(locus_from_value(value)?)),
        BlockType::Study => Ok(LeapdnaBlock::Study(study_from_value(value)?)),
    }
}

/// Parse leapdna JSON text into a block.
pub fn load_leapdna(contents: &str) -> Result<LeapdnaBlock, LeapdnaError> {
    let value: Value = serde_json::from_str(contents)?;
    load_leapdna_value(value)
}

/// Read a leapdna file (plaintext or gzip-compressed) into a block.
pub fn load_leapdna_file(filepath: impl Into<PathBuf>) -> Result<LeapdnaBlock, LeapdnaError> {
    let contents = InputFile::new(filepath).read_to_string()?;
    load_leapdna(&contents)
}

/// Serialize a block to leapdna JSON text.
pub fn dump_leapdna<B: ToLeapdna>(block: &B) -> Result<String, LeapdnaError> {
    Ok(serde_json::to_string(&block.to_leapdna(true))?)
}

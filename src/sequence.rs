//! The sequence entity: a sequence-level description of an STR allele.

use std::cell::RefCell;

use serde::Deserialize;
use serde_json::Value;

use crate::block::{BlockCommon, BlockParams, BlockType};
use crate::bracketed::expand_bracketed;
use crate::derived::{read_or_cache_with, Derived};
use crate::error::LeapdnaError;
use crate::traits::ToLeapdna;

/// A sequence-level allele description: reference coordinates, repeat
/// motifs, and the repeating region and flanks in bracketed and literal
/// form.
///
/// The literal (`*_seq`) forms are derived lazily from their bracketed
/// counterparts through [`expand_bracketed`] and cached on first read. An
/// explicitly assigned literal always wins over derivation; clearing it
/// lets the next read derive afresh.
#[derive(Clone, Debug, Default)]
pub struct Sequence {
    pub common: BlockCommon,
    pub name: Option<String>,
    /// Reference sequence (e.g. chromosome) name.
    pub refseq_name: Option<String>,
    /// Start coordinate on the reference, kept verbatim as written.
    pub refseq_start: Option<String>,
    /// End coordinate on the reference, kept verbatim as written.
    pub refseq_end: Option<String>,
    pub repeat_motifs: Option<Vec<String>>,
    pub repeating_region_bracketed: Option<String>,
    pub flank5_bracketed: Option<String>,
    pub flank3_bracketed: Option<String>,
    repeating_region_seq: RefCell<Derived<String>>,
    flank5_seq: RefCell<Derived<String>>,
    flank3_seq: RefCell<Derived<String>>,
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn from_params(params: SequenceParams) -> Result<Self, LeapdnaError> {
        params.common.expect_type(BlockType::Sequence)?;
        Ok(Self {
            common: BlockCommon::from_params(params.common),
            name: params.name,
            refseq_name: params.refseq_name,
            refseq_start: params.refseq_start,
            refseq_end: params.refseq_end,
            repeat_motifs: params.repeat_motifs,
            repeating_region_bracketed: params.repeating_region_bracketed,
            flank5_bracketed: params.flank5_bracketed,
            flank3_bracketed: params.flank3_bracketed,
            repeating_region_seq: RefCell::new(Derived::explicit(params.repeating_region_seq)),
            flank5_seq: RefCell::new(Derived::explicit(params.flank5_seq)),
            flank3_seq: RefCell::new(Derived::explicit(params.flank3_seq)),
        })
    }

    /// The literal repeating region, derived from the bracketed form on
    /// first read and cached thereafter.
    pub fn repeating_region_seq(&self) -> Option<String> {
        read_or_cache_with(&self.repeating_region_seq, || {
            self.repeating_region_bracketed.as_deref().map(expand_bracketed)
        })
    }

    /// Assign or clear the literal repeating region.
    pub fn set_repeating_region_seq(&mut self, value: Option<String>) {
        self.repeating_region_seq.get_mut().assign(value);
    }

    /// The literal 5' flank, derived from the bracketed form on first
    /// read and cached thereafter.
    pub fn flank5_seq(&self) -> Option<String> {
        read_or_cache_with(&self.flank5_seq, || {
            self.flank5_bracketed.as_deref().map(expand_bracketed)
        })
    }

    /// Assign or clear the literal 5' flank.
    pub fn set_flank5_seq(&mut self, value: Option<String>) {
        self.flank5_seq.get_mut().assign(value);
    }

    /// The literal 3' flank, derived from the bracketed form on first
    /// read and cached thereafter.
    pub fn flank3_seq(&self) -> Option<String> {
        read_or_cache_with(&self.flank3_seq, || {
            self.flank3_bracketed.as_deref().map(expand_bracketed)
        })
    }

    /// Assign or clear the literal 3' flank.
    pub fn set_flank3_seq(&mut self, value: Option<String>) {
        self.flank3_seq.get_mut().assign(value);
    }
}

/// The fields of a sequence block as decoded off the wire.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SequenceParams {
    #[serde(flatten)]
    pub common: BlockParams,
    pub name: Option<String>,
    pub refseq_name: Option<String>,
    pub refseq_start: Option<String>,
    pub refseq_end: Option<String>,
    pub repeat_motifs: Option<Vec<String>>,
    pub repeating_region_bracketed: Option<String>,
    pub repeating_region_seq: Option<String>,
    pub flank5_bracketed: Option<String>,
    pub flank5_seq: Option<String>,
    pub flank3_bracketed: Option<String>,
    pub flank3_seq: Option<String>,
}

impl ToLeapdna for Sequence {
    fn to_leapdna(&self, top_level: bool) -> Value {
        let mut map = self.common.to_leapdna_map(BlockType::Sequence, top_level);
        if let Some(name) = &self.name {
            map.insert("name".to_string(), Value::String(name.clone()));
        }
        if let Some(refseq_name) = &self.refseq_name {
            map.insert("refseq_name".to_string(), Value::String(refseq_name.clone()));
        }
        if let Some(refseq_start) = &self.refseq_start {
            map.insert("refseq_start".to_string(), Value::String(refseq_start.clone()));
        }
        if let Some(refseq_end) = &self.refseq_end {
            map.insert("refseq_end".to_string(), Value::String(refseq_end.clone()));
        }
        if let Some(bracketed) = &self.repeating_region_bracketed {
            map.insert(
                "repeating_region_bracketed".to_string(),
                Value::String(bracketed.clone()),
            );
        }
        // the literal forms derive from the bracketed ones on demand
        if let Some(seq) = self.repeating_region_seq() {
            map.insert("repeating_region_seq".to_string(), Value::String(seq));
        }
        if let Some(bracketed) = &self.flank5_bracketed {
            map.insert("flank5_bracketed".to_string(), Value::String(bracketed.clone()));
        }
        if let Some(seq) = self.flank5_seq() {
            map.insert("flank5_seq".to_string(), Value::String(seq));
        }
        if let Some(bracketed) = &self.flank3_bracketed {
            map.insert("flank3_bracketed".to_string(), Value::String(bracketed.clone()));
        }
        if let Some(seq) = self.flank3_seq() {
            map.insert("flank3_seq".to_string(), Value::String(seq));
        }
        if let Some(motifs) = &self.repeat_motifs {
            map.insert(
                "repeat_motifs".to_string(),
                Value::Array(motifs.iter().map(|m| Value::String(m.clone())).collect()),
            );
        }
        Value::Object(map)
    }
}

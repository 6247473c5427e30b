pub mod traits;
pub mod error;
pub mod matrix;
pub mod bracketed;
pub mod derived;
pub mod block;
pub mod sequence;
pub mod allele;
pub mod locus;
pub mod study;
pub mod io;
pub mod commands;
pub mod reporting;
pub mod test_utilities;

pub type Frequency = f64;

pub mod prelude {
    pub use crate::allele::{Allele, AlleleDesignation};
    pub use crate::block::{Block, BlockType, IdSource, LEAPDNA_VERSION};
    pub use crate::bracketed::expand_bracketed;
    pub use crate::error::LeapdnaError;
    pub use crate::io::{
        dump_familias, dump_leapdna, dump_table, load_leapdna, load_leapdna_file,
        load_study_familias, load_study_table, parse_study_table, LeapdnaBlock, ReadTableOptions,
        RowIndexing, StudyFormat, WriteTableOptions,
    };
    pub use crate::locus::{Locus, RARE_ALLELE_NAME};
    pub use crate::matrix::{Coord, Datum, Matrix, MatrixSlice};
    pub use crate::sequence::Sequence;
    pub use crate::study::Study;
    pub use crate::traits::ToLeapdna;
    pub use crate::Frequency;
}

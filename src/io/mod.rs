//! Input/output: file handling and the three study file formats.

pub mod familias;
pub mod file;
pub mod leapdna;
pub mod table;

pub use familias::{dump_familias, load_study_familias};
pub use file::{InputFile, OutputFile};
pub use leapdna::{dump_leapdna, load_leapdna, load_leapdna_file, load_leapdna_value, LeapdnaBlock};
pub use table::{
    dump_table, load_study_table, parse_study_table, Newline, ReadTableOptions, RowIndexing,
    WriteTableOptions, CSV_TABLE, DEFAULT_NA_STRING, TSV_TABLE,
};

use std::path::Path;

use clap::ValueEnum;

use crate::error::LeapdnaError;

/// The study file formats the crate reads and writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StudyFormat {
    /// The leapdna JSON interchange format.
    Leapdna,
    /// A delimited frequency table.
    Table,
    /// The Familias frequency file format.
    Familias,
}

impl StudyFormat {
    /// Infer the format from a file extension, looking through a
    /// trailing `.gz`.
    pub fn detect(path: impl AsRef<Path>) -> Result<Self, LeapdnaError> {
        let path = path.as_ref();
        match base_extension(path).to_ascii_lowercase().as_str() {
            "json" | "leapdna" => Ok(StudyFormat::Leapdna),
            "csv" | "tsv" | "tab" | "txt" => Ok(StudyFormat::Table),
            "fam" | "familias" => Ok(StudyFormat::Familias),
            _ => Err(LeapdnaError::CouldNotDetectFileFormat(
                path.to_string_lossy().into_owned(),
            )),
        }
    }
}

/// The extension deciding the format, with a `.gz` suffix stripped.
fn base_extension(path: &Path) -> String {
    let mut path = path.to_path_buf();
    if path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("gz"))
    {
        path.set_extension("");
    }
    path.extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(StudyFormat::detect("study.json").unwrap(), StudyFormat::Leapdna);
        assert_eq!(StudyFormat::detect("study.leapdna").unwrap(), StudyFormat::Leapdna);
        assert_eq!(StudyFormat::detect("nist.csv").unwrap(), StudyFormat::Table);
        assert_eq!(StudyFormat::detect("nist.tsv").unwrap(), StudyFormat::Table);
        assert_eq!(StudyFormat::detect("nist.txt").unwrap(), StudyFormat::Table);
        assert_eq!(StudyFormat::detect("nordic.fam").unwrap(), StudyFormat::Familias);
    }

    #[test]
    fn test_format_detection_through_gzip() {
        assert_eq!(
            StudyFormat::detect("study.json.gz").unwrap(),
            StudyFormat::Leapdna
        );
        assert_eq!(StudyFormat::detect("nist.csv.GZ").unwrap(), StudyFormat::Table);
    }

    #[test]
    fn test_format_detection_is_case_insensitive() {
        assert_eq!(StudyFormat::detect("STUDY.JSON").unwrap(), StudyFormat::Leapdna);
    }

    #[test]
    fn test_format_detection_failures() {
        assert!(matches!(
            StudyFormat::detect("noextension"),
            Err(LeapdnaError::CouldNotDetectFileFormat(p)) if p == "noextension"
        ));
        assert!(matches!(
            StudyFormat::detect("bare.gz"),
            Err(LeapdnaError::CouldNotDetectFileFormat(_))
        ));
        assert!(matches!(
            StudyFormat::detect("study.xlsx"),
            Err(LeapdnaError::CouldNotDetectFileFormat(_))
        ));
    }
}

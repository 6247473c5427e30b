//! Reading and writing delimited allele frequency tables.
//!
//! Frequency tables put loci on one axis and alleles on the other, with
//! a header row/column naming each. [`parse_study_table`] turns such a
//! table into a [`Study`], sniffing the delimiter and the orientation
//! when they are not given; [`dump_table`] is the reverse projection.
//!
//! Published tables often carry extra annotation rows (sample sizes,
//! observed heterozygosities, totals). The [`ReadTableOptions::slice`]
//! selects the frequency region, and the optional secondary slices pull
//! the per-locus statistics out of their annotation rows.

use std::path::PathBuf;

use clap::ValueEnum;
use csv::{ReaderBuilder, Terminator, WriterBuilder};
use lazy_static::lazy_static;

use crate::error::LeapdnaError;
use crate::io::file::InputFile;
use crate::matrix::{submatrix, transpose, Coord, Datum, Matrix, MatrixSlice};
use crate::study::Study;
use crate::Frequency;

/// The cell value standing for "no data" unless configured otherwise.
pub const DEFAULT_NA_STRING: &str = "NA";

/// Delimiters considered when sniffing, in order of preference.
const DELIMITER_CANDIDATES: [u8; 4] = [b',', b'\t', b';', b'|'];

/// Which axis of a table indexes alleles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum RowIndexing {
    /// Decide from the table shape: fewer rows than columns means the
    /// rows are loci. Only meaningful when reading; treated as
    /// [`RowIndexing::Alleles`] when writing.
    #[default]
    Auto,
    /// Rows are alleles, columns are loci.
    Alleles,
    /// Rows are loci, columns are alleles.
    Loci,
}

/// How to interpret a delimited table as a study.
#[derive(Clone, Debug)]
pub struct ReadTableOptions {
    /// Field delimiter; sniffed from the first line when `None`.
    pub delimiter: Option<u8>,
    pub row_indexing: RowIndexing,
    /// Cell value standing for "no data"; [`DEFAULT_NA_STRING`] when
    /// `None`. An explicitly empty string is honored as-is.
    pub na_string: Option<String>,
    /// The region holding the frequencies, in the orientation of the
    /// file. Defaults to everything below and right of the headers.
    pub slice: MatrixSlice,
    /// A one-row region holding per-locus sample sizes.
    pub sample_size_slice: Option<MatrixSlice>,
    /// A one-row region holding per-locus observed heterozygosities.
    pub h_obs_slice: Option<MatrixSlice>,
}

impl Default for ReadTableOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            row_indexing: RowIndexing::Auto,
            na_string: None,
            slice: MatrixSlice::from_corners(1, 1, Coord::End, Coord::End),
            sample_size_slice: None,
            h_obs_slice: None,
        }
    }
}

/// The record terminator written between table rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Newline {
    /// Windows-style `\r\n`, the common convention for CSV.
    #[default]
    Crlf,
    /// Unix-style `\n`.
    Lf,
}

impl Newline {
    fn terminator(&self) -> Terminator {
        match self {
            Newline::Crlf => Terminator::CRLF,
            Newline::Lf => Terminator::Any(b'\n'),
        }
    }
}

/// How to serialize a study as a delimited table.
#[derive(Clone, Debug)]
pub struct WriteTableOptions {
    pub delimiter: u8,
    pub newline: Newline,
    pub row_indexing: RowIndexing,
    /// Written in place of zero or absent frequencies.
    pub na_string: String,
}

impl Default for WriteTableOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            newline: Newline::Crlf,
            row_indexing: RowIndexing::Alleles,
            na_string: String::new(),
        }
    }
}

lazy_static! {
    /// Comma-delimited output in the default configuration.
    pub static ref CSV_TABLE: WriteTableOptions = WriteTableOptions::default();
    /// Tab-delimited output in the default configuration.
    pub static ref TSV_TABLE: WriteTableOptions = WriteTableOptions {
        delimiter: b'\t',
        ..WriteTableOptions::default()
    };
}

/// Pick the candidate delimiter occurring most often in the first line.
/// Ties go to the earlier candidate.
fn sniff_delimiter(line: &str) -> Result<u8, LeapdnaError> {
    let mut best: Option<(u8, usize)> = None;
    for candidate in DELIMITER_CANDIDATES {
        let count = line.bytes().filter(|b| *b == candidate).count();
        if count > 0 && best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((candidate, count));
        }
    }
    best.map(|(delimiter, _)| delimiter)
        .ok_or(LeapdnaError::CouldNotDetectDelimiter)
}

/// Parse delimited text into a cell matrix. Cells equal to `na_string`
/// become numeric zero, except in the first column, which holds names.
fn parse_table(contents: &str, delimiter: u8, na_string: &str) -> Result<Matrix, LeapdnaError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(contents.as_bytes());

    let mut matrix: Matrix = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| LeapdnaError::TabularParseFailure(e.to_string()))?;
        let row: Vec<Datum> = record
            .iter()
            .enumerate()
            .map(|(i, field)| {
                if i > 0 && field == na_string {
                    Datum::Num(0.0)
                } else {
                    Datum::Str(field.to_string())
                }
            })
            .collect();
        matrix.push(row);
    }

    // a final one-cell row is a footer or stray line, not data
    if matrix.last().map_or(false, |row| row.len() == 1) {
        matrix.pop();
    }
    if matrix.is_empty() {
        return Err(LeapdnaError::TabularParseFailure(
            "table has no rows".to_string(),
        ));
    }
    let width = matrix[0].len();
    for (i, row) in matrix.iter().enumerate() {
        if row.len() != width {
            return Err(LeapdnaError::TabularParseFailure(format!(
                "row {} has {} cells; expected {}",
                i + 1,
                row.len(),
                width
            )));
        }
    }
    Ok(matrix)
}

fn parse_sample_size_cell(cell: &Datum) -> Result<Option<i64>, LeapdnaError> {
    if cell.is_blank() {
        return Ok(None);
    }
    match cell {
        Datum::Num(n) => {
            if n.fract() == 0.0 {
                Ok(Some(*n as i64))
            } else {
                Err(LeapdnaError::InvalidSampleSizeValue(cell.to_string()))
            }
        }
        Datum::Str(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            if let Ok(size) = trimmed.parse::<i64>() {
                return Ok(Some(size));
            }
            match trimmed.parse::<f64>() {
                Ok(size) if size.is_finite() && size.fract() == 0.0 => Ok(Some(size as i64)),
                _ => Err(LeapdnaError::InvalidSampleSizeValue(s.clone())),
            }
        }
    }
}

fn parse_h_obs_cell(cell: &Datum) -> Result<Option<Frequency>, LeapdnaError> {
    if cell.is_blank() {
        return Ok(None);
    }
    match cell {
        Datum::Num(n) => Ok(Some(*n)),
        Datum::Str(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<Frequency>()
                .ok()
                .filter(|h| !h.is_nan())
                .map(Some)
                .ok_or_else(|| LeapdnaError::InvalidHObsValue(s.clone()))
        }
    }
}

/// The single row a secondary slice selects, after canonicalization.
fn secondary_row(table: &Matrix, region: &MatrixSlice) -> Vec<Datum> {
    submatrix(table, region).into_iter().next().unwrap_or_default()
}

/// Interpret delimited text as a study.
pub fn parse_study_table(
    contents: &str,
    options: &ReadTableOptions,
) -> Result<Study, LeapdnaError> {
    let delimiter = match options.delimiter {
        Some(delimiter) => delimiter,
        None => sniff_delimiter(contents.lines().next().unwrap_or_default())?,
    };
    let na_string = options.na_string.as_deref().unwrap_or(DEFAULT_NA_STRING);
    let mut table = parse_table(contents, delimiter, na_string)?;

    let rows_are_loci = match options.row_indexing {
        RowIndexing::Alleles => false,
        RowIndexing::Loci => true,
        RowIndexing::Auto => table.len() < table.first().map_or(0, |row| row.len()),
    };

    // canonicalize to rows-are-alleles; the slices move with the cells
    let mut slice = options.slice;
    let mut sample_size_slice = options.sample_size_slice;
    let mut h_obs_slice = options.h_obs_slice;
    if rows_are_loci {
        table = transpose(&table);
        slice = slice.transposed();
        sample_size_slice = sample_size_slice.map(|s| s.transposed());
        h_obs_slice = h_obs_slice.map(|s| s.transposed());
    }

    // locus names sit above the frequency region, allele names beside it
    let header_slice = MatrixSlice::new(
        (Coord::FromStart(0), slice.north_west.1),
        (Coord::FromStart(0), slice.south_east.1),
    );
    let locus_names: Vec<String> = submatrix(&table, &header_slice)
        .into_iter()
        .next()
        .unwrap_or_default()
        .iter()
        .map(Datum::to_string)
        .collect();
    let names_slice = MatrixSlice::new(
        (slice.north_west.0, Coord::FromStart(0)),
        (slice.south_east.0, Coord::FromStart(0)),
    );
    let allele_names: Vec<String> = submatrix(&table, &names_slice)
        .into_iter()
        .map(|row| row.first().map(Datum::to_string).unwrap_or_default())
        .collect();

    let frequencies = submatrix(&table, &slice);
    let mut labeled: Matrix = Vec::with_capacity(frequencies.len() + 1);
    let mut header: Vec<Datum> = Vec::with_capacity(locus_names.len() + 1);
    header.push(Datum::from(""));
    header.extend(locus_names.iter().map(|name| Datum::from(name.as_str())));
    labeled.push(header);
    for (allele_name, row) in allele_names.iter().zip(frequencies) {
        let mut labeled_row = Vec::with_capacity(row.len() + 1);
        labeled_row.push(Datum::from(allele_name.as_str()));
        labeled_row.extend(row);
        labeled.push(labeled_row);
    }
    let mut study = Study::from_matrix(&labeled)?;

    if let Some(region) = sample_size_slice {
        let cells = secondary_row(&table, &region);
        for (name, cell) in locus_names.iter().zip(&cells) {
            if let Some(value) = parse_sample_size_cell(cell)? {
                if let Some(locus) = study.get_locus_mut(name) {
                    locus.set_sample_size(Some(value))?;
                }
            }
        }
    }
    if let Some(region) = h_obs_slice {
        let cells = secondary_row(&table, &region);
        for (name, cell) in locus_names.iter().zip(&cells) {
            if let Some(value) = parse_h_obs_cell(cell)? {
                if let Some(locus) = study.get_locus_mut(name) {
                    locus.set_h_obs(Some(value))?;
                }
            }
        }
    }
    Ok(study)
}

/// Read a delimited table file (plaintext or gzip-compressed) as a study.
pub fn load_study_table(
    filepath: impl Into<PathBuf>,
    options: &ReadTableOptions,
) -> Result<Study, LeapdnaError> {
    let contents = InputFile::new(filepath).read_to_string()?;
    parse_study_table(&contents, options)
}

/// Serialize a study as a delimited table. Zero frequencies are written
/// as the configured `na_string`.
pub fn dump_table(study: &Study, options: &WriteTableOptions) -> Result<String, LeapdnaError> {
    let mut matrix = study.to_matrix();
    if matches!(options.row_indexing, RowIndexing::Loci) {
        matrix = transpose(&matrix);
    }

    let mut buffer = Vec::new();
    {
        let mut writer = WriterBuilder::new()
            .delimiter(options.delimiter)
            .terminator(options.newline.terminator())
            .from_writer(&mut buffer);
        for row in &matrix {
            let record: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    Datum::Num(n) if *n == 0.0 => options.na_string.clone(),
                    other => other.to_string(),
                })
                .collect();
            writer
                .write_record(&record)
                .map_err(|e| LeapdnaError::IOError(e.into()))?;
        }
        writer.flush()?;
    }
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

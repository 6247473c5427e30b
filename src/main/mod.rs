use std::path::PathBuf;

use clap::{Parser, Subcommand};
use leapdna::{
    commands::{leapdna_convert, leapdna_normalize, leapdna_stats},
    io::{Newline, ReadTableOptions, RowIndexing, StudyFormat, WriteTableOptions},
    prelude::LeapdnaError,
};

#[cfg(feature = "dev-commands")]
use leapdna::commands::leapdna_random_study;

const INFO: &str = "\
leapdna: allele frequency data tools for forensic genetics
usage: leapdna [--help] <subcommand>

Subcommands:

  convert: read a study file in one format and write it in another.

  normalize: rescale each locus so its allele frequencies sum to 1.

  stats: summarize each locus of a study.

";

#[derive(Parser)]
#[clap(name = "leapdna")]
#[clap(about = INFO)]
struct Cli {
    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Convert {
        /// an input study file (leapdna JSON, frequency table, or Familias)
        #[arg(required = true)]
        input: PathBuf,

        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// the input format, when the file extension is not decisive
        #[arg(long, value_enum)]
        from: Option<StudyFormat>,

        /// the output format, when the output extension is not decisive
        #[arg(long, value_enum)]
        to: Option<StudyFormat>,

        /// the input table delimiter (sniffed from the first line if not specified)
        #[arg(long)]
        in_delimiter: Option<char>,

        /// whether input table rows are alleles or loci (default: decide from shape)
        #[arg(long, value_enum)]
        in_rows: Option<RowIndexing>,

        /// the input table cell value standing for missing data (default: NA)
        #[arg(long)]
        na_string: Option<String>,

        /// the output table delimiter (default: comma)
        #[arg(long)]
        out_delimiter: Option<char>,

        /// the output table newline convention (default: crlf)
        #[arg(long, value_enum)]
        out_newline: Option<Newline>,

        /// whether output table rows are alleles or loci (default: alleles)
        #[arg(long, value_enum)]
        out_rows: Option<RowIndexing>,

        /// written in place of zero frequencies in output tables (default: empty)
        #[arg(long)]
        out_na_string: Option<String>,
    },
    Normalize {
        /// an input study file (leapdna JSON, frequency table, or Familias)
        #[arg(required = true)]
        input: PathBuf,

        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// the input format, when the file extension is not decisive
        #[arg(long, value_enum)]
        from: Option<StudyFormat>,

        /// the output format, when the output extension is not decisive
        #[arg(long, value_enum)]
        to: Option<StudyFormat>,

        /// absorb each locus's remainder into a `rare` allele instead of rescaling
        #[arg(long)]
        rare: bool,

        /// the input table delimiter (sniffed from the first line if not specified)
        #[arg(long)]
        in_delimiter: Option<char>,

        /// whether input table rows are alleles or loci (default: decide from shape)
        #[arg(long, value_enum)]
        in_rows: Option<RowIndexing>,

        /// the input table cell value standing for missing data (default: NA)
        #[arg(long)]
        na_string: Option<String>,

        /// the output table delimiter (default: comma)
        #[arg(long)]
        out_delimiter: Option<char>,

        /// the output table newline convention (default: crlf)
        #[arg(long, value_enum)]
        out_newline: Option<Newline>,

        /// whether output table rows are alleles or loci (default: alleles)
        #[arg(long, value_enum)]
        out_rows: Option<RowIndexing>,

        /// written in place of zero frequencies in output tables (default: empty)
        #[arg(long)]
        out_na_string: Option<String>,
    },
    Stats {
        /// an input study file (leapdna JSON, frequency table, or Familias)
        #[arg(required = true)]
        input: PathBuf,

        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// the input format, when the file extension is not decisive
        #[arg(long, value_enum)]
        from: Option<StudyFormat>,

        /// the input table delimiter (sniffed from the first line if not specified)
        #[arg(long)]
        in_delimiter: Option<char>,

        /// whether input table rows are alleles or loci (default: decide from shape)
        #[arg(long, value_enum)]
        in_rows: Option<RowIndexing>,

        /// the input table cell value standing for missing data (default: NA)
        #[arg(long)]
        na_string: Option<String>,
    },

    #[cfg(feature = "dev-commands")]
    RandomStudy {
        /// number of loci to generate
        #[arg(long, default_value_t = 10)]
        loci: usize,

        /// number of alleles per locus
        #[arg(long, default_value_t = 8)]
        alleles: usize,

        /// an optional output file (standard output will be used if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// the output format, when the output extension is not decisive
        #[arg(long, value_enum)]
        to: Option<StudyFormat>,
    },
}

fn delimiter_byte(delimiter: char) -> Result<u8, LeapdnaError> {
    if delimiter.is_ascii() {
        Ok(delimiter as u8)
    } else {
        Err(LeapdnaError::InvalidDelimiter(delimiter))
    }
}

fn read_table_options(
    in_delimiter: Option<char>,
    in_rows: Option<RowIndexing>,
    na_string: Option<String>,
) -> Result<ReadTableOptions, LeapdnaError> {
    Ok(ReadTableOptions {
        delimiter: in_delimiter.map(delimiter_byte).transpose()?,
        row_indexing: in_rows.unwrap_or_default(),
        na_string,
        ..Default::default()
    })
}

fn write_table_options(
    out_delimiter: Option<char>,
    out_newline: Option<Newline>,
    out_rows: Option<RowIndexing>,
    out_na_string: Option<String>,
) -> Result<WriteTableOptions, LeapdnaError> {
    Ok(WriteTableOptions {
        delimiter: out_delimiter.map(delimiter_byte).transpose()?.unwrap_or(b','),
        newline: out_newline.unwrap_or_default(),
        row_indexing: out_rows.unwrap_or(RowIndexing::Alleles),
        na_string: out_na_string.unwrap_or_default(),
    })
}

fn run() -> Result<(), LeapdnaError> {
    let cli = Cli::parse();
    let result = match &cli.command {
        Some(Commands::Convert {
            input,
            output,
            from,
            to,
            in_delimiter,
            in_rows,
            na_string,
            out_delimiter,
            out_newline,
            out_rows,
            out_na_string,
        }) => {
            let read_options = read_table_options(*in_delimiter, *in_rows, na_string.clone())?;
            let write_options = write_table_options(
                *out_delimiter,
                *out_newline,
                *out_rows,
                out_na_string.clone(),
            )?;
            leapdna_convert(
                input,
                output.as_ref(),
                *from,
                *to,
                &read_options,
                &write_options,
            )
        }
        Some(Commands::Normalize {
            input,
            output,
            from,
            to,
            rare,
            in_delimiter,
            in_rows,
            na_string,
            out_delimiter,
            out_newline,
            out_rows,
            out_na_string,
        }) => {
            let read_options = read_table_options(*in_delimiter, *in_rows, na_string.clone())?;
            let write_options = write_table_options(
                *out_delimiter,
                *out_newline,
                *out_rows,
                out_na_string.clone(),
            )?;
            leapdna_normalize(
                input,
                output.as_ref(),
                *from,
                *to,
                *rare,
                &read_options,
                &write_options,
            )
        }
        Some(Commands::Stats {
            input,
            output,
            from,
            in_delimiter,
            in_rows,
            na_string,
        }) => {
            let read_options = read_table_options(*in_delimiter, *in_rows, na_string.clone())?;
            leapdna_stats(input, output.as_ref(), *from, &read_options)
        }
        #[cfg(feature = "dev-commands")]
        Some(Commands::RandomStudy {
            loci,
            alleles,
            output,
            to,
        }) => leapdna_random_study(
            *loci,
            *alleles,
            output.as_ref(),
            *to,
            &WriteTableOptions::default(),
        ),
        None => {
            println!("{}\n", INFO);
            std::process::exit(1);
        }
    };
    let _output = result?;
    // TODO print the report entries once commands fill them in
    Ok(())
}

fn main() {
    match run() {
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

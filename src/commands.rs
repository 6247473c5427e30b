use std::io::Write;
use std::path::PathBuf;

use crate::{
    io::{
        dump_familias, dump_leapdna, dump_table, load_leapdna_file, load_study_familias,
        load_study_table, InputFile, OutputFile, ReadTableOptions, StudyFormat, WriteTableOptions,
    },
    prelude::*,
    reporting::{CommandOutput, Report},
};

#[cfg(feature = "dev-commands")]
use crate::test_utilities::random_study;

/// Load a study from any supported format, detecting the format from the
/// file extension unless one is forced.
pub fn load_study(
    filepath: &PathBuf,
    format: Option<StudyFormat>,
    read_options: &ReadTableOptions,
) -> Result<Study, LeapdnaError> {
    let format = match format {
        Some(format) => format,
        None => StudyFormat::detect(filepath)?,
    };
    match format {
        StudyFormat::Leapdna => load_leapdna_file(filepath)?.into_study(),
        StudyFormat::Table => load_study_table(filepath, read_options),
        StudyFormat::Familias => {
            let contents = InputFile::new(filepath).read_to_string()?;
            load_study_familias(&contents)
        }
    }
}

/// Serialize a study in any supported format.
pub fn dump_study(
    study: &Study,
    format: StudyFormat,
    write_options: &WriteTableOptions,
) -> Result<String, LeapdnaError> {
    match format {
        StudyFormat::Leapdna => dump_leapdna(study),
        StudyFormat::Table => dump_table(study, write_options),
        StudyFormat::Familias => Ok(dump_familias(study)),
    }
}

/// The output format: forced, or inferred from the output path, with
/// leapdna JSON for standard output.
fn resolve_output_format(
    to: Option<StudyFormat>,
    output: Option<&PathBuf>,
) -> Result<StudyFormat, LeapdnaError> {
    match to {
        Some(format) => Ok(format),
        None => match output {
            Some(path) => StudyFormat::detect(path),
            None => Ok(StudyFormat::Leapdna),
        },
    }
}

/// Write serialized text to the output file, or standard output. A final
/// newline is added if the serialization lacks one.
fn write_output(output: Option<&PathBuf>, text: &str) -> Result<(), LeapdnaError> {
    let output_stream = output.map_or(OutputFile::new_stdout(), OutputFile::new);
    let mut writer = output_stream.writer()?;
    write!(writer, "{}", text)?;
    if !text.ends_with('\n') {
        writeln!(writer)?;
    }
    Ok(())
}

/// Convert a study file between formats.
pub fn leapdna_convert(
    input: &PathBuf,
    output: Option<&PathBuf>,
    from: Option<StudyFormat>,
    to: Option<StudyFormat>,
    read_options: &ReadTableOptions,
    write_options: &WriteTableOptions,
) -> Result<CommandOutput<()>, LeapdnaError> {
    let study = load_study(input, from, read_options)?;
    let to_format = resolve_output_format(to, output)?;
    let text = dump_study(&study, to_format, write_options)?;
    write_output(output, &text)?;

    let report = Report::new();
    Ok(CommandOutput::new((), report))
}

/// Rescale each locus so its allele frequencies sum to 1, or absorb the
/// remainder into a `rare` allele instead.
pub fn leapdna_normalize(
    input: &PathBuf,
    output: Option<&PathBuf>,
    from: Option<StudyFormat>,
    to: Option<StudyFormat>,
    rare: bool,
    read_options: &ReadTableOptions,
    write_options: &WriteTableOptions,
) -> Result<CommandOutput<()>, LeapdnaError> {
    let mut study = load_study(input, from, read_options)?;

    // For reporting stuff to the user.
    let mut report = Report::new();

    let off_unit = study
        .loci()
        .values()
        .filter(|locus| (locus.allele_frequency_sum() - 1.0).abs() > 1e-9)
        .count();
    if off_unit > 0 {
        report.add_issue(format!(
            "{} loci had allele frequencies not summing to 1",
            off_unit
        ));
    }

    if rare {
        study.add_rare_alleles();
    } else {
        study.normalize_allele_frequencies();
    }

    let to_format = resolve_output_format(to, output)?;
    let text = dump_study(&study, to_format, write_options)?;
    write_output(output, &text)?;

    Ok(CommandOutput::new((), report))
}

/// Summarize each locus of a study: allele count, sample size, frequency
/// sum, and heterozygosities.
pub fn leapdna_stats(
    input: &PathBuf,
    output: Option<&PathBuf>,
    from: Option<StudyFormat>,
    read_options: &ReadTableOptions,
) -> Result<CommandOutput<()>, LeapdnaError> {
    let study = load_study(input, from, read_options)?;

    let mut lines = vec!["locus\tn_alleles\tsample_size\tfreq_sum\th_exp\th_obs".to_string()];
    for locus in study.loci().values() {
        let h_obs = locus
            .h_obs()
            .map_or_else(|| "NA".to_string(), |h| h.to_string());
        lines.push(format!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            locus.name(),
            locus.len(),
            locus.sample_size(),
            locus.allele_frequency_sum(),
            locus.h_exp(),
            h_obs
        ));
    }
    write_output(output, &lines.join("\n"))?;

    let report = Report::new();
    Ok(CommandOutput::new((), report))
}

/// Generate a random study, for trying out the other commands.
#[cfg(feature = "dev-commands")]
pub fn leapdna_random_study(
    num_loci: usize,
    num_alleles: usize,
    output: Option<&PathBuf>,
    to: Option<StudyFormat>,
    write_options: &WriteTableOptions,
) -> Result<CommandOutput<()>, LeapdnaError> {
    let study = random_study(num_loci, num_alleles);
    let to_format = resolve_output_format(to, output)?;
    let text = dump_study(&study, to_format, write_options)?;
    write_output(output, &text)?;

    let report = Report::new();
    Ok(CommandOutput::new((), report))
}

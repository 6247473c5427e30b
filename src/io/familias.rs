//! Reading and writing the Familias allele frequency format.
//!
//! Familias files list each locus as a bare name line, followed by one
//! `allele<TAB>frequency` line per allele, with loci separated by blank
//! lines. The format carries nothing but names and frequencies.

use crate::allele::Allele;
use crate::error::LeapdnaError;
use crate::locus::Locus;
use crate::study::Study;
use crate::Frequency;

/// Parse Familias-formatted text into a study. A locus still open at
/// the end of input is kept, so a trailing blank line is optional.
pub fn load_study_familias(contents: &str) -> Result<Study, LeapdnaError> {
    let mut study = Study::new();
    let mut current: Option<Locus> = None;

    for line in contents.lines() {
        if line.is_empty() {
            if let Some(locus) = current.take() {
                study.add_locus(locus);
            }
            continue;
        }
        match &mut current {
            None => current = Some(Locus::new(line)),
            Some(locus) => {
                // columns past the frequency are tolerated and ignored
                let mut parts = line.splitn(3, '\t');
                let name = parts.next().unwrap_or_default();
                let frequency_text = match parts.next() {
                    Some(text) => text,
                    None => {
                        return Err(LeapdnaError::TabularParseFailure(format!(
                            "allele line \"{}\" has no frequency column",
                            line
                        )))
                    }
                };
                let frequency = frequency_text
                    .trim()
                    .parse::<Frequency>()
                    .ok()
                    .filter(|f| !f.is_nan())
                    .ok_or_else(|| {
                        LeapdnaError::InvalidFrequencyValue(frequency_text.to_string())
                    })?;
                locus.add_allele(Allele::new(name).with_frequency(frequency));
            }
        }
    }
    if let Some(locus) = current.take() {
        study.add_locus(locus);
    }
    Ok(study)
}

/// Serialize a study as Familias-formatted text. Alleles without a
/// frequency are written as 0.
pub fn dump_familias(study: &Study) -> String {
    let mut sections: Vec<String> = Vec::with_capacity(study.len());
    for locus in study.loci().values() {
        let mut lines: Vec<String> = Vec::with_capacity(locus.len() + 2);
        lines.push(locus.name().to_string());
        for allele in locus.alleles().values() {
            let name = allele.identity().unwrap_or_default();
            let frequency = allele.frequency.unwrap_or(0.0);
            lines.push(format!("{}\t{}", name, frequency));
        }
        lines.push(String::new());
        sections.push(lines.join("\n"));
    }
    sections.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_LOCI: &str = "L1\na\t0.2\nb\t0.8\n\nL2\nb\t0.5\nc\t0.5\n";

    #[test]
    fn test_load_basic() {
        let study = load_study_familias(TWO_LOCI).unwrap();
        assert_eq!(study.all_locus_names(), vec!["L1", "L2"]);
        assert_eq!(study.get_frequency("L1", "a").unwrap(), 0.2);
        assert_eq!(study.get_frequency("L2", "c").unwrap(), 0.5);
    }

    #[test]
    fn test_final_locus_needs_no_blank_line() {
        let study = load_study_familias("L1\na\t1\n\nL2\nb\t1").unwrap();
        assert_eq!(study.all_locus_names(), vec!["L1", "L2"]);
        assert_eq!(study.get_frequency("L2", "b").unwrap(), 1.0);
    }

    #[test]
    fn test_repeated_blank_lines() {
        let study = load_study_familias("L1\na\t1\n\n\n\nL2\nb\t1\n").unwrap();
        assert_eq!(study.len(), 2);
    }

    #[test]
    fn test_windows_line_endings() {
        let study = load_study_familias("L1\r\na\t0.25\r\n\r\nL2\r\nb\t1\r\n").unwrap();
        assert_eq!(study.get_frequency("L1", "a").unwrap(), 0.25);
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let study = load_study_familias("L1\na\t0.2\tcomment\there\n").unwrap();
        assert_eq!(study.get_frequency("L1", "a").unwrap(), 0.2);
    }

    #[test]
    fn test_allele_line_without_tab() {
        let err = load_study_familias("L1\na 0.2\n").unwrap_err();
        assert!(matches!(
            err,
            LeapdnaError::TabularParseFailure(msg) if msg.contains("a 0.2")
        ));
    }

    #[test]
    fn test_bad_frequency() {
        let err = load_study_familias("L1\na\tlots\n").unwrap_err();
        assert!(matches!(err, LeapdnaError::InvalidFrequencyValue(v) if v == "lots"));
    }

    #[test]
    fn test_empty_input() {
        let study = load_study_familias("").unwrap();
        assert!(study.is_empty());
        assert_eq!(dump_familias(&study), "");
    }

    #[test]
    fn test_dump() {
        let study = load_study_familias(TWO_LOCI).unwrap();
        assert_eq!(dump_familias(&study), TWO_LOCI);
    }

    #[test]
    fn test_dump_absent_frequency_as_zero() {
        let study = Study::with_loci(vec![Locus::with_alleles(
            "L1",
            vec![Allele::new("a")],
        )]);
        assert_eq!(dump_familias(&study), "L1\na\t0\n");
    }

    #[test]
    fn test_round_trip() {
        let study = load_study_familias(TWO_LOCI).unwrap();
        let reloaded = load_study_familias(&dump_familias(&study)).unwrap();
        assert_eq!(reloaded.to_matrix(), study.to_matrix());
    }
}

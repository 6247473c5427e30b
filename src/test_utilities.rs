//! Test cases and test utility functions.
//!

use rand::{thread_rng, Rng};

use crate::allele::Allele;
use crate::locus::Locus;
use crate::study::Study;
use crate::Frequency;

// Stochastic study defaults
//
// Allele counts per locus are kept small so failures print readably.
pub const MIN_ALLELES: usize = 2;
pub const MAX_ALLELES: usize = 12;

// number of loci in a random study
pub const NLOCI: usize = 10;

// common STR locus names, so fixtures look like real panels
pub const LOCUS_NAMES: [&str; 10] = [
    "CSF1PO", "D3S1358", "D5S818", "D7S820", "D8S1179", "D13S317", "D18S51", "FGA", "TH01", "vWA",
];

/// Build `n` random frequencies summing to 1.
pub fn random_frequencies(n: usize) -> Vec<Frequency> {
    let mut rng = thread_rng();
    let mut weights: Vec<f64> = (0..n).map(|_| rng.gen_range(0.01..1.0)).collect();
    let total: f64 = weights.iter().sum();
    for weight in &mut weights {
        *weight /= total;
    }
    weights
}

/// Build a random locus of `n` CE alleles with frequencies summing to 1
/// and counts consistent with a random sample size.
pub fn random_locus(name: impl Into<String>, n: usize) -> Locus {
    let mut rng = thread_rng();
    let frequencies = random_frequencies(n);
    let base_repeat = rng.gen_range(5..20);
    let sample_size = rng.gen_range(100..1000);
    let mut alleles = Vec::with_capacity(n);
    for (i, frequency) in frequencies.into_iter().enumerate() {
        // occasional 9.3-style microvariants; the integer part keeps
        // names distinct
        let allele_name = if rng.gen_bool(0.2) {
            format!("{}.3", base_repeat + i)
        } else {
            (base_repeat + i).to_string()
        };
        let count = (frequency * sample_size as f64).round() as u64;
        alleles.push(Allele::ce(allele_name).with_frequency(frequency).with_count(count));
    }
    Locus::with_alleles(name, alleles)
}

/// Build a random study of `num_loci` loci with `num_alleles` alleles
/// each, named after common STR loci.
pub fn random_study(num_loci: usize, num_alleles: usize) -> Study {
    let mut loci = Vec::with_capacity(num_loci);
    for i in 0..num_loci {
        let name = LOCUS_NAMES
            .get(i)
            .map(|name| name.to_string())
            .unwrap_or_else(|| format!("L{}", i + 1));
        loci.push(random_locus(name, num_alleles));
    }
    Study::with_loci(loci)
}

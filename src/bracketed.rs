//! Expansion of bracketed repeat notation into literal sequences.
//!
//! Short tandem repeat sequences are commonly written in a compact form
//! like `[TCTA]4TCA`, where a bracketed motif is followed by a repeat
//! count. [`expand_bracketed`] rewrites that notation into the literal
//! sequence, leaving everything outside motifs untouched.

/// Expand bracketed repeat notation into a literal sequence.
///
/// Motifs are delimited by `[`/`]` or `(`/`)` and followed by a decimal
/// repeat count: `[TCTA]3` expands to `TCTATCTATCTA`. Characters outside
/// a motif, including whitespace and digits that do not follow a closing
/// bracket, pass through unchanged. A motif whose count is missing at the
/// end of input repeats zero times. This function accepts any input and
/// never fails.
pub fn expand_bracketed(bracketed: &str) -> String {
    let mut expanded = String::new();
    let mut motif = String::new();
    let mut nrepeats: usize = 0;
    let mut in_motif = false;
    let mut in_count = false;

    for c in bracketed.chars() {
        if in_count {
            if let Some(digit) = c.to_digit(10) {
                nrepeats = nrepeats.saturating_mul(10).saturating_add(digit as usize);
                continue;
            }
            expanded.push_str(&motif.repeat(nrepeats));
            motif.clear();
            nrepeats = 0;
            in_count = false;
        }

        match c {
            '[' | '(' => in_motif = true,
            ']' | ')' => {
                in_motif = false;
                in_count = true;
            }
            _ if in_motif => motif.push(c),
            _ => expanded.push(c),
        }
    }

    if in_count {
        expanded.push_str(&motif.repeat(nrepeats));
    }

    expanded
}

/// Delimiter candidates considered by auto-detection, in spec.md §4.5.1 order.
const CANDIDATES: [char; 4] = [',', ';', '\t', '|'];

/// Minimum number of sampled lines required before auto-detection trusts
/// its own scoring; below this, spec.md §4.5.1 says default to `,`.
const MIN_EVIDENCE_LINES: usize = 3;

/// Maximum number of lines sampled from the head of the stream.
pub const SAMPLE_SIZE: usize = 50;

/// Score and pick a delimiter from up to `SAMPLE_SIZE` lines sampled from
/// the head of the stream (spec.md §4.5.1):
///
/// `score = n − 5·variance − 2·empty_ratio·n`
///
/// where `n` is the sample size, `variance` is the variance of per-line
/// field counts under that candidate, and `empty_ratio` is the fraction of
/// resulting fields that are empty. The highest-scoring candidate wins,
/// provided the sample has at least 3 lines of evidence; otherwise `,`.
pub fn detect(sample: &[String]) -> char {
    if sample.len() < MIN_EVIDENCE_LINES {
        return ',';
    }

    let mut best = (',', f64::MIN);
    for candidate in CANDIDATES {
        let score = score_candidate(sample, candidate);
        if score > best.1 {
            best = (candidate, score);
        }
    }
    best.0
}

fn score_candidate(sample: &[String], delimiter: char) -> f64 {
    let n = sample.len() as f64;
    let counts: Vec<usize> = sample.iter().map(|line| line.split(delimiter).count()).collect();
    let mean = counts.iter().sum::<usize>() as f64 / n;
    let variance = counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / n;

    let mut total_fields = 0usize;
    let mut empty_fields = 0usize;
    for line in sample {
        for field in line.split(delimiter) {
            total_fields += 1;
            if field.is_empty() {
                empty_fields += 1;
            }
        }
    }
    let empty_ratio = if total_fields > 0 { empty_fields as f64 / total_fields as f64 } else { 0.0 };

    n - 5.0 * variance - 2.0 * empty_ratio * n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_semicolon_when_consistent() {
        let sample: Vec<String> = (0..10).map(|i| format!("x{i};y{i};z{i}")).collect();
        assert_eq!(detect(&sample), ';');
    }

    #[test]
    fn detects_comma_as_baseline() {
        let sample: Vec<String> = (0..10).map(|i| format!("x{i},y{i},z{i}")).collect();
        assert_eq!(detect(&sample), ',');
    }

    #[test]
    fn too_few_lines_defaults_to_comma() {
        let sample = vec!["a;b".to_string(), "c;d".to_string()];
        assert_eq!(detect(&sample), ',');
    }

    #[test]
    fn detects_pipe_over_noisier_comma() {
        let mut sample: Vec<String> = (0..10).map(|i| format!("x{i}|y{i}|z{i}")).collect();
        // Sprinkle commas inconsistently so pipe still wins on variance.
        sample.push("no,commas,,here,at,all".to_string());
        assert_eq!(detect(&sample), '|');
    }
}

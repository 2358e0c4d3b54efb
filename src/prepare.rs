//! Data preparation: missing-value imputation and train/test splitting.
//!
//! Both operations are deterministic given the same seed and input, so a
//! re-run of the processing stage reproduces the same partitions byte for
//! byte.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::data::{Column, DataError, Frame};

// ============================================================================
// Imputation
// ============================================================================

/// Fill missing values of one named numeric column with the column median.
///
/// The median is computed over the finite values only. Returns the fill
/// value, or `None` when the column is absent, not numeric, or has no
/// finite values. All of those are treated as "nothing to do", not
/// errors, matching the single-column cleaning step of the processing
/// stage.
pub fn impute_median(frame: &mut Frame, column: &str) -> Option<f32> {
    let values = match frame.numeric_mut(column) {
        Ok(values) => values,
        Err(_) => {
            log::warn!("column '{column}' not found; skipping missing value treatment");
            return None;
        }
    };

    let mut finite: Vec<f32> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        log::warn!("column '{column}' has no finite values; skipping missing value treatment");
        return None;
    }
    finite.sort_by(f32::total_cmp);

    let mid = finite.len() / 2;
    let median = if finite.len() % 2 == 0 {
        (finite[mid - 1] + finite[mid]) / 2.0
    } else {
        finite[mid]
    };

    let mut filled = 0usize;
    for v in values.iter_mut() {
        if v.is_nan() {
            *v = median;
            filled += 1;
        }
    }

    log::info!("filled {filled} missing '{column}' values with median {median}");
    Some(median)
}

// ============================================================================
// Train/test split
// ============================================================================

/// Split a frame into disjoint train and test partitions.
///
/// `test_size` is the fraction of rows assigned to the test partition
/// (rounded). The shuffle is seeded, so the same seed and input always
/// produce the same partitions. With `stratify_col`, rows are grouped by
/// that column's value and each group is split separately, keeping the
/// per-value proportions within one row of rounding in both partitions.
///
/// # Panics
/// Panics if `test_size` is outside `[0, 1)`.
pub fn train_test_split(
    frame: &Frame,
    test_size: f32,
    seed: u64,
    stratify_col: Option<&str>,
) -> Result<(Frame, Frame), DataError> {
    assert!(
        (0.0..1.0).contains(&test_size),
        "test_size must be in [0, 1), got {test_size}"
    );

    let mut rng = StdRng::seed_from_u64(seed);

    let (train_idx, test_idx) = match stratify_col {
        None => {
            log::info!("no stratification used");
            split_indices(frame.n_rows(), test_size, &mut rng)
        }
        Some(col) => {
            log::info!("stratifying by column '{col}'");
            stratified_indices(frame, col, test_size, &mut rng)?
        }
    };

    let train = frame.take(&train_idx);
    let test = frame.take(&test_idx);
    log::info!(
        "split complete: train {} rows, test {} rows",
        train.n_rows(),
        test.n_rows()
    );

    Ok((train, test))
}

/// Shuffled split of `0..n_rows` into (train, test) index sets.
fn split_indices(n_rows: usize, test_size: f32, rng: &mut StdRng) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n_rows).collect();
    indices.shuffle(rng);

    let n_test = ((n_rows as f32) * test_size).round() as usize;
    let n_test = n_test.min(n_rows);
    let (test, train) = indices.split_at(n_test);
    (train.to_vec(), test.to_vec())
}

/// Per-group shuffled split, preserving the distribution of a column.
///
/// Groups are visited in sorted key order so the draw sequence, and with
/// it the whole split, is stable for a fixed seed.
fn stratified_indices(
    frame: &Frame,
    column: &str,
    test_size: f32,
    rng: &mut StdRng,
) -> Result<(Vec<usize>, Vec<usize>), DataError> {
    let keys: Vec<String> = match frame.column(column) {
        Some(Column::Categorical { values, .. }) => values.clone(),
        Some(Column::Numeric { values, .. }) => values.iter().map(|v| v.to_string()).collect(),
        None => {
            return Err(DataError::MissingColumn {
                name: column.to_string(),
            })
        }
    };

    let mut groups: std::collections::BTreeMap<&str, Vec<usize>> = Default::default();
    for (i, key) in keys.iter().enumerate() {
        groups.entry(key.as_str()).or_default().push(i);
    }

    let mut train = Vec::new();
    let mut test = Vec::new();
    for indices in groups.values() {
        let mut indices = indices.clone();
        indices.shuffle(rng);

        let n_test = ((indices.len() as f32) * test_size).round() as usize;
        let n_test = n_test.min(indices.len());
        test.extend_from_slice(&indices[..n_test]);
        train.extend_from_slice(&indices[n_test..]);
    }

    Ok((train, test))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::read_csv_from_reader;

    fn frame_with_missing() -> Frame {
        let input = "total_bedrooms,other\n4,1\n,1\n2,1\n,1\n10,1\n";
        read_csv_from_reader(input.as_bytes()).unwrap()
    }

    #[test]
    fn impute_fills_only_missing_cells() {
        let mut frame = frame_with_missing();
        let median = impute_median(&mut frame, "total_bedrooms").unwrap();

        // Median of [2, 4, 10].
        assert_eq!(median, 4.0);
        assert_eq!(
            frame.numeric("total_bedrooms").unwrap(),
            &[4.0, 4.0, 2.0, 4.0, 10.0]
        );
    }

    #[test]
    fn impute_even_count_averages_middle_values() {
        let input = "x\n1\n2\n3\n4\n";
        let mut frame = read_csv_from_reader(input.as_bytes()).unwrap();
        assert_eq!(impute_median(&mut frame, "x"), Some(2.5));
    }

    #[test]
    fn impute_missing_column_is_a_noop() {
        let mut frame = frame_with_missing();
        assert_eq!(impute_median(&mut frame, "nope"), None);
        assert!(frame.numeric("total_bedrooms").unwrap()[1].is_nan());
    }

    fn labeled_frame(n: usize) -> Frame {
        let mut csv = String::from("x,group\n");
        for i in 0..n {
            // 1 of every 5 rows lands in group b.
            let group = if i % 5 == 0 { "b" } else { "a" };
            csv.push_str(&format!("{i},{group}\n"));
        }
        read_csv_from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn split_partitions_are_disjoint_and_complete() {
        let frame = labeled_frame(100);
        let (train, test) = train_test_split(&frame, 0.2, 42, None).unwrap();

        assert_eq!(test.n_rows(), 20);
        assert_eq!(train.n_rows() + test.n_rows(), 100);

        let mut seen: Vec<f32> = train
            .numeric("x")
            .unwrap()
            .iter()
            .chain(test.numeric("x").unwrap())
            .copied()
            .collect();
        seen.sort_by(f32::total_cmp);
        let expected: Vec<f32> = (0..100).map(|i| i as f32).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn split_is_deterministic_for_a_fixed_seed() {
        let frame = labeled_frame(50);
        let (train_a, test_a) = train_test_split(&frame, 0.2, 7, None).unwrap();
        let (train_b, test_b) = train_test_split(&frame, 0.2, 7, None).unwrap();

        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);

        let (_, test_c) = train_test_split(&frame, 0.2, 8, None).unwrap();
        assert_ne!(test_a, test_c);
    }

    #[test]
    fn stratified_split_preserves_group_proportions() {
        let frame = labeled_frame(100);
        let (train, test) = train_test_split(&frame, 0.2, 42, Some("group")).unwrap();

        assert_eq!(train.n_rows() + test.n_rows(), 100);

        // 20 "b" rows overall; a 20% test split should take 4 of them.
        let count_b = |f: &Frame| match f.column("group").unwrap() {
            Column::Categorical { values, .. } => values.iter().filter(|v| *v == "b").count(),
            _ => panic!("expected categorical"),
        };
        assert_eq!(count_b(&test), 4);
        assert_eq!(count_b(&train), 16);
    }

    #[test]
    fn stratify_on_missing_column_is_an_error() {
        let frame = labeled_frame(10);
        let err = train_test_split(&frame, 0.2, 42, Some("nope")).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn { .. }));
    }
}

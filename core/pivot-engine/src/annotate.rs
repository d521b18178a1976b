//! FILENAME: core/pivot-engine/src/annotate.rs
//! Table Annotations - derived comparison columns appended to a pivot table.
//!
//! Every annotation reads one numeric column (or a per-row aggregate),
//! appends exactly one new column with its header, and leaves the existing
//! columns untouched. Cells that are not numeric get an empty annotation.

use engine::StatValue;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::definition::{
    GainOptions, MarkerOptions, RankingOptions, DOMINANCE_GLYPHS, DOMINANCE_REPEAT, MEDALS,
    THUMBS_DOWN, THUMBS_UP,
};
use crate::error::PivotError;
use crate::table::PivotTable;

fn blank() -> StatValue {
    StatValue::Text(String::new())
}

impl PivotTable {
    /// Appends `Ranking by {column}`: medals for ranks 1-3, `# N` after that.
    /// Equal values share the better rank.
    pub fn add_ranking(&mut self, options: &RankingOptions) -> Result<&mut Self, PivotError> {
        let (label, values) = self.numeric_column(&options.column)?;

        let mut sorted: Vec<f64> = values.iter().flatten().copied().collect();
        sorted.sort_by(f64::total_cmp);
        if options.bigger_is_better {
            sorted.reverse();
        }

        let cells = values
            .iter()
            .map(|value| {
                value
                    .and_then(|v| sorted.iter().position(|s| *s == v))
                    .map_or_else(blank, |rank| StatValue::Text(rank_marker(rank)))
            })
            .collect();

        log::debug!(target: "PIVOT", "add_ranking column='{}'", label);
        self.push_column(format!("Ranking by {}", label), cells);
        Ok(self)
    }

    /// Appends `Gains in {column}`: each row relative to the baseline row.
    /// The baseline renders as `1x`, every other row as `{gain:.2}x`.
    pub fn add_gains(&mut self, options: &GainOptions) -> Result<&mut Self, PivotError> {
        let (label, values) = self.numeric_column(&options.column)?;
        if options.baseline_row >= values.len() {
            return Err(PivotError::NoSuchRow(options.baseline_row));
        }

        let baseline = values[options.baseline_row].filter(|b| *b != 0.0);
        let gains: Vec<Option<f64>> = values
            .iter()
            .enumerate()
            .map(|(row, value)| {
                let baseline = baseline?;
                if row == options.baseline_row {
                    Some(1.0)
                } else {
                    value.map(|v| v / baseline)
                }
            })
            .collect();
        let best = gains.iter().flatten().copied().fold(f64::NEG_INFINITY, f64::max);

        let cells = gains
            .iter()
            .enumerate()
            .map(|(row, gain)| {
                let Some(gain) = *gain else {
                    return blank();
                };
                let text = if row == options.baseline_row {
                    "1x".to_string()
                } else {
                    format!("{:.2}x", gain)
                };
                if options.highlight_best && gain == best {
                    StatValue::Text(format!("**{}**", text))
                } else {
                    StatValue::Text(text)
                }
            })
            .collect();

        if baseline.is_none() {
            log::warn!(
                target: "PIVOT",
                "add_gains baseline row {} of '{}' is not a usable number",
                options.baseline_row,
                label
            );
        }
        self.push_column(format!("Gains in {}", label), cells);
        Ok(self)
    }

    /// Appends `Good in {column}` using the thread-local RNG for the
    /// dominance glyph. See `add_markers_with`.
    pub fn add_markers(&mut self, options: &MarkerOptions) -> Result<&mut Self, PivotError> {
        self.add_markers_with(options, &mut rand::thread_rng())
    }

    /// Appends `Good in {column}`: values in the favored third of the range
    /// get a thumbs up, values in the other outer third a thumbs down, the
    /// middle third nothing. A dominant leader (bigger is better, and more
    /// than `dominance_ratio` times the runner-up) also gets a glyph picked
    /// by `rng`, repeated three times.
    pub fn add_markers_with<R: Rng + ?Sized>(
        &mut self,
        options: &MarkerOptions,
        rng: &mut R,
    ) -> Result<&mut Self, PivotError> {
        let (label, values) = self.numeric_column(&options.column)?;
        let header = format!("Good in {}", label);

        let mut sorted: Vec<f64> = values.iter().flatten().copied().collect();
        sorted.sort_by(f64::total_cmp);

        // Not enough spread to say anything
        let (Some(&smallest), Some(&biggest)) = (sorted.first(), sorted.last()) else {
            self.push_column(header, vec![blank(); values.len()]);
            return Ok(self);
        };
        if sorted.len() <= 1 || biggest == smallest {
            self.push_column(header, vec![blank(); values.len()]);
            return Ok(self);
        }

        let runner_up = sorted[sorted.len() - 2];
        let dominant = options.bigger_is_better
            && runner_up > 0.0
            && biggest / runner_up > options.dominance_ratio;
        let brackets = Brackets::new(smallest, biggest, options.log_scale);

        let cells = values
            .iter()
            .map(|value| {
                let Some(v) = *value else {
                    return blank();
                };
                let in_top = v >= brackets.top;
                let in_bottom = v <= brackets.bottom;
                if !in_top && !in_bottom {
                    return blank();
                }

                let favored = if options.bigger_is_better { in_top } else { in_bottom };
                if !favored {
                    return StatValue::text(THUMBS_DOWN);
                }

                if dominant && v == biggest {
                    let glyph = DOMINANCE_GLYPHS
                        .choose(rng)
                        .copied()
                        .unwrap_or(DOMINANCE_GLYPHS[0]);
                    StatValue::Text(format!("{}{}", glyph.repeat(DOMINANCE_REPEAT), THUMBS_UP))
                } else {
                    StatValue::text(THUMBS_UP)
                }
            })
            .collect();

        log::debug!(
            target: "PIVOT",
            "add_markers column='{}' bottom={} top={} dominant={}",
            label,
            brackets.bottom,
            brackets.top,
            dominant
        );
        self.push_column(header, cells);
        Ok(self)
    }
}

/// Rank (0-based) to its marker.
fn rank_marker(rank: usize) -> String {
    MEDALS
        .get(rank)
        .map_or_else(|| format!("# {}", rank + 1), |medal| medal.to_string())
}

/// Edges of the bottom third `[min, bottom]` and top third `[top, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Brackets {
    bottom: f64,
    top: f64,
}

impl Brackets {
    fn new(smallest: f64, biggest: f64, log_scale: bool) -> Self {
        if log_scale && smallest > 0.0 {
            let log_small = smallest.ln();
            let log_big = biggest.ln();
            let third = (log_big - log_small) / 3.0;
            return Brackets {
                bottom: (log_small + third).exp(),
                top: (log_big - third).exp(),
            };
        }

        if log_scale {
            log::warn!(
                target: "PIVOT",
                "log-scale markers need positive values (min={}); using linear brackets",
                smallest
            );
        }

        let third = (biggest - smallest) / 3.0;
        Brackets {
            bottom: smallest + third,
            top: biggest - third,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ColumnRef;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn single_column(values: &[StatValue]) -> PivotTable {
        PivotTable::from_parts(
            (0..values.len()).map(|i| format!("r{}", i)).collect(),
            vec!["ops".to_string()],
            values.iter().map(|v| vec![v.clone()]).collect(),
        )
    }

    fn numbers(values: &[f64]) -> PivotTable {
        single_column(&values.iter().map(|v| StatValue::Number(*v)).collect::<Vec<_>>())
    }

    fn last_column(table: &PivotTable) -> Vec<String> {
        table
            .grid()
            .iter()
            .map(|row| row.last().map(StatValue::display_value).unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_ranking_bigger_is_better() {
        let mut table = numbers(&[30.0, 10.0, 20.0]);
        table.add_ranking(&RankingOptions::default()).unwrap();

        assert_eq!(table.col_labels(), ["ops", "Ranking by ops"]);
        assert_eq!(
            last_column(&table),
            [MEDALS[0], MEDALS[2], MEDALS[1]]
        );
    }

    #[test]
    fn test_ranking_smaller_is_better_with_ties_and_tail() {
        let mut table = numbers(&[5.0, 1.0, 3.0, 1.0, 9.0]);
        let options = RankingOptions {
            bigger_is_better: false,
            ..Default::default()
        };
        table.add_ranking(&options).unwrap();

        assert_eq!(
            last_column(&table),
            ["# 4", MEDALS[0], MEDALS[2], MEDALS[0], "# 5"]
        );
    }

    #[test]
    fn test_ranking_skips_non_numeric() {
        let mut table = single_column(&[StatValue::Number(2.0), StatValue::Empty, StatValue::text("x")]);
        table.add_ranking(&RankingOptions::default()).unwrap();
        assert_eq!(last_column(&table), [MEDALS[0], "", ""]);
    }

    #[test]
    fn test_ranking_coerces_numeric_text() {
        let mut table = single_column(&[StatValue::text("1,500"), StatValue::Number(900.0)]);
        table.add_ranking(&RankingOptions::default()).unwrap();
        assert_eq!(last_column(&table), [MEDALS[0], MEDALS[1]]);
    }

    #[test]
    fn test_gains_against_first_row() {
        let mut table = numbers(&[100.0, 50.0, 200.0]);
        table.add_gains(&GainOptions::default()).unwrap();

        assert_eq!(table.col_labels()[1], "Gains in ops");
        assert_eq!(last_column(&table), ["1x", "0.50x", "2.00x"]);
    }

    #[test]
    fn test_gains_highlight_best() {
        let mut table = numbers(&[100.0, 50.0, 200.0]);
        let options = GainOptions {
            baseline_row: 1,
            highlight_best: true,
            ..Default::default()
        };
        table.add_gains(&options).unwrap();

        assert_eq!(last_column(&table), ["2.00x", "1x", "**4.00x**"]);
    }

    #[test]
    fn test_gains_edge_cases() {
        let mut table = single_column(&[StatValue::Number(10.0), StatValue::text("n/a")]);
        table.add_gains(&GainOptions::default()).unwrap();
        assert_eq!(last_column(&table), ["1x", ""]);

        let mut zero = numbers(&[0.0, 5.0]);
        zero.add_gains(&GainOptions::default()).unwrap();
        assert_eq!(last_column(&zero), ["", ""]);

        let mut table = numbers(&[1.0]);
        let options = GainOptions {
            baseline_row: 3,
            ..Default::default()
        };
        assert_eq!(table.add_gains(&options).unwrap_err(), PivotError::NoSuchRow(3));
        assert_eq!(table.col_count(), 1);
    }

    #[test]
    fn test_markers_linear_brackets() {
        let mut table = numbers(&[10.0, 50.0, 90.0, 40.0]);
        let mut rng = StdRng::seed_from_u64(7);
        table.add_markers_with(&MarkerOptions::default(), &mut rng).unwrap();

        assert_eq!(table.col_labels()[1], "Good in ops");
        assert_eq!(last_column(&table), [THUMBS_DOWN, "", THUMBS_UP, ""]);
    }

    #[test]
    fn test_markers_smaller_is_better_flips_verdicts() {
        let mut table = numbers(&[10.0, 50.0, 90.0]);
        let options = MarkerOptions {
            bigger_is_better: false,
            ..Default::default()
        };
        table.add_markers_with(&options, &mut StdRng::seed_from_u64(1)).unwrap();

        assert_eq!(last_column(&table), [THUMBS_UP, "", THUMBS_DOWN]);
    }

    #[test]
    fn test_markers_dominant_leader_is_pinned_by_rng() {
        let values = [1.0, 2.0, 100.0];
        let mut first = numbers(&values);
        let mut second = numbers(&values);
        first
            .add_markers_with(&MarkerOptions::default(), &mut StdRng::seed_from_u64(42))
            .unwrap();
        second
            .add_markers_with(&MarkerOptions::default(), &mut StdRng::seed_from_u64(42))
            .unwrap();

        let leader = last_column(&first)[2].clone();
        assert_eq!(leader, last_column(&second)[2]);
        assert!(leader.ends_with(THUMBS_UP));
        assert!(DOMINANCE_GLYPHS
            .iter()
            .any(|glyph| leader == format!("{}{}", glyph.repeat(3), THUMBS_UP)));
        assert_eq!(last_column(&first)[..2], [THUMBS_DOWN.to_string(), THUMBS_DOWN.to_string()]);
    }

    #[test]
    fn test_markers_log_scale() {
        // Linear brackets would put 150 in the bottom third.
        let mut table = numbers(&[1.0, 8.0, 150.0, 1000.0]);
        let options = MarkerOptions {
            log_scale: true,
            ..Default::default()
        };
        table.add_markers_with(&options, &mut StdRng::seed_from_u64(3)).unwrap();

        assert_eq!(last_column(&table), [THUMBS_DOWN, THUMBS_DOWN, THUMBS_UP, THUMBS_UP]);
    }

    #[test]
    fn test_markers_need_spread() {
        let mut single = numbers(&[5.0]);
        single.add_markers(&MarkerOptions::default()).unwrap();
        assert_eq!(last_column(&single), [""]);

        let mut flat = numbers(&[5.0, 5.0]);
        flat.add_markers(&MarkerOptions::default()).unwrap();
        assert_eq!(last_column(&flat), ["", ""]);
    }

    #[test]
    fn test_markers_log_scale_falls_back_to_linear() {
        // Non-positive minimum: brackets are [-10, 23.3] and [56.7, 90]
        let mut table = numbers(&[-10.0, 0.0, 50.0, 90.0]);
        let options = MarkerOptions {
            log_scale: true,
            ..Default::default()
        };
        table.add_markers_with(&options, &mut StdRng::seed_from_u64(5)).unwrap();

        assert_eq!(last_column(&table), [THUMBS_DOWN, THUMBS_DOWN, "", THUMBS_UP]);
    }

    #[test]
    fn test_markers_skip_non_numeric_cells() {
        let mut table = single_column(&[
            StatValue::Number(10.0),
            StatValue::text("n/a"),
            StatValue::Number(90.0),
            StatValue::Empty,
        ]);
        table
            .add_markers_with(&MarkerOptions::default(), &mut StdRng::seed_from_u64(9))
            .unwrap();

        assert_eq!(last_column(&table), [THUMBS_DOWN, "", THUMBS_UP, ""]);
    }

    #[test]
    fn test_markers_no_dominance_when_smaller_is_better() {
        // 100 / 2 exceeds the ratio, but 100 is the worst value here
        let mut table = numbers(&[1.0, 2.0, 100.0]);
        let options = MarkerOptions {
            bigger_is_better: false,
            ..Default::default()
        };
        table.add_markers_with(&options, &mut StdRng::seed_from_u64(11)).unwrap();

        assert_eq!(last_column(&table), [THUMBS_UP, THUMBS_UP, THUMBS_DOWN]);
    }

    #[test]
    fn test_markers_no_dominance_without_positive_runner_up() {
        let mut table = numbers(&[-5.0, 0.0, 100.0]);
        table
            .add_markers_with(&MarkerOptions::default(), &mut StdRng::seed_from_u64(13))
            .unwrap();

        assert_eq!(last_column(&table), [THUMBS_DOWN, THUMBS_DOWN, THUMBS_UP]);
    }

    #[test]
    fn test_annotations_only_append() {
        let mut table = numbers(&[3.0, 1.0]);
        let before = table.clone();
        table
            .add_ranking(&RankingOptions::default())
            .unwrap()
            .add_gains(&GainOptions {
                column: ColumnRef::Index(0),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(table.col_count(), 3);
        assert_eq!(table.source_columns(), 1);
        for (row, original) in table.grid().iter().zip(before.grid()) {
            assert_eq!(row[0], original[0]);
        }
    }

    #[test]
    fn test_unknown_column_is_rejected() {
        let mut table = numbers(&[1.0, 2.0]);
        let options = RankingOptions {
            column: ColumnRef::Named("latency".into()),
            ..Default::default()
        };
        assert_eq!(
            table.add_ranking(&options).unwrap_err(),
            PivotError::NoSuchColumn("latency".into())
        );
    }
}

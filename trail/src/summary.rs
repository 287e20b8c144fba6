//! The free-text attack summary closing a diagram.

use itertools::Itertools;

use crate::error::TrailError;
use crate::permutation::STATE_CELLS;
use crate::solution::RoundConfig;
use crate::tweak::TweakAnnotator;

pub const LINE_SEPARATOR_WIDTH: usize = 55;

pub fn line_separator() -> String {
    "#".repeat(LINE_SEPARATOR_WIDTH)
}

/// Distinguisher parameters, the lazy tweak cells and the tweak permutations of the first
/// `KR - 2` rounds, each printed as one 4x4 grid per trail instance.
pub fn attack_summary(annotator: &TweakAnnotator<'_>, config: &RoundConfig) -> Result<String, TrailError> {
    let sep = line_separator();
    let lazy = annotator.lazy_cells()
        .iter()
        .map(|(parity, cell)| format!("T{}[{:02}]", parity.index(), cell))
        .join(", ");

    let mut lines = vec![
        sep.clone(),
        "Distinguisher parameters:".to_string(),
        format!("Number of forward rounds:        {:02}", config.ru + 1),
        format!("Number of backward rounds:       {:02}", config.rl + 1),
        format!("Tweak cells that are active at most {:02} times:", config.npt),
        lazy,
        sep.clone(),
    ];

    for r in 0..config.kr.saturating_sub(2) {
        lines.push(format!("Tweak permutation[{:02}]:", r));
        for instance in 0..config.variant.instances() {
            if instance > 0 {
                lines.push(String::new());
            }
            let cells = annotator.tweak_cells(r, instance)?;
            lines.extend(cells.chunks(STATE_CELLS / 4)
                .map(|row| format!("  {}", row.iter().map(|c| format!("{:02}", c)).join(" "))));
        }
        lines.push(sep.clone());
    }

    lines.push(String::new());
    Ok(lines.join("\n"))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::{ResultBuilder, Variant};
    use crate::tweak::Parity;

    #[test]
    fn summary_lists_parameters_lazy_cells_and_permutations() {
        let config = RoundConfig::new(Variant::Qarma64, 2, 3, 4).with_npt(1);
        let result = ResultBuilder::new(config)
            .lazy(Parity::Even, 3)
            .lazy(Parity::Odd, 12)
            .build();
        let annotator = TweakAnnotator::new(&result, config.variant).unwrap();

        let text = attack_summary(&annotator, &config).unwrap();
        let expected = format!("{sep}
Distinguisher parameters:
Number of forward rounds:        03
Number of backward rounds:       04
Tweak cells that are active at most 01 times:
T0[03], T1[12]
{sep}
Tweak permutation[00]:
  00 01 02 03
  04 05 06 07
  08 09 10 11
  12 13 14 15
{sep}
Tweak permutation[01]:
  00 01 02 03
  04 05 06 07
  08 09 10 11
  12 13 14 15
{sep}
", sep = line_separator());
        assert_eq!(text, expected);
    }

    #[test]
    fn wide_variant_prints_one_grid_per_instance() {
        let config = RoundConfig::new(Variant::Qarma128, 1, 1, 3);
        let result = ResultBuilder::new(config).build();
        let annotator = TweakAnnotator::new(&result, config.variant).unwrap();

        let text = attack_summary(&annotator, &config).unwrap();
        assert!(text.contains("  16 17 18 19\n"));
        assert!(text.contains("  12 13 14 15\n\n  16 17 18 19\n"));
        assert_eq!(text.matches("Tweak permutation[").count(), 1);
    }
}

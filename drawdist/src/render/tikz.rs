//! Standalone LaTeX/TikZ output, drawn with the macros of the `qarmavtwo64` and `qarmavtwo128`
//! style packages.

use std::fmt::{Result as FmtResult, Write};

use trail::{Block, BlockKind, CellMark, Diagram, Slot, Variant};

use crate::error::DrawError;

use super::DiagramRenderer;

#[derive(Debug, Clone, Default)]
pub struct TikzRenderer {
    /// Draw the colour legend below the trail instead of leaving it commented out.
    legend: bool,
}

/// One style-package macro call, one argument per line.
struct MacroCall {
    name: String,
    args: Vec<(String, &'static str)>,
}

// =================================================================================================

impl TikzRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_legend(mut self, legend: bool) -> Self {
        self.legend = legend;
        self
    }

    pub fn package(variant: Variant) -> &'static str {
        match variant {
            Variant::Qarma64 => "qarmavtwo64",
            Variant::Qarma128 => "qarmavtwo128",
        }
    }

    fn write_header(&self, out: &mut String, diagram: &Diagram) -> Result<(), DrawError> {
        writeln!(out, "\\documentclass[varwidth=50cm]{{standalone}}")?;
        writeln!(out, "\\usepackage{{{}}}", Self::package(diagram.variant()))?;
        writeln!(out, "\\usepackage{{comment}}")?;
        writeln!(out, "\\begin{{document}}")?;
        writeln!(out, "%\\begin{{figure}}")?;
        writeln!(out, "%\\centering")?;
        writeln!(out, "\\begin{{tikzpicture}}")?;

        let header = diagram.header()
            .ok_or_else(|| DrawError::IncompleteDiagram {
                block: "diagram".to_string(),
                slot: Slot::Initial.name(),
            })?;
        write!(out, "\\QarmaInit")?;
        for instance in 0..diagram.instances() {
            write!(out, "{{{}}}", fills(lane(header, Slot::Initial, instance)?))?;
        }
        if diagram.variant() == Variant::Qarma64 {
            write!(out, " % init coordinates, print labels")?;
        }
        writeln!(out)?;
        writeln!(out)?;
        Ok(())
    }

    fn write_forward(&self, out: &mut String, variant: Variant, block: &Block) -> Result<(), DrawError> {
        let (first, last) = match block.kind() {
            BlockKind::Forward { first, last } => (first, last),
            _ => return Ok(()),
        };

        for instance in 0..variant.instances() {
            let name = match variant {
                Variant::Qarma64 if last => "QarmaForwardFinal".to_string(),
                Variant::Qarma64 => "QarmaForwardNewLine".to_string(),
                Variant::Qarma128 => {
                    let stem = if first {
                        "QarmaForwardNewLineInit"
                    } else if last {
                        "QarmaForwardFinal"
                    } else {
                        "QarmaForwardNewLine"
                    };
                    format!("{}{}", stem, instance_suffix(instance))
                }
            };
            // The last round ends in the state shared with the backward trail.
            let after_mix = if block.slot(Slot::Handoff).is_some() { Slot::Handoff } else { Slot::AfterDiffusion };

            let mut call = MacroCall::new(name)
                .arg("$S$", "first operation: S-box layer")
                .arg(fills(lane(block, Slot::AfterSbox, instance)?), "after S")
                .arg(subtweakey(block, variant, instance)?, "round tweakey")
                .arg(fills(lane(block, Slot::AfterTweakXor, instance)?), "after tweakey addition")
                .arg("$\\tau$", "second operation: cell permutation")
                .arg(fills(lane(block, Slot::AfterPermute, instance)?), "after tau")
                .arg("$M$", "third operation: mix columns")
                .arg(fills(lane(block, after_mix, instance)?), "after M");
            if variant == Variant::Qarma128 && !first {
                call = call.arg(fills(lane(block, Slot::AfterTweakXor, instance)?), "after XR");
            }
            call.write_to(out)?;
            writeln!(out)?;
        }
        Ok(())
    }

    fn write_backward(&self, out: &mut String, variant: Variant, block: &Block) -> Result<(), DrawError> {
        let last = match block.kind() {
            BlockKind::Backward { last } => last,
            _ => return Ok(()),
        };
        // The inverse S-box output of the last round is the terminal state.
        let after_inv_sbox = if last { Slot::Terminal } else { Slot::BeforeInvSbox };

        for instance in 0..variant.instances() {
            let call = match variant {
                Variant::Qarma64 => MacroCall::new("QarmaBackwardNewLine")
                    .arg("$\\bar{M}$", "inverse mix columns")
                    .arg(fills(lane(block, Slot::AfterInvDiffusion, instance)?), "after inverse M")
                    .arg("$\\bar{\\tau}$", "inverse cell permutation")
                    .arg(fills(lane(block, Slot::AfterInvPermute, instance)?), "after inverse tau")
                    .arg(subtweakey(block, variant, instance)?, "round tweakey")
                    .arg(fills(lane(block, Slot::AfterTweakXor, instance)?), "before inverse S")
                    .arg("$\\bar{S}$", "inverse S-box layer")
                    .arg(fills(lane(block, after_inv_sbox, instance)?), "after inverse S"),
                Variant::Qarma128 => {
                    let stem = if last { "QarmaBackwardFinal" } else { "QarmaBackwardNewLine" };
                    let after_xr = if last { Slot::Terminal } else { Slot::AfterTweakXor };
                    MacroCall::new(format!("{}{}", stem, instance_suffix(instance)))
                        .arg("$\\bar{S}$", "inverse S-box layer")
                        .arg(fills(lane(block, Slot::BeforeInvSbox, instance)?), "after inverse S")
                        .arg("$\\bar{M}$", "inverse mix columns")
                        .arg(fills(lane(block, Slot::AfterInvDiffusion, instance)?), "after inverse M")
                        .arg("$\\bar{\\tau}$", "inverse cell permutation")
                        .arg(fills(lane(block, Slot::AfterInvPermute, instance)?), "after inverse tau")
                        .arg(subtweakey(block, variant, instance)?, "round tweakey")
                        .arg(fills(lane(block, Slot::BeforeTweakXor, instance)?), "before XR")
                        .arg(fills(lane(block, after_xr, instance)?), "after XR")
                }
            };
            call.write_to(out)?;
            writeln!(out)?;
        }
        Ok(())
    }

    fn write_trailer(&self, out: &mut String, diagram: &Diagram) -> Result<(), DrawError> {
        let comment = if self.legend { "" } else { "%" };
        writeln!(out, "{}\\IntegralDistinguisherLegend", comment)?;
        writeln!(out, "\\end{{tikzpicture}}")?;
        writeln!(out, "%\\caption{{Integral distinguisher for {} rounds of {}}}",
                 diagram.total_rounds(), diagram.variant().cipher_name())?;
        writeln!(out, "%\\end{{figure}}")?;
        writeln!(out, "\\begin{{comment}}")?;
        if let Some(summary) = diagram.summary() {
            write!(out, "{}", summary)?;
            if !summary.ends_with('\n') {
                writeln!(out)?;
            }
        }
        writeln!(out, "\\end{{comment}}")?;
        writeln!(out, "\\end{{document}}")?;
        Ok(())
    }
}

impl DiagramRenderer for TikzRenderer {
    fn render(&self, diagram: &Diagram) -> Result<String, DrawError> {
        let mut out = String::new();
        self.write_header(&mut out, diagram)?;
        for block in diagram.blocks() {
            match block.kind() {
                BlockKind::Forward { .. } => self.write_forward(&mut out, diagram.variant(), block)?,
                BlockKind::Backward { .. } => self.write_backward(&mut out, diagram.variant(), block)?,
                BlockKind::Header | BlockKind::Summary => (),
            }
        }
        self.write_trailer(&mut out, diagram)?;
        Ok(out)
    }

    fn extension(&self) -> &'static str {
        "tex"
    }
}

impl MacroCall {
    fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    fn arg<S: Into<String>>(mut self, value: S, comment: &'static str) -> Self {
        self.args.push((value.into(), comment));
        self
    }

    fn write_to(&self, out: &mut String) -> FmtResult {
        writeln!(out, "\\{}", self.name)?;
        for (value, comment) in self.args.iter() {
            writeln!(out, "    {{{}}} % {}", value, comment)?;
        }
        Ok(())
    }
}

// =================================================================================================

fn instance_suffix(instance: usize) -> &'static str {
    if instance == 0 { "Zero" } else { "One" }
}

fn lane(block: &Block, slot: Slot, instance: usize) -> Result<&[CellMark], DrawError> {
    block.lane(slot, instance)
        .map(|l| l.as_slice())
        .ok_or_else(|| DrawError::IncompleteDiagram {
            block: describe(block),
            slot: slot.name(),
        })
}

fn describe(block: &Block) -> String {
    match block.round() {
        Some(r) => format!("{:?} block of round {}", block.kind(), r),
        None => format!("{:?} block", block.kind()),
    }
}

fn fills(lane: &[CellMark]) -> String {
    lane.iter()
        .enumerate()
        .map(|(j, cell)| format!("\\Fill[{}]{{s{}}}", cell.style.as_str(), j))
        .collect()
}

/// Fills, then frames on the lazy cells, then the tweak cell labels.
fn subtweakey(block: &Block, variant: Variant, instance: usize) -> Result<String, DrawError> {
    let cells = lane(block, Slot::Subtweakey, instance)?;
    let mut out = fills(cells);
    for (j, _) in cells.iter().enumerate().filter(|(_, c)| c.framed) {
        write!(out, "\\FrameCell[filter]{{s{}}}", j)?;
    }
    if let Some(ids) = block.tweak_cells(instance) {
        for (j, id) in ids.iter().enumerate() {
            match variant {
                Variant::Qarma64 => write!(out, "\\Cell{{s{}}}{{\\texttt{{{:x}}}}}", j, id)?,
                Variant::Qarma128 => write!(out, "\\Cell{{s{}}}{{\\texttt{{{}}}}}", j, id)?,
            }
        }
    }
    Ok(out)
}


#[cfg(test)]
mod tests {
    use super::*;
    use trail::{assemble, ActivityLabel, Mask, Parity, ResultBuilder, RoundConfig};

    fn render(config: RoundConfig, builder: ResultBuilder) -> String {
        let result = builder.build();
        let diagram = assemble(&result, config).unwrap();
        TikzRenderer::new().render(&diagram).unwrap()
    }

    #[test]
    fn narrow_document_has_one_macro_per_round() {
        let config = RoundConfig::new(Variant::Qarma64, 2, 2, 2);
        let tex = render(config, ResultBuilder::new(config));

        assert!(tex.starts_with("\\documentclass[varwidth=50cm]{standalone}\n\\usepackage{qarmavtwo64}\n"));
        assert!(tex.contains("\\QarmaInit{\\Fill[white]{s0}\\Fill[white]{s1}"));
        assert_eq!(tex.matches("\\QarmaForwardNewLine\n").count(), 1);
        assert_eq!(tex.matches("\\QarmaForwardFinal\n").count(), 1);
        assert_eq!(tex.matches("\\QarmaBackwardNewLine\n").count(), 2);
        assert!(tex.contains("%\\caption{Integral distinguisher for 6 rounds of QARMA-v2-64}\n"));
        assert!(tex.contains("%\\IntegralDistinguisherLegend\n"));
        assert!(tex.ends_with("\\end{comment}\n\\end{document}\n"));
    }

    #[test]
    fn narrow_tweak_labels_are_hex_and_lazy_cells_framed() {
        let config = RoundConfig::new(Variant::Qarma64, 1, 1, 2);
        let tex = render(config, ResultBuilder::new(config)
            .lazy(Parity::Even, 11)
            .label(Mask::ForwardExx, 0, 0, 11, ActivityLabel::NonzeroAny));

        assert!(tex.contains("\\Cell{s11}{\\texttt{b}}"));
        assert!(tex.contains("\\Fill[nonzeroany]{s11}\\Fill[white]{s12}"));
        // Framed in the forward round only: the backward round is odd.
        assert_eq!(tex.matches("\\FrameCell[filter]{s11}").count(), 1);
    }

    #[test]
    fn wide_document_draws_both_instances() {
        let config = RoundConfig::new(Variant::Qarma128, 3, 2, 4);
        let tex = render(config, ResultBuilder::new(config));

        assert!(tex.contains("\\usepackage{qarmavtwo128}\n"));
        for name in ["QarmaForwardNewLineInitZero", "QarmaForwardNewLineInitOne",
                     "QarmaForwardNewLineZero", "QarmaForwardNewLineOne",
                     "QarmaForwardFinalZero", "QarmaForwardFinalOne",
                     "QarmaBackwardNewLineZero", "QarmaBackwardNewLineOne",
                     "QarmaBackwardFinalZero", "QarmaBackwardFinalOne"].iter() {
            assert_eq!(tex.matches(&format!("\\{}\n", name)).count(), 1, "{}", name);
        }
        assert!(tex.contains("\\Cell{s0}{\\texttt{16}}"));
        assert!(tex.contains("of QARMA-v2-128}"));
    }

    #[test]
    fn first_wide_round_has_no_tweak_xor_argument() {
        let config = RoundConfig::new(Variant::Qarma128, 2, 1, 2);
        let tex = render(config, ResultBuilder::new(config));

        let init = tex.split("\\QarmaForwardNewLineInitZero\n").nth(1).unwrap();
        let init = init.split("\n\n").next().unwrap();
        assert_eq!(init.lines().count(), 8);

        let last = tex.split("\\QarmaForwardFinalZero\n").nth(1).unwrap();
        let last = last.split("\n\n").next().unwrap();
        assert_eq!(last.lines().count(), 9);
    }

    #[test]
    fn legend_can_be_drawn() {
        let config = RoundConfig::new(Variant::Qarma64, 1, 1, 2);
        let diagram = assemble(&ResultBuilder::new(config).build(), config).unwrap();
        let tex = TikzRenderer::new().with_legend(true).render(&diagram).unwrap();

        assert!(tex.contains("\n\\IntegralDistinguisherLegend\n"));
    }
}

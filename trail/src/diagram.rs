//! The renderer-agnostic description of a distinguisher's trail.

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Result as FmtResult;

use crate::label::Style;
use crate::permutation::STATE_CELLS;
use crate::solution::Variant;
use crate::state::TrailState;
use crate::tweak::{Parity, TweakOverlay};

/// Named state positions inside a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Initial,
    BeforeSbox,
    AfterSbox,
    Subtweakey,
    AfterTweakXor,
    AfterPermute,
    AfterDiffusion,
    /// Post-diffusion state of the last forward round, shared with the backward trail.
    Handoff,
    BeforeInvSbox,
    AfterInvDiffusion,
    AfterInvPermute,
    BeforeTweakXor,
    /// Ciphertext-side boundary state of the last backward round.
    Terminal,
}

/// One drawn cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellMark {
    pub style: Style,
    /// Lazy tweak cell highlight. Only ever set in subtweakey slots.
    pub framed: bool,
}

/// The 16 cells of one slot for one trail instance.
pub type LaneCells = Vec<CellMark>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// The initial state, drawn before the first round.
    Header,
    /// `first` blocks follow the header directly, `last` blocks carry the handoff state.
    /// With a single forward round both are set.
    Forward { first: bool, last: bool },
    /// `last` blocks carry the terminal state.
    Backward { last: bool },
    /// Attack summary text.
    Summary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    kind: BlockKind,
    round: Option<usize>,
    parity: Option<Parity>,
    slots: BTreeMap<Slot, Vec<LaneCells>>,
    /// Per instance, the tweak cell id at every subtweakey position.
    tweak_cells: Vec<[u8; STATE_CELLS]>,
    text: Option<String>,
}

/// Ordered blocks: header, forward rounds, backward rounds, summary. Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagram {
    variant: Variant,
    blocks: Vec<Block>,
    total_rounds: usize,
}

// =================================================================================================

impl Slot {
    pub fn name(&self) -> &'static str {
        use Slot::*;
        match self {
            Initial => "initial",
            BeforeSbox => "before-S-box",
            AfterSbox => "after-S-box",
            Subtweakey => "subtweakey",
            AfterTweakXor => "after-tweakey-addition",
            AfterPermute => "after-permutation",
            AfterDiffusion => "after-diffusion",
            Handoff => "handoff",
            BeforeInvSbox => "before-inverse-S-box",
            AfterInvDiffusion => "after-inverse-diffusion",
            AfterInvPermute => "after-inverse-permutation",
            BeforeTweakXor => "before-tweakey-addition",
            Terminal => "terminal",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.name())
    }
}

impl CellMark {
    pub fn lane(state: &TrailState) -> LaneCells {
        state.styles()
            .map(|style| CellMark { style, framed: false })
            .collect()
    }

    pub fn framed_lane(overlay: &TweakOverlay) -> LaneCells {
        overlay.labels.styles()
            .enumerate()
            .map(|(j, style)| CellMark { style, framed: overlay.is_framed(j) })
            .collect()
    }
}

impl Block {
    pub(crate) fn new(kind: BlockKind, round: Option<usize>, parity: Option<Parity>) -> Self {
        Self {
            kind,
            round,
            parity,
            slots: BTreeMap::new(),
            tweak_cells: Vec::new(),
            text: None,
        }
    }

    pub(crate) fn insert_states<'s, I>(&mut self, slot: Slot, states: I)
        where I: IntoIterator<Item = &'s TrailState>
    {
        let lanes = states.into_iter().map(CellMark::lane).collect();
        self.slots.insert(slot, lanes);
    }

    pub(crate) fn insert_overlays<'o, I>(&mut self, overlays: I)
        where I: IntoIterator<Item = &'o TweakOverlay>
    {
        let (lanes, cells): (Vec<_>, Vec<_>) = overlays.into_iter()
            .map(|o| (CellMark::framed_lane(o), o.tweak_cells))
            .unzip();
        self.slots.insert(Slot::Subtweakey, lanes);
        self.tweak_cells = cells;
    }

    pub(crate) fn with_text(mut self, text: String) -> Self {
        self.text = Some(text);
        self
    }

    #[inline]
    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    #[inline]
    pub fn round(&self) -> Option<usize> {
        self.round
    }

    #[inline]
    pub fn parity(&self) -> Option<Parity> {
        self.parity
    }

    #[inline]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// The cells of `slot`, one entry per trail instance.
    pub fn slot(&self, slot: Slot) -> Option<&[LaneCells]> {
        self.slots.get(&slot).map(|lanes| lanes.as_slice())
    }

    pub fn lane(&self, slot: Slot, instance: usize) -> Option<&LaneCells> {
        self.slots.get(&slot)?.get(instance)
    }

    pub fn slots(&self) -> impl Iterator<Item = (&Slot, &Vec<LaneCells>)> {
        self.slots.iter()
    }

    pub fn tweak_cells(&self, instance: usize) -> Option<&[u8; STATE_CELLS]> {
        self.tweak_cells.get(instance)
    }

    /// Positions with a framed cell, per instance.
    pub fn framed_cells(&self, instance: usize) -> Vec<usize> {
        self.lane(Slot::Subtweakey, instance)
            .map(|lane| lane.iter()
                .enumerate()
                .filter(|(_, c)| c.framed)
                .map(|(j, _)| j)
                .collect())
            .unwrap_or_default()
    }

    fn fmt_log_entry(&self, f: &mut fmt::Formatter<'_>) -> FmtResult {
        write!(f, "{:?}", self.kind)?;
        if let Some(r) = self.round {
            write!(f, " round {}", r)?;
        }
        if let Some(p) = self.parity {
            write!(f, " (parity {})", p)?;
        }
        writeln!(f)?;

        for (slot, lanes) in self.slots.iter() {
            write!(f, "  {: <26}", slot.name())?;
            for lane in lanes.iter() {
                write!(f, " ")?;
                for (j, cell) in lane.iter().enumerate() {
                    if j > 0 && j % 4 == 0 {
                        write!(f, "|")?;
                    }
                    let glyph = match (cell.framed, cell.style) {
                        (true, Style::White) => 'o',
                        (true, style) => style.glyph().to_ascii_lowercase(),
                        (false, style) => style.glyph(),
                    };
                    write!(f, "{}", glyph)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Diagram {
    pub(crate) fn new(variant: Variant, blocks: Vec<Block>, total_rounds: usize) -> Self {
        Self {
            variant,
            blocks,
            total_rounds,
        }
    }

    #[inline]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    #[inline]
    pub fn instances(&self) -> usize {
        self.variant.instances()
    }

    #[inline]
    pub fn total_rounds(&self) -> usize {
        self.total_rounds
    }

    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn header(&self) -> Option<&Block> {
        self.blocks.iter().find(|b| b.kind == BlockKind::Header)
    }

    pub fn forward_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| matches!(b.kind, BlockKind::Forward { .. }))
    }

    pub fn backward_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| matches!(b.kind, BlockKind::Backward { .. }))
    }

    pub fn summary(&self) -> Option<&str> {
        self.blocks.iter()
            .find(|b| b.kind == BlockKind::Summary)
            .and_then(|b| b.text())
    }

    fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> FmtResult {
        writeln!(f, "Integral distinguisher for {} rounds of {}", self.total_rounds, self.variant)?;
        writeln!(f, "{} forward block(s), {} backward block(s), {} trail instance(s)",
                 self.forward_blocks().count(),
                 self.backward_blocks().count(),
                 self.instances())?;
        if let Some(text) = self.summary() {
            write!(f, "{}", text)?;
        }
        Ok(())
    }

    fn fmt_log(&self, f: &mut fmt::Formatter<'_>) -> FmtResult {
        let width = 100;
        writeln!(f, "{:-^w$}", format!(" {} trail ", self.variant), w = width)?;
        for block in self.blocks.iter().filter(|b| b.kind != BlockKind::Summary) {
            block.fmt_log_entry(f)?;
        }
        writeln!(f, "{:-^w$}", "", w = width)
    }
}

/// The ways a Diagram can be shown as text.
pub enum DisplayDiagram<'a> {
    /// Round counts and the attack summary.
    AsSummary(&'a Diagram),
    /// Every block as rows of style glyphs, framed cells in lower case.
    AsLog(&'a Diagram),
    BlockAsLog(&'a Block),
}

impl fmt::Display for DisplayDiagram<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> FmtResult {
        use DisplayDiagram::*;

        match self {
            AsSummary(diagram) => diagram.fmt_summary(f),
            AsLog(diagram) => diagram.fmt_log(f),
            BlockAsLog(block) => block.fmt_log_entry(f),
        }
    }
}

//! The solved variable assignment handed over by the constraint solver, and the round layout a
//! rendering pass expects it to have.

use std::fmt;

use itertools::iproduct;
use serde::Deserialize;

use crate::error::TrailError;
use crate::permutation::STATE_CELLS;
use crate::state::TrailState;

pub use builder::ResultBuilder;

mod builder;

/// Per round, per trail instance, per cell raw labels. Kept wider than a label so that any
/// integer the solver prints is range-checked with its field path instead of failing decoding.
pub type RawMasks = Vec<Vec<Vec<i64>>>;

/// Read-only bundle of solver output. Field names follow the solver model's output variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SolverResult {
    pub forward_mask_x: RawMasks,
    pub forward_mask_sbx: RawMasks,
    /// Absent for the narrow variant, where the tweak addition leaves the labels untouched.
    #[serde(default)]
    pub forward_mask_exx: Option<RawMasks>,
    pub backward_mask_x: RawMasks,
    pub backward_mask_sbx: RawMasks,
    #[serde(default)]
    pub backward_mask_exx: Option<RawMasks>,
    /// `tk_permutation_per_round[r][16 * inst + j]` is the tweak cell occupying position `j` of
    /// instance `inst` in round `r`.
    pub tk_permutation_per_round: Vec<Vec<u8>>,
    /// `contradict[0][parity][cell] == 1` marks a lazy tweak cell. Empty when no cell is lazy.
    pub contradict: Vec<Vec<Vec<i64>>>,
}

/// Which solver array a state is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mask {
    ForwardX,
    ForwardSbx,
    ForwardExx,
    BackwardX,
    BackwardSbx,
    BackwardExx,
}

/// The supported cipher widths. The width fixes the number of parallel trail instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// QARMA-v2-64: one trail instance.
    Qarma64,
    /// QARMA-v2-128: two trail instances sharing one round schedule.
    Qarma128,
}

/// The round layout of one rendering pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundConfig {
    pub variant: Variant,
    /// Drawn forward rounds.
    pub ru: usize,
    /// Drawn backward rounds.
    pub rl: usize,
    /// Key recovery rounds; the first `kr - 2` tweak permutations end up in the summary.
    pub kr: usize,
    /// Upper bound on how often a lazy tweak cell is active.
    pub npt: usize,
}

// =================================================================================================

impl Mask {
    pub const ALL: [Mask; 6] = [
        Mask::ForwardX,
        Mask::ForwardSbx,
        Mask::ForwardExx,
        Mask::BackwardX,
        Mask::BackwardSbx,
        Mask::BackwardExx,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Mask::ForwardX => "forward_mask_x",
            Mask::ForwardSbx => "forward_mask_sbx",
            Mask::ForwardExx => "forward_mask_exx",
            Mask::BackwardX => "backward_mask_x",
            Mask::BackwardSbx => "backward_mask_sbx",
            Mask::BackwardExx => "backward_mask_exx",
        }
    }

    fn is_forward(&self) -> bool {
        matches!(self, Mask::ForwardX | Mask::ForwardSbx | Mask::ForwardExx)
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Variant {
    #[inline]
    pub fn instances(&self) -> usize {
        match self {
            Variant::Qarma64 => 1,
            Variant::Qarma128 => 2,
        }
    }

    /// Number of entries in one round of the tweak permutation.
    #[inline]
    pub fn tweak_cells(&self) -> usize {
        STATE_CELLS * self.instances()
    }

    pub fn cipher_name(&self) -> &'static str {
        match self {
            Variant::Qarma64 => "QARMA-v2-64",
            Variant::Qarma128 => "QARMA-v2-128",
        }
    }

    pub fn from_name(name: &str) -> Option<Variant> {
        match name.to_lowercase().as_str() {
            "qarma64" | "qarma-v2-64" | "64" => Some(Variant::Qarma64),
            "qarma128" | "qarma-v2-128" | "128" => Some(Variant::Qarma128),
            _ => None,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cipher_name())
    }
}

impl RoundConfig {
    pub fn new(variant: Variant, ru: usize, rl: usize, kr: usize) -> Self {
        Self {
            variant,
            ru,
            rl,
            kr,
            npt: 1,
        }
    }

    pub fn with_npt(mut self, npt: usize) -> Self {
        self.npt = npt;
        self
    }

    /// Rounds covered by the distinguisher: the drawn rounds plus the two boundary rounds.
    #[inline]
    pub fn total_rounds(&self) -> usize {
        self.ru + self.rl + 2
    }

    /// Rounds of tweak permutation the solver result must provide.
    pub fn tweak_rounds_needed(&self) -> usize {
        std::cmp::max(self.ru + self.rl, self.kr.saturating_sub(2))
    }

    fn expected_rounds(&self, mask: Mask) -> usize {
        match mask {
            Mask::ForwardX => self.ru + 1,
            Mask::ForwardSbx | Mask::ForwardExx => self.ru,
            Mask::BackwardX | Mask::BackwardSbx | Mask::BackwardExx => self.rl,
        }
    }
}

// =================================================================================================

impl SolverResult {
    /// The raw array behind `mask`. A missing tweak-XOR array falls back to the post-S-box array,
    /// `validate` makes sure this only happens for the narrow variant.
    pub fn masks(&self, mask: Mask) -> &RawMasks {
        match mask {
            Mask::ForwardX => &self.forward_mask_x,
            Mask::ForwardSbx => &self.forward_mask_sbx,
            Mask::ForwardExx => self.forward_mask_exx.as_ref().unwrap_or(&self.forward_mask_sbx),
            Mask::BackwardX => &self.backward_mask_x,
            Mask::BackwardSbx => &self.backward_mask_sbx,
            Mask::BackwardExx => self.backward_mask_exx.as_ref().unwrap_or(&self.backward_mask_sbx),
        }
    }

    /// Reads the state of one instance in one solver round.
    pub fn state(&self, mask: Mask, round: usize, instance: usize) -> Result<TrailState, TrailError> {
        let path = format!("{}[{}][{}]", mask.name(), round, instance);
        let raw = self.masks(mask)
            .get(round)
            .ok_or_else(|| TrailError::malformed(
                format!("{}[{}]", mask.name(), round),
                "round is missing"))?
            .get(instance)
            .ok_or_else(|| TrailError::malformed(path.as_str(), "trail instance is missing"))?;

        TrailState::from_raw(raw, &path)
    }

    /// The tweak permutation of one round, restricted to one instance.
    pub fn tweak_permutation(&self, round: usize, instance: usize) -> Result<&[u8], TrailError> {
        let perm = self.tk_permutation_per_round
            .get(round)
            .ok_or_else(|| TrailError::malformed(
                format!("tk_permutation_per_round[{}]", round),
                "round is missing"))?;
        let start = STATE_CELLS * instance;
        perm.get(start..start + STATE_CELLS)
            .ok_or_else(|| TrailError::malformed(
                format!("tk_permutation_per_round[{}]", round),
                format!("no tweak cells for instance {}", instance)))
    }

    /// Checks the whole result against `config`. Called before any block is derived, so a
    /// rendering pass either sees a fully consistent result or produces nothing at all.
    pub fn validate(&self, config: &RoundConfig) -> Result<(), TrailError> {
        if config.ru == 0 || config.rl == 0 {
            return Err(TrailError::mismatch(format!(
                "at least one forward and one backward round must be drawn (RU = {}, RL = {})",
                config.ru, config.rl)));
        }
        if config.kr < 2 {
            return Err(TrailError::mismatch(format!(
                "KR must be at least 2, got {}", config.kr)));
        }

        if config.variant.instances() > 1 {
            if self.forward_mask_exx.is_none() {
                return Err(TrailError::malformed(Mask::ForwardExx.name(),
                    "required when two trail instances are drawn"));
            }
            if self.backward_mask_exx.is_none() {
                return Err(TrailError::malformed(Mask::BackwardExx.name(),
                    "required when two trail instances are drawn"));
            }
        }

        // Round extents first, so a misconfigured pass is reported as such rather than as a
        // missing entry.
        for mask in Mask::ALL.iter() {
            let expected = config.expected_rounds(*mask);
            let found = self.masks(*mask).len();
            if found != expected {
                let (name, count) = if mask.is_forward() { ("RU", config.ru) } else { ("RL", config.rl) };
                return Err(TrailError::mismatch(format!(
                    "{} holds {} rounds, but {} = {} requires {}",
                    mask.name(), found, name, count, expected)));
            }
        }
        let tweak_rounds = self.tk_permutation_per_round.len();
        if tweak_rounds < config.tweak_rounds_needed() {
            return Err(TrailError::mismatch(format!(
                "tk_permutation_per_round holds {} rounds, but RU + RL = {} and KR = {} require {}",
                tweak_rounds, config.ru + config.rl, config.kr, config.tweak_rounds_needed())));
        }

        let instances = config.variant.instances();
        for mask in Mask::ALL.iter() {
            for (r, round) in self.masks(*mask).iter().enumerate() {
                if round.len() != instances {
                    return Err(TrailError::malformed(
                        format!("{}[{}]", mask.name(), r),
                        format!("expected {} trail instance(s), found {}", instances, round.len())));
                }
            }
            let rounds = self.masks(*mask).len();
            for (r, inst) in iproduct!(0..rounds, 0..instances) {
                self.state(*mask, r, inst)?;
            }
        }
        self.validate_handoff(config)?;

        let width = config.variant.tweak_cells();
        for (r, perm) in self.tk_permutation_per_round.iter().enumerate() {
            if perm.len() != width {
                return Err(TrailError::malformed(
                    format!("tk_permutation_per_round[{}]", r),
                    format!("expected {} tweak cells, found {}", width, perm.len())));
            }
            if let Some((j, id)) = perm.iter().enumerate().find(|(_, id)| **id as usize >= width) {
                return Err(TrailError::malformed(
                    format!("tk_permutation_per_round[{}][{}]", r, j),
                    format!("tweak cell {} is outside 0..{}", id, width)));
            }
        }

        self.validate_contradict()
    }

    /// The post-diffusion state of the last forward round is the first state the backward trail
    /// consumes. Both arrays hold it, and they must agree cell by cell.
    fn validate_handoff(&self, config: &RoundConfig) -> Result<(), TrailError> {
        let backward_round = config.rl - 1;
        for inst in 0..config.variant.instances() {
            let forward = self.state(Mask::ForwardX, config.ru, inst)?;
            let backward = self.state(Mask::BackwardX, backward_round, inst)?;
            let differing = forward.cells().iter()
                .zip(backward.cells().iter())
                .position(|(f, b)| f != b);
            if let Some(j) = differing {
                return Err(TrailError::malformed(
                    format!("{}[{}][{}][{}]", Mask::ForwardX.name(), config.ru, inst, j),
                    format!("label {} differs from {}[{}][{}][{}] = {}",
                            forward.cells()[j], Mask::BackwardX.name(), backward_round, inst, j,
                            backward.cells()[j])));
            }
        }
        Ok(())
    }

    fn validate_contradict(&self) -> Result<(), TrailError> {
        if self.contradict.len() > 1 {
            return Err(TrailError::malformed("contradict",
                format!("expected at most 1 entry, found {}", self.contradict.len())));
        }
        let parities = match self.contradict.get(0) {
            Some(parities) => parities,
            None => return Ok(()),
        };
        if parities.len() != 2 {
            return Err(TrailError::malformed("contradict[0]",
                format!("expected 2 parity rows, found {}", parities.len())));
        }
        for (p, row) in parities.iter().enumerate() {
            if row.len() != STATE_CELLS {
                return Err(TrailError::malformed(format!("contradict[0][{}]", p),
                    format!("expected {} flags, found {}", STATE_CELLS, row.len())));
            }
            if let Some((j, flag)) = row.iter().enumerate().find(|(_, f)| !(0..=1).contains(*f)) {
                return Err(TrailError::malformed(format!("contradict[0][{}][{}]", p, j),
                    format!("flag {} is not 0 or 1", flag)));
            }
        }
        Ok(())
    }
}

use std::fmt;

use tracing::{debug, info, info_span};

use trail::{assemble, Diagram, DisplayDiagram, SolverResult};

use crate::error::DrawError;
use crate::render::DiagramRenderer;
use crate::setup::Setup;
use crate::solver::{CpModel, SolveParams, Solver};

/// Caller-assigned identity of a distinguisher. Nothing in this crate hands out ids on its own,
/// so batches can be numbered deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DistinguisherId(usize);

#[derive(Debug, Clone)]
pub struct Distinguisher {
    id: DistinguisherId,
    name: String,
    setup: Setup,
}

/// A rendered distinguisher: the abstract diagram and the document made from it.
#[derive(Debug, Clone)]
pub struct Drawing {
    pub diagram: Diagram,
    pub document: String,
}

// =================================================================================================

impl DistinguisherId {
    #[inline]
    pub fn new(id: usize) -> Self {
        DistinguisherId(id)
    }

    #[inline]
    pub fn get(&self) -> usize {
        self.0
    }
}

impl From<usize> for DistinguisherId {
    fn from(id: usize) -> Self {
        DistinguisherId(id)
    }
}

impl fmt::Display for DistinguisherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Distinguisher {
    pub fn new(id: DistinguisherId, setup: Setup) -> Self {
        Self {
            id,
            name: format!("IntegralDistinguisher{}", id),
            setup,
        }
    }

    #[inline]
    pub fn id(&self) -> DistinguisherId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn setup(&self) -> &Setup {
        &self.setup
    }

    /// The model instance to hand to a solver for this distinguisher.
    pub fn model(&self) -> CpModel {
        CpModel::new(self.setup.config())
    }

    /// Assembles and renders `result`. Does not touch the file system.
    pub fn draw<R: DiagramRenderer>(&self, result: &SolverResult, renderer: &R) -> Result<Drawing, DrawError> {
        let diagram = assemble(result, self.setup.config())?;
        debug!(distinguisher = %self.name, "\n{}", DisplayDiagram::AsLog(&diagram));

        let document = renderer.render(&diagram)?;
        Ok(Drawing {
            diagram,
            document,
        })
    }

    /// Writes the document and the summary to the output files of the setup.
    pub fn write(&self, drawing: &Drawing) -> Result<(), DrawError> {
        let out_files = self.setup.out_files();
        out_files.create_parent_folder()?;
        out_files.write_tex(&drawing.document)?;
        out_files.write_summary(drawing.diagram.summary().unwrap_or_default())?;

        info!(distinguisher = %self.name, tex = %out_files.tex_file().display(), "wrote diagram");
        Ok(())
    }

    /// Obtains a solution from `solver`, then draws and writes it.
    pub fn run<S, R>(&self, solver: &S, params: &SolveParams, renderer: &R) -> Result<Drawing, DrawError>
        where
            S: Solver,
            R: DiagramRenderer,
    {
        let span = info_span!("distinguisher", id = %self.id);
        let _guard = span.enter();

        let result = solver.solve(&self.model(), params)?;
        let drawing = self.draw(&result, renderer)?;
        self.write(&drawing)?;
        Ok(drawing)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::TikzRenderer;
    use crate::setup::OutFiles;
    use crate::solver::SolveError;
    use trail::{ResultBuilder, Variant};

    struct FixedSolver(SolverResult);

    impl Solver for FixedSolver {
        fn solve(&self, model: &CpModel, _params: &SolveParams) -> Result<SolverResult, SolveError> {
            assert_eq!(model.config().ru, 2);
            Ok(self.0.clone())
        }
    }

    fn setup(out: &std::path::Path) -> Setup {
        Setup::new(Variant::Qarma64, 3, 2, 4, 1, OutFiles::new(out), true).unwrap()
    }

    #[test]
    fn name_is_derived_from_the_explicit_id() {
        let d = Distinguisher::new(DistinguisherId::new(7), setup("o.tex".as_ref()));
        assert_eq!(d.name(), "IntegralDistinguisher7");
        assert_eq!(d.id().get(), 7);
    }

    #[test]
    fn run_writes_document_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let tex = dir.path().join("nested").join("trail.tex");
        let d = Distinguisher::new(DistinguisherId::new(1), setup(&tex));
        let solver = FixedSolver(ResultBuilder::new(d.setup().config()).build());

        let drawing = d.run(&solver, &SolveParams::default(), &TikzRenderer::new()).unwrap();

        let written = std::fs::read_to_string(&tex).unwrap();
        assert_eq!(written, drawing.document);
        let summary = std::fs::read_to_string(dir.path().join("nested").join("trail_summary.txt")).unwrap();
        assert!(summary.starts_with(&"#".repeat(55)));
        assert!(summary.contains("Number of forward rounds:        03"));
    }

    #[test]
    fn malformed_result_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let tex = dir.path().join("trail.tex");
        let d = Distinguisher::new(DistinguisherId::new(1), setup(&tex));
        let mut result = ResultBuilder::new(d.setup().config()).build();
        result.forward_mask_x[0][0][0] = 7;

        let err = d.run(&FixedSolver(result), &SolveParams::default(), &TikzRenderer::new()).unwrap_err();
        assert!(matches!(err, DrawError::Trail(_)));
        assert!(!tex.exists());
    }
}

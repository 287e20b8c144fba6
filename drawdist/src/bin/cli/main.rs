use std::path::Path;
use std::process;
use std::thread;
use std::thread::JoinHandle;

use console::style;
use structopt::StructOpt;

use draw_options::{DrawOptions, RoundOptions};
use drawdist::batch::draw_batch;
use drawdist::logging::init_with_level;
use drawdist::progress::{MyStyledSpinner, Progress, StyledProgressBar};
use drawdist::{Distinguisher, DistinguisherId, DrawError, OutFiles, Setup, SolutionFile, SolveParams,
               TikzRenderer};
use trail::{DisplayDiagram, Variant};

mod draw_options;

fn main() {
    let outcome = match DrawOptions::from_args() {
        DrawOptions::Draw {
            input,
            rounds,
            out_file,
            id,
            silent_mode,
            log_level,
        } => {
            init_with_level(log_level.as_deref());
            setup_from(&rounds, OutFiles::new(&out_file), silent_mode)
                .and_then(|setup| run(setup, &input, DistinguisherId::new(id), rounds.legend))
        },

        DrawOptions::Batch {
            in_folder,
            rounds,
            out_folder,
            log_level,
        } => {
            init_with_level(log_level.as_deref());
            setup_from(&rounds, OutFiles::in_folder(&out_folder, "batch"), true)
                .and_then(|setup| run_batch(setup, &in_folder, &out_folder, rounds.legend))
        },
    };

    if let Err(e) = outcome {
        eprintln!("{} {}", style("error:").red().bold(), e);
        process::exit(1);
    }
}

fn setup_from(rounds: &RoundOptions, out_files: OutFiles, silent_mode: bool) -> Result<Setup, DrawError> {
    let variant = Variant::from_name(&rounds.variant)
        .ok_or_else(|| DrawError::Setup(format!(
            "variant '{}' is not supported, use qarma64 or qarma128", rounds.variant)))?;

    Setup::new(variant, rounds.ru, rounds.rl, rounds.kr, rounds.npt, out_files, silent_mode)
}

// ===============================================================================================
// ===============================================================================================

fn run(setup: Setup, input: &Path, id: DistinguisherId, legend: bool) -> Result<(), DrawError> {
    let progress_arena = Progress::new();
    let main_pb = init_main_pb(&progress_arena, &setup);
    let drawer = drive_progress(progress_arena.clone());

    let distinguisher = Distinguisher::new(id, setup);
    main_pb.set_message(&format!("Drawing {}", distinguisher.name()));

    let drawing = distinguisher.run(&SolutionFile::new(input),
                                    &SolveParams::default(),
                                    &TikzRenderer::new().with_legend(legend));
    match &drawing {
        Ok(_) => main_pb.finish_with_message(&format!(
            "{} written to {}",
            distinguisher.name(),
            distinguisher.setup().out_files().tex_file().display())),
        Err(_) => main_pb.finish_and_clear(),
    }
    let _ = drawer.join();
    let drawing = drawing?;

    if !distinguisher.setup().silent_mode() {
        println!("{}", DisplayDiagram::AsSummary(&drawing.diagram));
    }
    Ok(())
}

fn run_batch(setup: Setup, in_folder: &Path, out_folder: &Path, legend: bool) -> Result<(), DrawError> {
    let files = drawdist::batch::solution_files(in_folder)?;
    let progress_arena = Progress::new();
    let pb = progress_arena.new_progress_bar(files.len() as u64);
    pb.set_message("Drawing distinguishers");
    let drawer = drive_progress(progress_arena.clone());

    let report = draw_batch(&setup,
                            in_folder,
                            out_folder,
                            &SolveParams::default(),
                            &TikzRenderer::new().with_legend(legend),
                            Some(&pb));
    pb.finish_with_message("All done!");
    let _ = drawer.join();
    let report = report?;

    for (path, e) in report.failed.iter() {
        eprintln!("{} {}: {}", style("failed").red(), path.display(), e);
    }
    println!("{} of {} distinguishers drawn to {}",
             style(report.drawn.len()).green(),
             report.len(),
             out_folder.display());

    if report.is_success() {
        Ok(())
    } else {
        Err(DrawError::BatchFailed { failed: report.failed.len(), total: report.len() })
    }
}

fn init_main_pb(progress_arena: &Progress, setup: &Setup) -> MyStyledSpinner {
    let config = setup.config();
    let main_pb = progress_arena.new_main_spinner();
    main_pb.println(
        &format!("Received cipher: {}, RU: {}, RL: {}, KR: {}",
                 config.variant, config.ru + 1, config.rl + 1, config.kr,
        ));
    main_pb.enable_steady_tick(200);

    main_pb
}

/// Drives the progress bars. Without it nothing is drawn, see progress.rs. The returned handle
/// finishes once every bar is finished.
fn drive_progress(progress_arena: Progress) -> JoinHandle<()> {
    thread::spawn(move || {
        let _ = progress_arena.join();
    })
}

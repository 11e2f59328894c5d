use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use oddex_app::app::App;
use oddex_app::cli::Args;
use oddex_app::context::ExperimentCtx;
use oddex_app::flow::{build_flow, FlowConfig};
use oddex_data::{load_conditions, sample_conditions, write_conditions};
use oddex_data::{ExperimentHandler, SessionInfo};
use oddex_schedule::TrialLoop;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // Sample this session's trials once, up front, and split them into the
    // practice and main lists.
    let conditions = load_conditions(&args.conditions)?;
    let mut rng = rand::rng();
    let total = args.practice_trials + args.main_trials;
    let sampled = sample_conditions(&conditions, total, &mut rng)?;
    let practice_rows = sampled[..args.practice_trials].to_vec();
    let main_rows = sampled[args.practice_trials..].to_vec();

    let info = SessionInfo::new(&args.participant, &args.session);
    let data = ExperimentHandler::new(info, &args.data_dir);

    // Keep the sampled lists next to the data file for later analysis.
    if let Some(session_dir) = data.file_stem().parent() {
        write_conditions(&session_dir.join("practice_triplets.csv"), &practice_rows)?;
        write_conditions(&session_dir.join("main_triplets.csv"), &main_rows)?;
    }

    let flow = build_flow(FlowConfig {
        practice: TrialLoop::new("practiceTrials", practice_rows),
        main: TrialLoop::new("mainTrials", main_rows),
        images_dir: args.images.clone(),
        instruction_image: args.resolve_instruction_image(),
        max_practice: args.max_practice,
        max_main: args.max_main,
    });
    let ctx = ExperimentCtx::new(data);

    App::new(flow, ctx, args.font.clone(), args.windowed).run()
}

use clap::Parser;
use genius_cli::commands::cli::{Args, Commands};
use genius_cli::error::CliError;
use genius_cli::{app, logging};

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("genius: {e}");
            e.exit_code()
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = Args::parse();
    let mut cfg = app::load_config(args.config.as_deref())?;
    logging::init(&cfg.logging)?;
    app::apply_repo(&mut cfg, args.repo.as_deref());

    match args.command {
        Commands::Run(run_args) => app::run(cfg, run_args, args.json).await,
        Commands::Plan(plan_args) => app::plan(cfg, plan_args, args.json).await,
    }
}

mod args;
mod dash;

use clap::Parser;
use log::{debug, LevelFilter};

use crate::dash::Overrides;

fn main() {
    let args = args::Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }
    debug!("args: {:?}", args);

    let res = match args.config.clone() {
        Some(config_path) => dash::run_dashboard(
            config_path,
            &Overrides {
                reference: args.reference.clone(),
                out: args.out.clone(),
            },
        ),
        None => dash::run_dashboard_arguments(&args),
    };

    if let Err(e) = res {
        dash::report_error(&e);
        std::process::exit(1);
    }
}

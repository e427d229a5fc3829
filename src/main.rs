use std::process::ExitCode;
use std::time::Instant;

use color_eyre::eyre::Result;
use tracing::{debug, error, info, trace};
use updatemac::utils::log::LogContext;

fn main() -> Result<ExitCode> {
    let now = Instant::now();
    color_eyre::install()?;

    let opts = updatemac::opts::parse();
    let log = LogContext::init(&opts.log_options())?;
    let _guard = tracing::dispatcher::set_default(log.dispatch());

    trace!("Starting updatemac.");
    info!("Log initialized at {}", log.path());

    match updatemac::run(opts, &log) {
        Ok(outcome) => {
            debug!("Finished with {outcome:?} in {:?}", now.elapsed());
            log.finish()?;
            Ok(ExitCode::from(outcome.exit_code()))
        }
        Err(e) => {
            error!("updatemac failed after {:?}: {e}", now.elapsed());
            log.finish()?;
            Err(e)
        }
    }
}

//! Interactive session: dialoguer prompts for each run's settings, then the
//! same background batch the command line uses. A failed run is reported and
//! the session carries on.

use crate::cli::output::map_error;
use crate::cli::presentation::format_summary_text;
use crate::cli::route::{RunContext, RunOverrides};
use crate::config::AppConfig;
use crate::error::ReviewError;
use dialoguer::{Confirm, Input, Password};
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing::{error, info};

/// Run the prompt/execute loop until the user declines another run.
///
/// `seed` carries any command-line flags; they become the prompt defaults.
pub fn run_interactive(
    context: &RunContext,
    runtime: &Runtime,
    seed: &RunOverrides,
) -> Result<(), ReviewError> {
    info!("Interactive session started");
    println!("crescendo: music review drafts\n");

    let mut defaults = context.config().clone();
    seed.apply(&mut defaults);
    let mut run = 1usize;

    loop {
        let overrides = prompt_run(&defaults, seed)?;
        overrides.apply(&mut defaults);

        info!(run, "Starting interactive run");
        match runtime.block_on(context.execute(&overrides, true)) {
            Ok(summary) => {
                println!("\n{}", format_summary_text(&summary, true));
            }
            Err(e) => {
                error!(run, error = %e, "Interactive run failed");
                eprintln!("\n{}\n", map_error(&e));
            }
        }

        let again = Confirm::new()
            .with_prompt("Start another run?")
            .default(false)
            .interact()?;
        if !again {
            break;
        }
        run += 1;
    }

    info!(runs = run, "Interactive session finished");
    Ok(())
}

/// Ask for one run's settings, defaulting to the previous answers.
fn prompt_run(defaults: &AppConfig, seed: &RunOverrides) -> Result<RunOverrides, ReviewError> {
    let input: String = Input::new()
        .with_prompt("Music table (markdown)")
        .default(defaults.batch.input.display().to_string())
        .interact_text()?;

    let output_dir: String = Input::new()
        .with_prompt("Output directory")
        .default(defaults.batch.output_dir.display().to_string())
        .interact_text()?;

    let keep_thinking = Confirm::new()
        .with_prompt("Keep the model's thinking in reviews?")
        .default(defaults.api.keep_thinking)
        .interact()?;

    let simulate = Confirm::new()
        .with_prompt("Simulation mode (no API calls)?")
        .default(defaults.batch.simulate)
        .interact()?;

    let skip_existing = Confirm::new()
        .with_prompt("Skip entries that already have a review?")
        .default(defaults.batch.skip_existing)
        .interact()?;

    let api_key = if !simulate && defaults.api.resolve_api_key().is_err() {
        let key = Password::new()
            .with_prompt(format!(
                "API key ({} is not set)",
                defaults.api.api_key_env
            ))
            .allow_empty_password(true)
            .interact()?;
        Some(key).filter(|k| !k.trim().is_empty())
    } else {
        None
    };

    Ok(RunOverrides {
        input: Some(PathBuf::from(input.trim())),
        output_dir: Some(PathBuf::from(output_dir.trim())),
        keep_thinking: Some(keep_thinking),
        simulate: Some(simulate),
        skip_existing: Some(skip_existing),
        api_key: api_key.or_else(|| seed.api_key.clone()),
        model: seed.model.clone(),
    })
}

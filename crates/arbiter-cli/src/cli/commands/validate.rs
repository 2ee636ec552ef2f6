use super::print_error;
use crate::cli::args::ValidateArgs;
use crate::exit_codes;
use arbiter_core::config;

pub fn run(args: ValidateArgs) -> anyhow::Result<i32> {
    match config::load_config(&args.config) {
        Ok(suite) => {
            println!(
                "config ok: {} prompts × {} inputs = {} pairs (mode {}, candidate {}, judge {})",
                suite.prompts.len(),
                suite.inputs.len(),
                suite.pair_count(),
                suite.mode,
                suite.candidate.model,
                suite.judge.model,
            );
            for unfilled in suite.unfilled_fields() {
                eprintln!(
                    "warning: input `{}` has no field `{}` used by {}; that pair will fail with missing_field",
                    unfilled.input_id, unfilled.field, unfilled.source
                );
            }
            Ok(exit_codes::SUCCESS)
        }
        Err(e) => {
            print_error(&e);
            Ok(exit_codes::CONFIG_ERROR)
        }
    }
}

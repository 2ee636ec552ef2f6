use crate::cli::args::InitArgs;
use crate::exit_codes;
use anyhow::Context;
use arbiter_core::samples;
use std::fs;

pub fn run(args: InitArgs) -> anyhow::Result<i32> {
    if args.path.exists() && !args.force {
        eprintln!(
            "error[config]: {} already exists (pass --force to overwrite)",
            args.path.display()
        );
        return Ok(exit_codes::CONFIG_ERROR);
    }
    if let Some(parent) = args.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&args.path, samples::SAMPLE_CONFIG)
        .with_context(|| format!("failed to write {}", args.path.display()))?;

    println!("Wrote {}", args.path.display());
    println!("Next: arbiter run {} -o results.json", args.path.display());
    Ok(exit_codes::SUCCESS)
}

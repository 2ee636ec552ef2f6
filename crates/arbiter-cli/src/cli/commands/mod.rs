use super::args::{Cli, Command};
use arbiter_core::EvalError;

pub mod init;
pub(crate) mod run;
pub(crate) mod runner_builder;
pub mod validate;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Run(args) => run::run(args).await,
        Command::Init(args) => init::run(args),
        Command::Validate(args) => validate::run(args),
    }
}

pub(crate) fn print_error(err: &EvalError) {
    eprintln!("error[{}]: {}", err.kind(), err);
}

use super::super::args::{Cli, Command};

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let config = cli.config.as_deref();
    match cli.cmd {
        Command::Run(args) => super::run::run(args, config).await,
        Command::Status(args) => super::status::run(args, config).await,
        Command::Estimate(args) => super::estimate::run(args, config),
        Command::Suites(args) => super::suites::run(args, config).await,
        Command::Costs(args) => super::costs::run(args, config).await,
        Command::Breakdown(args) => super::breakdown::run(args, config).await,
        Command::Models(args) => super::models::run(args, config),
    }
}

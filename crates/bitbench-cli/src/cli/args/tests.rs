use super::*;
use clap::CommandFactory;
use clap::Parser;
use std::time::Duration;

#[test]
fn cli_debug_assert() {
    Cli::command().debug_assert();
}

#[test]
fn run_parses_durations_and_model_list() {
    let cli = Cli::try_parse_from([
        "bitbench",
        "run",
        "--suite",
        "tests/bsv.json",
        "--models",
        "gpt-4o,claude-sonnet-4",
        "--timeout",
        "5m",
        "--stagger",
        "250ms",
        "--provider",
        "fake",
    ])
    .expect("parse should succeed");

    match cli.cmd {
        Command::Run(args) => {
            assert_eq!(args.selection.models, vec!["gpt-4o", "claude-sonnet-4"]);
            let timeout: Duration = args.timeout.unwrap().into();
            assert_eq!(timeout, Duration::from_secs(300));
            let stagger: Duration = args.stagger.unwrap().into();
            assert_eq!(stagger, Duration::from_millis(250));
            assert_eq!(args.provider, Provider::Fake);
            assert!(args.selection.runs.is_none());
            assert!(!args.no_publish);
        }
        _ => panic!("expected Command::Run"),
    }
}

#[test]
fn global_flags_work_after_subcommand() {
    let cli = Cli::try_parse_from(["bitbench", "models", "-v", "--config", "b.yaml"]).unwrap();
    assert!(cli.verbose);
    assert_eq!(cli.config.unwrap(), PathBuf::from("b.yaml"));
}

#[test]
fn costs_requires_a_subcommand() {
    assert!(Cli::try_parse_from(["bitbench", "costs"]).is_err());
    let cli = Cli::try_parse_from(["bitbench", "costs", "show"]).unwrap();
    match cli.cmd {
        Command::Costs(c) => assert!(matches!(c.cmd, CostsSub::Show { top: 20 })),
        _ => panic!("expected Command::Costs"),
    }
}

#[test]
fn bad_duration_is_rejected() {
    assert!(Cli::try_parse_from([
        "bitbench", "run", "--suite", "s.json", "--timeout", "soon"
    ])
    .is_err());
}

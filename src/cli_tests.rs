use super::*;
use clap::CommandFactory;

#[test]
fn cli_definition_is_consistent() {
    RootArgs::command().debug_assert();
}

#[test]
fn build_accepts_ids_and_global_flags_after_subcommand() {
    let args = RootArgs::try_parse_from([
        "jsip", "build", "--journal", "jlp", "5", "6", "--overwrite", "--snapshot", "s.json",
    ])
    .expect("parse");
    assert_eq!(args.global.snapshot, Some(PathBuf::from("s.json")));
    match args.command {
        Command::Build(build) => {
            assert_eq!(build.ids, vec![5, 6]);
            assert!(build.flags.overwrite);
            assert!(!build.flags.test);
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn build_requires_ids() {
    assert!(RootArgs::try_parse_from(["jsip", "build", "--journal", "jlp"]).is_err());
}

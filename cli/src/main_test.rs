use super::*;
use clap::CommandFactory;

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn generate_defaults_to_detailed_affirming() {
    let cli = Cli::try_parse_from(["cura", "teacher", "generate", "s1", "--notes", "Good start"]).unwrap();
    match cli.command {
        Command::Teacher(TeacherCommand {
            command: TeacherSubcommand::Generate { submission_id, notes, conciseness, tone, grade },
        }) => {
            assert_eq!(submission_id, "s1");
            assert_eq!(notes, "Good start");
            assert_eq!(conciseness, Conciseness::Detailed);
            assert_eq!(tone, Tone::Affirming);
            assert_eq!(grade, None);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn tone_accepts_wire_spelling() {
    let cli = Cli::try_parse_from([
        "cura",
        "teacher",
        "generate",
        "s1",
        "--notes",
        "n",
        "--tone",
        "Gentle Redirection",
        "--grade",
        "91.5",
    ])
    .unwrap();
    let Command::Teacher(TeacherCommand { command: TeacherSubcommand::Generate { tone, grade, .. } }) = cli.command
    else {
        panic!("expected teacher generate");
    };
    assert_eq!(tone, Tone::GentleRedirection);
    assert_eq!(grade, Some(91.5));
}

#[test]
fn signup_rejects_unknown_role() {
    let result = Cli::try_parse_from([
        "cura", "signup", "--email", "a@b.c", "--password", "pw", "--role", "admin", "--name", "A",
    ]);
    assert!(result.is_err());
}

#[test]
fn values_respond_parses_stance() {
    let cli =
        Cli::try_parse_from(["cura", "values", "respond", "v1", "--stance", "against", "--response", "Because"])
            .unwrap();
    let Command::Values(ValuesCommand { command: ValuesSubcommand::Respond { stance, .. } }) = cli.command else {
        panic!("expected values respond");
    };
    assert_eq!(stance, Stance::Against);
}

#[test]
fn values_next_force_is_opt_in() {
    let cli = Cli::try_parse_from(["cura", "values", "next"]).unwrap();
    let Command::Values(ValuesCommand { command: ValuesSubcommand::Next { force } }) = cli.command else {
        panic!("expected values next");
    };
    assert!(!force);

    let cli = Cli::try_parse_from(["cura", "values", "next", "--force"]).unwrap();
    let Command::Values(ValuesCommand { command: ValuesSubcommand::Next { force } }) = cli.command else {
        panic!("expected values next");
    };
    assert!(force);
}

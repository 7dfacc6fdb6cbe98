use proptest::prelude::*;

use super::*;

fn split(command: &str) -> Vec<String> {
    shell_words::split(command).unwrap()
}

#[test]
fn inserts_overwrite_flag_after_tool() {
    assert_eq!(
        ensure_overwrite_flag("ffmpeg -i in.mp4 out.mp4", "ffmpeg"),
        "ffmpeg -y -i in.mp4 out.mp4"
    );
}

#[test]
fn overwrite_flag_keeps_original_quoting() {
    let command = r#"ffmpeg -i "my clip.mp4" -vf 'scale=1280:720' out.mp4"#;
    assert_eq!(
        ensure_overwrite_flag(command, "ffmpeg"),
        r#"ffmpeg -y -i "my clip.mp4" -vf 'scale=1280:720' out.mp4"#
    );
}

#[test]
fn overwrite_flag_is_not_duplicated() {
    let command = "ffmpeg -i in.mp4 -y out.mp4";
    assert_eq!(ensure_overwrite_flag(command, "ffmpeg"), command);
}

#[test]
fn overwrite_flag_matches_tool_case_insensitively() {
    assert_eq!(
        ensure_overwrite_flag("  FFmpeg -i a.mp4 b.mp4 ", "ffmpeg"),
        "FFmpeg -y -i a.mp4 b.mp4"
    );
}

#[test]
fn overwrite_flag_leaves_other_programs_alone() {
    assert_eq!(ensure_overwrite_flag("  ls -la ", "ffmpeg"), "ls -la");
}

#[test]
fn quiet_flags_are_added_once() {
    let once = ensure_quiet_flags("ffmpeg -i a.mp4 b.mp4", "ffmpeg");
    assert_eq!(once, "ffmpeg -hide_banner -loglevel error -i a.mp4 b.mp4");
    assert_eq!(ensure_quiet_flags(&once, "ffmpeg"), once);
}

#[test]
fn quiet_flags_respect_existing_verbosity() {
    assert_eq!(
        ensure_quiet_flags("ffmpeg -v quiet -i a.mp4 b.mp4", "ffmpeg"),
        "ffmpeg -hide_banner -v quiet -i a.mp4 b.mp4"
    );
}

#[test]
fn rejects_command_for_another_tool() {
    let err = validate_structure("nottool -i in.mp4 out.mp4", "ffmpeg").unwrap_err();
    assert_eq!(
        err,
        StructuralError::MissingToolPrefix {
            tool: "ffmpeg".to_string()
        }
    );
    assert_eq!(err.to_string(), "The command must start with \"ffmpeg\"");
}

#[test]
fn rejects_tool_name_with_suffix() {
    assert!(validate_structure("ffmpegx -i in.mp4 out.mp4", "ffmpeg").is_err());
}

#[test]
fn accepts_tool_given_as_path() {
    assert!(validate_structure("/usr/bin/ffmpeg -i in.mp4 out.mp4", "ffmpeg").is_ok());
}

#[test]
fn rejects_empty_command() {
    assert_eq!(
        validate_structure("   ", "ffmpeg"),
        Err(StructuralError::Empty)
    );
}

#[test]
fn input_flag_followed_by_flag_is_missing_input() {
    let err = validate_structure("ffmpeg -i -f null -", "ffmpeg").unwrap_err();
    assert_eq!(
        err,
        StructuralError::MissingInput {
            cause: MissingInputCause::Flag("-f".to_string())
        }
    );
    assert!(err.to_string().starts_with("Missing input file after -i flag"));
}

#[test]
fn input_flag_at_end_is_missing_input() {
    assert_eq!(
        validate_structure("ffmpeg -i", "ffmpeg"),
        Err(StructuralError::MissingInput {
            cause: MissingInputCause::EndOfCommand
        })
    );
}

#[test]
fn input_flag_followed_by_null_device_is_missing_input() {
    assert_eq!(
        validate_structure("ffmpeg -i /dev/null out.mp4", "ffmpeg"),
        Err(StructuralError::MissingInput {
            cause: MissingInputCause::NullSink("/dev/null".to_string())
        })
    );
}

#[test]
fn stdin_input_is_accepted() {
    assert!(validate_structure("ffmpeg -f mp4 -i - out.mp4", "ffmpeg").is_ok());
}

#[test]
fn structure_check_survives_unbalanced_quotes() {
    assert!(validate_structure("ffmpeg -i \"in.mp4 out.mp4", "ffmpeg").is_ok());
}

#[test]
fn dry_run_replaces_output_file() {
    assert_eq!(
        to_dry_run_form("ffmpeg -i in.mp4 out.mp4", NullSink::Dash),
        "ffmpeg -i in.mp4 -f null -"
    );
}

#[test]
fn dry_run_keeps_existing_null_output() {
    let command = "ffmpeg -i in.mp4 -f null -";
    assert_eq!(to_dry_run_form(command, NullSink::Dash), command);
}

#[test]
fn dry_run_never_treats_stream_map_as_output() {
    let dry = to_dry_run_form(
        "ffmpeg -i in.mp4 -map 0:v -c:v libx264 out.mp4",
        NullSink::Dash,
    );
    assert_eq!(
        split(&dry),
        vec![
            "ffmpeg", "-i", "in.mp4", "-map", "0:v", "-c:v", "libx264", "-f", "null", "-"
        ]
    );
}

#[test]
fn dry_run_keeps_boolean_flag_before_output() {
    let dry = to_dry_run_form("ffmpeg -i a.mp4 -i b.wav -shortest out.mp4", NullSink::Dash);
    assert_eq!(
        split(&dry),
        vec![
            "ffmpeg", "-i", "a.mp4", "-i", "b.wav", "-shortest", "-f", "null", "-"
        ]
    );
}

#[test]
fn dry_run_appends_spec_when_no_output() {
    let dry = to_dry_run_form("ffmpeg -i in.mp4", NullSink::Dash);
    assert_eq!(dry, "ffmpeg -i in.mp4 -f null -");
    assert_eq!(dry.matches(NULL_FORMAT_MARKER).count(), 1);
}

#[test]
fn dry_run_keeps_quoted_filter_graph_intact() {
    let dry = to_dry_run_form(
        r#"ffmpeg -i in.mp4 -vf "drawtext=text='Hello World':x=10:y=10" out.mp4"#,
        NullSink::Dash,
    );
    let tokens = split(&dry);
    assert_eq!(tokens[3], "-vf");
    assert_eq!(tokens[4], "drawtext=text='Hello World':x=10:y=10");
    assert_eq!(&tokens[5..], ["-f", "null", "-"]);
}

#[test]
fn dry_run_falls_back_on_unbalanced_quotes() {
    assert_eq!(
        to_dry_run_form("ffmpeg -i \"in.mp4 out.mp4", NullSink::Dash),
        "ffmpeg -i \"in.mp4 out.mp4 -f null -"
    );
}

#[test]
fn dry_run_skips_redirection_targets() {
    let dry = to_dry_run_form("ffmpeg -i in.mp4 out.mp4 > log.txt", NullSink::Dash);
    assert_eq!(dry, "ffmpeg -i in.mp4 -f null -");
}

#[test]
fn dry_run_folds_line_continuations_before_a_pipe() {
    let dry = to_dry_run_form("ffmpeg -i in.mp4 \\\n out.mp4 | cat", NullSink::Dash);
    assert_eq!(dry, "ffmpeg -i in.mp4 -f null - | cat");
    assert!(!dry.contains("out.mp4"));
}

#[test]
fn dry_run_handles_multi_line_commands() {
    let command = "ffmpeg -i in.mp4 \\\n  -c:v libx264 \\\n  -crf 23 \\\n  out.mp4";
    assert_eq!(
        to_dry_run_form(command, NullSink::Dash),
        "ffmpeg -i in.mp4 -c:v libx264 -crf 23 -f null -"
    );
}

#[test]
fn dry_run_stops_at_and_chain() {
    assert_eq!(
        to_dry_run_form("ffmpeg -i in.mp4 out.mp4 && echo done", NullSink::Dash),
        "ffmpeg -i in.mp4 -f null - && echo done"
    );
}

#[test]
fn dry_run_leaves_pipeline_consumer_untouched() {
    assert_eq!(
        to_dry_run_form("ffmpeg -i in.mp4 out.mp4 | tee log.txt", NullSink::Dash),
        "ffmpeg -i in.mp4 -f null - | tee log.txt"
    );
    assert_eq!(
        to_dry_run_form("ffmpeg -i in.mp4 out.mp4; ls -l out.mp4", NullSink::Dash),
        "ffmpeg -i in.mp4 -f null - ; ls -l out.mp4"
    );
}

#[test]
fn dry_run_replaces_stdout_output_feeding_a_pipe() {
    assert_eq!(
        to_dry_run_form("ffmpeg -i in.mp4 -f mp4 - | tee out.mp4", NullSink::Dash),
        "ffmpeg -i in.mp4 -f mp4 -f null - | tee out.mp4"
    );
}

#[test]
fn dry_run_splits_operators_attached_to_words() {
    assert_eq!(
        to_dry_run_form("ffmpeg -i in.mp4 out.mp4&&echo done", NullSink::Dash),
        "ffmpeg -i in.mp4 -f null - && echo done"
    );
}

#[test]
fn stderr_redirection_is_not_a_control_operator() {
    assert_eq!(
        to_dry_run_form("ffmpeg -i in.mp4 out.mp4 2>&1 | tail -n 5", NullSink::Dash),
        "ffmpeg -i in.mp4 -f null - | tail -n 5"
    );
}

#[test]
fn dry_run_ignores_trailing_comment() {
    assert_eq!(
        to_dry_run_form("ffmpeg -i in.mp4 out.mp4 # final render", NullSink::Dash),
        "ffmpeg -i in.mp4 -f null -"
    );
}

#[test]
fn quoted_operators_stay_arguments() {
    let dry = to_dry_run_form(
        r#"ffmpeg -i in.mp4 -metadata title="a | b" out.mp4"#,
        NullSink::Dash,
    );
    let tokens = split(&dry);
    assert_eq!(tokens[4], "title=a | b");
    assert_eq!(&tokens[5..], ["-f", "null", "-"]);
}

#[cfg(unix)]
#[test]
fn dry_run_uses_dev_null_sink() {
    assert_eq!(
        to_dry_run_form("ffmpeg -i in.mp4 out.mp4", NullSink::DevNull),
        "ffmpeg -i in.mp4 -f null /dev/null"
    );
}

#[test]
fn locates_trailing_null_output() {
    assert_eq!(null_output_suffix_start("ffmpeg -i a.mp4 -f null -"), Some(16));
    assert_eq!(null_output_suffix_start("ffmpeg -i a.mp4 out.mp4"), None);
    assert_eq!(
        null_output_suffix_start("ffmpeg -i a.mp4 \\\n -f null -"),
        Some(19)
    );
}

fn option_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "-c:v libx264",
        "-an",
        "-shortest",
        "-map 0:a",
        "-b:a 128k",
        "-vf scale=640:-1",
        "-preset fast",
    ])
}

proptest! {
    #[test]
    fn dry_run_is_idempotent(
        input in "[a-z]{1,8}",
        output in "[a-z]{1,8}",
        options in prop::collection::vec(option_strategy(), 0..4),
    ) {
        let prefix = format!("ffmpeg -i {input}.mp4 {}", options.join(" "));
        let command = format!("{prefix} {output}.mkv");
        let dry = to_dry_run_form(&command, NullSink::Dash);

        prop_assert_eq!(to_dry_run_form(&dry, NullSink::Dash), dry.clone());
        prop_assert_eq!(dry.matches(NULL_FORMAT_MARKER).count(), 1);

        let expected_prefix = split(&prefix);
        let tokens = split(&dry);
        prop_assert_eq!(&tokens[..expected_prefix.len()], expected_prefix.as_slice());
        prop_assert_eq!(&tokens[expected_prefix.len()..], ["-f", "null", "-"]);
    }

    #[test]
    fn overwrite_flag_is_idempotent(
        input in "[a-z]{1,8}",
        options in prop::collection::vec(option_strategy(), 0..4),
    ) {
        let command = format!("ffmpeg -i {input}.mp4 {} out.mp4", options.join(" "));
        let once = ensure_overwrite_flag(&command, "ffmpeg");
        prop_assert_eq!(ensure_overwrite_flag(&once, "ffmpeg"), once.clone());
        prop_assert_eq!(split(&once).iter().filter(|token| *token == "-y").count(), 1);
    }
}

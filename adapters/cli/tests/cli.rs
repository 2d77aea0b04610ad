use std::{
    env, fs,
    path::PathBuf,
    process::{Command, Output},
};

fn chrobry(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_chrobry"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to launch the chrobry binary")
}

fn scratch(name: &str) -> PathBuf {
    env::temp_dir().join(format!("chrobry-cli-{}-{name}", std::process::id()))
}

#[test]
fn short_session_prints_a_summary() {
    let output = chrobry(&["--seed", "4", "--ticks", "120"]);

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("elapsed 1.9s"), "{stdout}");
    assert!(stdout.contains("alive: enemies"), "{stdout}");
}

#[test]
fn saved_session_resumes_from_its_transfer_string() {
    let save = scratch("save.txt");
    let path = save.to_string_lossy().into_owned();

    let first = chrobry(&["--seed", "9", "--ticks", "60", "--save", &path]);
    assert!(first.status.success(), "{first:?}");
    let encoded = fs::read_to_string(&save).expect("save file written");
    assert!(encoded.starts_with("chrobry:v1:"));

    let resumed = chrobry(&["--seed", "9", "--ticks", "60", "--load", &path]);
    assert!(resumed.status.success(), "{resumed:?}");
    let stdout = String::from_utf8_lossy(&resumed.stdout);
    assert!(stdout.contains("elapsed 1.9s"), "{stdout}");

    let _ = fs::remove_file(save);
}

#[test]
fn scripted_session_replays_intents() {
    let script = scratch("script.json");
    fs::write(
        &script,
        r#"[{ "movement": [1.0, 0.0] }, { "movement": [0.0, 1.0], "melee": true }]"#,
    )
    .expect("script written");

    let output = chrobry(&[
        "--seed",
        "2",
        "--ticks",
        "30",
        "--script",
        &script.to_string_lossy(),
    ]);

    assert!(output.status.success(), "{output:?}");
    let _ = fs::remove_file(script);
}

#[test]
fn corrupt_transfer_string_is_reported() {
    let load = scratch("corrupt.txt");
    fs::write(&load, "arena:v1:abc").expect("file written");

    let output = chrobry(&["--ticks", "1", "--load", &load.to_string_lossy()]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("transfer prefix 'arena' is not supported"), "{stderr}");
    let _ = fs::remove_file(load);
}

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::{TempDir, tempdir};

fn project() -> TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("app.py"), "print('hi')\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "remember <this>\n").unwrap();
    fs::write(dir.path().join(".env"), "SECRET=1\n").unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/main.rs"), "fn main() {}\n").unwrap();
    dir
}

fn ctxl(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ctxl").unwrap();
    cmd.env_remove("PROJECT_ROOT")
        .arg("--quiet")
        .current_dir(dir.path());
    cmd
}

#[test]
fn generate_writes_compact_xml_to_stdout() {
    let dir = project();
    ctxl(&dir)
        .args(["generate", "--no-auto-detect", "--compact", "-t", "Explain a < b"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            r#"<?xml version="1.0" encoding="UTF-8"?><root><project_context>"#,
        ))
        .stdout(predicate::str::contains(
            r#"<file path="src/main.rs"><content>fn main() {}"#,
        ))
        .stdout(predicate::str::contains(
            r#"<file path="notes.txt"><content>remember &lt;this&gt;"#,
        ))
        .stdout(predicate::str::contains("<task>Explain a &lt; b</task></root>"))
        .stdout(predicate::str::contains(".env").not());
}

#[test]
fn filter_selects_files_in_both_sections() {
    let dir = project();
    ctxl(&dir)
        .args(["generate", "--no-auto-detect", "-F", "*.py"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"<file path="app.py">"#))
        .stdout(predicate::str::contains("notes.txt").not())
        .stdout(predicate::str::contains("main.rs").not());
}

#[test]
fn include_dotfiles_admits_hidden_files() {
    let dir = project();
    ctxl(&dir)
        .args(["generate", "--no-auto-detect", "--include-dotfiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"<file path=".env">"#));
}

#[test]
fn ignore_file_patterns_are_honoured() {
    let dir = project();
    fs::write(dir.path().join(".gitignore"), "*.txt\n\n").unwrap();
    ctxl(&dir)
        .args(["generate", "--no-auto-detect"])
        .assert()
        .success()
        .stdout(predicate::str::contains("notes.txt").not())
        .stdout(predicate::str::contains("app.py"));
}

#[test]
fn tree_prints_directories_first() {
    let dir = project();
    ctxl(&dir)
        .args(["tree", "--no-auto-detect"])
        .assert()
        .success()
        .stdout("├── src\n│   └── main.rs\n├── app.py\n└── notes.txt\n");
}

#[test]
fn presets_restrict_selection() {
    let dir = project();
    ctxl(&dir)
        .args(["tree", "-p", "rust"])
        .assert()
        .success()
        .stdout("└── src\n    └── main.rs\n");
}

#[test]
fn detect_lists_matching_presets() {
    let dir = project();
    ctxl(&dir)
        .arg("detect")
        .assert()
        .success()
        .stdout("misc\npython\nrust\n");
}

#[test]
fn json_format_from_config_file() {
    let dir = project();
    fs::create_dir_all(dir.path().join(".ctxl")).unwrap();
    fs::write(
        dir.path().join(".ctxl/ctxl.toml"),
        "[general]\nauto_detect = false\n\n[output]\nformat = \"json\"\ntask = \"from config\"\n",
    )
    .unwrap();

    let output = ctxl(&dir).arg("generate").output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["task"], "from config");
    let files = value["projectContext"]["files"].as_array().unwrap();
    assert!(files.iter().all(|f| f["type"] == "file"));
    assert_eq!(files.len(), 3);
}

#[test]
fn output_flag_writes_file() {
    let dir = project();
    let target = dir.path().join("out/context.xml");
    ctxl(&dir)
        .args(["generate", "--no-auto-detect", "-o"])
        .arg(&target)
        .assert()
        .success()
        .stdout("");
    let written = fs::read_to_string(&target).unwrap();
    assert!(written.contains("<directory_structure>"));
}

#[test]
fn malformed_preset_file_fails() {
    let dir = project();
    fs::create_dir_all(dir.path().join(".ctxl")).unwrap();
    fs::write(dir.path().join(".ctxl/presets.yaml"), "rust: [unclosed\n").unwrap();
    ctxl(&dir)
        .args(["generate", "-p", "rust"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Preset File Parse Error"));
}

#[test]
fn presets_save_refuses_to_overwrite_without_force() {
    let dir = project();
    ctxl(&dir).args(["presets", "save"]).assert().success();
    let saved = fs::read_to_string(dir.path().join(".ctxl/presets.yaml")).unwrap();
    assert!(saved.contains("python:"));

    ctxl(&dir).args(["presets", "save"]).assert().code(5);
    ctxl(&dir)
        .args(["presets", "save", "--force"])
        .assert()
        .success();
}

#[test]
fn user_preset_replaces_builtin() {
    let dir = project();
    fs::create_dir_all(dir.path().join(".ctxl")).unwrap();
    fs::write(
        dir.path().join(".ctxl/presets.yaml"),
        "rust:\n  suffixes: [\".txt\"]\n  include: [\"*.txt\"]\n  exclude: []\n",
    )
    .unwrap();
    ctxl(&dir)
        .args(["tree", "-p", "rust"])
        .assert()
        .success()
        .stdout("├── src\n└── notes.txt\n");
}

#[test]
fn unsupported_completion_shell_is_rejected() {
    let dir = project();
    ctxl(&dir)
        .args(["completion", "--shell", "tcsh"])
        .assert()
        .code(5);
}

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn vulntechx(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("vulntechx").unwrap();
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd
}

fn read_lines(path: &Path) -> Vec<String> {
    let mut v: Vec<String> = fs::read_to_string(path).unwrap_or_default().lines().map(String::from).collect();
    v.sort();
    v
}

const WP_PHP: &str = r#"{"host":"a.com","tech":["WordPress:5.0","PHP:7"]}"#;

#[test]
fn version_subcommand() {
    let dir = TempDir::new().unwrap();
    vulntechx(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("Current vulntechx version v"));
}

#[test]
fn missing_template_prints_usage_and_exits_1() {
    let dir = TempDir::new().unwrap();
    vulntechx(&dir)
        .arg("nuclei")
        .write_stdin(WP_PHP)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Usage: vulntechx nuclei --cmd"));
}

#[test]
fn unknown_flag_exits_1() {
    let dir = TempDir::new().unwrap();
    vulntechx(&dir).args(["httpx", "--bogus"]).assert().code(1);
}

#[test]
fn conflicting_filters_run_nothing() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("ran");
    let template = format!("touch {}", marker.display());
    vulntechx(&dir)
        .args(["httpx", "--cmd", &template, "-i", "php", "-e", "wordpress"])
        .write_stdin(WP_PHP)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Cannot use both --exclude-tech and --include-tech"));
    assert!(!marker.exists());
}

#[test]
fn empty_stdin_exits_1() {
    let dir = TempDir::new().unwrap();
    vulntechx(&dir)
        .args(["nuclei", "--cmd", "true"])
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No input provided on stdin"));
}

#[test]
fn malformed_json_exits_1() {
    let dir = TempDir::new().unwrap();
    vulntechx(&dir)
        .args(["nuclei", "--cmd", "true"])
        .write_stdin("{\"host\": \"a.com\", \"tech\": [")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("decoding JSON"));
}

#[test]
fn failing_detector_exits_1() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("cfg.yaml"), "detector: \"exit 7\"\n").unwrap();
    vulntechx(&dir)
        .args(["--config", "cfg.yaml", "nuclei", "--cmd", "true"])
        .write_stdin("a.com\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("running exit 7"));
}

#[test]
fn unwritable_output_exits_1() {
    let dir = TempDir::new().unwrap();
    vulntechx(&dir)
        .args(["httpx", "--cmd", "true", "-o", "no/such/dir/out.txt"])
        .write_stdin(WP_PHP)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("opening output file"));
}

#[test]
fn all_jobs_finish_before_exit() {
    let dir = TempDir::new().unwrap();
    let input: String = (0..200).map(|i| format!("{{\"host\":\"h{i}.example\",\"tech\":[\"nginx:1.2\"]}}\n")).collect();
    vulntechx(&dir)
        .args(["httpx", "--cmd", "cat; echo", "--parallel", "5", "-o", "out.txt"])
        .write_stdin(input)
        .assert()
        .success();
    let lines = read_lines(&dir.path().join("out.txt"));
    assert_eq!(lines.len(), 200);
    let mut expected: Vec<String> = (0..200).map(|i| format!("h{i}.example")).collect();
    expected.sort();
    assert_eq!(lines, expected);
}

#[test]
fn non_positive_parallel_is_accepted() {
    let dir = TempDir::new().unwrap();
    vulntechx(&dir)
        .args(["httpx", "--cmd", "cat; echo", "--parallel", "-3", "-o", "out.txt"])
        .write_stdin(WP_PHP)
        .assert()
        .success();
    assert_eq!(read_lines(&dir.path().join("out.txt")), vec!["a.com", "a.com"]);
}

#[test]
fn nuclei_mode_aggregates_and_saves_only_result_lines() {
    let dir = TempDir::new().unwrap();
    vulntechx(&dir)
        .args(["nuclei", "--cmd", "echo '[t] [http] [info]' {tech}; echo '[INF] noise'; echo plain", "-o", "out.txt"])
        .write_stdin(WP_PHP)
        .assert()
        .success()
        .stdout(predicate::str::contains("[INF] noise"))
        .stdout(predicate::str::contains("plain"));
    assert_eq!(read_lines(&dir.path().join("out.txt")), vec!["[t] [http] [info] wordpress,php"]);
}

#[test]
fn nuclei_tc_template_renders_expression() {
    let dir = TempDir::new().unwrap();
    vulntechx(&dir)
        .args(["nuclei", "--cmd", "echo -tc {tech}"])
        .write_stdin(WP_PHP)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "-tc contains(to_lower(name),'wordpress') || contains(to_lower(name),'php')",
        ));
}

#[test]
fn httpx_mode_resolves_wordlists_per_tag() {
    let dir = TempDir::new().unwrap();
    let wl = dir.path().join("wordlists");
    fs::create_dir(&wl).unwrap();
    fs::write(wl.join("php.txt"), "/info.php\n").unwrap();
    fs::write(dir.path().join("cfg.yaml"), format!("wordlist_dir: {}\n", wl.display())).unwrap();

    vulntechx(&dir)
        .args(["--config", "cfg.yaml", "httpx", "--cmd", "echo -path {tech}", "-o", "out.txt"])
        .write_stdin(WP_PHP)
        .assert()
        .success();
    let mut expected = vec![format!("-path {}", wl.join("php.txt").display()), "-path wordpress".to_string()];
    expected.sort();
    assert_eq!(read_lines(&dir.path().join("out.txt")), expected);
}

#[test]
fn run_infers_strategy_from_template() {
    let dir = TempDir::new().unwrap();
    vulntechx(&dir)
        .args(["run", "--cmd", "echo -path {tech}", "-o", "per-tag.txt"])
        .write_stdin(WP_PHP)
        .assert()
        .success();
    assert_eq!(read_lines(&dir.path().join("per-tag.txt")), vec!["-path php", "-path wordpress"]);

    vulntechx(&dir)
        .args(["run", "--cmd", "echo '[a] [b] [c]' {tech}", "-o", "aggregate.txt"])
        .write_stdin(WP_PHP)
        .assert()
        .success();
    assert_eq!(read_lines(&dir.path().join("aggregate.txt")), vec!["[a] [b] [c] wordpress,php"]);
}

#[test]
fn blank_include_list_runs_nothing() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("ran");
    let template = format!("touch {}", marker.display());
    vulntechx(&dir)
        .args(["httpx", "--cmd", &template, "-i", ","])
        .write_stdin(WP_PHP)
        .assert()
        .success();
    assert!(!marker.exists());

    vulntechx(&dir)
        .args(["httpx", "--cmd", &template, "-i", " ", "-e", "php"])
        .write_stdin(WP_PHP)
        .assert()
        .code(1);
    assert!(!marker.exists());
}

#[test]
fn include_file_limits_jobs() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("only.txt"), "PHP\n").unwrap();
    let input = format!("{WP_PHP}\n{{\"host\":\"b.com\",\"tech\":[\"IIS\"]}}\n{{\"host\":\"c.com\",\"tech\":null}}");
    vulntechx(&dir)
        .args(["httpx", "--cmd", "echo {tech}", "-i", "only.txt", "-o", "out.txt"])
        .write_stdin(input)
        .assert()
        .success();
    assert_eq!(read_lines(&dir.path().join("out.txt")), vec!["php"]);
}

#[test]
fn host_list_goes_through_detector() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("detect.sh"),
        "while read h; do printf '{\"host\":\"%s\",\"tech\":[\"nginx\"]}\\n' \"$h\"; done\n",
    )
    .unwrap();
    fs::write(dir.path().join("cfg.yaml"), "detector: sh detect.sh\n").unwrap();
    vulntechx(&dir)
        .args(["--config", "cfg.yaml", "httpx", "--cmd", "cat; echo", "-o", "out.txt"])
        .write_stdin("a.com\nb.com\n")
        .assert()
        .success();
    assert_eq!(read_lines(&dir.path().join("out.txt")), vec!["a.com", "b.com"]);
}

#[test]
fn process_flag_announces_commands() {
    let dir = TempDir::new().unwrap();
    vulntechx(&dir)
        .args(["nuclei", "--cmd", "true {tech}", "--process"])
        .write_stdin(WP_PHP)
        .assert()
        .success()
        .stdout(predicate::str::contains("Running Nuclei: [echo \"a.com\" | true wordpress,php]"));

    vulntechx(&dir)
        .args(["httpx", "--cmd", "true {tech}", "--process"])
        .write_stdin(WP_PHP)
        .assert()
        .success()
        .stdout(predicate::str::contains("Running httpx for host a.com tech wordpress: [echo \"a.com\" | true wordpress]"))
        .stdout(predicate::str::contains("Running httpx for host a.com tech php: [echo \"a.com\" | true php]"));
}

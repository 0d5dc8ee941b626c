use std::path::Path;
use std::process::Command;

fn run_cellgc(args: &[&str], cwd: &Path) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_cellgc"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute cellgc");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn assert_success(args: &[&str], cwd: &Path) -> String {
    let (stdout, stderr, success) = run_cellgc(args, cwd);
    assert!(success, "command should succeed, stderr:\n{}", stderr);
    stdout
}

fn assert_failure(args: &[&str], cwd: &Path) -> String {
    let (_, stderr, success) = run_cellgc(args, cwd);
    assert!(!success, "command should fail");
    stderr
}

#[test]
fn test_default_demo() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = assert_success(&["demo"], dir.path());
    assert_eq!(
        stdout,
        "myList: 1 2 3 4 5\n\
         Removed myList from scope...\n\
         Deallocating address 2 !\n\
         Deallocating address 4 !\n\
         Deallocating address 6 !\n\
         Deallocating address 8 !\n\
         Deallocating address 10 !\n\
         myList2: 6 7 8 9 10 11 12\n\
         Removed myList2 from scope...\n"
    );
}

#[test]
fn test_demo_gc_stats() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = assert_success(&["demo", "--gc-stats"], dir.path());
    assert!(stdout.ends_with("[gc] heap=20 allocations=12 collections=1 reclaimed=5 live=7\n"));
}

#[test]
fn test_demo_large_heap_never_collects() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = assert_success(&["demo", "--heap-size", "64"], dir.path());
    assert!(!stdout.contains("Deallocating"));
    assert!(stdout.contains("myList2: 6 7 8 9 10 11 12\n"));
}

#[test]
fn test_demo_json() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = assert_success(&["demo", "--format", "json"], dir.path());
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["stats"]["collections"], 1);
    assert_eq!(value["lists"][0]["name"], "myList");
}

#[test]
fn test_demo_heap_too_small() {
    let dir = tempfile::tempdir().unwrap();
    let stderr = assert_failure(&["demo", "--heap-size", "12"], dir.path());
    assert!(stderr.contains("out of memory"), "stderr: {}", stderr);
}

#[test]
fn test_demo_invalid_heap_size() {
    let dir = tempfile::tempdir().unwrap();
    let stderr = assert_failure(&["demo", "--heap-size", "7"], dir.path());
    assert!(stderr.contains("invalid heap size 7"), "stderr: {}", stderr);
}

#[test]
fn test_init_then_demo_uses_config() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = assert_success(&["init"], dir.path());
    assert!(stdout.contains("cellgc.toml"));
    assert_failure(&["init"], dir.path());

    std::fs::write(
        dir.path().join("cellgc.toml"),
        "[collector]\nheap_size = 8\n\n[[demo.lists]]\nname = \"xs\"\nvalues = [7, 8]\n",
    )
    .unwrap();
    let stdout = assert_success(&["demo"], dir.path());
    assert_eq!(stdout, "xs: 7 8\nRemoved xs from scope...\n");
}

#[test]
fn test_explicit_config_missing() {
    let dir = tempfile::tempdir().unwrap();
    let stderr = assert_failure(&["demo", "--config", "nope.toml"], dir.path());
    assert!(stderr.contains("failed to read"), "stderr: {}", stderr);
}

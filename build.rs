use std::process::Command;

/// Run a command and return its trimmed stdout, or None on any failure
fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8(output.stdout).ok()?;
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn main() {
    let commit = command_output("git", &["rev-parse", "--short", "HEAD"]);
    let date = command_output("date", &["+%Y-%m-%d"]);
    // "rustc 1.92.0 (abcdef 2026-01-01)" -> "1.92.0"
    let rustc = command_output("rustc", &["--version"])
        .and_then(|line| line.split_whitespace().nth(1).map(str::to_string));

    let stamps = [
        ("ASTROLABE_COMMIT_SHA", commit),
        ("ASTROLABE_BUILD_DATE", date),
        ("ASTROLABE_RUSTC_VERSION", rustc),
    ];
    for (key, value) in stamps {
        println!(
            "cargo:rustc-env={}={}",
            key,
            value.as_deref().unwrap_or("unknown")
        );
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
}

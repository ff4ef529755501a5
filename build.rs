use std::process::Command;
use vergen::EmitBuilder;

fn main() {
    let in_git_repo = Command::new("git")
        .args(["rev-parse", "--git-dir"])
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false);

    let result = if in_git_repo {
        EmitBuilder::builder().build_timestamp().git_sha(true).emit()
    } else {
        EmitBuilder::builder().build_timestamp().emit()
    };

    // version metadata falls back to "unknown" at runtime
    if let Err(e) = result {
        println!("cargo:warning=build metadata unavailable: {e}");
    }
}

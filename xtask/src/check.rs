use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

fn check(label: &str, args: &[&str]) -> Result<()> {
    println!("{}", format!("  Checking {label}...").cyan());
    let start = Instant::now();

    let output = Command::new("cargo")
        .arg("check")
        .args(args)
        .output()
        .with_context(|| format!("Failed to check {label}"))?;

    if !output.status.success() {
        eprintln!("{}", format!("  ✗ {label} check failed").red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        anyhow::bail!("{label} check failed");
    }

    println!(
        "{}",
        format!("  ✓ {label} check passed in {:.2}s", start.elapsed().as_secs_f64()).green()
    );
    println!();
    Ok(())
}

pub fn run() -> Result<()> {
    println!();
    println!("{}", "🔍 Checking all crates...".cyan().bold());
    println!();

    let total_start = Instant::now();

    check("hardware target (STM32H7)", &[
        "-p", "firmware", "--target", "thumbv7em-none-eabihf", "--features", "hardware",
    ])?;

    check("host target", &["-p", "firmware", "--features", "std"])?;

    check("platform crate (no_std)", &[
        "-p", "platform", "--target", "thumbv7em-none-eabihf", "--no-default-features",
    ])?;

    check("transport crate (no_std)", &[
        "-p", "transport", "--target", "thumbv7em-none-eabihf", "--no-default-features",
    ])?;

    check("display-engine crate (no_std)", &[
        "-p", "display-engine", "--target", "thumbv7em-none-eabihf", "--no-default-features",
    ])?;

    // Clippy lints
    println!("{}", "  Running clippy lints...".cyan());
    let clippy_start = Instant::now();

    let clippy_output = Command::new("cargo")
        .args(["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])
        .output()
        .context("Failed to run clippy")?;

    if !clippy_output.status.success() {
        eprintln!("{}", "  ✗ Clippy warnings found".red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&clippy_output.stderr));
        anyhow::bail!("Clippy check failed");
    }
    println!(
        "{}",
        format!("  ✓ Clippy passed in {:.2}s", clippy_start.elapsed().as_secs_f64()).green()
    );
    println!();

    // Format check
    println!("{}", "  Checking code formatting...".cyan());

    let fmt_output = Command::new("cargo")
        .args(["fmt", "--all", "--check"])
        .output()
        .context("Failed to run cargo fmt")?;

    if !fmt_output.status.success() {
        eprintln!("{}", "  ✗ Formatting issues found".red().bold());
        eprintln!("     Run 'cargo fmt --all' to fix");
        anyhow::bail!("Format check failed");
    }
    println!("{}", "  ✓ Formatting check passed".green());
    println!();

    println!(
        "{}",
        format!("✓ All checks completed in {:.2}s", total_start.elapsed().as_secs_f64())
            .green()
            .bold()
    );
    println!();

    Ok(())
}

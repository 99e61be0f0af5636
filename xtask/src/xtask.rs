use anyhow::Result;
use clap::{Parser, Subcommand};
use xshell::{cmd, Shell};

#[derive(Parser)]
#[command(name = "xtask", about = "Development tasks for hbacore")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full test suite across feature combinations.
    Test,
    /// Run clippy with warnings denied.
    Lint,
    /// Check formatting without modifying files.
    Fmt,
    /// Run the criterion benchmark suite.
    Bench,
    /// Run everything CI runs, in order.
    Ci,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let sh = Shell::new()?;

    match args.command {
        Command::Test => test(&sh),
        Command::Lint => lint(&sh),
        Command::Fmt => fmt(&sh),
        Command::Bench => bench(&sh),
        Command::Ci => {
            fmt(&sh)?;
            lint(&sh)?;
            test(&sh)
        }
    }
}

fn test(sh: &Shell) -> Result<()> {
    // Dev-dependencies (criterion, proptest, sha3) require std, so the
    // no_std build is checked by compiling only, not by running tests.
    cmd!(sh, "cargo build --no-default-features").run()?;
    cmd!(sh, "cargo test").run()?;
    cmd!(sh, "cargo test --all-features").run()?;
    Ok(())
}

fn lint(sh: &Shell) -> Result<()> {
    cmd!(sh, "cargo clippy --all-features --all-targets -- -D warnings").run()?;
    Ok(())
}

fn fmt(sh: &Shell) -> Result<()> {
    cmd!(sh, "cargo fmt --check").run()?;
    Ok(())
}

fn bench(sh: &Shell) -> Result<()> {
    cmd!(sh, "cargo bench --all-features").run()?;
    Ok(())
}

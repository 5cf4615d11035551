// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation
//!
//! `cargo xtask ci` runs formatting, clippy, docs and the test suite. The
//! standard test suite needs no infrastructure: the lifecycle runs against
//! the in-memory store and a scripted gateway.
//!
//! Database work is opt-in:
//!
//! - `cargo xtask verify-migrations` checks that the Supabase migrations
//!   still declare the guards the lifecycle relies on
//! - `cargo xtask apply-migrations` applies them to `DATABASE_URL` with `psql`

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::{
    fmt::Debug,
    fs, io,
    path::{Path, PathBuf},
    process::Output,
};

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use duct::cmd;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

/// Where the Supabase migrations live, relative to the workspace root.
const MIGRATIONS_DIR: &str = "crates/persistence/migrations";

/// Index names the lifecycle depends on for its atomic guards.
const REQUIRED_GUARDS: [(&str, &str); 3] = [
    (
        "orders_one_active_per_cleaner_day",
        "a cleaner holds one active order per service date",
    ),
    (
        "payments_one_active_per_order",
        "an order has one pending or paid payment",
    ),
    (
        "payments_reference",
        "webhooks find payments by merchant reference",
    ),
];

/// Secret used by `cargo xtask serve`; never use it outside development.
const DEV_JWT_SECRET: &str = "clean-aceh-development-secret-change-me";

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask")]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test, migrations)
    CI,

    /// Build the project
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Generate code coverage report
    #[command(visible_alias = "cov")]
    Coverage,

    /// Lint formatting, clippy, and docs
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the project
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check documentation for errors and warnings
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check for formatting issues in the project
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Fix clippy warnings in the project
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Fix formatting issues in the project
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run tests
    #[command(visible_alias = "t")]
    Test,

    /// Run doc tests
    #[command(visible_alias = "td")]
    TestDocs,

    /// Run lib tests
    #[command(visible_alias = "tl")]
    TestLibs,

    /// Check that the migrations declare the lifecycle's unique guards
    #[command(visible_alias = "vm")]
    VerifyMigrations,

    /// Apply the migrations to `DATABASE_URL` with psql
    #[command(visible_alias = "am")]
    ApplyMigrations,

    /// Run the server locally against the in-memory store
    #[command(visible_alias = "s")]
    Serve,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Check => check(),
            Self::Coverage => coverage(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => lint_format(),
            Self::FixClippy => fix_clippy(),
            Self::FixFormatting => fix_format(),
            Self::Test => test(),
            Self::TestDocs => test_docs(),
            Self::TestLibs => test_libs(),
            Self::VerifyMigrations => verify_migrations(),
            Self::ApplyMigrations => apply_migrations(),
            Self::Serve => serve(),
        }
    }
}

/// Run CI checks (lint, build, test, migrations)
fn ci() -> Result<()> {
    lint()?;
    build()?;
    test()?;
    verify_migrations()?;
    Ok(())
}

/// Build the project
fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

/// Run cargo check
fn check() -> Result<()> {
    run_cargo(vec!["check", "--all-targets", "--all-features"])
}

/// Generate code coverage report
fn coverage() -> Result<()> {
    run_cargo(vec![
        "llvm-cov",
        "--lcov",
        "--output-path",
        "target/lcov.info",
        "--all-features",
    ])
}

/// Lint formatting, clippy, and docs
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    lint_format()?;
    Ok(())
}

/// Run clippy on the project
fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
}

/// Fix clippy warnings in the project
fn fix_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--fix",
        "--allow-dirty",
        "--allow-staged",
        "--",
        "-D",
        "warnings",
    ])
}

/// Check that docs build without warnings
fn lint_docs() -> Result<()> {
    cmd!("cargo", "doc", "--workspace", "--no-deps", "--all-features")
        .env("RUSTDOCFLAGS", "-D warnings")
        .run_with_trace()?;
    Ok(())
}

/// Lint formatting issues in the project
fn lint_format() -> Result<()> {
    run_cargo(vec!["fmt", "--all", "--check"])
}

/// Fix formatting issues in the project
fn fix_format() -> Result<()> {
    run_cargo(vec!["fmt", "--all"])
}

/// Run lib and doc tests
fn test() -> Result<()> {
    test_libs()?;
    test_docs()?; // run last because it's slow
    Ok(())
}

/// Run doc tests for the workspace's default packages
fn test_docs() -> Result<()> {
    run_cargo(vec!["test", "--doc", "--all-features"])
}

/// Run lib tests for the workspace's default packages
fn test_libs() -> Result<()> {
    run_cargo(vec!["test", "--all-targets", "--all-features"])
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Lists the migration files in apply order.
fn migration_files() -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(MIGRATIONS_DIR)
        .wrap_err_with(|| format!("failed to read {MIGRATIONS_DIR}"))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "sql"))
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(eyre!("no migrations found in {MIGRATIONS_DIR}"));
    }
    Ok(files)
}

/// Verify the migrations still declare the lifecycle's unique guards.
///
/// The double-booking and one-active-payment checks in the service are
/// backed by unique partial indexes; dropping one of them silently turns
/// a race into a duplicate row. This is a static check over the SQL and
/// needs no database.
fn verify_migrations() -> Result<()> {
    let files = migration_files()?;
    let mut sql = String::new();
    for file in &files {
        tracing::debug!("reading {}", file.display());
        let contents = fs::read_to_string(file)
            .wrap_err_with(|| format!("failed to read {}", file.display()))?;
        sql.push_str(&contents);
        sql.push('\n');
    }
    let sql = sql.to_lowercase();

    let missing: Vec<&str> = REQUIRED_GUARDS
        .iter()
        .filter(|(name, _)| !declares_unique_index(&sql, name))
        .map(|(name, purpose)| {
            tracing::error!("missing unique index {name}: {purpose}");
            *name
        })
        .collect();

    if !missing.is_empty() {
        return Err(eyre!("migrations are missing guards: {}", missing.join(", ")));
    }

    tracing::info!(
        "{} migration file(s) declare all {} guards",
        files.len(),
        REQUIRED_GUARDS.len()
    );
    Ok(())
}

fn declares_unique_index(sql: &str, name: &str) -> bool {
    sql.lines().any(|line| {
        let line = line.trim();
        line.starts_with("create unique index") && line.split_whitespace().any(|word| word == name)
    })
}

/// Apply the migrations with psql.
///
/// Requires `DATABASE_URL` (the Supabase Postgres connection string) and
/// `psql` on the path. Every migration is idempotent, so re-running is safe.
fn apply_migrations() -> Result<()> {
    let database_url = std::env::var("DATABASE_URL")
        .wrap_err("DATABASE_URL must be set to apply migrations")?;

    cmd!("psql", "--version")
        .run_with_trace()
        .wrap_err("psql is not available")?;

    for file in migration_files()? {
        apply_migration(&database_url, &file)?;
    }
    Ok(())
}

fn apply_migration(database_url: &str, file: &Path) -> Result<()> {
    tracing::info!("applying {}", file.display());
    cmd!(
        "psql",
        database_url,
        "--set",
        "ON_ERROR_STOP=1",
        "--single-transaction",
        "--file",
        file
    )
    .run_with_trace()
    .wrap_err_with(|| format!("failed to apply {}", file.display()))?;
    Ok(())
}

/// Run the server against the in-memory store with a development secret.
fn serve() -> Result<()> {
    tracing::warn!("using the development JWT secret; orders are lost on exit");
    cmd!("cargo", "run", "--package", "clean-aceh-server")
        .env_remove("SUPABASE_URL")
        .env("JWT_SECRET", DEV_JWT_SECRET)
        .env(
            "MIDTRANS_SERVER_KEY",
            std::env::var("MIDTRANS_SERVER_KEY")
                .unwrap_or_else(|_| String::from("SB-Mid-server-dev")),
        )
        .run_with_trace()?;
    Ok(())
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}

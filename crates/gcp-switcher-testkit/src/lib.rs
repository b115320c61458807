// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use gcp_switcher_app::{Account, Project};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

const USER_NAMES: [&str; 12] = [
    "avery", "jordan", "taylor", "riley", "morgan", "casey", "quinn", "parker", "drew", "kai",
    "robin", "rowan",
];

const DOMAINS: [&str; 4] = ["example.com", "example.org", "corp.example", "dev.example"];

const PROJECT_WORDS: [&str; 14] = [
    "billing", "analytics", "platform", "staging", "sandbox", "ingest", "search", "payments",
    "edge", "ledger", "metrics", "batch", "identity", "archive",
];

const ENVIRONMENTS: [&str; 4] = ["dev", "test", "prod", "ops"];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator for account and project rows shaped like gcloud output.
#[derive(Debug, Clone)]
pub struct CloudFaker {
    rng: DeterministicRng,
}

impl CloudFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    fn pick<'a>(&mut self, values: &'a [&'a str]) -> &'a str {
        values[self.rng.int_n(values.len())]
    }

    /// `count` distinct accounts; the first is the active one.
    pub fn accounts(&mut self, count: usize) -> Vec<Account> {
        (0..count)
            .map(|index| {
                let user = self.pick(&USER_NAMES);
                let domain = self.pick(&DOMAINS);
                Account {
                    account: format!("{user}{index}@{domain}"),
                    status: if index == 0 { "ACTIVE" } else { "" }.to_owned(),
                }
            })
            .collect()
    }

    /// `count` distinct projects with gcloud-style ids.
    pub fn projects(&mut self, count: usize) -> Vec<Project> {
        (0..count)
            .map(|index| {
                let word = self.pick(&PROJECT_WORDS);
                let env = self.pick(&ENVIRONMENTS);
                let suffix = 100_000 + self.rng.int_n(900_000);
                Project {
                    project_id: format!("{word}-{env}-{suffix}-{index}"),
                    name: format!("{} {}", capitalize(word), env.to_uppercase()),
                }
            })
            .collect()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn accounts_json(accounts: &[Account]) -> Result<String> {
    serde_json::to_string_pretty(accounts).context("encode accounts fixture")
}

pub fn projects_json(projects: &[Project]) -> Result<String> {
    serde_json::to_string_pretty(projects).context("encode projects fixture")
}

/// Scripted answer for one exact argument list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    stdout: String,
    stderr: String,
    exit_code: i32,
    hang_secs: Option<u64>,
}

impl Reply {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            ..Self::default()
        }
    }

    pub fn fail(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stderr: stderr.into(),
            exit_code,
            ..Self::default()
        }
    }

    /// Sleeps instead of exiting so callers hit their deadline.
    pub fn hang(secs: u64) -> Self {
        Self {
            hang_secs: Some(secs),
            ..Self::default()
        }
    }

    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }
}

/// A shell script standing in for `gcloud`. Every invocation is appended to
/// `calls.log`; argument lists without a scripted reply exit 2.
pub struct FakeGcloud {
    dir: tempfile::TempDir,
    cases: Vec<(String, Reply)>,
}

impl FakeGcloud {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create fake gcloud dir")?;
        Ok(Self {
            dir,
            cases: Vec::new(),
        })
    }

    pub fn on(mut self, args: &str, reply: Reply) -> Self {
        self.cases.push((args.to_owned(), reply));
        self
    }

    pub fn binary(&self) -> PathBuf {
        self.dir.path().join("gcloud")
    }

    fn calls_path(&self) -> PathBuf {
        self.dir.path().join("calls.log")
    }

    /// Writes the script and returns its path.
    pub fn install(&self) -> Result<PathBuf> {
        let mut script = String::from("#!/bin/sh\n");
        let _ = writeln!(
            script,
            "printf '%s\\n' \"$*\" >> {}",
            shell_quote(&self.calls_path())
        );
        script.push_str("case \"$*\" in\n");

        for (index, (args, reply)) in self.cases.iter().enumerate() {
            let out = self.dir.path().join(format!("case-{index}.out"));
            let err = self.dir.path().join(format!("case-{index}.err"));
            fs::write(&out, &reply.stdout)
                .with_context(|| format!("write {}", out.display()))?;
            fs::write(&err, &reply.stderr)
                .with_context(|| format!("write {}", err.display()))?;

            let _ = writeln!(script, "  {})", shell_quote(Path::new(args)));
            let _ = writeln!(script, "    cat {}", shell_quote(&out));
            let _ = writeln!(script, "    cat {} >&2", shell_quote(&err));
            if let Some(secs) = reply.hang_secs {
                let _ = writeln!(script, "    exec sleep {secs}");
            }
            let _ = writeln!(script, "    exit {}\n    ;;", reply.exit_code);
        }
        script.push_str("  *)\n    echo \"unexpected gcloud invocation: $*\" >&2\n    exit 2\n    ;;\nesac\n");

        let path = self.binary();
        fs::write(&path, script).with_context(|| format!("write {}", path.display()))?;
        make_executable(&path)?;
        Ok(path)
    }

    /// Argument lists seen so far, oldest first.
    pub fn calls(&self) -> Result<Vec<String>> {
        let path = self.calls_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        Ok(raw.lines().map(str::to_owned).collect())
    }
}

fn shell_quote(value: &Path) -> String {
    format!("'{}'", value.to_string_lossy().replace('\'', r"'\''"))
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("chmod {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("config.toml");
    Ok((dir, path))
}

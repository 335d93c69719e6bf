//! maskmine CLI
//!
//! Mine inputs whose (masked) digest hits a target.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use maskmine_core::{
    estimate_time_50pct, format_difficulty, format_duration, verify, Challenge, HashAlgorithm,
    MaskedTarget, Miner, SearchReport, SearchRequest, SearchResult, DEFAULT_ALPHABET,
};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "maskmine")]
#[command(version)]
#[command(about = "Masked-target hash preimage miner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for a candidate matching an explicit target and mask
    Search {
        /// Hash algorithm (md5, sha1, sha224, sha256, sha384, sha512)
        #[arg(short, long, default_value = "sha256")]
        algorithm: String,

        /// Target digest (hex)
        #[arg(long, required_unless_present = "request")]
        target: Option<String>,

        /// Mask applied to the digest before comparison (hex, default all ones)
        #[arg(long)]
        mask: Option<String>,

        /// Load the whole request from a JSON file instead of flags
        #[arg(long)]
        request: Option<PathBuf>,

        #[command(flatten)]
        space: SpaceArgs,
    },

    /// Search for a digest starting (or ending) with a bit pattern
    Bits {
        /// Hash algorithm
        #[arg(short, long, default_value = "sha256")]
        algorithm: String,

        /// Bit pattern, e.g. 0000000000000000
        #[arg(short, long)]
        bits: String,

        /// Match the end of the digest instead of the start
        #[arg(long)]
        trailing: bool,

        #[command(flatten)]
        space: SpaceArgs,
    },

    /// Issue a proof-of-work challenge and check the answer read from stdin
    Challenge {
        /// Leading one-bits required
        #[arg(short, long, default_value = "20")]
        bits: usize,
    },

    /// Solve a proof-of-work challenge prompt (read from stdin if omitted)
    Solve {
        /// Challenge prompt text
        text: Option<String>,

        /// Answer length
        #[arg(short, long, default_value = "12")]
        length: usize,

        /// Answer alphabet
        #[arg(long)]
        alphabet: Option<String>,

        /// Search on a single thread
        #[arg(long)]
        sequential: bool,
    },

    /// Check whether a candidate satisfies a target
    Verify {
        /// Hash algorithm
        #[arg(short, long, default_value = "sha256")]
        algorithm: String,

        /// Candidate input
        candidate: String,

        /// Target digest (hex)
        #[arg(long)]
        target: String,

        /// Mask (hex, default all ones)
        #[arg(long)]
        mask: Option<String>,
    },

    /// List supported hash algorithms
    Algorithms,

    /// Exhaust a fixed search space and report throughput
    Benchmark {
        /// Hash algorithm
        #[arg(short, long, default_value = "sha256")]
        algorithm: String,

        /// Variable segment length (62^length candidates)
        #[arg(short, long, default_value = "4")]
        length: usize,

        /// Number of threads (0 = auto)
        #[arg(long, default_value = "0")]
        threads: usize,
    },
}

/// Shape of the candidate space
#[derive(Args)]
struct SpaceArgs {
    /// Variable segment length
    #[arg(short, long, default_value = "8")]
    length: usize,

    /// Fixed bytes before the segment
    #[arg(long, default_value = "")]
    prefix: String,

    /// Fixed bytes after the segment
    #[arg(long, default_value = "")]
    suffix: String,

    /// Bytes the segment is drawn from (default a-zA-Z0-9)
    #[arg(long)]
    alphabet: Option<String>,

    /// Search on a single thread (deterministic, lexicographically first match)
    #[arg(long)]
    sequential: bool,

    /// Number of threads (0 = auto)
    #[arg(long, default_value = "0")]
    threads: usize,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

impl SpaceArgs {
    fn request(&self, target: &MaskedTarget) -> SearchRequest {
        let alphabet = self
            .alphabet
            .as_ref()
            .map(|a| a.as_bytes().to_vec())
            .unwrap_or_else(|| DEFAULT_ALPHABET.to_vec());

        SearchRequest::new(self.length, target)
            .prefix(self.prefix.as_bytes().to_vec())
            .suffix(self.suffix.as_bytes().to_vec())
            .alphabet(alphabet)
            .parallel(!self.sequential)
            .threads(self.threads)
    }
}

/// Report shape for `--json`
#[derive(Serialize)]
struct JsonReport {
    algorithm: HashAlgorithm,
    found: bool,
    candidate: Option<String>,
    candidate_hex: Option<String>,
    digest_hex: Option<String>,
    candidates_tested: u64,
    workers: usize,
    time_secs: f64,
    candidates_per_second: f64,
}

impl From<&SearchReport> for JsonReport {
    fn from(report: &SearchReport) -> Self {
        let candidate = report.result.found();
        Self {
            algorithm: report.algorithm,
            found: candidate.is_some(),
            candidate: candidate.map(|c| String::from_utf8_lossy(c).into_owned()),
            candidate_hex: candidate.map(hex::encode),
            digest_hex: candidate.map(|c| hex::encode(report.algorithm.digest(c))),
            candidates_tested: report.candidates_tested,
            workers: report.workers,
            time_secs: report.time_secs,
            candidates_per_second: report.candidates_per_second,
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            algorithm,
            target,
            mask,
            request,
            space,
        } => {
            let algorithm: HashAlgorithm = algorithm.parse()?;
            let request = match request {
                Some(path) => load_request(&path)?,
                None => {
                    let target = target.context("--target is required")?;
                    space.request(&parse_target(algorithm, &target, mask.as_deref())?)
                }
            };
            cmd_search(algorithm, &request, space.json)?;
        }
        Commands::Bits {
            algorithm,
            bits,
            trailing,
            space,
        } => {
            let algorithm: HashAlgorithm = algorithm.parse()?;
            let size = algorithm.digest_size();
            let target = if trailing {
                MaskedTarget::trailing_bits(&bits, size)?
            } else {
                MaskedTarget::leading_bits(&bits, size)?
            };
            cmd_search(algorithm, &space.request(&target), space.json)?;
        }
        Commands::Challenge { bits } => {
            cmd_challenge(bits)?;
        }
        Commands::Solve {
            text,
            length,
            alphabet,
            sequential,
        } => {
            cmd_solve(text, length, alphabet.as_deref(), sequential)?;
        }
        Commands::Verify {
            algorithm,
            candidate,
            target,
            mask,
        } => {
            let algorithm: HashAlgorithm = algorithm.parse()?;
            let target = parse_target(algorithm, &target, mask.as_deref())?;
            if verify(algorithm, candidate.as_bytes(), &target) {
                println!("ok");
            } else {
                bail!("candidate does not satisfy the target");
            }
        }
        Commands::Algorithms => {
            cmd_algorithms();
        }
        Commands::Benchmark {
            algorithm,
            length,
            threads,
        } => {
            cmd_benchmark(algorithm.parse()?, length, threads)?;
        }
    }

    Ok(())
}

fn parse_target(algorithm: HashAlgorithm, target: &str, mask: Option<&str>) -> Result<MaskedTarget> {
    let target = hex::decode(target).context("target is not valid hex")?;
    let mask = match mask {
        Some(mask) => hex::decode(mask).context("mask is not valid hex")?,
        None => vec![0xff; algorithm.digest_size()],
    };
    Ok(MaskedTarget::new(target, mask)?)
}

fn load_request(path: &Path) -> Result<SearchRequest> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid request in {}", path.display()))
}

fn cmd_search(algorithm: HashAlgorithm, request: &SearchRequest, json_output: bool) -> Result<()> {
    let miner = Miner::new(algorithm, request)?;
    let difficulty = miner.difficulty();

    let report = if json_output {
        miner.run()?
    } else {
        let workers = miner.config().worker_count(miner.alphabet().len());
        eprintln!("maskmine v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Algorithm:  {}", algorithm);
        eprintln!("Candidate:  {} bytes ({} variable)", miner.config().candidate_len(), request.seg_len);
        eprintln!("Space:      {}", miner.search_space());
        eprintln!("Difficulty: {}", format_difficulty(difficulty));
        eprintln!("Threads:    {}", workers);
        eprintln!();

        let space = miner.search_space();
        let report = miner.run_with_callback(|stats| {
            eprint!("\r{}", stats.format(difficulty, space));
            let _ = std::io::stderr().flush();
        })?;
        eprintln!();
        report
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&JsonReport::from(&report))?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn cmd_challenge(bits: usize) -> Result<()> {
    let challenge = Challenge::random(bits)?;
    println!("{}", challenge.prompt());
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().lock().read_line(&mut input)?;

    if challenge.check(input.as_bytes()) {
        println!("accepted");
        Ok(())
    } else {
        bail!("proof-of-work rejected")
    }
}

fn cmd_solve(text: Option<String>, length: usize, alphabet: Option<&str>, sequential: bool) -> Result<()> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            line
        }
    };

    let challenge = Challenge::parse(&text)?;
    let alphabet = alphabet.map(str::as_bytes).unwrap_or(DEFAULT_ALPHABET);

    let rate_hint = estimate_time_50pct(2f64.powi(challenge.bits() as i32), 1_000_000.0);
    eprintln!(
        "Solving {}-bit challenge (~{} at 1 MH/s)",
        challenge.bits(),
        format_duration(rate_hint)
    );

    match challenge.solve(length, alphabet, !sequential)? {
        Some(answer) => {
            println!("{}", String::from_utf8_lossy(&answer));
            Ok(())
        }
        None => bail!("no {length}-byte answer exists over this alphabet"),
    }
}

fn cmd_algorithms() {
    println!("Supported Algorithms:");
    println!("{:-<40}", "");
    println!("{:<10} {:<10} {}", "Name", "Display", "Digest bytes");
    println!("{:-<40}", "");

    for algorithm in HashAlgorithm::ALL {
        println!(
            "{:<10} {:<10} {}",
            algorithm.name(),
            algorithm.to_string(),
            algorithm.digest_size()
        );
    }
}

fn cmd_benchmark(algorithm: HashAlgorithm, length: usize, threads: usize) -> Result<()> {
    eprintln!("Benchmarking {} over a {}-symbol segment...", algorithm, length);
    eprintln!("Threads: {}", if threads == 0 { num_cpus::get() } else { threads });
    eprintln!();

    // All-ones mask over an all-zero digest: effectively never hit
    let target = MaskedTarget::exact(vec![0u8; algorithm.digest_size()]);
    let request = SearchRequest::new(length, &target).threads(threads);
    let miner = Miner::new(algorithm, &request)?;

    let report = miner.run()?;

    eprintln!("Candidates:  {}", report.candidates_tested);
    eprintln!("Time:        {:.2}s", report.time_secs);
    eprintln!("Speed:       {:.2} MH/s", report.candidates_per_second / 1_000_000.0);
    eprintln!("\nBenchmark complete!");

    Ok(())
}

fn print_report(report: &SearchReport) {
    println!();
    match &report.result {
        SearchResult::Found(candidate) => {
            println!("MATCH FOUND!");
            println!("{:-<60}", "");
            println!("Candidate:   {}", String::from_utf8_lossy(candidate));
            println!("Hex:         {}", hex::encode(candidate));
            println!("Digest:      {}", hex::encode(report.algorithm.digest(candidate)));
        }
        SearchResult::NotFound => {
            println!("No candidate in the search space matches.");
            println!("{:-<60}", "");
        }
    }
    println!("{:-<60}", "");
    println!("Tested:      {}", report.candidates_tested);
    println!("Time:        {:.2}s", report.time_secs);
    println!("Speed:       {:.2} MH/s", report.candidates_per_second / 1_000_000.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_target_defaults_to_exact() {
        let target = parse_target(HashAlgorithm::Md5, "900150983cd24fb0d6963f7d28e17f72", None).unwrap();
        assert_eq!(target.mask(), &[0xff; 16]);
        assert!(verify(HashAlgorithm::Md5, b"abc", &target));
    }

    #[test]
    fn test_parse_target_rejects_bad_input() {
        assert!(parse_target(HashAlgorithm::Md5, "zz", None).is_err());
        assert!(parse_target(HashAlgorithm::Md5, "00", Some("ffff")).is_err());
    }

    #[test]
    fn test_space_args_request() {
        let cli = Cli::parse_from([
            "maskmine", "bits", "-b", "0000", "-l", "3", "--prefix", "id:", "--alphabet", "ab",
            "--sequential",
        ]);
        let Commands::Bits { space, .. } = cli.command else {
            panic!("expected bits command");
        };

        let target = MaskedTarget::leading_bits("0000", 32).unwrap();
        let request = space.request(&target);
        assert_eq!(request.seg_len, 3);
        assert_eq!(request.prefix, b"id:");
        assert_eq!(request.alphabet, b"ab");
        assert!(!request.parallel);
    }

    #[test]
    fn test_json_report() {
        let report = SearchReport {
            algorithm: HashAlgorithm::Md5,
            result: SearchResult::Found(b"abc".to_vec()),
            candidates_tested: 3,
            workers: 1,
            time_secs: 0.5,
            candidates_per_second: 6.0,
        };
        let json = serde_json::to_value(JsonReport::from(&report)).unwrap();

        assert_eq!(json["algorithm"], "md5");
        assert_eq!(json["candidate"], "abc");
        assert_eq!(json["candidate_hex"], "616263");
        assert_eq!(json["digest_hex"], "900150983cd24fb0d6963f7d28e17f72");
    }
}

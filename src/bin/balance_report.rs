//! Balance report: scripted negotiations against every demon.
//!
//! Prints recruitment rate, flee breakdown, and mean rounds per demon for
//! each requested difficulty and answer policy.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use demon_recruiter::alignment::Alignment;
use demon_recruiter::config::GameConfig;
use demon_recruiter::data::GameData;
use demon_recruiter::harness::{run_batch, AnswerPolicy, BatchConfig};

#[derive(Parser, Debug)]
#[command(name = "balance_report")]
#[command(about = "Run scripted negotiations and report recruitment statistics")]
struct Args {
    /// Sessions per demon, difficulty, and policy
    #[arg(short = 'n', long, default_value = "200")]
    runs: u32,

    /// Base seed; run i uses seed + i
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Difficulty levels to test
    #[arg(short, long, value_delimiter = ',', default_value = "1,3,5")]
    difficulty: Vec<u8>,

    /// Answer policies to test
    #[arg(short, long, value_enum, value_delimiter = ',', default_value = "greedy,random")]
    policy: Vec<AnswerPolicy>,

    /// JSON config file; a missing file means defaults
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Directory with data overrides
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    demon_recruiter::init_tracing();
    let args = Args::parse();

    let config = GameConfig::load(&args.config)
        .with_context(|| format!("loading config {}", args.config.display()))?;
    let data = match &args.data_dir {
        Some(dir) => GameData::load_from(dir).with_context(|| format!("loading game data from {}", dir.display()))?,
        None => GameData::defaults().context("loading embedded game data")?,
    };
    data.check_limits(&config).context("checking demon catalog against config")?;

    println!("=== Balance Report ===");
    println!(
        "{} demons, {} questions, {} whims, {} runs each, base seed {}",
        data.demons.len(),
        data.questions.len(),
        data.whims.entries.len(),
        args.runs,
        args.seed
    );
    println!();

    for &difficulty in &args.difficulty {
        for &policy in &args.policy {
            let batch = BatchConfig {
                name: format!("d{}-{:?}", difficulty, policy).to_lowercase(),
                game: config.clone(),
                difficulty,
                policy,
                core: Alignment::default(),
                whims: data.whims.clone(),
                num_runs: args.runs,
                base_seed: args.seed,
            };
            let start = Instant::now();
            let results = run_batch(&batch, &data).with_context(|| format!("running batch {}", batch.name))?;
            print!("{}", results.report());
            println!("  ({:?})", start.elapsed());
            println!();
        }
    }

    Ok(())
}

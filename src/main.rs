use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use demon_recruiter::config::{core_alignment, validate_difficulty, GameConfig};
use demon_recruiter::console::Console;
use demon_recruiter::data::GameData;
use demon_recruiter::negotiation::{Demon, NegotiationSession, Player, SessionSettings};

#[derive(Parser, Debug)]
#[command(name = "demon_recruiter")]
#[command(about = "Talk demons into joining you, one question at a time")]
struct Args {
    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Difficulty 1-5 (prompted if not specified)
    #[arg(short, long)]
    difficulty: Option<u8>,

    /// JSON config file; a missing file means defaults
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Directory with demons.json / questions.json / cues.json overrides
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Demon to meet first, by name or id (random if not specified)
    #[arg(long)]
    demon: Option<String>,

    /// Your core Law/Chaos alignment, -5..=5
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    core_lc: i32,

    /// Your core Light/Dark alignment, -5..=5
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    core_ld: i32,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn main() -> Result<()> {
    demon_recruiter::init_tracing();
    let args = Args::parse();

    let mut config = GameConfig::load(&args.config)
        .with_context(|| format!("loading config {}", args.config.display()))?;
    if args.no_color {
        config.ui.color = false;
    }

    let data = match &args.data_dir {
        Some(dir) => GameData::load_from(dir).with_context(|| format!("loading game data from {}", dir.display()))?,
        None => GameData::defaults().context("loading embedded game data")?,
    };
    data.check_limits(&config).context("checking demon catalog against config")?;
    let core = core_alignment(args.core_lc, args.core_ld).context("invalid --core-lc/--core-ld")?;

    let seed = args.seed.or(config.rng_seed).unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    info!("seed {}", seed);

    let stdout = io::stdout();
    let clear = config.ui.color && stdout.is_terminal();
    let mut console = Console::new(io::stdin().lock(), stdout, &config.ui).with_clear_screen(clear);

    let difficulty = match args.difficulty {
        Some(level) => validate_difficulty(level).context("invalid --difficulty")?,
        None => match console.prompt_difficulty()? {
            Some(level) => level,
            None => return Ok(()),
        },
    };

    let mut catalog: Vec<Demon> = data.demons.clone();
    let mut current = match &args.demon {
        Some(name) => match catalog.iter().position(|d| d.matches(name)) {
            Some(idx) => idx,
            None => bail!("no demon named '{}' in the catalog", name),
        },
        None => match pick_available(&catalog, &mut rng) {
            Some(idx) => idx,
            None => bail!("the demon catalog is empty"),
        },
    };

    let mut player = Player::new(core).with_purse(config.player.starting_gold, &config.player.starting_items);
    loop {
        player.reset_stance();
        let settings = SessionSettings::from_config(&config, difficulty, rng.gen());
        let mut session = NegotiationSession::new(&mut player, &mut catalog[current], &data.questions, settings)
            .context("starting negotiation")?;
        console.run_session(&mut session, &data.cues, &data.whims)?;
        drop(session);

        let Some(next) = pick_available(&catalog, &mut rng) else {
            console.say("No demons left to meet.")?;
            break;
        };
        if !console.confirm("Negotiate with another demon?")? {
            break;
        }
        current = next;
    }

    info!("run over: {} demons recruited", player.roster().len());
    Ok(())
}

fn pick_available(catalog: &[Demon], rng: &mut ChaCha8Rng) -> Option<usize> {
    let open: Vec<usize> = (0..catalog.len()).filter(|&i| catalog[i].available).collect();
    open.choose(rng).copied()
}

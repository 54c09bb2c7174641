use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use hafalan::config::session::LastSession;
use hafalan::curriculum::{Curriculum, load_curriculum};
use hafalan::game::GameEvent;
use hafalan::profile::{JsonFileRepository, LearnerEdit, LearnerProfile, ProfileRepository, RepositoryError};
use hafalan::progress::{ScoreHistory, best_surah, hafalan_leaderboard, score_leaderboard};
use hafalan::quiz::{Outcome, ScopeSelection, SurahFilter};
use hafalan::scoring::Badge;
use hafalan::verify::{ApiKeyManager, Verifier};
use hafalan::voice::terminal::{AnnounceAudio, LineRecognizer, PrintSynthesizer};
use hafalan::voice::{VoiceEvent, VoiceQuiz};
use hafalan::{App, Config, GameEngine};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hafalan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a quiz session (default)
    Play {
        /// Learner id; defaults to whoever played last
        #[arg(short, long)]
        learner: Option<String>,
        /// Fixed shuffle seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Create a learner or update their settings. Settings without a flag are kept.
    AddLearner {
        id: String,
        #[command(flatten)]
        flags: LearnerFlags,
    },
    /// Show a learner's level, badges and memorized surahs
    Progress { id: String },
    /// Show a learner's session totals and recent scores
    Scores {
        id: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Show the score leaderboard, or the hafalan board for one surah
    Leaderboard {
        #[arg(long)]
        surah: Option<u32>,
    },
    /// Store the Gemini API key used to check recitations
    VerifierSetup { key: String },
    /// Recite answers instead of picking them
    Voice {
        #[arg(short, long)]
        learner: Option<String>,
    },
}

#[derive(Args)]
struct LearnerFlags {
    name: Option<String>,
    /// Assign a whole juz (repeatable)
    #[arg(long)]
    juz: Vec<u32>,
    /// Assign some surahs of a juz, e.g. `30:78,79` (repeatable)
    #[arg(long)]
    surah: Vec<String>,
    /// Fixed countdown in seconds instead of the level default
    #[arg(long, conflicts_with = "no_timer")]
    timer: Option<u32>,
    /// Go back to the level's default countdown
    #[arg(long)]
    no_timer: bool,
    /// Allow recitation sessions with `hafalan voice`
    #[arg(long, conflicts_with = "no_voice")]
    voice: bool,
    #[arg(long)]
    no_voice: bool,
}

impl LearnerFlags {
    fn into_edit(self) -> Result<LearnerEdit> {
        Ok(LearnerEdit {
            name: self.name,
            scope: parse_scope(&self.juz, &self.surah)?,
            timer_override_seconds: toggle(self.timer.map(Some), self.no_timer, None),
            voice_enabled: toggle(self.voice.then_some(true), self.no_voice, false),
        })
    }
}

fn init_logging() -> Result<()> {
    let log_path = Config::log_path()?;
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {:?}", parent))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    // Logs go to a file so they never draw over the TUI
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hafalan=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command.unwrap_or(Commands::Play { learner: None, seed: None }) {
        Commands::Play { learner, seed } => {
            let id = resolve_learner(learner)?;
            let mut engine = open_engine(&config, seed.or(config.seed))?;
            engine.load_learner(&id)?;

            let mut app = App::new(config, engine)?;
            app.run().await?;
        }
        Commands::AddLearner { id, flags } => {
            let edit = flags.into_edit()?;
            let mut repository = JsonFileRepository::open(Config::profiles_path()?)?;
            let existing = match repository.get_learner(&id) {
                Ok(existing) => Some(existing),
                Err(RepositoryError::NotFound(_)) => None,
                Err(e) => return Err(e.into()),
            };
            let profile = edit.apply(&id, existing);
            repository.save_learner(&profile)?;
            println!("Saved {} ({}), juz {:?}", profile.name, profile.id, profile.scope.juz_numbers());
        }
        Commands::Progress { id } => {
            let repository = JsonFileRepository::open(Config::profiles_path()?)?;
            let learner = repository.get_learner(&id)?;
            print_progress(&learner, &load_curriculum_for(&config)?);
        }
        Commands::Scores { id, limit } => {
            let repository = JsonFileRepository::open(Config::profiles_path()?)?;
            let learner = repository.get_learner(&id)?;
            let history = ScoreHistory::from_entries(&repository.score_entries(&id)?, limit);
            print_scores(&learner, &history);
        }
        Commands::Leaderboard { surah } => {
            let repository = JsonFileRepository::open(Config::profiles_path()?)?;
            let learners = repository.list_learners()?;
            match surah {
                Some(surah) => {
                    for (rank, row) in hafalan_leaderboard(&learners, surah).iter().enumerate() {
                        println!(
                            "{:>2}. {:<20} {:>3} ayat  {:>4}s",
                            rank + 1,
                            row.name,
                            row.mastered_ayahs,
                            row.total_best_time_seconds
                        );
                    }
                }
                None => {
                    for (rank, row) in score_leaderboard(&learners).iter().enumerate() {
                        println!("{:>2}. {:<20} {:>6}", rank + 1, row.name, row.cumulative_score);
                    }
                }
            }
        }
        Commands::VerifierSetup { key } => {
            ApiKeyManager::set_api_key(&key)?;
            println!("Stored API key {}", ApiKeyManager::mask_key(key.trim()));
        }
        Commands::Voice { learner } => {
            let id = resolve_learner(learner)?;
            run_voice(&config, &id).await?;
        }
    }

    Ok(())
}

/// Pick the learner from the flag or the last session, remembering the choice
fn resolve_learner(flag: Option<String>) -> Result<String> {
    let mut last = LastSession::load().unwrap_or_else(|e| {
        tracing::warn!("Ignoring unreadable session file: {}", e);
        LastSession::default()
    });
    let Some(id) = flag.or_else(|| last.learner_id.clone()) else {
        bail!("No learner given. Use --learner <id>, or add one with `hafalan add-learner`");
    };
    last.learner_id = Some(id.clone());
    if let Err(e) = last.save() {
        tracing::warn!("Failed to save session file: {}", e);
    }
    Ok(id)
}

fn load_curriculum_for(config: &Config) -> Result<Curriculum> {
    let curriculum = match &config.curriculum_path {
        Some(path) => load_curriculum(path)?,
        None => Curriculum::builtin()?,
    };
    Ok(curriculum)
}

fn open_engine(config: &Config, seed: Option<u64>) -> Result<GameEngine<JsonFileRepository>> {
    let curriculum = load_curriculum_for(config)?;
    let repository = JsonFileRepository::open(Config::profiles_path()?)?;
    Ok(GameEngine::new(curriculum, repository, seed))
}

/// A setting given by a `--x` / `--no-x` flag pair, or `None` when neither was passed
fn toggle<T>(on: Option<T>, off: bool, off_value: T) -> Option<T> {
    if off { Some(off_value) } else { on }
}

/// Build a scope from `--juz N` and `--surah J:S,S` flags. No flags means
/// the scope is left as it is.
fn parse_scope(juz: &[u32], surahs: &[String]) -> Result<Option<ScopeSelection>> {
    if juz.is_empty() && surahs.is_empty() {
        return Ok(None);
    }

    let mut scope = ScopeSelection::new();
    for &number in juz {
        scope.assign(number, SurahFilter::All);
    }
    for spec in surahs {
        let (juz, list) = spec
            .split_once(':')
            .with_context(|| format!("Expected JUZ:SURAH[,SURAH...], got {:?}", spec))?;
        let juz: u32 = juz.trim().parse().with_context(|| format!("Invalid juz in {:?}", spec))?;
        let numbers = list
            .split(',')
            .map(|s| s.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Invalid surah list in {:?}", spec))?;
        if numbers.is_empty() {
            bail!("No surahs listed in {:?}", spec);
        }
        scope.assign(juz, SurahFilter::only(numbers));
    }
    Ok(Some(scope))
}

fn print_progress(learner: &LearnerProfile, curriculum: &Curriculum) {
    println!("{} ({})", learner.name, learner.id);
    println!("Level {}  Skor {}  Tingkat {}", learner.level, learner.cumulative_score, learner.difficulty().label());

    let badges: Vec<String> =
        Badge::unlocked(learner.level).iter().map(|b| format!("{} {}", b.icon(), b.name())).collect();
    if !badges.is_empty() {
        println!("Lencana: {}", badges.join(", "));
    }

    if learner.mastery.is_empty() {
        println!("Belum ada ayat yang dihafal");
        return;
    }
    println!("Surah terbaik: {}", curriculum.surah_name(best_surah(learner)).unwrap_or("-"));
    for (number, record) in &learner.mastery {
        let total = curriculum.surah_ayah_count(*number).unwrap_or(0);
        let mark = if record.is_completed { "\u{2713}" } else { " " };
        println!("{} {:>3} {:<20} {}/{} ayat", mark, number, record.surah_name, record.mastered_count(), total);
    }
}

fn print_scores(learner: &LearnerProfile, history: &ScoreHistory) {
    println!("{} ({})", learner.name, learner.id);
    if history.is_empty() {
        println!("Belum ada data skor");
        return;
    }
    println!(
        "{} sesi  Total {}  Terbaik {}  Benar {}%",
        history.sessions,
        history.total_score,
        history.best_score,
        history.accuracy_percent()
    );
    for entry in &history.recent {
        let juz: Vec<String> = entry.juz.iter().map(u32::to_string).collect();
        println!(
            "{:>12}  {:>4}  {:>2}/{:<2}  {:<6}  juz {}",
            entry.recorded_at,
            entry.score,
            entry.correct,
            entry.total,
            entry.difficulty.label(),
            juz.join(", ")
        );
    }
}

async fn run_voice(config: &Config, id: &str) -> Result<()> {
    let mut engine = open_engine(config, config.seed)?;
    let learner = engine.load_learner(id)?.clone();
    if !learner.voice_enabled {
        bail!("Voice sessions are off for {}. Enable them with `hafalan add-learner --voice`", learner.id);
    }
    let questions = engine.voice_questions(config.voice.question_count)?;

    let verifier = Verifier::from_config(&config.verifier);
    if !verifier.is_remote() {
        println!("(Pemeriksaan bacaan memakai pencocokan lokal)");
    }

    let mut quiz =
        VoiceQuiz::new(config.voice, &verifier, LineRecognizer::stdin(), PrintSynthesizer, AnnounceAudio);
    let cancel_token = quiz.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_token.cancel();
        }
    });

    let summary = quiz.run(&learner.name, &learner.scope.juz_numbers(), &questions, print_voice_event).await;

    for event in engine.record_voice_summary(&summary) {
        match event {
            GameEvent::SurahMastered(mastered) => println!("Surah {} sudah hafal!", mastered.surah_name),
            GameEvent::PersistencePending { pending } => {
                println!("{pending} perubahan belum tersimpan");
            }
            _ => {}
        }
    }
    Ok(())
}

fn print_voice_event(event: &VoiceEvent) {
    match event {
        VoiceEvent::QuestionShown { index, total, question } => {
            println!();
            println!("Soal {} dari {}: {} ayat {}", index + 1, total, question.surah_name, question.prompt_ayah_number);
            println!("  {}", question.prompt_text);
        }
        VoiceEvent::Listening { attempt } if *attempt > 1 => println!("Coba sekali lagi"),
        VoiceEvent::Resolved { outcome, points, .. } => match outcome {
            Outcome::Correct => println!("\u{2713} +{points}"),
            _ => println!("\u{2717}"),
        },
        VoiceEvent::Finished(summary) => {
            println!();
            println!("Benar {}/{}  Skor {}", summary.correct_count, summary.total, summary.score);
            if summary.cancelled {
                println!("(dihentikan)");
            }
        }
        _ => {}
    }
}

//! Wordle Tree CLI
//!
//! Generates the decision tree, replays it, and exposes the scorer.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use wordle_tree::generator::Generator;
use wordle_tree::{
    FeedbackMatrix, FeedbackPattern, GeneratorConfig, HardModeConstraints, LookupTree, Scorer, Vocabulary, Walker,
    Word, DEFAULT_DEPTH, DEFAULT_START, FEEDBACK_TABLE_PATH,
};

struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    fn new(message: &'static str) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let handle = thread::spawn(move || {
            let frames = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
            let mut stderr = io::stderr();
            let mut i = 0;
            while running_clone.load(Ordering::Relaxed) {
                let _ = write!(stderr, "\r{} {}", frames[i % frames.len()], message);
                let _ = stderr.flush();
                thread::sleep(Duration::from_millis(80));
                i += 1;
            }
            let _ = write!(stderr, "\r{}\r", " ".repeat(message.len() + 3));
            let _ = stderr.flush();
        });
        Self {
            running,
            handle: Some(handle),
        }
    }

    fn stop(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

#[derive(Parser)]
#[command(name = "wordle-tree", version, about = "Precomputed optimal Wordle strategy")]
struct Cli {
    /// Word list with one word per line; defaults to the embedded dictionary
    #[arg(long, global = true)]
    dictionary: Option<PathBuf>,

    /// Precomputed feedback matrix, used when present
    #[arg(long, global = true, env = "WORDLE_FEEDBACK_TABLE", default_value = FEEDBACK_TABLE_PATH)]
    feedback_table: PathBuf,

    /// Read the feedback matrix into memory instead of mapping it
    #[arg(long, global = true)]
    no_mmap: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the decision tree file
    Generate {
        #[arg(long, default_value_t = DEFAULT_DEPTH)]
        depth: u32,
        #[arg(long, default_value = DEFAULT_START, conflicts_with = "auto_start")]
        start: String,
        /// Let the scorer choose the opening word
        #[arg(long)]
        auto_start: bool,
        /// Output path (default: lookup_<start>.bin)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replay the tree against an answer
    Solve {
        word: String,
        #[command(flatten)]
        tree: TreeArgs,
        /// Print the trace as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay the tree against every vocabulary word
    Benchmark {
        #[command(flatten)]
        tree: TreeArgs,
    },
    /// Print a tree file's header and nodes
    Dump { path: PathBuf },
    /// Find the best opening word
    Start,
    /// Rank next guesses given a history of `word:pattern` pairs (e.g. roate:_y__g)
    Suggest {
        history: Vec<String>,
        /// Only consider guesses that respect revealed hints
        #[arg(long)]
        hard: bool,
        #[arg(long, default_value_t = 5)]
        top: usize,
    },
    /// Compute the feedback matrix and write it to --feedback-table
    FeedbackTable,
}

#[derive(clap::Args)]
struct TreeArgs {
    /// Tree file (default: lookup_<start>.bin)
    #[arg(long)]
    tree: Option<PathBuf>,
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    depth: u32,
    #[arg(long, default_value = DEFAULT_START)]
    start: String,
}

impl TreeArgs {
    fn load(&self) -> Result<LookupTree> {
        let start: Word = Word::from_input(&self.start)?;
        let path = self.tree.clone().unwrap_or_else(|| default_tree_path(start));
        LookupTree::load(&path, self.depth, start)
            .with_context(|| format!("loading tree {} (run `wordle-tree generate` first)", path.display()))
    }
}

fn default_tree_path(start: Word) -> PathBuf {
    PathBuf::from(format!("lookup_{start}.bin"))
}

fn load_vocabulary(path: Option<&Path>) -> Result<Vocabulary> {
    let vocab = match path {
        Some(path) => {
            Vocabulary::from_file(path).with_context(|| format!("reading dictionary {}", path.display()))?
        }
        None => wordle_tree::load_dictionary()?,
    };
    if vocab.is_empty() {
        bail!("word list is empty");
    }
    info!("loaded {} words", vocab.len());
    Ok(vocab)
}

fn parse_history(history: &[String]) -> Result<Vec<(Word, FeedbackPattern)>> {
    history
        .iter()
        .map(|item| -> Result<(Word, FeedbackPattern)> {
            let (word, pattern) = item
                .split_once(':')
                .with_context(|| format!("expected word:pattern, got {item:?}"))?;
            let pattern = FeedbackPattern::parse(pattern)
                .with_context(|| format!("invalid pattern {pattern:?} (use g, y and _ or b)"))?;
            Ok((Word::from_input(word)?, pattern))
        })
        .collect()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let vocab = load_vocabulary(cli.dictionary.as_deref())?;

    match cli.command {
        Command::FeedbackTable => {
            let spinner = Spinner::new("Computing feedback matrix...");
            let matrix = FeedbackMatrix::compute(&vocab);
            spinner.stop();
            matrix
                .write(&cli.feedback_table)
                .with_context(|| format!("writing {}", cli.feedback_table.display()))?;
            println!(
                "Wrote {} feedback entries to {}",
                matrix.size() * matrix.size(),
                cli.feedback_table.display()
            );
        }
        Command::Generate {
            depth,
            start,
            auto_start,
            output,
        } => {
            let matrix = FeedbackMatrix::load_or_fallback(&cli.feedback_table, &vocab, !cli.no_mmap);
            let config = GeneratorConfig {
                depth,
                start: if auto_start {
                    None
                } else {
                    Some(Word::from_input(&start)?)
                },
            };

            let started = Instant::now();
            let mut generator = Generator::new(&vocab, matrix.as_ref());
            let tree = generator.generate(&config)?;
            let path = output.unwrap_or_else(|| default_tree_path(tree.start));
            wordle_tree::codec::write_file(&tree, &path).with_context(|| format!("writing {}", path.display()))?;

            let stats = generator.stats();
            println!(
                "Wrote {} (start {}, {} nodes, height {}, {} backtracks) in {:.2?}",
                path.display(),
                tree.start,
                tree.node_count(),
                tree.height(),
                stats.backtracks,
                started.elapsed()
            );
        }
        Command::Solve { word, tree, json } => {
            let answer = Word::from_input(&word)?;
            vocab.require(answer)?;
            let lookup = tree.load()?;
            let trace = Walker::new(&lookup).solve(answer);

            if json {
                println!("{}", serde_json::to_string(&trace)?);
            } else {
                for (i, step) in trace.steps.iter().enumerate() {
                    println!("Guess {}: {} → {}", i + 1, step.guess, step.feedback);
                }
                println!();
            }
            trace.into_result()?;
        }
        Command::Benchmark { tree } => {
            let lookup = tree.load()?;
            let spinner = Spinner::new("Running benchmark...");
            let started = Instant::now();
            let report = Walker::new(&lookup).benchmark(&vocab);
            let elapsed = started.elapsed();
            spinner.stop();

            let total = vocab.len();
            println!("Guess distribution:");
            for (turns, count) in &report.distribution {
                let pct = *count as f64 / total as f64 * 100.0;
                let bar = "█".repeat((*count * 40 / total).max(1));
                println!("  {} guesses: {:>5} ({:>5.1}%) {}", turns, count, pct, bar);
            }
            println!();
            println!("Average guesses: {:.3}", report.average_turns());
            println!("Total words: {}", total);
            println!("Time elapsed: {:.2?}", elapsed);
            for failure in &report.failures {
                println!("Failed: {} ({:?})", failure.answer, failure.outcome);
            }
            if !report.failures.is_empty() {
                bail!("{} words not solved", report.failures.len());
            }
        }
        Command::Dump { path } => {
            let bytes = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            let lookup = LookupTree::from_bytes(bytes)?;
            lookup.dump(&mut io::stdout().lock())?;
        }
        Command::Start => {
            let matrix = FeedbackMatrix::load_or_fallback(&cli.feedback_table, &vocab, !cli.no_mmap);
            let scorer = Scorer::new(&vocab, matrix.as_ref());
            let all = vocab.all_indices();

            println!("Calculating the best starting word across {} words...", vocab.len());
            let started = Instant::now();
            let best = scorer
                .best_guess(&all, &all, None)
                .context("no starting word found")?;
            let analysis = scorer.analyze(best.index, &all);
            println!("Best starting word: {}", best.word);
            println!("  Entropy: {:.3} bits", analysis.entropy);
            println!("  Expected remaining: {:.1} words", analysis.expected_remaining);
            println!("Calculation time: {:.2?}", started.elapsed());
        }
        Command::Suggest { history, hard, top } => {
            let matrix = FeedbackMatrix::load_or_fallback(&cli.feedback_table, &vocab, !cli.no_mmap);
            let scorer = Scorer::new(&vocab, matrix.as_ref());
            let oracle = scorer.oracle();

            let mut candidates = vocab.all_indices();
            let mut constraints = HardModeConstraints::new();
            for (guess, pattern) in parse_history(&history)? {
                candidates = oracle.filter_word(&candidates, guess, pattern);
                constraints.update(guess, pattern);
            }
            let domain = if hard {
                constraints.domain(&vocab)
            } else {
                vocab.all_indices()
            };

            println!("Remaining possibilities: {}", candidates.len());
            if candidates.is_empty() {
                bail!("no words match this history");
            }
            println!("{:>4} {:>8} {:>8} {:>12} Possible?", "#", "Word", "Entropy", "Exp. Remain");
            println!("{}", "-".repeat(50));
            for (i, analysis) in scorer.top_guesses(&candidates, &domain, top).iter().enumerate() {
                println!(
                    "{:>4} {:>8} {:>8.3} {:>12.1} {}",
                    i + 1,
                    analysis.guess.word.to_string().to_uppercase(),
                    analysis.entropy,
                    analysis.expected_remaining,
                    if analysis.is_possible_answer { "✓" } else { "" }
                );
            }
        }
    }
    Ok(())
}

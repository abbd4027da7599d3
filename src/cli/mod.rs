// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, built with clap.
// All work is delegated to Layer 2 (application); this layer
// only turns args into configs and prints the summaries.
//
// Five commands, one per stage:
//   1. `stance`    — normalise and split a stance dataset
//   2. `score`     — compare candidate translations
//   3. `aggregate` — merge tweet files
//   4. `filter`    — classify and keep safe rows
//   5. `translate` — batch-translate text columns
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{AggregateArgs, Commands, FilterArgs, ScoreArgs, StanceArgs, TranslateArgs};

#[derive(Parser, Debug)]
#[command(
    name = "stance-prep",
    version = "0.1.0",
    about = "Prepare stance and tweet datasets: split, score translations, merge, filter, translate."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Stance(args)    => run_stance(args),
            Commands::Score(args)     => run_score(args),
            Commands::Aggregate(args) => run_aggregate(args),
            Commands::Filter(args)    => run_filter(args),
            Commands::Translate(args) => run_translate(args),
        }
    }
}

fn run_stance(args: StanceArgs) -> Result<()> {
    use crate::application::stance_use_case::StanceUseCase;

    tracing::info!("Normalising stances in: {}", args.input);
    let summary = StanceUseCase::new(args.try_into()?).execute()?;

    println!("Training set size: {}", summary.train);
    println!("Validation set size: {}", summary.validation);
    println!("Test set size: {}", summary.test);
    Ok(())
}

fn run_score(args: ScoreArgs) -> Result<()> {
    use crate::application::score_use_case::ScoreUseCase;

    let rows = ScoreUseCase::new(args.into()).execute()?;

    for row in &rows {
        println!("BLEU Score for {} Translations: {:.2}", row.candidate, row.bleu);
        println!("ChrF Score for {} Translations: {:.2}", row.candidate, row.chrf);
        println!("METEOR Score for {} Translations: {:.4}", row.candidate, row.meteor);
    }
    Ok(())
}

fn run_aggregate(args: AggregateArgs) -> Result<()> {
    use crate::application::aggregate_use_case::AggregateUseCase;

    let summary = AggregateUseCase::new(args.into()).execute()?;

    println!(
        "Combined {} rows from {} files ({} skipped) into {}",
        summary.rows,
        summary.processed.len(),
        summary.failed.len(),
        summary.output_path.display()
    );
    Ok(())
}

fn run_filter(args: FilterArgs) -> Result<()> {
    use crate::application::filter_use_case::FilterUseCase;

    let output  = args.output.clone();
    let summary = FilterUseCase::new(args.into()).execute()?;

    println!(
        "Kept {} of {} rows. Filtered data saved to {}",
        summary.rows_kept, summary.rows_in, output
    );
    Ok(())
}

fn run_translate(args: TranslateArgs) -> Result<()> {
    use crate::application::translate_use_case::TranslateUseCase;

    let output  = args.output.clone();
    let summary = TranslateUseCase::new(args.into()).execute()?;

    println!(
        "Translation completed: {} rows, columns [{}] saved to {}",
        summary.rows,
        summary.columns.join(", "),
        output
    );
    Ok(())
}

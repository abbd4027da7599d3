// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// One subcommand per pipeline stage. Every default value a
// stage uses lives here; the application layer only ever
// sees the config structs built from these args.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::{
    aggregate_use_case::AggregateConfig,
    filter_use_case::FilterConfig,
    score_use_case::{Candidate, CleanJob, ScoreConfig},
    stance_use_case::StanceConfig,
    translate_use_case::TranslateConfig,
};
use crate::data::splitter::SplitConfig;
use crate::domain::{error::PrepError, stance::LabelMap};

/// The five pipeline stages
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drop unrelated stances, encode labels, write a stratified 70/15/15 split
    Stance(StanceArgs),

    /// Score candidate translations with BLEU, chrF and METEOR
    Score(ScoreArgs),

    /// Merge a directory of tab-separated tweet files into one CSV
    Aggregate(AggregateArgs),

    /// Classify each text and keep only the safe rows
    Filter(FilterArgs),

    /// Translate every text column of a CSV in batches
    Translate(TranslateArgs),
}

// ─── stance ───────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct StanceArgs {
    /// Labelled stance CSV
    #[arg(long, default_value = "train_stances.csv")]
    pub input: String,

    #[arg(long, default_value = "fnc_train.csv")]
    pub train_out: String,

    #[arg(long, default_value = "fnc_validation.csv")]
    pub val_out: String,

    #[arg(long, default_value = "fnc_test.csv")]
    pub test_out: String,

    /// Column holding the stance category
    #[arg(long, default_value = "Stance")]
    pub label_column: String,

    /// Category removed before encoding
    #[arg(long, default_value = "unrelated")]
    pub exclude: String,

    /// Category encoding as NAME=CODE with CODE in {-1, 0, 1}; repeat for each category
    #[arg(
        long = "label",
        value_parser = parse_label,
        default_values = ["agree=1", "disagree=-1", "discuss=0"]
    )]
    pub labels: Vec<(String, i64)>,

    /// Seed for the per-class shuffle
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl TryFrom<StanceArgs> for StanceConfig {
    type Error = PrepError;

    fn try_from(a: StanceArgs) -> Result<Self, PrepError> {
        Ok(StanceConfig {
            input:        a.input,
            train_out:    a.train_out,
            val_out:      a.val_out,
            test_out:     a.test_out,
            label_column: a.label_column,
            excluded:     a.exclude,
            label_map:    LabelMap::new(a.labels)?,
            split:        SplitConfig { seed: a.seed, ..SplitConfig::default() },
        })
    }
}

fn parse_label(s: &str) -> Result<(String, i64), String> {
    match s.split_once('=') {
        Some((name, code)) if !name.is_empty() => code
            .trim()
            .parse::<i64>()
            .map(|code| (name.to_string(), code))
            .map_err(|_| format!("expected an integer code in '{s}'")),
        _ => Err(format!("expected NAME=CODE, got '{s}'")),
    }
}

// ─── score ────────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Reference translations (first column is used)
    #[arg(long, default_value = "example.csv")]
    pub reference: String,

    /// Candidate as NAME=PATH; repeat for each candidate
    #[arg(
        long = "candidate",
        value_parser = parse_candidate,
        default_values = ["Helsinki=translated_tryout.csv", "Google=headlines_only2.csv"]
    )]
    pub candidates: Vec<Candidate>,

    /// Quote-stripped copy as SRC:DST; repeat as needed
    #[arg(
        long = "clean",
        value_parser = parse_clean_job,
        default_values = [
            "translated_tryout.csv:translated_tryout_cleaned.csv",
            "headlines_only2.csv:headlines_only_cleaned.csv",
        ]
    )]
    pub clean: Vec<CleanJob>,

    /// Also write the scores to this CSV
    #[arg(long)]
    pub report: Option<String>,
}

impl From<ScoreArgs> for ScoreConfig {
    fn from(a: ScoreArgs) -> Self {
        ScoreConfig {
            reference:  a.reference,
            candidates: a.candidates,
            clean:      a.clean,
            report:     a.report,
        }
    }
}

fn parse_candidate(s: &str) -> Result<Candidate, String> {
    match s.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => Ok(Candidate::new(name, path)),
        _ => Err(format!("expected NAME=PATH, got '{s}'")),
    }
}

fn parse_clean_job(s: &str) -> Result<CleanJob, String> {
    match s.split_once(':') {
        Some((src, dst)) if !src.is_empty() && !dst.is_empty() => Ok(CleanJob::new(src, dst)),
        _ => Err(format!("expected SRC:DST, got '{s}'")),
    }
}

// ─── aggregate ────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct AggregateArgs {
    /// Directory of tab-separated tweet files
    #[arg(long, default_value = "datasets/table3")]
    pub dir: String,

    /// Combined file name, written inside --dir and never read as input
    #[arg(long, default_value = "combined_cleaned_table3.csv")]
    pub output: String,

    #[arg(long, default_value = "csv")]
    pub extension: String,

    #[arg(long, default_value = "Text")]
    pub text_column: String,

    #[arg(long, default_value = "Class")]
    pub class_column: String,
}

impl From<AggregateArgs> for AggregateConfig {
    fn from(a: AggregateArgs) -> Self {
        AggregateConfig {
            dir:          a.dir,
            output:       a.output,
            extension:    a.extension,
            text_column:  a.text_column,
            class_column: a.class_column,
        }
    }
}

// ─── filter ───────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Input CSV; repeat to concatenate several
    #[arg(long = "input", default_values = ["datasets/table3/combined_cleaned_table3.csv"])]
    pub inputs: Vec<String>,

    #[arg(long, default_value = "datasets/filtered/filtered_table_3_data.csv")]
    pub output: String,

    /// Directory with model_config.json, model.mpk.gz and tokenizer.json
    #[arg(long, default_value = "models/classifier")]
    pub model_dir: String,

    #[arg(long, default_value = "Text")]
    pub text_column: String,

    /// Name of the appended class column
    #[arg(long, default_value = "is_hate")]
    pub flag_column: String,

    /// Class index kept in the output
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub safe_class: i64,

    /// Tokens per text fed to the classifier
    #[arg(long, default_value_t = 128)]
    pub max_len: usize,
}

impl From<FilterArgs> for FilterConfig {
    fn from(a: FilterArgs) -> Self {
        FilterConfig {
            inputs:      a.inputs,
            output:      a.output,
            model_dir:   a.model_dir,
            text_column: a.text_column,
            flag_column: a.flag_column,
            safe_class:  a.safe_class,
            max_len:     a.max_len,
        }
    }
}

// ─── translate ────────────────────────────────────────────────────────────────
#[derive(Args, Debug)]
pub struct TranslateArgs {
    #[arg(long, default_value = "headlines_only.csv")]
    pub input: String,

    #[arg(long, default_value = "translated_example.csv")]
    pub output: String,

    /// Directory with model_config.json, model.mpk.gz and tokenizer.json
    #[arg(long, default_value = "models/translator")]
    pub model_dir: String,

    /// Texts per translation call
    #[arg(long, default_value_t = 16)]
    pub batch_size: usize,

    /// Maximum generated tokens per text
    #[arg(long, default_value_t = 512)]
    pub max_len: usize,
}

impl From<TranslateArgs> for TranslateConfig {
    fn from(a: TranslateArgs) -> Self {
        TranslateConfig {
            input:      a.input,
            output:     a.output,
            model_dir:  a.model_dir,
            batch_size: a.batch_size,
            max_len:    a.max_len,
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn parse(args: &[&str]) -> Commands {
        Cli::try_parse_from(std::iter::once("stance-prep").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    #[test]
    fn test_score_defaults_match_config_defaults() {
        let Commands::Score(args) = parse(&["score"]) else { panic!("expected score") };
        let config: ScoreConfig = args.into();
        let expected = ScoreConfig::default();
        assert_eq!(config.candidates, expected.candidates);
        assert_eq!(config.clean, expected.clean);
        assert_eq!(config.report, None);
    }

    #[test]
    fn test_repeated_candidates_replace_defaults() {
        let Commands::Score(args) =
            parse(&["score", "--candidate", "A=a.csv", "--candidate", "B=b.csv", "--candidate", "C=c.csv"])
        else {
            panic!("expected score")
        };
        let names: Vec<_> = args.candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_malformed_candidate_is_rejected() {
        let res = Cli::try_parse_from(["stance-prep", "score", "--candidate", "no-equals"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_stance_seed_flows_into_split() {
        let Commands::Stance(args) = parse(&["stance", "--seed", "7"]) else { panic!("expected stance") };
        let config = StanceConfig::try_from(args).unwrap();
        assert_eq!(config.split.seed, 7);
        assert_eq!(config.excluded, "unrelated");
        assert_eq!(config.label_map, LabelMap::fnc());
    }

    #[test]
    fn test_stance_labels_replace_defaults() {
        let Commands::Stance(args) = parse(&["stance", "--label", "pro=1", "--label", "con=-1"]) else {
            panic!("expected stance")
        };
        let config = StanceConfig::try_from(args).unwrap();
        assert_eq!(config.label_map.encode("con"), Some(-1));
        assert_eq!(config.label_map.encode("agree"), None);
    }

    #[test]
    fn test_stance_label_outside_code_range_is_rejected() {
        let Commands::Stance(args) = parse(&["stance", "--label", "agree=2"]) else { panic!("expected stance") };
        let err = StanceConfig::try_from(args).unwrap_err();
        assert!(matches!(err, PrepError::InvalidConfig(_)));
    }

    #[test]
    fn test_malformed_label_is_rejected() {
        assert!(Cli::try_parse_from(["stance-prep", "stance", "--label", "agree"]).is_err());
        assert!(Cli::try_parse_from(["stance-prep", "stance", "--label", "agree=yes"]).is_err());
    }

    #[test]
    fn test_filter_accepts_negative_safe_class() {
        let Commands::Filter(args) = parse(&["filter", "--safe-class", "-1"]) else { panic!("expected filter") };
        assert_eq!(args.safe_class, -1);
        assert_eq!(args.inputs.len(), 1);
    }
}

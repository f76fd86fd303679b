//! Developer utility to train both forests on a student CSV and report metrics.

use std::path::PathBuf;

use gradecast::dataset::{Outcome, load_dataset};
use gradecast::logging;
use gradecast::ml::metrics::precision_recall_by_class;
use gradecast::model::{TrainOptions, train_models};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }
    let dataset = load_dataset(&options.dataset).map_err(|err| err.to_string())?;
    let models = train_models(&dataset, &options.train).map_err(|err| err.to_string())?;

    println!("dataset: {} ({} rows)", dataset.fingerprint(), dataset.len());
    println!(
        "split: {} train / {} test (seed {})",
        models.train_rows, models.test_rows, models.options.seed
    );
    println!("pass/fail accuracy: {:.4}", models.accuracy);
    println!("percentage r2: {:.4}", models.r2);
    println!("percentage mae: {:.3}", models.mae);

    let cm = models.confusion_matrix();
    for (stats, outcome) in precision_recall_by_class(&cm).iter().zip(Outcome::ALL) {
        println!(
            "class {:<5} precision={:.3}  recall={:.3}  support={}",
            outcome, stats.precision, stats.recall, stats.support
        );
    }
    println!("confusion matrix (rows=true, cols=pred):");
    for truth in 0..cm.n_classes {
        let mut row = String::new();
        for pred in 0..cm.n_classes {
            row.push_str(&format!("{:6}", cm.get(truth, pred)));
        }
        println!("{row}");
    }

    if let Some(out) = &options.model_out {
        models.save_json(out).map_err(|err| err.to_string())?;
        println!("saved models to {}", out.display());
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct CliOptions {
    dataset: PathBuf,
    model_out: Option<PathBuf>,
    train: TrainOptions,
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut dataset: Option<PathBuf> = None;
    let mut model_out: Option<PathBuf> = None;
    let mut train = TrainOptions::default();

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--dataset" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--dataset requires a value".to_string())?;
                dataset = Some(PathBuf::from(value));
            }
            "--out" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--out requires a value".to_string())?;
                model_out = Some(PathBuf::from(value));
            }
            "--trees" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--trees requires a value".to_string())?;
                train.n_trees = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid --trees value: {value}"))?;
            }
            "--seed" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--seed requires a value".to_string())?;
                train.seed = value
                    .parse::<u64>()
                    .map_err(|_| format!("Invalid --seed value: {value}"))?;
            }
            "--test-fraction" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--test-fraction requires a value".to_string())?;
                train.test_fraction = value
                    .parse::<f64>()
                    .map_err(|_| format!("Invalid --test-fraction value: {value}"))?;
            }
            "--max-depth" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--max-depth requires a value".to_string())?;
                train.max_depth = Some(
                    value
                        .parse::<usize>()
                        .map_err(|_| format!("Invalid --max-depth value: {value}"))?,
                );
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    let dataset = dataset.ok_or_else(help_text)?;
    Ok(CliOptions {
        dataset,
        model_out,
        train,
    })
}

fn help_text() -> String {
    [
        "gradecast-train",
        "",
        "Trains the pass/fail and semester percentage forests and prints held-out metrics.",
        "",
        "Usage:",
        "  gradecast-train --dataset <file.csv> [--out models.json] [options]",
        "",
        "Options:",
        "  --dataset <file>       Student CSV (required).",
        "  --out <file>           Write the trained models as JSON.",
        "  --trees <n>            Trees per forest (default: 250).",
        "  --seed <n>             Seed for the split and the trees (default: 42).",
        "  --test-fraction <f64>  Held-out share of rows (default: 0.2).",
        "  --max-depth <n>        Depth limit per tree (default: unlimited).",
    ]
    .join("\n")
}

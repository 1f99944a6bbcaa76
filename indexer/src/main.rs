use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lossy_core::corpus::{parse_json, parse_jsonl, parse_sgml};
use lossy_core::report::SizeReport;
use lossy_core::tokenizer::Tokenizer;
use lossy_core::{
    validate_query, ArtifactFormat, ArtifactStore, CasePolicy, CompressionPipeline, Document,
    IndexBuilder, MatchMode, PipelineConfig, QueryEngine, QueryNormalizer, Stage,
};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs;
use std::path::{Path, PathBuf};

mod render;

const SAMPLE_QUERIES: [(&str, &[u32]); 3] = [
    (
        "abolition",
        &[
            209, 274, 318, 893, 991, 4670, 4705, 5432, 7051, 8681, 9774, 11122, 12241, 12640,
            12847, 12887, 12916, 16292, 17703, 18403, 19508, 19543,
        ],
    ),
    ("lifo", &[588, 2221, 6084, 6104, 6461, 7061, 8262, 9519, 11320, 11333, 16844, 17808, 18610]),
    ("zweig", &[20518]),
];

const CHALLENGE_QUERIES: [&str; 3] = ["interesting", "progress", "powerful"];

#[derive(Parser)]
#[command(name = "indexer")]
#[command(
    about = "Build an inverted index and measure lossy dictionary compression",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone)]
struct PipelineArgs {
    /// JSON pipeline configuration; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,
    /// Tokenizer case policy: raw | preserve-acronyms
    #[arg(long)]
    case_policy: Option<CasePolicy>,
    /// Artifact encoding: json | bincode
    #[arg(long)]
    format: Option<ArtifactFormat>,
    /// Keep digits in tokens so the number-removal stage has work to do
    #[arg(long, default_value_t = false)]
    keep_digits: bool,
}

impl PipelineArgs {
    fn resolve(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)
                .with_context(|| format!("loading pipeline config {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        if let Some(policy) = self.case_policy {
            config.tokenizer.case_policy = policy;
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if self.keep_digits {
            config.tokenizer.strip_digits = false;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Tokenize a corpus, build the naive index and run the compression pipeline
    Build {
        /// Input path (file or directory of .sgm/.json/.jsonl files)
        #[arg(long)]
        input: String,
        /// Output artifact directory
        #[arg(long, default_value = "./output")]
        output: String,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// Run the compression pipeline on an existing naive index
    Compress {
        #[arg(long, default_value = "./output")]
        artifacts: String,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// Look up one or more terms in a stage's index
    Query {
        #[arg(long, default_value = "./output")]
        artifacts: String,
        /// naive | no-numbers | case-folded | stopwords-N | stemmed
        #[arg(long, default_value = "stemmed")]
        stage: Stage,
        /// exact | substring
        #[arg(long, default_value = "exact")]
        mode: MatchMode,
        #[arg(long)]
        format: Option<ArtifactFormat>,
        /// Pass terms through unchanged instead of normalizing them like the stage
        #[arg(long, default_value_t = false)]
        raw: bool,
        /// Also persist the results as queries_<name>.json
        #[arg(long)]
        save_as: Option<String>,
        #[arg(required = true)]
        terms: Vec<String>,
    },
    /// Run a built-in query batch: sample | challenge
    Batch {
        #[arg(long, default_value = "./output")]
        artifacts: String,
        name: String,
        #[arg(long, default_value = "case-folded")]
        stage: Stage,
        #[arg(long, default_value = "exact")]
        mode: MatchMode,
        #[arg(long)]
        format: Option<ArtifactFormat>,
    },
    /// Prompt for single-term queries until `:q`, Ctrl-C or EOF
    Interactive {
        #[arg(long, default_value = "./output")]
        artifacts: String,
        #[arg(long, default_value = "case-folded")]
        stage: Stage,
        #[arg(long, default_value = "exact")]
        mode: MatchMode,
        #[arg(long)]
        format: Option<ArtifactFormat>,
    },
    /// Print the size table of the last pipeline run
    Report {
        #[arg(long, default_value = "./output")]
        artifacts: String,
    },
    /// Build, compress, then run the sample and challenge batches
    Run {
        #[arg(long)]
        input: String,
        #[arg(long, default_value = "./output")]
        output: String,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, pipeline } => {
            let config = pipeline.resolve()?;
            build(&input, &output, &config)
        }
        Commands::Compress { artifacts, pipeline } => {
            let config = pipeline.resolve()?;
            let store = ArtifactStore::new(&artifacts).with_format(config.format);
            let output = CompressionPipeline::new(&config, &store)
                .run_from_store()
                .context("compression pipeline failed")?;
            render::print_report(&SizeReport::from_stages(&output.sizes()));
            Ok(())
        }
        Commands::Query { artifacts, stage, mode, format, raw, save_as, terms } => {
            let store = ArtifactStore::new(&artifacts).with_format(format.unwrap_or_default());
            let engine = open_engine(&store, stage)?;
            let normalizer = if raw {
                QueryNormalizer::identity()
            } else {
                QueryNormalizer::for_stage(stage)
            };
            let batch = engine.run_batch(&terms, mode, &normalizer);
            for (term, postings) in batch.iter() {
                render::print_postings(term, postings);
            }
            if let Some(name) = save_as {
                let path = store.save_query_batch(&name, &batch)?;
                println!("\nSaved results to {}", path.display());
            }
            Ok(())
        }
        Commands::Batch { artifacts, name, stage, mode, format } => {
            let store = ArtifactStore::new(&artifacts).with_format(format.unwrap_or_default());
            run_named_batch(&store, &name, stage, mode)
        }
        Commands::Interactive { artifacts, stage, mode, format } => {
            let store = ArtifactStore::new(&artifacts).with_format(format.unwrap_or_default());
            interactive(&store, stage, mode)
        }
        Commands::Report { artifacts } => {
            let store = ArtifactStore::new(&artifacts);
            let manifest = store
                .load_manifest()
                .context("no pipeline run recorded, run `build` first")?;
            println!("{} documents, run at {}", manifest.num_docs, manifest.created_at);
            render::print_report(&SizeReport::from_stages(&manifest.stages));
            Ok(())
        }
        Commands::Run { input, output, pipeline } => {
            let config = pipeline.resolve()?;
            build(&input, &output, &config)?;
            let store = ArtifactStore::new(&output).with_format(config.format);
            // the sample expectations come from a lower-cased uncompressed index
            println!("\nSample queries against the case-folded index");
            run_named_batch(&store, "sample", Stage::CaseFolded, MatchMode::Exact)?;
            println!("\nSample queries against the compressed index");
            run_named_batch(&store, "sample", Stage::Stemmed, MatchMode::Substring)?;
            println!("\nChallenge queries");
            run_named_batch(&store, "challenge", Stage::Stemmed, MatchMode::Substring)
        }
    }
}

fn open_engine(store: &ArtifactStore, stage: Stage) -> Result<QueryEngine> {
    QueryEngine::open(store, stage).with_context(|| {
        let root = store.root().display();
        format!("cannot open the {stage} index under {root}, run `build` first")
    })
}

fn corpus_files(input: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "sgm" | "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    }
    files.sort();
    files
}

fn read_corpus_file(file: &Path) -> Result<Vec<Document>> {
    // Reuters files are not guaranteed to be valid UTF-8
    let bytes = fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    let docs = match file.extension().and_then(|s| s.to_str()) {
        Some("sgm") => parse_sgml(&text),
        Some("jsonl") => parse_jsonl(&text)?,
        Some("json") => parse_json(&text)?,
        _ => {
            tracing::warn!(file = %file.display(), "skipping file with unknown extension");
            Vec::new()
        }
    };
    Ok(docs)
}

fn build(input: &str, output: &str, config: &PipelineConfig) -> Result<()> {
    let files = corpus_files(Path::new(input));
    if files.is_empty() {
        anyhow::bail!("no corpus files found under {input}");
    }
    tracing::info!(files = files.len(), "found corpus files");

    let mut builder = IndexBuilder::new(Tokenizer::new(config.tokenizer));
    for file in &files {
        let docs = read_corpus_file(file)?;
        let n = builder
            .add_documents(&docs)
            .with_context(|| format!("indexing {}", file.display()))?;
        tracing::info!(file = %file.display(), docs = n, "ingested corpus file");
    }
    let naive = builder.build();

    let store = ArtifactStore::new(output).with_format(config.format);
    store.save_index(Stage::Naive, &naive)?;
    tracing::info!(terms = naive.len(), postings = naive.postings_count(), "naive index persisted");

    let result = CompressionPipeline::new(config, &store)
        .run(naive)
        .context("compression pipeline failed")?;
    render::print_report(&SizeReport::from_stages(&result.sizes()));
    tracing::info!(output, "index build complete");
    Ok(())
}

fn run_named_batch(store: &ArtifactStore, name: &str, stage: Stage, mode: MatchMode) -> Result<()> {
    let engine = open_engine(store, stage)?;
    let normalizer = QueryNormalizer::for_stage(stage);
    let batch = match name {
        "sample" => {
            let batch = engine.run_batch(SAMPLE_QUERIES.iter().map(|(t, _)| t), mode, &normalizer);
            let mut valid = 0;
            for (term, expected) in SAMPLE_QUERIES {
                let got = batch.get(term).unwrap_or_default();
                render::print_postings(term, got);
                if got == expected {
                    valid += 1;
                } else {
                    println!("Query \"{term}\" differs from the expected Reuters-21578 result");
                }
            }
            let total = SAMPLE_QUERIES.len();
            println!("\n{valid} of {total} sample queries match the expected results");
            batch
        }
        "challenge" => {
            let batch = engine.run_batch(CHALLENGE_QUERIES, mode, &normalizer);
            for (term, postings) in batch.iter() {
                render::print_postings(term, postings);
            }
            batch
        }
        other => anyhow::bail!("unknown batch `{other}`, expected sample or challenge"),
    };
    let path = store.save_query_batch(&format!("{name}_{stage}"), &batch)?;
    println!("\nSaved results to {}", path.display());
    Ok(())
}

fn interactive(store: &ArtifactStore, stage: Stage, mode: MatchMode) -> Result<()> {
    let engine = open_engine(store, stage)?;
    let normalizer = QueryNormalizer::for_stage(stage);
    let mut rl = DefaultEditor::new()?;

    println!("Searching the {stage} index (:q, Ctrl-C or Ctrl-D to quit)");

    loop {
        let line = match rl.readline("term> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };
        let line = line.trim();
        if line == ":q" {
            break;
        }
        if !line.is_empty() {
            let _ = rl.add_history_entry(line);
        }
        match validate_query(line) {
            Ok(term) => {
                let postings = engine.search(&normalizer.prepare(&term), mode);
                render::print_postings(&term, &postings);
            }
            Err(rejection) => println!("\nRejected: {rejection}"),
        }
    }
    Ok(())
}

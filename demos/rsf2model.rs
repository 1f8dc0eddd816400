use std::path::PathBuf;

use clap::{Parser, Subcommand};

use kconfig_model::config::TranslatorConfig;
use kconfig_model::model::Model;
use kconfig_model::rewrite::rewrite;
use kconfig_model::rsf::RsfReader;
use kconfig_model::translate::translate;

#[derive(Debug, Parser)]
#[command(author, version, about = "Extracts presence implications from Kconfig dumps")]
struct Cli {
    /// Print debug output.
    #[clap(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Translate an .rsf dump into a .model file.
    Translate {
        #[arg(value_name = "RSF")]
        rsf: PathBuf,

        /// Output file (default: stdout).
        #[clap(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Mark items with `depends on` always-on if they default to `y`.
        #[clap(long)]
        lenient_always_on: bool,
    },

    /// Normalize a single expression against an .rsf dump.
    Rewrite {
        #[arg(value_name = "RSF")]
        rsf: PathBuf,

        #[arg(value_name = "EXPR")]
        expr: String,

        /// Let `m` count as present.
        #[clap(long)]
        module: bool,
    },

    /// List the leaf features of a model.
    Leaves {
        #[arg(value_name = "MODEL")]
        model: PathBuf,
    },

    /// List the symbols reachable from the given ones.
    Slice {
        #[arg(value_name = "MODEL")]
        model: PathBuf,

        #[arg(value_name = "SYMBOL", required = true)]
        symbols: Vec<String>,
    },

    /// Print the constraints relevant for the given symbols.
    Intersect {
        #[arg(value_name = "MODEL")]
        model: PathBuf,

        #[arg(value_name = "SYMBOL", required = true)]
        symbols: Vec<String>,
    },

    /// Render (a slice of) a model in DOT format.
    Dot {
        #[arg(value_name = "MODEL")]
        model: PathBuf,

        #[arg(value_name = "SYMBOL")]
        symbols: Vec<String>,
    },
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        if args.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    match args.command {
        Command::Translate {
            rsf,
            output,
            lenient_always_on,
        } => {
            let time_total = std::time::Instant::now();
            let rsf = RsfReader::load(&rsf)?;
            let config = TranslatorConfig::default().with_strict_always_on(!lenient_always_on);
            let model = translate(&rsf, &config);
            match output {
                Some(path) => model.save(path)?,
                None => print!("{}", model),
            }
            log::info!("Translated in {:.3} s", time_total.elapsed().as_secs_f64());
        }
        Command::Rewrite { rsf, expr, module } => {
            let rsf = RsfReader::load(&rsf)?;
            println!("{}", rewrite(&rsf, &expr, module)?);
        }
        Command::Leaves { model } => {
            let model = Model::load(&model)?;
            for leaf in model.leaf_features() {
                println!("{}", leaf);
            }
        }
        Command::Slice { model, symbols } => {
            let model = Model::load(&model)?;
            for symbol in model.slice_symbols(&symbols) {
                println!("{}", symbol);
            }
        }
        Command::Intersect { model, symbols } => {
            let model = Model::load(&model)?;
            let result = model.intersect(&symbols)?;
            println!("{}", result.formula);
            log::info!("{} valid items", result.valid_items);
            if !result.missing.is_empty() {
                let missing: Vec<_> = result.missing.into_iter().collect();
                log::warn!("Missing items: {}", missing.join(", "));
            }
            if !model.is_complete() {
                log::warn!("Model is incomplete");
            }
        }
        Command::Dot { model, symbols } => {
            let model = Model::load(&model)?;
            print!("{}", model.to_dot(&symbols)?);
        }
    }

    Ok(())
}

mod file;
mod project;

use clap::{Parser, Subcommand};
use cljscope_api::Direction;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cljscope",
    version,
    about = "Structural analysis of Clojure source files",
    long_about = "cljscope reconciles a lexical boundary scan with a tree-sitter parse to extract \
                  definitions, namespaces and call graphs from Clojure code, navigate its \
                  s-expressions and classify its idioms. Every command prints JSON."
)]
pub struct Cli {
    /// JSON configuration file; defaults apply when omitted
    #[arg(long, global = true, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Also write logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Zero-based cursor position.
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct CursorArgs {
    #[arg(long)]
    pub line: usize,
    #[arg(long)]
    pub column: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the reconciled definition forms of a file
    Forms {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Extract function definitions
    Functions {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Glob on the function name, e.g. `tool-*`
        #[arg(short, long)]
        pattern: Option<String>,
    },
    /// Extract the namespace declaration
    Namespace {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Report every namespace declared in the file, not just the first
        #[arg(long)]
        all: bool,
    },
    /// Extract macro definitions
    Macros {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(short, long)]
        pattern: Option<String>,
    },
    /// Extract protocols, interfaces, types and records
    Types {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(short, long)]
        pattern: Option<String>,
    },
    /// Trace calls between the functions of a file
    Calls {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Restrict the graph to one function
        #[arg(short, long)]
        target: Option<String>,
    },
    /// Show the chain of forms enclosing a cursor
    Locate {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[command(flatten)]
        cursor: CursorArgs,
    },
    /// Move from a cursor to a neighbouring form
    Navigate {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[command(flatten)]
        cursor: CursorArgs,
        /// in, out, next, previous or top
        #[arg(short, long)]
        direction: Direction,
    },
    /// Find the delimiter matching the one under the cursor
    Match {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[command(flatten)]
        cursor: CursorArgs,
    },
    /// Classify idioms and score their density
    Idioms {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Idiom kinds to report; all kinds when omitted
        #[arg(short, long = "kind")]
        kinds: Vec<String>,
    },
    /// Summarize idiom usage: totals and the most frequent operators
    Summary {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Report concurrency, state, destructuring and call graph complexity
    Complexity {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Inspect the form under a cursor: context, navigation, idioms, suggestions
    Inspect {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[command(flatten)]
        cursor: CursorArgs,
    },
    /// Extract functions from every Clojure file under a directory
    Batch {
        #[arg(value_name = "ROOT")]
        root: PathBuf,
        /// Glob on the function name
        #[arg(short, long)]
        pattern: Option<String>,
        /// Glob on the file name
        #[arg(long)]
        files: Option<String>,
    },
    /// Build the namespace dependency graph of a directory
    Deps {
        #[arg(value_name = "ROOT")]
        root: PathBuf,
        /// Print the transitive dependencies of this namespace instead of the graph
        #[arg(long, value_name = "NAMESPACE")]
        tree: Option<String>,
        /// Levels to follow with --tree
        #[arg(long, default_value_t = 5, requires = "tree")]
        depth: usize,
    },
    /// Print the effective configuration, or its JSON schema
    Config {
        #[arg(long)]
        schema: bool,
    },
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _guard = cljscope_runtime::init_logging("cli", cli.verbose);

    let config = cljscope_runtime::load_config(cli.config.as_deref())?;
    if let Commands::Config { schema } = cli.command {
        return if schema {
            print_json(&schemars::schema_for!(cljscope_core::AnalyzerConfig))
        } else {
            print_json(&config)
        };
    }

    let analyzer = cljscope_runtime::build_default_analyzer(config)?;
    let analyzer = analyzer.as_ref();

    match cli.command {
        Commands::Forms { file } => file::forms(analyzer, &file),
        Commands::Functions { file, pattern } => {
            file::functions(analyzer, &file, pattern.as_deref())
        }
        Commands::Namespace { file, all } => file::namespace(analyzer, &file, all),
        Commands::Macros { file, pattern } => file::macros(analyzer, &file, pattern.as_deref()),
        Commands::Types { file, pattern } => file::types(analyzer, &file, pattern.as_deref()),
        Commands::Calls { file, target } => file::calls(analyzer, &file, target.as_deref()),
        Commands::Locate { file, cursor } => file::locate(analyzer, &file, cursor),
        Commands::Navigate {
            file,
            cursor,
            direction,
        } => file::navigate(analyzer, &file, cursor, direction),
        Commands::Match { file, cursor } => file::matching(analyzer, &file, cursor),
        Commands::Idioms { file, kinds } => file::idioms(analyzer, &file, &kinds),
        Commands::Summary { file } => file::summary(analyzer, &file),
        Commands::Complexity { file } => file::complexity(analyzer, &file),
        Commands::Inspect { file, cursor } => file::inspect(analyzer, &file, cursor),
        Commands::Batch {
            root,
            pattern,
            files,
        } => project::batch(analyzer, &root, pattern.as_deref(), files.as_deref()),
        Commands::Deps { root, tree, depth } => match tree {
            Some(namespace) => project::dependency_tree(analyzer, &root, &namespace, depth),
            None => project::deps(analyzer, &root),
        },
        Commands::Config { .. } => Ok(()),
    }
}

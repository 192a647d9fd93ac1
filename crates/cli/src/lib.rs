mod args;
mod query;
mod resources;
mod roots;

pub use args::ScanArgs;
pub use query::QueryKind;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "classscan",
    version,
    about = "Classpath resource discovery and class indexing",
    long_about = "Classscan walks the roots of a classpath (directories and jar/zip archives), \
                  indexes the resources that match the given prefixes and patterns, and answers \
                  structural questions about the class files it finds."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every matching resource name
    Resources {
        #[command(flatten)]
        scan: ScanArgs,
    },
    /// List discovered roots in delegation order
    #[command(
        long_about = "Prints one line per root that holds at least one matching resource: \
                      its origin, kind, defining scope and resource count. Roots of the current \
                      loader come before roots of its parent."
    )]
    Roots {
        #[command(flatten)]
        scan: ScanArgs,
    },
    /// Query the class index
    #[command(
        long_about = "Parses every class file under the given packages and runs one structural \
                      query against them. Matching names are resolved through the classpath \
                      before they are reported."
    )]
    Query {
        #[arg(value_enum)]
        kind: QueryKind,
        /// Binary name of the annotation, type or interface (com.example.Marker)
        #[arg(value_name = "NAME")]
        name: String,
        #[command(flatten)]
        scan: ScanArgs,
    },
}

impl Commands {
    fn scan_args(&self) -> &ScanArgs {
        match self {
            Commands::Resources { scan } | Commands::Roots { scan } | Commands::Query { scan, .. } => {
                scan
            }
        }
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _guard = classscan_core::logging::init_logging("cli", cli.command.scan_args().verbose);

    match cli.command {
        Commands::Resources { scan } => resources::run(&scan),
        Commands::Roots { scan } => roots::run(&scan),
        Commands::Query { kind, name, scan } => query::run(kind, &name, &scan),
    }
}

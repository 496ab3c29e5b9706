use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "unnest")]
#[command(about = "Recursively extract nested archives", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Suppress all non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: <config dir>/unnest/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print version information
    Version,
    /// Extract every archive under a directory, nested ones included
    Extract {
        /// Directory containing compressed files
        source: PathBuf,
        /// Output directory (defaults to the source directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Only decode archives already present; leave nested ones alone
        #[arg(long)]
        no_recursive: bool,
        /// Override the iteration budget
        #[arg(long)]
        max_iterations: Option<usize>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Decode a single archive
    Decode {
        /// Archive file
        archive: PathBuf,
        /// Destination directory (defaults to the archive's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Show the detected archive kind of each path
    Classify {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extract() {
        let cli = Cli::parse_from(["unnest", "-d", "extract", "/bundle", "-o", "/out", "--no-recursive", "--json"]);
        assert!(cli.debug);
        match cli.command {
            Commands::Extract {
                source,
                output_dir,
                no_recursive,
                max_iterations,
                json,
            } => {
                assert_eq!(source, PathBuf::from("/bundle"));
                assert_eq!(output_dir, Some(PathBuf::from("/out")));
                assert!(no_recursive);
                assert!(json);
                assert_eq!(max_iterations, None);
            }
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn test_classify_requires_paths() {
        assert!(Cli::try_parse_from(["unnest", "classify"]).is_err());
    }
}

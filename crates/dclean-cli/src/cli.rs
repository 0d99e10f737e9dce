use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use dclean_core::Category;

#[derive(Parser, Debug)]
#[command(name = "dclean")]
#[command(about = "Find large, old, temporary, empty and duplicate files and clean them up")]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: ~/.config/dclean/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan a directory and summarize each category
    Scan(ScanArgs),
    /// Scan a directory and delete every entry of one category
    Clean(CleanArgs),
    /// Delete the given paths
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Directory to scan
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Also look for duplicate files (reads every candidate file)
    #[arg(short, long)]
    pub duplicates: bool,

    /// List the members of one category: large, old, temp, empty, duplicates
    #[arg(short, long, value_parser = parse_category)]
    pub category: Option<Category>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Directory to scan
    pub root: PathBuf,

    /// Category to clean: large, old, temp, empty, duplicates
    #[arg(short, long, value_parser = parse_category)]
    pub category: Category,

    /// Remove permanently instead of moving to the trash
    #[arg(long)]
    pub permanent: bool,

    /// Actually delete; without this only the plan is printed
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Paths to delete
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Remove permanently instead of moving to the trash
    #[arg(long)]
    pub permanent: bool,
}

fn parse_category(name: &str) -> Result<Category, String> {
    Category::from_name(&name.to_lowercase()).ok_or_else(|| {
        let known: Vec<&str> = Category::ALL.iter().map(|c| c.name()).collect();
        format!("unknown category '{name}' (expected one of: {})", known.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn scan_defaults_to_current_dir() {
        let cli = Cli::parse_from(["dclean", "scan"]);
        match cli.command {
            Command::Scan(args) => {
                assert_eq!(args.root, PathBuf::from("."));
                assert!(!args.duplicates);
                assert!(args.category.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn clean_parses_category_and_flags() {
        let cli = Cli::parse_from(["dclean", "clean", "/data", "--category", "TEMP", "--yes"]);
        match cli.command {
            Command::Clean(args) => {
                assert_eq!(args.category, Category::Temporary);
                assert!(args.yes);
                assert!(!args.permanent);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = Cli::try_parse_from(["dclean", "scan", "--category", "huge"]).unwrap_err();
        assert!(err.to_string().contains("unknown category"));
    }

    #[test]
    fn delete_requires_paths() {
        assert!(Cli::try_parse_from(["dclean", "delete"]).is_err());
        let cli = Cli::parse_from(["dclean", "--config", "c.toml", "delete", "a", "b"]);
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
    }
}

//! CLI Adapter
//!
//! Command-line interface for the intern quant ranker.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{
    evaluate_mint, execute, CliApp, Command, EvaluateCmd, Evaluation, PortfolioCmd, RankCmd,
};

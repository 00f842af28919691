//! Command-line interface definitions for the stats loader.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! The date is strict: with `--date 2020-01-01`, statistics are uploaded for
//! episodes from day 02 onwards, not from 01.

use std::path::PathBuf;

use clap::Parser;

/// Command-line arguments for one loader run.
///
/// # Examples
///
/// ```sh
/// # Upload everything published after 2020-01-01 for show 4040
/// spreaker_stats_loader -s 4040 -p my-project --dataset podcasts -t spreaker_english
///
/// # Explicit cutoff and credential paths
/// spreaker_stats_loader -s 4040 -d 2023-06-30 -a ./auth.json -c ./credentials.json \
///     -p my-project --dataset podcasts -t spreaker_spanish
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Cutoff date. Episodes published strictly after this date are
    /// uploaded; pick a date before the show's first episode to upload
    /// everything.
    #[arg(short, long, default_value = "2020-01-01")]
    pub date: String,

    /// Spreaker show ID for the podcast.
    #[arg(short, long)]
    pub show: u64,

    /// Local auth file holding the Spreaker bearer token.
    #[arg(short, long, default_value = "./auth.json")]
    pub auth: PathBuf,

    /// Local service-account key file for BigQuery.
    #[arg(short, long, default_value = "./credentials.json")]
    pub credentials: PathBuf,

    /// BigQuery project name.
    #[arg(short, long)]
    pub project: String,

    /// BigQuery dataset.
    #[arg(long)]
    pub dataset: String,

    /// BigQuery table receiving the appended rows, e.g. `spreaker_english`.
    #[arg(short, long)]
    pub table: String,
}

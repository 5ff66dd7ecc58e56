//! # Rating Subcommand
//!
//! Convert a performance rating between scales.

use anyhow::Result;
use clap::Args;

use compa_core::{PerformanceRatingScale, RatingScaleConverter};

/// Arguments for the `compa rating` subcommand.
#[derive(Args, Debug)]
pub struct RatingArgs {
    /// Rating on the source scale.
    pub rating: i64,

    #[arg(long)]
    pub from: PerformanceRatingScale,

    #[arg(long)]
    pub to: PerformanceRatingScale,
}

/// Execute the rating subcommand.
pub fn run_rating(args: &RatingArgs) -> Result<u8> {
    let converted = RatingScaleConverter::convert_rating(args.rating, args.from, args.to)?;
    println!(
        "{} on the {} is {converted} on the {}",
        args.rating,
        args.from.display_name(),
        args.to.display_name()
    );
    Ok(0)
}

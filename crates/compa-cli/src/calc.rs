//! # Calc Subcommand
//!
//! Single-record salary adjustment against a matrix file or the defaults.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use rust_decimal::Decimal;

use compa_core::PerformanceRatingScale;
use compa_engine::{CalculationInput, CalculationResult, CompensationCalculator};

use crate::config::CompaConfig;
use crate::matrix::load_store;

/// Arguments for the `compa calc` subcommand.
#[derive(Args, Debug)]
pub struct CalcArgs {
    #[arg(long, default_value = "default")]
    pub tenant: String,

    /// Rating scale; the configured default when omitted.
    #[arg(long)]
    pub scale: Option<PerformanceRatingScale>,

    /// Matrix file; the default table when omitted.
    #[arg(long)]
    pub matrix: Option<PathBuf>,

    #[arg(long)]
    pub salary: Decimal,

    /// Midpoint of the employee's salary scale.
    #[arg(long)]
    pub mid: Decimal,

    #[arg(long)]
    pub rating: i64,

    /// Years of experience.
    #[arg(long, default_value_t = 0)]
    pub tenure: i64,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the calc subcommand.
pub fn run_calc(args: &CalcArgs, config: &CompaConfig) -> Result<u8> {
    let ctx = config.tenant_context(&args.tenant, args.scale)?;
    let store = load_store(args.matrix.as_deref(), &ctx.tenant_id)?;
    let calculator = CompensationCalculator::new(store);

    let input = CalculationInput {
        current_salary: args.salary,
        mid_of_scale: args.mid,
        performance_rating: args.rating,
        tenure_years: args.tenure,
    };
    let result = calculator.calculate(&ctx, &input)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render(&result));
    }
    Ok(0)
}

fn render(result: &CalculationResult) -> String {
    let band = result.band_label.as_deref().unwrap_or("none");
    format!(
        "compa ratio:     {}\n\
         bucket:          {}\n\
         band:            {band}\n\
         increase:        {}%\n\
         new salary:      {}\n\
         increase amount: {}\n",
        result.compa_ratio,
        result.bucket,
        result.increase_percent.normalize(),
        result.new_salary,
        result.increase_amount,
    )
}

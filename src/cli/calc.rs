use std::error::Error;

use crate::core::amortization::{LoanParameters, LoanSummary};

pub fn run_calc(
    principal: f64,
    rate: f64,
    years: f64,
    fee: f64,
    penalty: f64,
) -> Result<(), Box<dyn Error>> {
    let params = LoanParameters::new(principal, rate, years)
        .with_processing_fee(fee)
        .with_prepayment_penalty(penalty);

    match LoanSummary::compute(&params) {
        Ok(summary) => {
            println!("{}", summary.describe(&params));
            Ok(())
        }
        Err(err) => {
            eprintln!("❌ {err}");
            std::process::exit(1);
        }
    }
}

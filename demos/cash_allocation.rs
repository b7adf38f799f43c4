//! Cash allocation example.
//!
//! A week's payables compete for a limited balance; net amounts come from
//! withholding, and the funded set is chosen by priority and due date.

use chrono::NaiveDate;
use monetary_engine::core::error::EngineError;
use monetary_engine::core::money::Money;
use monetary_engine::core::obligation::{Obligation, ObligationKind, Portfolio, PriorityClass};
use monetary_engine::core::party::CounterpartyId;
use monetary_engine::settlement::prioritization::PaymentPrioritizationEngine;
use monetary_engine::tax::withholding::TaxWithholdingCalculator;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

fn main() -> Result<(), EngineError> {
    let date = |d| NaiveDate::from_ymd_opt(2024, 2, d).unwrap_or(NaiveDate::MIN);

    println!("━━━ Service invoice: withholding ━━━\n");

    let rates = BTreeMap::from([
        ("irrf".to_string(), dec!(0.015)),
        ("iss".to_string(), dec!(0.05)),
        ("inss".to_string(), dec!(0.11)),
    ]);
    let invoice = TaxWithholdingCalculator::withhold("5000.00".parse()?, &rates)?;
    for (name, amount) in &invoice.withheld {
        println!("  {:<5} {:>10}", name, amount);
    }
    println!("  Net payable to supplier: {}\n", invoice.net);

    println!("━━━ Payables for the week ━━━\n");

    let payable = |party: &str, amount: Money, due: u32, priority| {
        Obligation::new(
            ObligationKind::Payable,
            CounterpartyId::new(party),
            amount,
            date(1),
            date(due),
        )
        .with_priority(priority)
    };

    let portfolio: Portfolio = vec![
        payable("PAYROLL", "12000.00".parse()?, 5, PriorityClass::High),
        payable("TAXES", "3200.00".parse()?, 10, PriorityClass::High),
        payable("CONSULTING", invoice.net, 7, PriorityClass::Medium),
        payable("STEEL-CO", "6800.00".parse()?, 6, PriorityClass::Medium),
        payable("CLEANING", "450.00".parse()?, 6, PriorityClass::Low),
        payable("COFFEE", "89.90".parse()?, 2, PriorityClass::Low),
    ]
    .into_iter()
    .collect();

    println!("  Total outstanding: {}\n", portfolio.total_outstanding());

    let result = PaymentPrioritizationEngine::allocate("20000.00".parse()?, portfolio.obligations())?;
    println!("{}", result);
    println!("Deferred total: {}", result.deferred_total());

    Ok(())
}

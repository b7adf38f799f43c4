//! Installment plan lifecycle example.
//!
//! Splits a receivable into installments, takes a partial payment, then
//! renegotiates the late balance into a new plan.

use chrono::NaiveDate;
use monetary_engine::accrual::calculator::AccrualRates;
use monetary_engine::core::error::EngineError;
use monetary_engine::core::money::Money;
use monetary_engine::core::obligation::{Obligation, ObligationKind};
use monetary_engine::core::party::CounterpartyId;
use monetary_engine::schedule::installments::InstallmentScheduler;
use monetary_engine::schedule::renegotiation::{RenegotiationEngine, RenegotiationTerms};
use monetary_engine::settlement::payment::{Payment, SettlementEngine};
use rust_decimal_macros::dec;

fn print_plan(ob: &Obligation) {
    for i in ob.installments() {
        println!(
            "  #{:<2} {:>10}  due {}  paid {:>10}  {:?}",
            i.number, i.value, i.due_date, i.paid, i.status
        );
    }
    println!("  Outstanding: {}  [{}]\n", ob.outstanding(), ob.status());
}

fn main() -> Result<(), EngineError> {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN);

    println!("━━━ Step 1: Schedule 1000.00 in 3 installments ━━━\n");

    let total: Money = "1000.00".parse()?;
    let plan = InstallmentScheduler::schedule(total, 3, date(2024, 2, 1), 30)?;
    let receivable = Obligation::new(
        ObligationKind::Receivable,
        CounterpartyId::new("CLI-0042"),
        total,
        date(2024, 1, 2),
        date(2024, 2, 1),
    )
    .with_schedule(plan)?;
    print_plan(&receivable);

    println!("━━━ Step 2: Client pays 450.00 ━━━\n");

    let (receivable, receipt) =
        SettlementEngine::apply_payment(&receivable, &Payment::new("450.00".parse()?, date(2024, 2, 1)))?;
    for applied in &receipt.applied {
        println!(
            "  {} applied to #{} -> {:?}",
            applied.amount, applied.installment_number, applied.installment_status
        );
    }
    println!();
    print_plan(&receivable);

    println!("━━━ Step 3: 20 days late, renegotiate with 50% off the charges ━━━\n");

    let rates = AccrualRates::new(dec!(0.00033), dec!(0.02));
    let today = date(2024, 3, 22);
    let due = SettlementEngine::amount_due(&receivable, today, &rates)?;
    println!(
        "  {} days late: interest {}  penalty {}  due today {}\n",
        due.days, due.interest, due.penalty, due.total
    );

    let terms = RenegotiationTerms {
        discount_pct: dec!(0.5),
        installments: 4,
        base_date: date(2024, 4, 1),
        interval_days: 30,
    };
    let (renegotiated, plan) =
        RenegotiationEngine::renegotiate_obligation(&receivable, today, &rates, &terms)?;

    println!("  Accrued:     {}", plan.accrued);
    println!("  Forgiven:    {}", plan.discount_amount);
    println!("  New balance: {}\n", plan.new_principal);
    print_plan(&renegotiated);

    Ok(())
}

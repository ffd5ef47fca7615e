/// post-dated checks - discount at per-bank daily rates
use chrono::{NaiveDate, TimeZone, Utc};
use loan_engine_rs::{
    CheckReference, EngineConfig, LoanBook, LoanTerms, Money, PaymentRequest, Rate, SafeTimeProvider,
    TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== pdc discount example ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    ));

    let config = EngineConfig::from_json(
        r#"{
            "discount": {
                "default_daily_rate": "0.0005",
                "bank_rates": { "metrobank - main": "0.0004" }
            }
        }"#,
    )?;
    let mut book = LoanBook::in_memory(config)?;

    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).ok_or("bad date");

    // standalone discount: 100,000 from day 1 to day 31
    let discount = book.compute_discount(Money::from_major(100_000), date(2024, 1, 1)?, date(2024, 1, 31)?, None)?;
    println!("days: {}", discount.elapsed_days);
    println!("interest: {}", discount.interest);
    println!("net proceeds: {}", discount.net_proceeds);

    // disbursement check at the drawee bank's rate
    let loan = book.originate_loan(
        "lito cruz",
        LoanTerms::flat_monthly(Money::from_major(50_000), Rate::from_percentage(12), 6, date(2024, 1, 1)?),
        &time,
    )?;
    book.attach_disbursement_check(
        loan.id,
        CheckReference {
            bank: "metrobank - main".to_string(),
            check_number: "771020".to_string(),
            check_date: date(2024, 1, 1)?,
        },
        Money::from_major(50_000),
        date(2024, 1, 20)?,
    )?;

    // six post-dated collection checks, one per installment
    for installment in book.installments(loan.id)? {
        let check = CheckReference {
            bank: "bpi - ortigas".to_string(),
            check_number: format!("00045{}", installment.sequence),
            check_date: installment.due_date,
        };
        book.allocate_payment(
            PaymentRequest::check(loan.id, installment.amortization(), check).targeting(installment.id),
            &time,
        )?;
    }

    let view = book.view(loan.id, &time)?;
    println!("\n{:<10} {:>12} {:>6} {:>10} {:>12}", "check", "amount", "days", "interest", "net");
    for line in &view.checks {
        println!(
            "{:<10} {:>12} {:>6} {:>10} {:>12}",
            line.check.check_number,
            line.face_amount(),
            line.discount.elapsed_days,
            line.interest(),
            line.net_proceeds()
        );
    }
    println!(
        "{:<10} {:>12} {:>6} {:>10} {:>12}",
        "total", view.check_totals.check_amount, "", view.check_totals.interest, view.check_totals.net_proceeds
    );

    Ok(())
}

/// quick start - originate a loan, take a payment, print the schedule
use chrono::{NaiveDate, TimeZone, Utc};
use loan_engine_rs::{EngineConfig, LoanBook, LoanTerms, Money, PaymentRequest, Rate, SafeTimeProvider, TimeSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()
    ));
    let mut book = LoanBook::in_memory(EngineConfig::standard())?;

    // 120,000 over 12 months with interest computed upfront
    let disbursed = NaiveDate::from_ymd_opt(2024, 1, 15).ok_or("bad date")?;
    let terms = LoanTerms::flat_monthly(Money::from_major(120_000), Rate::from_percentage(10), 12, disbursed)
        .with_total_interest(Money::from_major(12_000));
    let loan = book.originate_loan("maria santos", terms, &time)?;

    // pay the first installment
    book.allocate_payment(PaymentRequest::cash(loan.id, Money::from_major(11_000)), &time)?;

    println!("{}", book.view(loan.id, &time)?.to_json_pretty()?);

    Ok(())
}

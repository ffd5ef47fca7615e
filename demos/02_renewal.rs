/// renewal - roll an outstanding balance plus fresh cash into a new loan
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use loan_engine_rs::{
    EngineConfig, LoanBook, LoanTerms, Money, PaymentRequest, Rate, RenewalTerms, SafeTimeProvider,
    TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== renewal example ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 5, 9, 0, 0).unwrap()
    ));
    let controller = time.test_control().unwrap();
    let mut book = LoanBook::in_memory(EngineConfig::standard())?;

    let disbursed = NaiveDate::from_ymd_opt(2024, 1, 5).ok_or("bad date")?;
    let terms = LoanTerms::flat_monthly(Money::from_major(60_000), Rate::from_percentage(12), 6, disbursed);
    let loan = book.originate_loan("rosa garcia", terms, &time)?;
    println!("original loan {} principal {}", loan.id, loan.principal());

    // two installments paid
    controller.advance(Duration::days(60));
    book.allocate_payment(PaymentRequest::cash(loan.id, Money::from_major(21_200)), &time)?;

    let quote = book.renewal_quote(loan.id, &time)?;
    println!("outstanding principal: {}", quote.outstanding_principal);
    println!("outstanding interest:  {}", quote.outstanding_interest);
    println!("outstanding penalty:   {}", quote.outstanding_penalty);
    println!("rolled over:           {}", quote.renewal_amount());

    let today = time.now().date_naive();
    let result = book.renew_loan(
        loan.id,
        Money::from_major(20_000),
        RenewalTerms::flat_monthly(Rate::from_percentage(12), 12, today),
        &time,
    )?;

    println!("\nnew loan {} principal {}", result.new_loan.id, result.new_loan.principal());
    println!("renewed from: {:?}", result.new_loan.renewed_from_loan_id);
    println!("old loan standing: {:?}", book.loan_status(loan.id, &time)?);

    // the old loan no longer accepts payments
    match book.allocate_payment(PaymentRequest::cash(loan.id, Money::from_major(1_000)), &time) {
        Ok(_) => println!("unexpected: payment accepted"),
        Err(e) => println!("payment on old loan rejected: {}", e),
    }

    Ok(())
}

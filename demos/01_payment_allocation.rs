/// payment allocation - oldest first, penalty before interest before principal
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use loan_engine_rs::{
    CashCount, EngineConfig, LoanBook, LoanTerms, Money, PaymentRequest, PenaltyPolicy, Rate,
    SafeTimeProvider, TimeSource,
};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== payment allocation example ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap()
    ));
    let controller = time.test_control().unwrap();

    // 0.1% a day on overdue principal + interest after a 3 day grace period
    let config = EngineConfig::standard().with_penalty(PenaltyPolicy::DailyRate {
        daily_rate: Rate::from_decimal(dec!(0.001)),
        grace_days: 3,
    });
    let mut book = LoanBook::in_memory(config)?;

    let disbursed = NaiveDate::from_ymd_opt(2024, 1, 10).ok_or("bad date")?;
    let loan = book.originate_loan(
        "pedro reyes",
        LoanTerms::flat_monthly(Money::from_major(30_000), Rate::from_percentage(12), 3, disbursed),
        &time,
    )?;

    for installment in book.installments(loan.id)? {
        println!(
            "#{} due {}: principal {} interest {}",
            installment.sequence, installment.due_date, installment.principal_due, installment.interest_due
        );
    }

    // first installment falls due on 2024-02-10; pay 20 days later
    controller.advance(Duration::days(51));
    println!("\npaying on {}", time.now().format("%Y-%m-%d"));

    let count = CashCount::new()
        .with(Money::from_major(1_000), 12)
        .with(Money::from_major(500), 1);
    let request = PaymentRequest::cash(loan.id, Money::from_major(12_500))
        .with_cash_count(count)
        .with_receipt(Some("PR-1042".to_string()), Some("OR-7781".to_string()))
        .with_remarks("walk-in");
    let payment = book.allocate_payment(request, &time)?;

    println!("applied to penalty:   {}", payment.allocation.to_penalty);
    println!("applied to interest:  {}", payment.allocation.to_interest);
    println!("applied to principal: {}", payment.allocation.to_principal);
    for line in &payment.lines {
        println!("  installment #{}: {}", line.sequence, line.applied.total_applied());
    }

    let view = book.view(loan.id, &time)?;
    println!("\nstanding: {:?}", view.standing);
    println!("outstanding: {}", view.totals.outstanding);

    // paying off everything leaves a credit rather than failing
    let payoff = view.totals.outstanding + Money::from_major(250);
    let payment = book.allocate_payment(PaymentRequest::cash(loan.id, payoff), &time)?;
    println!("leftover credit: {}", payment.leftover_credit);
    println!("loan status: {:?}", book.loan(loan.id)?.status);

    println!("\nevents:");
    for event in book.take_events() {
        println!("  {:?}", event);
    }

    Ok(())
}

use std::time::Duration;

use kalanow_store::payment::{PaymentSimulator, PaymentStatus};

#[tokio::test]
async fn every_result_has_an_id_and_a_known_status() {
    let simulator = PaymentSimulator::new(Duration::ZERO);
    for _ in 0..50 {
        let result = simulator.process_payment(250_000, "gateway").await;
        match result.status {
            PaymentStatus::Success => assert!(result.transaction_id.starts_with("TXN-")),
            PaymentStatus::Failed => assert!(result.transaction_id.starts_with("FAILED-")),
            PaymentStatus::Pending => panic!("simulator never leaves a payment pending"),
        }
        assert_eq!(result.transaction_id.split('-').nth(1).map(str::len), Some(16));
    }
}

#[tokio::test]
async fn failure_rate_is_near_ten_percent() {
    let simulator = PaymentSimulator::new(Duration::ZERO);
    let trials = 4000;
    let mut failures = 0;
    for _ in 0..trials {
        if simulator.process_payment(1000, "gateway").await.status == PaymentStatus::Failed {
            failures += 1;
        }
    }
    let rate = failures as f64 / trials as f64;
    assert!((0.07..=0.13).contains(&rate), "failure rate {rate}");
}

#[tokio::test]
async fn transaction_ids_are_unique() {
    let simulator = PaymentSimulator::new(Duration::ZERO);
    let a = simulator.process_payment(1000, "gateway").await;
    let b = simulator.process_payment(1000, "gateway").await;
    assert_ne!(a.transaction_id, b.transaction_id);
}

#[tokio::test]
async fn non_positive_amount_always_fails() {
    let simulator = PaymentSimulator::new(Duration::ZERO).with_success_rate(1.0);
    for amount in [0, -100] {
        let result = simulator.process_payment(amount, "gateway").await;
        assert_eq!(result.status, PaymentStatus::Failed);
    }
    let approved = simulator.process_payment(1, "gateway").await;
    assert_eq!(approved.status, PaymentStatus::Success);
}

#[tokio::test]
async fn simulator_waits_before_answering() {
    let simulator = PaymentSimulator::new(Duration::from_millis(50));
    let started = tokio::time::Instant::now();
    simulator.process_payment(1000, "gateway").await;
    assert!(started.elapsed() >= Duration::from_millis(50));
}

#[test]
fn result_uses_camel_case_fields() {
    let json = serde_json::to_value(kalanow_store::payment::PaymentResult {
        transaction_id: "TXN-1".into(),
        status: PaymentStatus::Success,
    })
    .unwrap();
    assert_eq!(json["transactionId"], "TXN-1");
    assert_eq!(json["status"], "Success");
}

use std::sync::Arc;

use crate::{config::AppConfig, db::Db, payment::PaymentSimulator};

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Arc<AppConfig>,
    pub payments: PaymentSimulator,
}

impl AppState {
    pub fn new(db: Db, config: AppConfig) -> Self {
        let payments = PaymentSimulator::new(config.payment_delay);
        Self {
            db,
            config: Arc::new(config),
            payments,
        }
    }
}

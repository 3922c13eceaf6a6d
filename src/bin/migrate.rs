use kalanow_store::{config::DbConfig, db::{Db, run_migrations}};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let db = Db::connect_lazy(&DbConfig::from_env());
    run_migrations(&db).await?;
    db.shutdown().await;
    println!("Migrations applied");
    Ok(())
}

mod cli;
mod infra;
mod report;
mod routes;
mod server;

use licensing_report::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

mod calendar;
mod cli;
mod infra;
mod routes;
mod server;

use council_portal::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

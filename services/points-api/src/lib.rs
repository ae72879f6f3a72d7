mod cli;
mod commands;
mod infra;
mod routes;
mod server;

use agility_points::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

mod cli;
mod demo;
mod infra;

use campus_verify::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

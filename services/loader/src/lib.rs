mod cli;
mod report;

use school_directory::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}

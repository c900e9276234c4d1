pub mod definition;
pub mod generate;
pub mod tables;

use std::future::Future;

/// Runs a command body, printing its error and mapping the outcome to an
/// exit code.
pub async fn run_cli_async<F, Fut>(f: F) -> i32
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), String>>,
{
    match f().await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

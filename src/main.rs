use std::process::ExitCode;

mod app;
mod logging;

fn main() -> ExitCode {
    let args = annotation_reorg::cli::parse();
    app::run(args)
}

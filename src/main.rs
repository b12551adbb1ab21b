//! sgate binary entry point.

fn main() {
    if let Err(err) = sourcegate::cli::run() {
        sourcegate::ui::output::error(format!("{err:#}"));
        std::process::exit(1);
    }
}

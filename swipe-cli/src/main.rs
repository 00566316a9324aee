//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = swipe_cli::run() {
        eprintln!("swipe: {err}");
        std::process::exit(1);
    }
}

fn main() {
    if let Err(err) = monero_tutor::cli::main() {
        eprintln!("❌ Error: {err}");
        std::process::exit(1);
    }
}

fn main() {
    if let Err(e) = clinsum_lib::run() {
        tracing::error!("{e}");
        eprintln!("clinsum: {e}");
        std::process::exit(1);
    }
}

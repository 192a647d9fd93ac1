fn main() {
    if let Err(e) = classscan_cli::run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

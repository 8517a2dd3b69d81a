fn main() {
    if let Err(e) = cljscope_cli::run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

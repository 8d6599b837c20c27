fn main() {
    if let Err(err) = roughboard::run() {
        log::error!("{err:#}");
        eprintln!("roughboard: {err:#}");
        std::process::exit(1);
    }
}

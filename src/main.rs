fn main() {
    if let Err(err) = gridspec::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

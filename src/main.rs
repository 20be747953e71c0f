fn main() {
    if let Err(err) = combo_overlay::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

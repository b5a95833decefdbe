fn main() {
    if let Err(err) = cluster_fold::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn main() {
    if let Err(e) = record_sorter_lib::run() {
        eprintln!("record-sorter: {e}");
        std::process::exit(1);
    }
}

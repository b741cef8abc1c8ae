use std::ffi::OsString;

fn main() {
    let args: Vec<OsString> = std::env::args_os().collect();
    if let Err(err) = mineboard_core::run(args) {
        eprintln!("board: {err:#}");
        std::process::exit(1);
    }
}

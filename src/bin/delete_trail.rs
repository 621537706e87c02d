use getopts::Options;

use std::env;
use std::process::exit;

use sentiero::manager::TrailManager;
use sentiero::Datasource;

fn print_usage(program: &str, opts: Options) {
    let brief = format!("Usage: {} [options]", program);
    print!("{}", opts.usage(&brief));
}

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("c", "code", "trail code", "CODE");
    opts.optflag("p", "purge", "also delete accessibility notifications");
    opts.optflag("h", "help", "print this help menu");
    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => panic!("{}", f),
    };
    if matches.opt_present("h") {
        print_usage(&program, opts);
        return;
    }
    let code = match matches.opt_str("c") {
        Some(code) => code,
        None => {
            print_usage(&program, opts);
            exit(1);
        }
    };

    let datasource = Datasource::connect().expect("cannot reach the trail database");
    let manager = TrailManager::new(&datasource);
    let deleted = manager
        .delete(&code, matches.opt_present("p"))
        .expect("delete failed");
    if deleted {
        println!("Deleted trail {}", code);
    } else {
        println!("No trail with code {}", code);
    }
}

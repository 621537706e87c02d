use getopts::Options;

use std::env;

use sentiero::trails::{TrailDao, RESULT_LIMIT};
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
    opts.optopt("c", "code", "only trails with this code", "CODE");
    opts.optopt("l", "limit", "max number of results", "NUM");
    opts.optflag("", "light", "elide the embedded geometry");
    opts.optflag("", "previews", "projected preview listing");
    opts.optflag("h", "help", "print this help menu");
    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => panic!("{}", f),
    };
    if matches.opt_present("h") {
        print_usage(&program, opts);
        return;
    }
    let limit: i64 = match matches.opt_str("l") {
        Some(l) => l.parse().expect("limit must be a number"),
        None => RESULT_LIMIT,
    };

    let datasource = Datasource::connect().expect("cannot reach the trail database");
    let dao = TrailDao::new(&datasource);

    let json = if matches.opt_present("previews") {
        let previews = match matches.opt_str("c") {
            Some(code) => dao.preview_by_code(&code),
            None => dao.get_all_previews(),
        }
        .expect("listing failed");
        serde_json::to_string_pretty(&previews).unwrap()
    } else {
        let trails = match matches.opt_str("c") {
            Some(code) => dao.get_by_code(&code),
            None => dao.get_trails(matches.opt_present("light"), limit),
        }
        .expect("listing failed");
        serde_json::to_string_pretty(&trails).unwrap()
    };
    println!("{}", json);
}

use getopts::Options;

use std::env;

use sentiero::accessibility::AccessibilityNotificationDao;
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
    opts.optopt("c", "code", "only notifications for this trail", "CODE");
    opts.optopt("f", "from", "skip this many results", "NUM");
    opts.optopt("l", "limit", "max number of results", "NUM");
    opts.optflag("r", "resolved", "list resolved instead of open ones");
    opts.optflag("h", "help", "print this help menu");
    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => panic!("{}", f),
    };
    if matches.opt_present("h") {
        print_usage(&program, opts);
        return;
    }
    let from: u64 = match matches.opt_str("f") {
        Some(f) => f.parse().expect("from must be a number"),
        None => 0,
    };
    let limit: i64 = match matches.opt_str("l") {
        Some(l) => l.parse().expect("limit must be a number"),
        None => 50,
    };
    let resolved = matches.opt_present("r");

    let datasource = Datasource::connect().expect("cannot reach the trail database");
    let dao = AccessibilityNotificationDao::new(&datasource);
    let notifications = match (matches.opt_str("c"), resolved) {
        (Some(code), true) => dao.get_resolved_by_code(&code),
        (Some(code), false) => dao.get_unresolved_by_code(&code),
        (None, true) => dao.get_resolved(from, limit),
        (None, false) => dao.get_unresolved(from, limit),
    }
    .expect("listing failed");
    println!("{}", serde_json::to_string_pretty(&notifications).unwrap());
}

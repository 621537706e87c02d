use getopts::Options;

use std::env;
use std::process::exit;

use sentiero::accessibility::AccessibilityNotificationDao;
use sentiero::mapper;
use sentiero::models::NotificationReport;
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
    opts.optopt("d", "description", "what is blocking the trail", "TEXT");
    opts.optflag("h", "help", "print this help menu");
    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => panic!("{}", f),
    };
    if matches.opt_present("h") {
        print_usage(&program, opts);
        return;
    }
    let (code, description) = match (matches.opt_str("c"), matches.opt_str("d")) {
        (Some(code), Some(description)) => (code, description),
        _ => {
            print_usage(&program, opts);
            exit(1);
        }
    };

    let datasource = Datasource::connect().expect("cannot reach the trail database");
    let dao = AccessibilityNotificationDao::new(&datasource);
    let created = dao
        .create(&NotificationReport {
            trail_code: code,
            description,
            report_date: mapper::stored_now(),
        })
        .expect("report failed");
    println!("{}", serde_json::to_string_pretty(&created).unwrap());
}

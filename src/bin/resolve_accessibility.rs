use getopts::Options;

use std::env;
use std::process::exit;

use sentiero::accessibility::AccessibilityNotificationDao;
use sentiero::mapper;
use sentiero::models::NotificationResolution;
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
    opts.optopt("i", "id", "notification id", "ID");
    opts.optopt("r", "resolution", "how the problem was fixed", "TEXT");
    opts.optflag("h", "help", "print this help menu");
    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => panic!("{}", f),
    };
    if matches.opt_present("h") {
        print_usage(&program, opts);
        return;
    }
    let (id, resolution) = match (matches.opt_str("i"), matches.opt_str("r")) {
        (Some(id), Some(resolution)) => (id, resolution),
        _ => {
            print_usage(&program, opts);
            exit(1);
        }
    };

    let datasource = Datasource::connect().expect("cannot reach the trail database");
    let dao = AccessibilityNotificationDao::new(&datasource);
    let resolved = dao
        .resolve(&NotificationResolution {
            id: id.clone(),
            resolution,
            resolution_date: mapper::stored_now(),
        })
        .expect("resolve failed");
    match resolved {
        Some(notification) => {
            println!("{}", serde_json::to_string_pretty(&notification).unwrap())
        }
        None => println!("No notification with id {}", id),
    }
}

use getopts::Options;

use std::env;
use std::process::exit;

use sentiero::geo::UnitOfMeasurement;
use sentiero::manager::TrailManager;
use sentiero::models::Coordinates;
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
    opts.optopt("", "lat", "probe latitude", "DEG");
    opts.optopt("", "lon", "probe longitude", "DEG");
    opts.optopt("d", "distance", "search radius", "NUM");
    opts.optopt("u", "unit", "radius unit, m (default) or km", "UNIT");
    opts.optopt("l", "limit", "max number of results", "NUM");
    opts.optflag("a", "any-point", "match any trail point, not just the start");
    opts.optflag("h", "help", "print this help menu");
    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => panic!("{}", f),
    };
    if matches.opt_present("h") {
        print_usage(&program, opts);
        return;
    }

    let (lat, lon, distance) = match (
        matches.opt_str("lat"),
        matches.opt_str("lon"),
        matches.opt_str("d"),
    ) {
        (Some(lat), Some(lon), Some(d)) => (
            lat.parse().expect("lat must be a number"),
            lon.parse().expect("lon must be a number"),
            d.parse().expect("distance must be a number"),
        ),
        _ => {
            print_usage(&program, opts);
            exit(1);
        }
    };
    let unit = match matches.opt_str("u").as_deref() {
        None | Some("m") => UnitOfMeasurement::M,
        Some("km") => UnitOfMeasurement::Km,
        Some(other) => {
            eprintln!("unknown unit '{}'", other);
            exit(1);
        }
    };
    let limit: i64 = match matches.opt_str("l") {
        Some(l) => l.parse().expect("limit must be a number"),
        None => 10,
    };

    let datasource = Datasource::connect().expect("cannot reach the trail database");
    let manager = TrailManager::new(&datasource);
    let hits = manager
        .get_by_geo(
            &Coordinates::new(lat, lon),
            distance,
            unit,
            matches.opt_present("a"),
            limit,
        )
        .expect("proximity query failed");

    for hit in &hits {
        println!(
            "{}\t{} m\t{}",
            hit.trail.code, hit.distance_m, hit.trail.name
        );
    }
}

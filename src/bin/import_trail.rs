use getopts::Options;

use std::env;
use std::process::exit;

use sentiero::gpx;
use sentiero::mapper;
use sentiero::models::{
    Coordinates, GeoLineString, Position, Trail, TrailClassification,
};
use sentiero::stats;
use sentiero::trails::TrailDao;
use sentiero::Datasource;

fn print_usage(program: &str, opts: Options) {
    let brief = format!("Usage: {} [options]", program);
    print!("{}", opts.usage(&brief));
}

fn position(name: &str, coordinates: Coordinates) -> Position {
    Position {
        name: name.to_string(),
        tags: Vec::new(),
        coordinates,
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("g", "gpx", "GPX file with the trail track", "FILE");
    opts.optopt("c", "code", "trail code", "CODE");
    opts.optopt("n", "name", "trail name", "NAME");
    opts.optopt("d", "description", "trail description", "TEXT");
    opts.optopt("k", "classification", "classification (T, E, EE, EEA)", "CLASS");
    opts.optopt("C", "country", "country code", "COUNTRY");
    opts.optopt("s", "section", "maintaining section", "SECTION");
    opts.optflag("h", "help", "print this help menu");
    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => panic!("{}", f),
    };
    if matches.opt_present("h") {
        print_usage(&program, opts);
        return;
    }

    let (file, code, name) = match (
        matches.opt_str("g"),
        matches.opt_str("c"),
        matches.opt_str("n"),
    ) {
        (Some(file), Some(code), Some(name)) => (file, code, name),
        _ => {
            print_usage(&program, opts);
            exit(1);
        }
    };
    let classification = matches
        .opt_str("k")
        .map(|value| {
            TrailClassification::parse(&value).unwrap_or_else(|| {
                eprintln!("unknown classification '{}'", value);
                exit(1);
            })
        })
        .unwrap_or(TrailClassification::E);

    let gpx_data = gpx::read_whole_file(&file).expect("cannot read GPX file");
    let points = gpx::parse_gpx(&gpx_data).expect("cannot parse GPX file");
    let coordinates = gpx::to_trail_coordinates(&points);

    let start = coordinates.first().expect("track has no points");
    let end = coordinates.last().expect("track has no points");
    let trail = Trail {
        name: name.clone(),
        description: matches.opt_str("d").unwrap_or_default(),
        code: code.clone(),
        start_pos: position(&format!("{} start", name), start.coordinates.clone()),
        final_pos: position(&format!("{} end", name), end.coordinates.clone()),
        locations: Vec::new(),
        classification,
        country: matches.opt_str("C").unwrap_or_else(|| "IT".to_string()),
        last_update: mapper::stored_now(),
        maintaining_section: matches.opt_str("s").unwrap_or_default(),
        stats_metadata: stats::calculate(&coordinates),
        geo_line: GeoLineString::from_trail_coordinates(&coordinates),
        coordinates,
        media: Vec::new(),
    };

    let datasource = Datasource::connect().expect("cannot reach the trail database");
    let dao = TrailDao::new(&datasource);
    dao.upsert(&trail).expect("upsert failed");
    println!(
        "Imported trail {} ({} points, {:.1} km)",
        code,
        trail.coordinates.len(),
        trail.stats_metadata.length / 1000.0
    );
}

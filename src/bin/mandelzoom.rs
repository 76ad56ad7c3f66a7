extern crate clap;
extern crate env_logger;
extern crate mandelzoom;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use mandelzoom::{render_sequence, Bailout, CancelToken, DirectorySink, Policy, ZoomConfig};
use std::str::FromStr;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

fn validate_positive(s: &str, err: &str) -> Result<(), String> {
    match f64::from_str(s) {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(()),
        _ => Err(err.to_string()),
    }
}

const OUTPUT: &str = "output";
const GIF: &str = "gif";
const CENTER: &str = "center";
const RESOLUTION: &str = "resolution";
const PIXELS: &str = "pixels";
const ITERATIONS: &str = "iterations";
const FRAMES: &str = "frames";
const ZOOM: &str = "zoom";
const STEP: &str = "step";
const THREADS: &str = "threads";
const POLICY: &str = "policy";
const BAILOUT: &str = "bailout";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get() * 4;

    App::new("mandelzoom")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Renders a zoom into the Mandelbrot set as numeric tables, rasters, and a GIF")
        .arg(
            Arg::with_name(OUTPUT)
                .required(false)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .default_value(".")
                .help("Directory holding arrays/, intermediates/ and final/"),
        )
        .arg(
            Arg::with_name(GIF)
                .required(false)
                .long(GIF)
                .short("g")
                .takes_value(true)
                .default_value("zoom.gif")
                .help("File name of the animation inside final/"),
        )
        .arg(
            Arg::with_name(CENTER)
                .required(false)
                .long(CENTER)
                .short("c")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-0.74951145384,0.04961979335")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse zoom center"))
                .help("Point of the complex plane to zoom into, as re,im"),
        )
        .arg(
            Arg::with_name(RESOLUTION)
                .required(false)
                .long(RESOLUTION)
                .short("r")
                .takes_value(true)
                .default_value("0.0000001")
                .validator(|s| validate_positive(&s, "Resolution must be a positive number"))
                .help("Distance between samples in the first frame"),
        )
        .arg(
            Arg::with_name(PIXELS)
                .required(false)
                .long(PIXELS)
                .short("p")
                .takes_value(true)
                .default_value("256")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        16_384,
                        "Could not parse pixel count",
                        "Pixel count must be between 1 and 16384",
                    )
                })
                .help("Pixels along each side of a frame"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("2500")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        10_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 10000000",
                    )
                })
                .help("Base iteration budget"),
        )
        .arg(
            Arg::with_name(FRAMES)
                .required(false)
                .long(FRAMES)
                .short("f")
                .takes_value(true)
                .default_value("12")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        100_000,
                        "Could not parse frame count",
                        "Frame count must be between 1 and 100000",
                    )
                })
                .help("Number of frames in the zoom"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .required(false)
                .long(ZOOM)
                .short("z")
                .takes_value(true)
                .default_value("0.25")
                .validator(|s| validate_positive(&s, "Zoom factor must be a positive number"))
                .help("Resolution multiplier per frame; below 1 zooms in"),
        )
        .arg(
            Arg::with_name(STEP)
                .required(false)
                .long(STEP)
                .short("s")
                .takes_value(true)
                .default_value("125")
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        1_000_000,
                        "Could not parse iteration step",
                        "Iteration step must be between 0 and 1000000",
                    )
                })
                .help("Extra iterations granted per frame"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Frames rendered at once (default: number of CPUs)"),
        )
        .arg(
            Arg::with_name(POLICY)
                .required(false)
                .long(POLICY)
                .takes_value(true)
                .possible_values(&["batch", "queue"])
                .default_value("batch")
                .help("Wait for each batch of frames, or keep every worker busy"),
        )
        .arg(
            Arg::with_name(BAILOUT)
                .required(false)
                .long(BAILOUT)
                .takes_value(true)
                .possible_values(&["real", "modulus"])
                .default_value("real")
                .help("Escape when the real part exceeds 2, or when |z| does"),
        )
        .get_matches()
}

fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, String> {
    matches
        .value_of(name)
        .and_then(|s| T::from_str(s).ok())
        .ok_or_else(|| format!("Could not parse {}", name))
}

fn config(matches: &ArgMatches) -> Result<ZoomConfig, String> {
    let center = matches
        .value_of(CENTER)
        .and_then(|s| parse_pair::<f64>(s, ','))
        .ok_or_else(|| "Could not parse zoom center".to_string())?;
    let threads = match matches.value_of(THREADS) {
        Some(_) => value(matches, THREADS)?,
        None => num_cpus::get(),
    };
    let policy = match matches.value_of(POLICY) {
        Some("queue") => Policy::WorkQueue,
        _ => Policy::BatchBarrier,
    };
    let bailout = match matches.value_of(BAILOUT) {
        Some("modulus") => Bailout::Modulus,
        _ => Bailout::RealPart,
    };

    Ok(ZoomConfig {
        x_center: center.0,
        y_center: center.1,
        initial_resolution: value(matches, RESOLUTION)?,
        n_pixels: value(matches, PIXELS)?,
        base_max_iterations: value(matches, ITERATIONS)?,
        frame_count: value(matches, FRAMES)?,
        size_per_frame: value(matches, ZOOM)?,
        iter_step: value(matches, STEP)?,
        threads,
        policy,
        bailout,
    })
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = args();
    let config = match config(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    let mut sink = DirectorySink::new(
        matches.value_of(OUTPUT).unwrap_or("."),
        matches.value_of(GIF).unwrap_or("zoom.gif"),
    );

    if let Err(e) = render_sequence(&config, &mut sink, &CancelToken::new()) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}

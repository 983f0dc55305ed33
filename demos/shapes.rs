//! Inspect how types are framed, then watch the decoder reject bad input.
//!
//! Run with: cargo run --example shapes

use serde::Deserialize;
use serde_delim::{describe, from_str, from_str_with_options, CodecOptions, Shape};
use std::collections::{BTreeMap, HashSet};
use std::error::Error;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
enum Fuel {
    Petrol,
    Diesel,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Tank {
    fuel: Fuel,
    litres: f32,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Truck {
    plate: String,
    axles: u8,
    tank: Tank,
    drivers: HashSet<String>,
    service: BTreeMap<u16, Option<String>>,
}

fn print_shape(name: &str, shape: &Shape, indent: usize) {
    println!("{:indent$}{}: {}", "", name, shape.kind(), indent = indent);
    for field in shape.fields() {
        print_shape(field.name, field.shape, indent + 2);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let shape = describe::<Truck>()?;
    print_shape(shape.name().unwrap_or("root"), &shape, 0);
    println!();

    let inputs = [
        "plate=B-TR 7\u{b3}axles=3\u{b3}tank\u{1e}fuel=Diesel\u{b4}litres=400\
         \u{b3}drivers\u{1d}Ana\u{1e}Ben\u{b3}service\u{1e}2021=null\u{b4}2023=brakes",
        "plate=B-TR 7\u{b3}axles=many",
        "plate=B-TR 7\u{b3}tank\u{1e}fuel=Hydrogen",
        "plate=B-TR 7\u{b3}colour=red",
    ];

    for input in inputs {
        match from_str::<Truck>(input) {
            Ok(truck) => println!("✓ {:?}", truck),
            Err(e) => println!("✗ {}", e),
        }
    }

    let lenient = CodecOptions::new().allow_unknown_fields();
    let result = from_str_with_options::<Truck>("plate=B-TR 7\u{b3}colour=red", lenient);
    println!("\nWith unknown fields allowed: {:?}", result.err());

    Ok(())
}

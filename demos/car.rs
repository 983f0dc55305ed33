//! Encode a car, show the raw stream, and decode it back.
//!
//! Run with: cargo run --example car

use serde::{Deserialize, Serialize};
use serde_delim::{from_str, to_string};
use std::collections::BTreeMap;
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum EngineType {
    Gasoline,
    Diesel,
    Hybrid,
    Electric,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct CarOption {
    option: String,
    price: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Car {
    model: String,
    power: Option<i32>,
    engine_type: EngineType,
    used: bool,
    options: Vec<CarOption>,
    mileage: BTreeMap<String, f64>,
}

/// Replaces the control characters with readable markers.
fn visible(encoded: &str) -> String {
    encoded
        .chars()
        .map(|ch| match ch {
            '\u{1d}' => " <GS> ".to_string(),
            '\u{1e}' => " <RS> ".to_string(),
            ch if u32::from(ch) >= 179 && u32::from(ch) < 200 => {
                format!(" <F{}> ", u32::from(ch) - 179)
            }
            ch => ch.to_string(),
        })
        .collect()
}

fn main() -> Result<(), Box<dyn Error>> {
    let car = Car {
        model: "Volvo XC60".to_string(),
        power: Some(190),
        engine_type: EngineType::Diesel,
        used: true,
        options: vec![
            CarOption {
                option: "Navi pack".to_string(),
                price: 1200.50,
            },
            CarOption {
                option: "Safety pack".to_string(),
                price: 755.25,
            },
        ],
        mileage: BTreeMap::from([
            ("2017".to_string(), 133.5),
            ("2018".to_string(), 4113.5),
            ("2019".to_string(), 727.8),
        ]),
    };

    let encoded = to_string(&car)?;
    println!("Encoded ({} bytes):\n{}\n", encoded.len(), visible(&encoded));

    let json = serde_json::to_string(&car)?;
    println!("Same car as JSON: {} bytes", json.len());

    let decoded: Car = from_str(&encoded)?;
    assert_eq!(car, decoded);
    println!("✓ Round-trip successful");

    Ok(())
}

use std::f64::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geo::{distance, format_distance};
use crate::{Coordinate, Station, StationType};

/// One entry of the station catalog, cycled by index during generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationTemplate {
    #[serde(rename = "type")]
    pub station_type: StationType,
    pub name_pool: Vec<String>,
    pub price_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressPool {
    pub streets: Vec<String>,
    pub cities: Vec<String>,
    pub state: String,
}

impl Default for AddressPool {
    fn default() -> Self {
        let owned = |items: &[&str]| -> Vec<String> {
            items.iter().map(|item| item.to_string()).collect()
        };
        AddressPool {
            streets: owned(&[
                "Main St",
                "Oak Ave",
                "Pine Rd",
                "Elm St",
                "Maple Dr",
                "Cedar Ln",
                "Birch Way",
                "Willow St",
            ]),
            cities: owned(&[
                "New York",
                "Brooklyn",
                "Queens",
                "Manhattan",
                "Bronx",
                "Staten Island",
            ]),
            state: "NY".into(),
        }
    }
}

impl AddressPool {
    /// Draws a street, a house number in 1..=999 and a city, in that order.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let street = pick(&self.streets, rng).unwrap_or("Main St");
        let number = rng.gen_range(1..=999);
        let city = pick(&self.cities, rng).unwrap_or("New York");
        format!("{} {}, {}, {}", number, street, city, self.state)
    }
}

fn pick<'a, R: Rng + ?Sized>(items: &'a [String], rng: &mut R) -> Option<&'a str> {
    if items.is_empty() {
        return None;
    }
    Some(items[rng.gen_range(0..items.len())].as_str())
}

/// Generate `count` stations scattered around `origin`, sorted by distance.
///
/// Positions use a planar offset: `offset * cos(angle)` degrees added to the
/// latitude and `offset * sin(angle)` to the longitude, which only
/// approximates a geodesic offset.
///
/// An empty catalog yields no stations.
pub fn generate<R: Rng + ?Sized>(
    origin: Coordinate,
    count: usize,
    radius_degrees: f64,
    catalog: &[StationTemplate],
    addresses: &AddressPool,
    rng: &mut R,
) -> Vec<Station> {
    if catalog.is_empty() {
        tracing::warn!("Station catalog is empty, no stations generated");
        return Vec::new();
    }

    let mut stations: Vec<Station> = (0..count)
        .map(|index| {
            let template = &catalog[index % catalog.len()];
            let angle = rng.r#gen::<f64>() * TAU;
            let offset = rng.r#gen::<f64>() * radius_degrees.max(0.0);
            let position = Coordinate::new(
                origin.latitude + offset * angle.cos(),
                origin.longitude + offset * angle.sin(),
            );
            let distance_km = distance(origin, position);
            let id = index as u32 + 1;

            Station {
                id,
                name: template
                    .name_pool
                    .get(index % template.name_pool.len().max(1))
                    .cloned()
                    .unwrap_or_else(|| format!("Charging Station {id}")),
                station_type: template.station_type,
                price_label: template.price_label.clone(),
                position,
                address: addresses.draw(rng),
                distance_km,
                distance_label: format_distance(distance_km),
                available: true,
            }
        })
        .collect();

    // Stable, so equal distances keep generation order.
    stations.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

    tracing::info!("Generated {} stations around {}", stations.len(), origin);
    stations
}

//! Region attribution over already-aggregated visitor counts

use std::collections::HashMap;
use std::net::IpAddr;

use tracing::{debug, info, warn};

use super::Locate;
use crate::error::GeoError;

/// `(longitude, latitude)`
pub type Coordinates = (f64, f64);

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRegion {
    pub name: String,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Region {
    pub hits: u64,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Default)]
pub struct RegionAggregate {
    pub regions: HashMap<String, Region>,
    pub resolved: usize,
    pub failed: usize,
}

impl RegionAggregate {
    pub fn totals(&self) -> HashMap<String, u64> {
        self.regions
            .iter()
            .map(|(name, region)| (name.clone(), region.hits))
            .collect()
    }

    pub fn locations(&self) -> HashMap<String, Coordinates> {
        self.regions
            .iter()
            .filter_map(|(name, region)| region.coordinates.map(|c| (name.clone(), c)))
            .collect()
    }
}

pub struct RegionResolver<'a, L: Locate> {
    locator: &'a L,
}

impl<'a, L: Locate> RegionResolver<'a, L> {
    pub fn new(locator: &'a L) -> Self {
        Self { locator }
    }

    /// Map an address to a display name (country followed by city) and a
    /// coordinate pair. Missing names become empty strings.
    pub fn resolve(&self, address: &str) -> Result<ResolvedRegion, GeoError> {
        let ip: IpAddr = address
            .parse()
            .map_err(|_| GeoError::InvalidAddress(address.to_string()))?;
        let record = self.locator.locate(ip)?;

        let name = format!(
            "{}{}",
            record.country.unwrap_or_default(),
            record.city.unwrap_or_default()
        );
        let coordinates = record.longitude.zip(record.latitude);
        Ok(ResolvedRegion { name, coordinates })
    }

    /// Attribute each visitor's hit count to its region, one lookup per
    /// visitor. Unresolvable visitors contribute nothing.
    pub fn attribute<'v, I>(&self, visitors: I) -> RegionAggregate
    where
        I: IntoIterator<Item = (&'v str, u64)>,
    {
        let mut aggregate = RegionAggregate::default();
        for (address, hits) in visitors {
            let resolved = match self.resolve(address) {
                Ok(resolved) => resolved,
                Err(e) => {
                    debug!("No region for {}: {}", address, e);
                    aggregate.failed += 1;
                    continue;
                }
            };
            aggregate.resolved += 1;

            let region = aggregate.regions.entry(resolved.name).or_default();
            region.hits += hits;
            if region.coordinates.is_none() {
                region.coordinates = resolved.coordinates;
            }
        }

        if aggregate.failed > 0 {
            warn!("{} visitors could not be attributed to a region", aggregate.failed);
        }
        info!(
            "Attributed {} visitors to {} regions",
            aggregate.resolved,
            aggregate.regions.len()
        );
        aggregate
    }
}

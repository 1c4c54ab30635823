//! GeoIP lookup module using MaxMind GeoLite2 database

pub mod region;

use maxminddb::{PathElement, Reader};
use std::net::IpAddr;
use std::path::Path;
use tracing::info;

use crate::error::GeoError;

/// Location record for one address
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CityRecord {
    pub country: Option<String>,
    pub city: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

/// Source of location records
pub trait Locate {
    fn locate(&self, ip: IpAddr) -> Result<CityRecord, GeoError>;
}

/// GeoLite2-City reader wrapper
pub struct GeoIp {
    reader: Reader<Vec<u8>>,
    locale: String,
}

impl GeoIp {
    /// Open the database. The run cannot attribute regions without it, so
    /// failure here is fatal to the caller.
    pub fn open(database_path: &Path, locale: &str) -> Result<Self, GeoError> {
        let reader = Reader::open_readfile(database_path).map_err(|source| GeoError::Open {
            path: database_path.to_path_buf(),
            source,
        })?;
        info!("GeoIP database loaded: {}", database_path.display());
        Ok(Self {
            reader,
            locale: locale.to_string(),
        })
    }
}

impl Locate for GeoIp {
    fn locate(&self, ip: IpAddr) -> Result<CityRecord, GeoError> {
        if is_reserved_ip(&ip) {
            return Err(GeoError::Reserved(ip));
        }

        let lookup = self.reader.lookup(ip)?;

        let country = lookup.decode_path::<String>(&[
            PathElement::Key("country"),
            PathElement::Key("names"),
            PathElement::Key(self.locale.as_str()),
        ])?;
        let city = lookup.decode_path::<String>(&[
            PathElement::Key("city"),
            PathElement::Key("names"),
            PathElement::Key(self.locale.as_str()),
        ])?;
        let longitude = lookup
            .decode_path::<f64>(&[PathElement::Key("location"), PathElement::Key("longitude")])?;
        let latitude = lookup
            .decode_path::<f64>(&[PathElement::Key("location"), PathElement::Key("latitude")])?;

        let record = CityRecord {
            country,
            city,
            longitude,
            latitude,
        };
        if record == CityRecord::default() {
            return Err(GeoError::NotFound(ip));
        }
        Ok(record)
    }
}

/// Check if an IP address is private/local and never present in the database
fn is_reserved_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            ipv4.is_private()
                || ipv4.is_loopback()
                || ipv4.is_link_local()
                || ipv4.is_broadcast()
                || ipv4.is_documentation()
                || ipv4.is_unspecified()
        }
        IpAddr::V6(ipv6) => ipv6.is_loopback() || ipv6.is_unspecified(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_reserved_ranges() {
        assert!(is_reserved_ip(&ip("10.1.2.3")));
        assert!(is_reserved_ip(&ip("192.168.0.1")));
        assert!(is_reserved_ip(&ip("127.0.0.1")));
        assert!(is_reserved_ip(&ip("169.254.1.1")));
        assert!(is_reserved_ip(&ip("255.255.255.255")));
        assert!(is_reserved_ip(&ip("192.0.2.10")));
        assert!(is_reserved_ip(&ip("0.0.0.0")));
        assert!(is_reserved_ip(&ip("::1")));
        assert!(is_reserved_ip(&ip("::")));
    }

    #[test]
    fn test_public_ranges() {
        assert!(!is_reserved_ip(&ip("8.8.8.8")));
        assert!(!is_reserved_ip(&ip("81.2.69.142")));
        assert!(!is_reserved_ip(&ip("2001:4860:4860::8888")));
    }

    #[test]
    fn test_open_missing_database() {
        let err = GeoIp::open(Path::new("/nonexistent/GeoLite2-City.mmdb"), "en")
            .err()
            .unwrap();
        assert!(matches!(err, GeoError::Open { .. }));
    }
}

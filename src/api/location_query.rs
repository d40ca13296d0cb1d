//! Search box input parsing

use crate::models::Coordinates;
use crate::{Result, WeatherSenseError};

/// What the user typed into the search box
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    /// Explicit "lat,lon" pair, no geocoding needed
    Coordinates(Coordinates),
    /// Place name to geocode
    Name(String),
}

impl LocationQuery {
    /// Parse search input. Empty input is rejected with the message shown to the user.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(WeatherSenseError::validation("Please enter a location name"));
        }

        if let Some(coordinates) = Self::parse_coordinates(input)? {
            return Ok(LocationQuery::Coordinates(coordinates));
        }

        Ok(LocationQuery::Name(input.to_string()))
    }

    /// Parse "40.7,-74.0" or "40.7 -74.0". Returns `Ok(None)` when the input is not numeric.
    fn parse_coordinates(input: &str) -> Result<Option<Coordinates>> {
        let parts: Vec<&str> = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();

        if parts.len() != 2 {
            return Ok(None);
        }

        let (Ok(lat), Ok(lon)) = (parts[0].parse::<f64>(), parts[1].parse::<f64>()) else {
            return Ok(None);
        };

        if !(-90.0..=90.0).contains(&lat) {
            return Err(WeatherSenseError::validation(format!(
                "Latitude must be between -90 and 90, got: {lat}"
            )));
        }

        if !(-180.0..=180.0).contains(&lon) {
            return Err(WeatherSenseError::validation(format!(
                "Longitude must be between -180 and 180, got: {lon}"
            )));
        }

        Ok(Some(Coordinates::new(lat, lon)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("40.7128,-74.0060", 40.7128, -74.006)]
    #[case("40.7128, -74.0060", 40.7128, -74.006)]
    #[case("46.8182 8.2275", 46.8182, 8.2275)]
    fn test_parse_coordinates(#[case] input: &str, #[case] lat: f64, #[case] lon: f64) {
        assert_eq!(
            LocationQuery::parse(input).unwrap(),
            LocationQuery::Coordinates(Coordinates::new(lat, lon))
        );
    }

    #[rstest]
    #[case("London")]
    #[case("  New York  ")]
    #[case("Rio de Janeiro")]
    fn test_parse_names(#[case] input: &str) {
        assert_eq!(
            LocationQuery::parse(input).unwrap(),
            LocationQuery::Name(input.trim().to_string())
        );
    }

    #[test]
    fn test_empty_query_rejected() {
        let err = LocationQuery::parse("   ").unwrap_err();
        assert_eq!(err.user_message(), "Please enter a location name");
    }

    #[test]
    fn test_out_of_range_coordinates_rejected() {
        assert!(LocationQuery::parse("91.0,0.0").is_err());
        assert!(LocationQuery::parse("0.0,181.0").is_err());
    }
}

//! Simulated advanced conditions
//!
//! Pollen, astronomy, marine, agricultural and aviation figures are produced
//! by weighted random draws, not by any real data source. Everything shown to
//! the user from here carries a "(simulated)" label.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};

use crate::models::Coordinates;

/// Reference new moon, 2023-01-21 00:00 UTC
const KNOWN_NEW_MOON: (i32, u32, u32) = (2023, 1, 21);
const LUNAR_CYCLE_DAYS: f64 = 29.53;

/// Tidal data is only produced below this absolute latitude
const MARINE_LATITUDE_LIMIT: f64 = 60.0;

pub const SIMULATED_LABEL: &str = "(simulated)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum PollenLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl PollenLevel {
    fn score(self) -> f64 {
        match self {
            PollenLevel::Low => 1.0,
            PollenLevel::Moderate => 2.0,
            PollenLevel::High => 3.0,
            PollenLevel::VeryHigh => 4.0,
        }
    }

    fn from_average(average: f64) -> Self {
        if average <= 1.5 {
            PollenLevel::Low
        } else if average <= 2.5 {
            PollenLevel::Moderate
        } else if average <= 3.5 {
            PollenLevel::High
        } else {
            PollenLevel::VeryHigh
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PollenLevel::Low => "Low",
            PollenLevel::Moderate => "Moderate",
            PollenLevel::High => "High",
            PollenLevel::VeryHigh => "Very High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    #[must_use]
    pub fn for_date(date: NaiveDate) -> Self {
        match date.month() {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Fall,
            _ => Season::Winter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allergen {
    pub name: &'static str,
    pub level: PollenLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollenReport {
    pub allergens: Vec<Allergen>,
    pub overall: PollenLevel,
    pub advice: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoonPhase {
    pub name: &'static str,
    pub icon: &'static str,
    /// Position within the lunar cycle, 0 is new moon
    pub fraction: f64,
}

const MOON_PHASES: [(&str, &str); 8] = [
    ("New Moon", "🌑"),
    ("Waxing Crescent", "🌒"),
    ("First Quarter", "🌓"),
    ("Waxing Gibbous", "🌔"),
    ("Full Moon", "🌕"),
    ("Waning Gibbous", "🌖"),
    ("Last Quarter", "🌗"),
    ("Waning Crescent", "🌘"),
];

/// Approximate moon phase from the mean synodic month
#[must_use]
pub fn moon_phase(at: DateTime<Utc>) -> MoonPhase {
    let (year, month, day) = KNOWN_NEW_MOON;
    let reference = Utc
        .with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default();

    let days = (at - reference).num_seconds() as f64 / 86_400.0;
    let cycles = days / LUNAR_CYCLE_DAYS;
    let fraction = cycles - cycles.floor();
    let index = ((fraction * 8.0 + 0.5).floor() as usize) % MOON_PHASES.len();
    let (name, icon) = MOON_PHASES[index];

    MoonPhase { name, icon, fraction }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StargazingQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl StargazingQuality {
    #[must_use]
    pub fn score(&self) -> u8 {
        match self {
            StargazingQuality::Excellent => 90,
            StargazingQuality::Good => 75,
            StargazingQuality::Fair => 60,
            StargazingQuality::Poor => 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AstronomyReport {
    pub moon: MoonPhase,
    pub stargazing: StargazingQuality,
    pub advice: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarineReport {
    pub next_high_tide: DateTime<Utc>,
    pub next_low_tide: DateTime<Utc>,
    /// Meters
    pub tide_height: f64,
    pub wave_height: &'static str,
    pub surf_rating: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgricultureReport {
    pub soil_moisture: &'static str,
    pub soil_moisture_percent: u8,
    pub crop_health: &'static str,
    pub growing_degree_days: u32,
    pub pest_risk: &'static str,
    pub irrigation_needed: bool,
    pub advice: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlightRules {
    Vfr,
    Mvfr,
    Ifr,
}

impl FlightRules {
    /// Classify from visibility (statute miles) and the reported sky cover
    #[must_use]
    pub fn classify(visibility_sm: f64, sky_cover: &str) -> Self {
        let open_sky = matches!(sky_cover, "CLR" | "FEW" | "SCT");
        if visibility_sm >= 3.0 && open_sky {
            FlightRules::Vfr
        } else if visibility_sm >= 1.0 && sky_cover != "OVC" {
            FlightRules::Mvfr
        } else {
            FlightRules::Ifr
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightRules::Vfr => "VFR",
            FlightRules::Mvfr => "MVFR",
            FlightRules::Ifr => "IFR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AviationReport {
    pub metar: String,
    pub rules: FlightRules,
}

/// Source of simulated condition reports
pub trait SimulatedDataProvider: Send + Sync {
    fn pollen(&self, date: NaiveDate) -> PollenReport;
    fn astronomy(&self, now: DateTime<Utc>) -> AstronomyReport;
    fn marine(&self, now: DateTime<Utc>) -> MarineReport;
    fn agriculture(&self) -> AgricultureReport;
    fn aviation(&self, now: DateTime<Utc>) -> AviationReport;
}

/// Weighted random simulation, reproducible when seeded
pub struct RandomSimulation {
    rng: Mutex<StdRng>,
}

impl RandomSimulation {
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::seeded(rand::rng().random())
    }

    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Pick from `choices` by cumulative weight; weights sum to 1
fn weighted<T: Copy>(rng: &mut StdRng, choices: &[(T, f64)]) -> T {
    let roll: f64 = rng.random();
    let mut cumulative = 0.0;
    for (choice, weight) in choices {
        cumulative += weight;
        if roll <= cumulative {
            return *choice;
        }
    }
    choices[0].0
}

fn pick<T: Copy>(rng: &mut StdRng, choices: &[T]) -> T {
    choices[rng.random_range(0..choices.len())]
}

fn pollen_advice(allergens: &[Allergen]) -> String {
    let high: Vec<&Allergen> = allergens
        .iter()
        .filter(|a| a.level >= PollenLevel::High)
        .collect();
    if high.is_empty() {
        return "Pollen levels are low. Normal outdoor activities are fine.".to_string();
    }

    let mut advice = Vec::new();
    for allergen in high {
        advice.push(match allergen.name {
            "Tree Pollen" => "Tree pollen levels are high. Keep windows closed and consider indoor exercise.",
            "Grass Pollen" => "Grass pollen levels are high. Avoid mowing lawn and wear a mask if gardening.",
            "Weed Pollen" => "Weed pollen levels are high. Limit outdoor time during peak pollen hours (5-10 AM).",
            _ => "Mold spore levels are high. Keep indoor humidity below 50% and clean damp areas.",
        });
    }
    advice.push("Consider taking antihistamines before going outdoors and shower after coming inside.");
    advice.join(" ")
}

fn astronomy_advice(quality: StargazingQuality, moon: &MoonPhase) -> String {
    let mut advice = Vec::new();
    if quality.score() >= 75 {
        advice.push("Excellent conditions for stargazing tonight!");
        match moon.name {
            "New Moon" => advice.push("New moon provides ideal dark sky conditions for deep sky objects."),
            "Full Moon" => advice.push("Full moon is perfect for lunar observation but may wash out fainter stars."),
            _ => {}
        }
    } else if quality.score() >= 60 {
        advice.push("Fair conditions for stargazing. Focus on brighter objects.");
    } else {
        advice.push("Poor conditions for stargazing. Consider indoor astronomy activities.");
    }
    advice.push("Allow 20-30 minutes for your eyes to adapt to darkness.");
    advice.join(" ")
}

impl SimulatedDataProvider for RandomSimulation {
    fn pollen(&self, date: NaiveDate) -> PollenReport {
        const LEVELS: [(PollenLevel, f64); 4] = [
            (PollenLevel::Low, 0.4),
            (PollenLevel::Moderate, 0.3),
            (PollenLevel::High, 0.2),
            (PollenLevel::VeryHigh, 0.1),
        ];
        let season = Season::for_date(date);
        let mut rng = self.rng();

        let candidates = [
            ("Tree Pollen", Some(Season::Spring)),
            ("Grass Pollen", Some(Season::Summer)),
            ("Weed Pollen", Some(Season::Fall)),
            ("Mold Spores", None),
        ];
        let allergens: Vec<Allergen> = candidates
            .into_iter()
            .filter(|(_, active)| active.is_none_or(|s| s == season))
            .map(|(name, _)| Allergen {
                name,
                level: weighted(&mut rng, &LEVELS),
            })
            .collect();

        let average =
            allergens.iter().map(|a| a.level.score()).sum::<f64>() / allergens.len() as f64;

        PollenReport {
            overall: PollenLevel::from_average(average),
            advice: pollen_advice(&allergens),
            allergens,
        }
    }

    fn astronomy(&self, now: DateTime<Utc>) -> AstronomyReport {
        let stargazing = weighted(
            &mut self.rng(),
            &[
                (StargazingQuality::Excellent, 0.3),
                (StargazingQuality::Good, 0.4),
                (StargazingQuality::Fair, 0.2),
                (StargazingQuality::Poor, 0.1),
            ],
        );
        let moon = moon_phase(now);
        AstronomyReport {
            advice: astronomy_advice(stargazing, &moon),
            moon,
            stargazing,
        }
    }

    fn marine(&self, now: DateTime<Utc>) -> MarineReport {
        let mut rng = self.rng();
        let next_high_tide = now + Duration::hours(12) + Duration::minutes(25);
        MarineReport {
            next_high_tide,
            next_low_tide: next_high_tide - Duration::hours(6) - Duration::minutes(12),
            tide_height: (rng.random_range(0.0..4.0) * 100.0_f64).round() / 100.0,
            wave_height: pick(
                &mut rng,
                &["Flat", "Small (1-2ft)", "Moderate (3-5ft)", "Large (6-8ft)", "Huge (8ft+)"],
            ),
            surf_rating: pick(&mut rng, &["Poor", "Fair", "Good", "Excellent"]),
        }
    }

    fn agriculture(&self) -> AgricultureReport {
        let mut rng = self.rng();
        let (soil_moisture, soil_moisture_percent) = weighted(
            &mut rng,
            &[
                (("Very Dry", 10), 0.1),
                (("Dry", 25), 0.2),
                (("Optimal", 50), 0.4),
                (("Moist", 75), 0.2),
                (("Waterlogged", 95), 0.1),
            ],
        );
        let crop_health = weighted(
            &mut rng,
            &[("Poor", 0.1), ("Fair", 0.2), ("Good", 0.5), ("Excellent", 0.2)],
        );
        let growing_degree_days = rng.random_range(15.0..30.0_f64).round() as u32 - 10;

        let humidity = rng.random_range(40.0..90.0);
        let temperature = rng.random_range(15.0..30.0);
        let pest_risk = if humidity > 70.0 && temperature > 20.0 {
            "High"
        } else if humidity > 60.0 || temperature > 25.0 {
            "Medium"
        } else {
            "Low"
        };

        let mut advice = Vec::new();
        let irrigation_needed = soil_moisture_percent < 60;
        if soil_moisture_percent < 30 {
            advice.push("Irrigation needed: 20-30mm immediate".to_string());
        } else if irrigation_needed {
            advice.push("Irrigation needed: 10-15mm within 24 hours".to_string());
        }
        match pest_risk {
            "High" => advice.push("High pest risk detected. Consider preventive treatment.".to_string()),
            "Medium" => advice.push("Monitor for pests, especially aphids.".to_string()),
            _ => {}
        }
        if matches!(soil_moisture, "Very Dry" | "Waterlogged") {
            advice.push(format!(
                "Soil moisture at {} levels. Adjust watering practices.",
                soil_moisture.to_lowercase()
            ));
        }

        AgricultureReport {
            soil_moisture,
            soil_moisture_percent,
            crop_health,
            growing_degree_days,
            pest_risk,
            irrigation_needed,
            advice: if advice.is_empty() {
                "Conditions are optimal for crop growth.".to_string()
            } else {
                advice.join(" ")
            },
        }
    }

    fn aviation(&self, now: DateTime<Utc>) -> AviationReport {
        let mut rng = self.rng();
        let station = pick(&mut rng, &["KJFK", "KLAX", "KEWR", "KSFO", "KORD"]);
        let sky_cover = pick(&mut rng, &["CLR", "FEW", "SCT", "BKN", "OVC"]);
        let visibility = (rng.random_range(0.5..10.0_f64) * 10.0).round() / 10.0;
        let temperature: i32 = rng.random_range(10..=30);
        let dewpoint = temperature - rng.random_range(5..=15);
        let wind_direction: u16 = rng.random_range(0..360);
        let wind_speed: u8 = rng.random_range(0..=20);
        let altimeter: u16 = rng.random_range(2950..=3000);

        let metar = format!(
            "METAR {station} {}Z {wind_direction:03}{wind_speed:02}KT {visibility:.1}SM {sky_cover} {temperature}/{dewpoint} A{altimeter}",
            now.format("%d%H%M"),
        );

        AviationReport {
            metar,
            rules: FlightRules::classify(visibility, sky_cover),
        }
    }
}

/// All simulated reports for one location, ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulatedPanel {
    pub pollen: PollenReport,
    pub astronomy: AstronomyReport,
    /// Only for locations that may be coastal
    pub marine: Option<MarineReport>,
    pub agriculture: AgricultureReport,
    pub aviation: AviationReport,
}

impl SimulatedPanel {
    pub fn build(
        provider: &dyn SimulatedDataProvider,
        coordinates: Coordinates,
        now: DateTime<Utc>,
    ) -> Self {
        let marine = (coordinates.latitude.abs() < MARINE_LATITUDE_LIMIT)
            .then(|| provider.marine(now));
        Self {
            pollen: provider.pollen(now.date_naive()),
            astronomy: provider.astronomy(now),
            marine,
            agriculture: provider.agriculture(),
            aviation: provider.aviation(now),
        }
    }

    /// Display lines, each labelled as simulated
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Pollen {SIMULATED_LABEL}: {} risk. {}", self.pollen.overall.as_str(), self.pollen.advice),
            format!(
                "Astronomy {SIMULATED_LABEL}: {} {}, stargazing {:?} ({}/100)",
                self.astronomy.moon.icon,
                self.astronomy.moon.name,
                self.astronomy.stargazing,
                self.astronomy.stargazing.score()
            ),
        ];
        if let Some(marine) = &self.marine {
            lines.push(format!(
                "Marine {SIMULATED_LABEL}: tide {:.2}m, waves {}, surf {}",
                marine.tide_height, marine.wave_height, marine.surf_rating
            ));
        }
        lines.push(format!(
            "Agriculture {SIMULATED_LABEL}: soil {} ({}%), crops {}, pests {}. {}",
            self.agriculture.soil_moisture,
            self.agriculture.soil_moisture_percent,
            self.agriculture.crop_health,
            self.agriculture.pest_risk,
            self.agriculture.advice
        ));
        lines.push(format!(
            "Aviation {SIMULATED_LABEL}: {} {}",
            self.aviation.rules.as_str(),
            self.aviation.metar
        ));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn noon(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    #[rstest]
    #[case(noon(2023, 1, 21), "New Moon")]
    #[case(noon(2023, 1, 28), "First Quarter")]
    #[case(noon(2023, 2, 5), "Full Moon")]
    #[case(noon(2023, 2, 13), "Last Quarter")]
    #[case(noon(2023, 2, 19), "New Moon")]
    fn test_moon_phase(#[case] at: DateTime<Utc>, #[case] expected: &str) {
        let phase = moon_phase(at);
        assert_eq!(phase.name, expected);
        assert!((0.0..1.0).contains(&phase.fraction));
    }

    #[rstest]
    #[case(10.0, "CLR", FlightRules::Vfr)]
    #[case(2.0, "SCT", FlightRules::Mvfr)]
    #[case(5.0, "BKN", FlightRules::Mvfr)]
    #[case(5.0, "OVC", FlightRules::Ifr)]
    #[case(0.5, "CLR", FlightRules::Ifr)]
    fn test_flight_rules(#[case] visibility: f64, #[case] cover: &str, #[case] expected: FlightRules) {
        assert_eq!(FlightRules::classify(visibility, cover), expected);
    }

    #[test]
    fn test_pollen_allergens_follow_season() {
        let simulation = RandomSimulation::seeded(3);
        let winter = simulation.pollen(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(winter.allergens.len(), 1);
        assert_eq!(winter.allergens[0].name, "Mold Spores");

        let spring = simulation.pollen(NaiveDate::from_ymd_opt(2024, 4, 15).unwrap());
        let names: Vec<_> = spring.allergens.iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["Tree Pollen", "Mold Spores"]);
        assert!(!spring.advice.is_empty());
    }

    #[test]
    fn test_seeded_simulation_is_reproducible() {
        let coordinates = Coordinates::new(40.7, -74.0);
        let now = noon(2024, 6, 1);
        let a = SimulatedPanel::build(&RandomSimulation::seeded(11), coordinates, now);
        let b = SimulatedPanel::build(&RandomSimulation::seeded(11), coordinates, now);
        assert_eq!(a, b);
    }

    #[test]
    fn test_marine_only_below_latitude_limit() {
        let simulation = RandomSimulation::seeded(5);
        let now = noon(2024, 6, 1);
        let coastal = SimulatedPanel::build(&simulation, Coordinates::new(40.7, -74.0), now);
        let polar = SimulatedPanel::build(&simulation, Coordinates::new(70.0, 20.0), now);
        assert!(coastal.marine.is_some());
        assert!(polar.marine.is_none());
        assert!(coastal.marine.unwrap().next_high_tide > now);
    }

    #[test]
    fn test_every_line_is_labelled() {
        let panel = SimulatedPanel::build(
            &RandomSimulation::seeded(9),
            Coordinates::new(10.0, 10.0),
            noon(2024, 6, 1),
        );
        let lines = panel.lines();
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|line| line.contains(SIMULATED_LABEL)));
    }

    #[test]
    fn test_agriculture_and_aviation_are_consistent() {
        let simulation = RandomSimulation::seeded(21);
        for _ in 0..50 {
            let farm = simulation.agriculture();
            assert_eq!(farm.irrigation_needed, farm.soil_moisture_percent < 60);
            assert!((5..=20).contains(&farm.growing_degree_days));

            let flight = simulation.aviation(noon(2024, 6, 1));
            assert!(flight.metar.starts_with("METAR K"));
            assert!(flight.metar.contains("011200Z"));
        }
    }
}

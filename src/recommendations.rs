//! Weather-driven advice
//!
//! Every generator is a pure function of the current scalars and the user's
//! profile. Temperatures are in °C. Fragments are appended in priority order
//! (air quality, temperature extremes, UV, condition-specific, general
//! wellness) and a default sentence is returned when nothing triggers, so the
//! result is never empty.
//!
//! Severe-weather alerts and growing degree days work on the daily forecast
//! summaries instead and convert to °C and km/h themselves.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::aggregation::DailySummary;
use crate::models::UnitSystem;

/// Base temperature (°C) for growing degree days
pub const GDD_BASE_CELSIUS: f64 = 10.0;

const HEAT_ALERT_CELSIUS: f64 = 35.0;
const COLD_ALERT_CELSIUS: f64 = -10.0;
const PRECIPITATION_ALERT_PERCENT: u8 = 80;
const WIND_ALERT_KMH: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeGroup {
    Child,
    #[default]
    Adult,
    Senior,
}

/// Shared scale for activity and fitness levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    #[default]
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Indoor,
    Outdoor,
    #[default]
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelPurpose {
    #[default]
    Leisure,
    Business,
    Outdoor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelDuration {
    #[default]
    Day,
    Weekend,
    Week,
    Month,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Crop {
    General,
    Vegetables,
    Fruit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FarmSeason {
    Planting,
    Harvest,
}

/// Personal profile that tailors advice. Never mutated by the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    /// Lowercase tags such as "asthma", "arthritis", "heart"
    pub health_conditions: BTreeSet<String>,
    pub age_group: AgeGroup,
    pub age: Option<u32>,
    pub activity_level: Level,
    pub preferred_activity_type: ActivityType,
    pub fitness_level: Level,
    /// Fitzpatrick skin type, 1-6
    pub skin_type: Option<u8>,
    pub gender: Option<Gender>,
    pub travel_purpose: TravelPurpose,
    pub travel_duration: TravelDuration,
    /// Empty means general crops
    pub crops: Vec<Crop>,
    pub farm_season: Option<FarmSeason>,
    pub has_solar: bool,
    pub has_wind_turbine: bool,
}

impl UserPreferences {
    #[must_use]
    pub fn has_condition(&self, condition: &str) -> bool {
        self.health_conditions.contains(condition)
    }

    fn grows(&self, crop: Crop) -> bool {
        if self.crops.is_empty() {
            crop == Crop::General
        } else {
            self.crops.contains(&crop)
        }
    }
}

fn is_rainy(condition: &str) -> bool {
    condition.contains("Rain") || condition.contains("Drizzle")
}

/// Health and wellness advice
#[must_use]
pub fn health_wellness(
    temp: f64,
    condition: &str,
    uv: f64,
    aqi: u8,
    prefs: &UserPreferences,
) -> String {
    let rainy = is_rainy(condition);
    let snowy = condition.contains("Snow");
    let windy = condition.contains("Windy") || condition.contains("wind");
    let humid = condition.contains("Humid") || condition.contains("humidity");
    let senior = prefs.age_group == AgeGroup::Senior;
    let very_active = prefs.activity_level == Level::High;

    let mut advice: Vec<&str> = Vec::new();

    if aqi >= 4 {
        advice.push("Air quality is poor. Limit outdoor activities, especially if you have respiratory issues. Consider using an air purifier indoors.");
    }

    if temp < -15.0 {
        advice.push("Extreme cold warning! Risk of hypothermia and frostbite. Limit outdoor exposure, dress in multiple layers, and protect extremities.");
    }
    if temp > 38.0 {
        advice.push("Heat advisory! Risk of heat exhaustion or heat stroke. Stay hydrated, seek shade, and limit physical activity during peak hours.");
    }

    if uv > 7.0 {
        advice.push("High UV index today. Wear sunscreen (SPF 30+), sunglasses, and a wide-brimmed hat. Seek shade between 10am-4pm.");
    }

    if rainy {
        advice.push("Damp weather may aggravate joint pain and wet surfaces raise the risk of slips and falls. Consider indoor exercise options.");
        if prefs.has_condition("arthritis") {
            advice.push("Gentle stretching or warm baths may help with joint discomfort in humid conditions.");
        }
        if prefs.has_condition("asthma") {
            advice.push("Rain can increase mold spores. Keep your inhaler accessible and consider staying indoors if you're sensitive.");
        }
    }

    if snowy {
        advice.push("Cold weather can strain the heart. Dress warmly in layers and be cautious during physical activities. Watch for signs of frostbite.");
        if senior {
            advice.push("Seniors should limit prolonged outdoor exposure and ensure proper heating indoors.");
        }
        if very_active {
            advice.push("For outdoor activities in snow, protect extremities and take frequent breaks in warm areas.");
        }
    }

    if windy {
        advice.push("Windy conditions increase heat loss and dry out skin. Protect eyes and skin.");
        if prefs.has_condition("allergies") {
            advice.push("Wind can spread pollen and irritants. Consider staying indoors if you have allergies.");
        }
    }

    if humid {
        advice.push("High humidity makes it harder for the body to cool itself. Stay hydrated and take breaks in cooler areas.");
        if prefs.has_condition("asthma") {
            advice.push("Humid conditions can worsen respiratory issues. Use air conditioning to reduce indoor humidity if possible.");
        }
    }

    if temp > 30.0 {
        advice.push("Hot temperatures increase dehydration risk. Drink water regularly, even if you don't feel thirsty.");
        if very_active {
            advice.push("Schedule outdoor activities for early morning or evening when temperatures are lower.");
        }
    } else if temp < 0.0 {
        advice.push("Cold temperatures increase the risk of hypothermia. Dress in layers and protect extremities.");
        if senior || prefs.has_condition("heart") {
            advice.push("Cold weather puts extra strain on the heart. Take it easy with physical activities.");
        }
    } else if temp < 10.0 {
        advice.push("Cooler temperatures may affect sleep quality. Keep your bedroom slightly cooler for optimal rest.");
        if senior {
            advice.push("Ensure proper heating and check on elderly family members.");
        }
    }

    if temp > 18.0 && temp < 28.0 && condition.contains("Clear") {
        advice.push("Ideal conditions for outdoor exercise and vitamin D synthesis. A walk outside can boost mood and energy.");
    }

    if rainy || condition.contains("Clouds") {
        advice.push("Overcast weather can affect mood. Try to get natural light exposure and keep regular routines.");
        if prefs.has_condition("depression") {
            advice.push("If you're sensitive to weather changes, consider light therapy or staying connected with others.");
        }
    }

    if advice.is_empty() {
        return "Maintain regular hydration throughout the day. Monitor how weather changes affect your body and adjust activities accordingly.".to_string();
    }
    advice.join(" ")
}

/// One activity suggestion for the current conditions
#[must_use]
pub fn activity(temp: f64, condition: &str, aqi: u8, prefs: &UserPreferences) -> String {
    let outdoor = prefs.preferred_activity_type == ActivityType::Outdoor;
    let fit = prefs.fitness_level == Level::High;
    let pick = |outdoor_text: &str, other_text: &str| {
        if outdoor { outdoor_text } else { other_text }.to_string()
    };

    if condition.contains("Storm") || condition.contains("Thunder") {
        return pick(
            "Stay indoors and avoid travel if possible. Consider indoor alternatives like yoga or reading.",
            "Perfect time for indoor activities like cooking, reading, or home workouts.",
        );
    }

    if aqi >= 4 {
        return pick(
            "Consider indoor activities due to poor air quality. Try gym workouts or home exercises.",
            "Ideal for indoor activities. Consider yoga, pilates, or creative hobbies.",
        );
    }

    if is_rainy(condition) {
        return match (outdoor, fit) {
            (true, true) => "If you enjoy outdoor activities in rain, consider waterproof gear for hiking or running.",
            (true, false) => "Indoor activities recommended. Visit museums, galleries, or cafes.",
            (false, _) => "Perfect for indoor activities like cooking classes, art projects, or a spa day.",
        }
        .to_string();
    }

    if condition.contains("Snow") {
        if temp < -5.0 {
            return pick(
                "Limited outdoor exposure recommended. If going out, dress warmly and limit time outside.",
                "Great time for indoor activities. Try baking, reading, or home organization.",
            );
        }
        return match (outdoor, fit) {
            (true, true) => "Perfect for winter sports enthusiasts: skiing, snowboarding, or ice skating.",
            (true, false) => "Winter sports like skiing or sledding would be perfect for beginners.",
            (false, _) => "Enjoy indoor winter activities like hot chocolate making, winter crafts, or movie marathons.",
        }
        .to_string();
    }

    if temp > 30.0 {
        return match (outdoor, fit) {
            (true, true) => "For heat-tolerant individuals: early morning or evening outdoor workouts. Stay hydrated!",
            (true, false) => "Indoor or water-based activities recommended. Stay hydrated and cool.",
            (false, _) => "Ideal for indoor climate-controlled activities. Consider swimming or water aerobics.",
        }
        .to_string();
    }

    if temp < 0.0 {
        return match (outdoor, fit) {
            (true, true) => "For cold-weather enthusiasts: winter jogging or snowshoeing with proper gear.",
            (true, false) => "Limited outdoor exposure recommended. Indoor sports like basketball or badminton are ideal.",
            (false, _) => "Perfect for cozy indoor activities like baking, crafting, or board games.",
        }
        .to_string();
    }

    if temp > 20.0 && temp < 30.0 && condition.contains("Clear") {
        return match (outdoor, fit) {
            (true, true) => "Optimal conditions for intense outdoor activities: hiking, cycling, or beach volleyball.",
            (true, false) => "Perfect for hiking, cycling or beach activities. Great weather for outdoor fun!",
            (false, _) => "Beautiful weather for outdoor picnics, gardening, or open-air markets.",
        }
        .to_string();
    }

    pick(
        "Good conditions for outdoor activities. Consider walking, jogging, or outdoor sports.",
        "Pleasant weather for either indoor or outdoor activities based on your preference.",
    )
}

/// Sun protection advice for a UV index
#[must_use]
pub fn uv(uv: f64, prefs: &UserPreferences) -> String {
    let mut advice = if uv < 3.0 {
        "Low UV risk - minimal protection needed"
    } else if uv < 6.0 {
        "Moderate UV - wear sunscreen and protective clothing"
    } else if uv < 8.0 {
        "High UV - limit sun exposure between 10am and 4pm"
    } else {
        "Very high UV - avoid sun exposure during peak hours, use SPF 50+ sunscreen"
    }
    .to_string();

    let skin = match prefs.skin_type.unwrap_or(3) {
        1 | 2 => Some("Your skin type burns very easily. Take extra precautions with sun protection."),
        3 | 4 => Some("Your skin type burns moderately. Regular sun protection is important."),
        5 | 6 => Some("Your skin type rarely burns but still needs protection to prevent long-term damage."),
        _ => None,
    };
    if let Some(skin) = skin {
        advice.push(' ');
        advice.push_str(skin);
    }

    let activity = match prefs.activity_level {
        Level::High if uv >= 3.0 => Some("Since you're highly active outdoors, reapply sunscreen every 2 hours and consider UV-blocking clothing."),
        Level::Low if uv >= 6.0 => Some("With limited outdoor activity, you can still enjoy outdoor time with proper protection."),
        _ => None,
    };
    if let Some(activity) = activity {
        advice.push(' ');
        advice.push_str(activity);
    }

    advice
}

/// Daily fluid intake target in liters, at least 1.0
#[must_use]
pub fn water_liters(temp: f64, condition: &str, prefs: &UserPreferences) -> f64 {
    let mut liters: f64 = if prefs.gender == Some(Gender::Male) { 2.5 } else { 2.0 };

    if temp > 35.0 {
        liters += 1.5;
    } else if temp > 30.0 {
        liters += 1.0;
    } else if temp > 25.0 {
        liters += 0.5;
    } else if temp < 0.0 {
        liters -= 0.3;
    }

    if condition.contains("Humid") || condition.contains("Mist") {
        liters += 0.4;
    }
    if is_rainy(condition) {
        liters += 0.2;
    }

    match prefs.activity_level {
        Level::High => liters += 1.2,
        Level::Low => liters -= 0.3,
        Level::Moderate => {}
    }

    let age = prefs.age.unwrap_or(30);
    if age > 65 {
        liters += 0.3;
    } else if age < 18 {
        liters += 0.2;
    }

    if prefs.has_condition("diabetes") {
        liters += 0.3;
    }
    if prefs.has_condition("kidney") {
        liters = liters.min(2.5);
    }

    liters.max(1.0)
}

/// Hydration target plus practical tips
#[must_use]
pub fn water(temp: f64, condition: &str, prefs: &UserPreferences) -> String {
    let liters = (water_liters(temp, condition, prefs) * 10.0).round() / 10.0;
    let cups = (liters * 4.0).round() as u32;

    let mut tips: Vec<&str> = Vec::new();
    if temp > 30.0 {
        tips.push("Drink water before you feel thirsty, as dehydration can happen quickly in extreme heat.");
        tips.push("Consider electrolyte replacement if you're sweating heavily.");
    } else if temp < 5.0 {
        tips.push("Stay hydrated even in cold weather. Warm beverages like herbal tea count toward your intake.");
        tips.push("Eat water-rich foods like soups and fruits.");
    }
    if condition.contains("Humid") {
        tips.push("High humidity can mask dehydration. Monitor your urine color as a hydration indicator.");
    }
    if condition.contains("Windy") {
        tips.push("Windy conditions can increase dehydration. Drink regularly even if you don't feel thirsty.");
    }
    if prefs.activity_level == Level::High {
        tips.push("For intense activity, sip water regularly rather than drinking large amounts at once.");
        tips.push("Consider a sports drink for activities longer than an hour.");
    }
    if prefs.has_condition("heart") {
        tips.push("Heart conditions may require fluid restrictions. Consult your doctor about appropriate intake.");
    }
    if prefs.has_condition("kidney") {
        tips.push("Kidney conditions may require fluid restrictions. Follow your doctor's specific guidance.");
    }
    if tips.is_empty() {
        tips.push("Drink when thirsty and monitor your urine color. Pale yellow indicates good hydration.");
        tips.push("Include water-rich foods like fruits and vegetables in your diet.");
    }

    format!(
        "Aim for about {liters:.1} liters ({cups} cups) of fluids today. {}",
        tips.join(" ")
    )
}

/// Meal suggestion for the weather
#[must_use]
pub fn food(temp: f64, condition: &str) -> String {
    if temp > 25.0 {
        "Focus on hydrating foods like watermelon, cucumber, and leafy greens. Light meals like salads and cold soups are ideal."
    } else if temp < 10.0 {
        "Warming foods like soups, stews, and hot cereals. Include root vegetables and warming spices like ginger and cinnamon."
    } else if is_rainy(condition) {
        "Comfort foods like soups and warm beverages. Include vitamin C rich foods to boost immunity."
    } else if condition.contains("Snow") {
        "Hearty meals with complex carbs for sustained energy. Hot beverages with cinnamon or ginger help maintain body warmth."
    } else {
        "Balanced meals with seasonal produce. Include a mix of proteins, whole grains, and fresh vegetables."
    }
    .to_string()
}

/// Travel planning advice
#[must_use]
pub fn travel(temp: f64, condition: &str, uv: f64, prefs: &UserPreferences) -> String {
    let mut advice: Vec<&str> = Vec::new();

    if condition.contains("Rain") || condition.contains("Snow") {
        advice.push("Pack appropriate waterproof gear and allow extra time for travel delays.");
    }
    if uv > 6.0 {
        advice.push("High UV levels: pack sunscreen, sunglasses, and a hat for outdoor activities.");
    }
    if temp > 30.0 {
        advice.push("Hot weather: travel during cooler parts of the day and stay hydrated during transit.");
    } else if temp < 0.0 {
        advice.push("Cold weather: dress in layers and protect electronics from extreme cold.");
    }
    if matches!(prefs.travel_duration, TravelDuration::Week | TravelDuration::Month) {
        advice.push("Extended travel: pack for variable conditions and check long-range forecasts.");
    }
    match prefs.travel_purpose {
        TravelPurpose::Business => advice.push("Business travel: keep backup plans for important meetings in case of weather disruptions."),
        TravelPurpose::Outdoor => advice.push("Outdoor adventure: check trail conditions and weather forecasts for your specific activities."),
        TravelPurpose::Leisure => {}
    }

    if advice.is_empty() {
        return "Weather conditions are favorable for travel. Check local forecasts before departure.".to_string();
    }
    advice.join(" ")
}

/// Crop and field-work advice; `humidity` is relative humidity in percent
#[must_use]
pub fn agriculture_advice(
    temp: f64,
    condition: &str,
    humidity: f64,
    prefs: &UserPreferences,
) -> String {
    let mut advice: Vec<&str> = Vec::new();

    if prefs.grows(Crop::General) || prefs.grows(Crop::Vegetables) {
        if temp > 25.0 && condition.contains("Clear") {
            advice.push("Ideal growing conditions for warm-season vegetables. Ensure adequate watering.");
        } else if temp < 5.0 {
            advice.push("Cold temperatures may slow growth. Consider cold frames or greenhouse protection.");
        }
    }
    if prefs.grows(Crop::Fruit) && temp > 15.0 && temp < 25.0 {
        advice.push("Optimal fruit development temperatures. Monitor for pests and diseases.");
    }

    if condition.contains("Rain") {
        advice.push("Natural irrigation received. Check soil drainage to prevent waterlogging.");
    } else if humidity < 40.0 {
        advice.push("Low humidity increases water needs. Irrigate deeply but less frequently.");
    }

    match prefs.farm_season {
        Some(FarmSeason::Planting) if temp > 10.0 && !condition.contains("Snow") => {
            advice.push("Suitable planting conditions. Work with soil when it's moist but not waterlogged.");
        }
        Some(FarmSeason::Harvest) if condition.contains("Clear") => {
            advice.push("Favorable harvest weather. Plan picking schedule for early morning or evening.");
        }
        _ => {}
    }

    if advice.is_empty() {
        return "Current conditions are generally favorable for agricultural activities. Monitor local forecasts for changes.".to_string();
    }
    advice.join(" ")
}

/// Household energy advice
#[must_use]
pub fn energy_advice(temp: f64, condition: &str, prefs: &UserPreferences) -> String {
    let mut advice: Vec<&str> = Vec::new();

    if temp > 25.0 {
        advice.push("Cooling demand high: Set thermostat to 78°F (26°C) and use fans to improve comfort.");
    } else if temp < 10.0 {
        advice.push("Heating demand high: Set thermostat to 68°F (20°C) and seal drafts to reduce energy use.");
    }

    if condition.contains("Clear") {
        advice.push("Take advantage of natural light to reduce electric lighting needs during daytime.");
    } else if condition.contains("Clouds") || condition.contains("Rain") {
        advice.push("Limited natural light: Consider full-spectrum bulbs for better indoor illumination.");
    }

    if prefs.has_solar && condition.contains("Clear") {
        advice.push("Optimal solar energy generation conditions. Monitor battery storage levels.");
    }
    if prefs.has_wind_turbine && condition.contains("Windy") {
        advice.push("Wind energy generation favorable. Check turbine performance and battery charging status.");
    }

    if temp > 30.0 {
        advice.push("Run heat-generating appliances (oven, dryer) during cooler evening hours to reduce cooling load.");
    } else if temp < 0.0 {
        advice.push("Run energy-intensive appliances during peak heating hours to utilize waste heat.");
    }

    if advice.is_empty() {
        return "Energy consumption patterns are typical for current weather conditions. No special adjustments needed.".to_string();
    }
    advice.join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertKind {
    HeatAdvisory,
    ColdAdvisory,
    PrecipitationWarning,
    WindAdvisory,
}

impl AlertKind {
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            AlertKind::HeatAdvisory => "Heat Advisory",
            AlertKind::ColdAdvisory => "Cold Advisory",
            AlertKind::PrecipitationWarning => "Precipitation Warning",
            AlertKind::WindAdvisory => "Wind Advisory",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Moderate,
    High,
}

/// A severe-weather condition expected on one forecast day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherAlert {
    pub date: NaiveDate,
    pub date_label: String,
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for WeatherAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:?}) {}: {}",
            self.kind.title(),
            self.severity,
            self.date_label,
            self.message
        )
    }
}

/// Alerts for each forecast day, in day order.
///
/// Temperatures and wind in `days` are in `units`; thresholds are strict and
/// checked in °C and km/h.
#[must_use]
pub fn severe_weather_alerts(days: &[DailySummary], units: UnitSystem) -> Vec<WeatherAlert> {
    let mut alerts = Vec::new();
    for day in days {
        let mut push = |kind, severity, message: String| {
            alerts.push(WeatherAlert {
                date: day.date,
                date_label: day.date_label.clone(),
                kind,
                severity,
                message,
            });
        };

        let high = units.to_celsius(day.high);
        let low = units.to_celsius(day.low);
        let wind = units.wind_speed_kmh(day.max_wind_speed);

        if high > HEAT_ALERT_CELSIUS {
            push(
                AlertKind::HeatAdvisory,
                Severity::Moderate,
                format!("High temperature of {high:.0}°C expected"),
            );
        }
        if low < COLD_ALERT_CELSIUS {
            push(
                AlertKind::ColdAdvisory,
                Severity::Moderate,
                format!("Low temperature of {low:.0}°C expected"),
            );
        }
        if day.precipitation_probability > PRECIPITATION_ALERT_PERCENT {
            push(
                AlertKind::PrecipitationWarning,
                Severity::High,
                format!(
                    "{} likely with {}% probability",
                    day.dominant_condition, day.precipitation_probability
                ),
            );
        }
        if wind > WIND_ALERT_KMH {
            push(
                AlertKind::WindAdvisory,
                Severity::Moderate,
                format!("Strong winds of {} km/h expected", wind.round()),
            );
        }
    }
    alerts
}

/// Growing degree days over the forecast, base [`GDD_BASE_CELSIUS`]
#[must_use]
pub fn growing_degree_days(days: &[DailySummary], units: UnitSystem) -> f64 {
    days.iter()
        .map(|day| {
            let mean = (units.to_celsius(day.high) + units.to_celsius(day.low)) / 2.0;
            (mean - GDD_BASE_CELSIUS).max(0.0)
        })
        .sum()
}

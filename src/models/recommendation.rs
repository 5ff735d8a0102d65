use serde::{Deserialize, Serialize, Serializer};
use std::{fmt::Display, str::FromStr};

/// One side of a release-year filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "RawYearBound")]
pub enum YearBound {
    /// No constraint
    #[default]
    Any,
    /// Inclusive year bound
    Year(i32),
}

/// Wire form of a year bound: `"Any"`, `1999` or `"1999"`
#[derive(Deserialize)]
#[serde(untagged)]
enum RawYearBound {
    Year(i32),
    Text(String),
}

impl TryFrom<RawYearBound> for YearBound {
    type Error = String;

    fn try_from(raw: RawYearBound) -> Result<Self, Self::Error> {
        match raw {
            RawYearBound::Year(year) => Ok(YearBound::Year(year)),
            RawYearBound::Text(text) => text.parse(),
        }
    }
}

impl FromStr for YearBound {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("any") {
            return Ok(YearBound::Any);
        }
        s.parse::<i32>()
            .map(YearBound::Year)
            .map_err(|_| format!("Invalid year bound '{}': expected \"Any\" or a year", s))
    }
}

impl Display for YearBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            YearBound::Any => write!(f, "Any"),
            YearBound::Year(year) => write!(f, "{}", year),
        }
    }
}

impl Serialize for YearBound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            YearBound::Any => serializer.serialize_str("Any"),
            YearBound::Year(year) => serializer.serialize_i32(*year),
        }
    }
}

/// Inclusive release-year range used to filter recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct YearRange {
    #[serde(default)]
    pub from: YearBound,
    #[serde(default)]
    pub to: YearBound,
}

impl YearRange {
    pub fn new(from: YearBound, to: YearBound) -> Self {
        Self { from, to }
    }

    /// Both bounds are `Any`
    pub fn is_unbounded(&self) -> bool {
        self.from == YearBound::Any && self.to == YearBound::Any
    }

    /// Both bounds are concrete and `from > to`, so nothing can match
    pub fn is_empty(&self) -> bool {
        matches!((self.from, self.to), (YearBound::Year(from), YearBound::Year(to)) if from > to)
    }

    /// Whether a movie with the given release year passes the filter.
    ///
    /// An unknown year only passes when neither bound is set.
    pub fn contains(&self, release_year: Option<i32>) -> bool {
        let Some(year) = release_year else {
            return self.is_unbounded();
        };

        let after_from = match self.from {
            YearBound::Any => true,
            YearBound::Year(from) => year >= from,
        };
        let before_to = match self.to {
            YearBound::Any => true,
            YearBound::Year(to) => year <= to,
        };

        after_from && before_to
    }
}

/// Display rating: a score rounded to one decimal, or unknown
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rating {
    Score(f64),
    Unknown,
}

impl Rating {
    /// Rounds a raw provider rating to one decimal place.
    ///
    /// Rounding is half-to-even on the exact value of `raw`, so `7.25` becomes
    /// `7.2` while `8.35` (stored just below 8.35) becomes `8.3`. Missing and
    /// non-finite values become `Unknown`.
    pub fn from_raw(raw: Option<f64>) -> Self {
        match raw {
            Some(value) if value.is_finite() => Rating::Score(round_tenths(value)),
            _ => Rating::Unknown,
        }
    }
}

fn round_tenths(value: f64) -> f64 {
    let scaled = value * 10.0;
    if scaled.fract().abs() != 0.5 {
        return scaled.round() / 10.0;
    }

    // `scaled` may itself be a rounded product; the fused residual tells which
    // side of the half the exact product lies on.
    let residual = value.mul_add(10.0, -scaled);
    let rounded = if residual > 0.0 {
        scaled.ceil()
    } else if residual < 0.0 {
        scaled.floor()
    } else {
        scaled.round_ties_even()
    };
    rounded / 10.0
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Rating::Score(score) => serializer.serialize_f64(*score),
            Rating::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

/// A single recommended movie with its enriched metadata
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    pub id: u64,
    pub title: String,
    /// Similarity to the selected movie
    pub score: f32,
    pub poster_url: String,
    pub genres: Vec<String>,
    pub overview: String,
    pub release_year: Option<i32>,
    pub rating: Rating,
}

/// Ordered recommendation results
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct Recommendations {
    pub results: Vec<Recommendation>,
    /// Candidates skipped because their metadata could not be fetched
    pub failed_fetches: usize,
}

impl Recommendations {
    pub fn titles(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.title.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_bound_from_str() {
        assert_eq!("Any".parse::<YearBound>(), Ok(YearBound::Any));
        assert_eq!("any".parse::<YearBound>(), Ok(YearBound::Any));
        assert_eq!(" 1999 ".parse::<YearBound>(), Ok(YearBound::Year(1999)));
        assert!("nineties".parse::<YearBound>().is_err());
    }

    #[test]
    fn test_year_bound_deserialize_accepts_number_and_string() {
        let bounds: Vec<YearBound> = serde_json::from_str(r#"[2001, "1990", "Any"]"#).unwrap();
        assert_eq!(
            bounds,
            vec![YearBound::Year(2001), YearBound::Year(1990), YearBound::Any]
        );
    }

    #[test]
    fn test_year_bound_deserialize_rejects_garbage() {
        assert!(serde_json::from_str::<YearBound>(r#""soon""#).is_err());
    }

    #[test]
    fn test_year_bound_serialize() {
        assert_eq!(serde_json::to_string(&YearBound::Any).unwrap(), r#""Any""#);
        assert_eq!(serde_json::to_string(&YearBound::Year(2010)).unwrap(), "2010");
    }

    #[test]
    fn test_year_range_defaults_to_any() {
        let range: YearRange = serde_json::from_str("{}").unwrap();
        assert!(range.is_unbounded());
    }

    #[test]
    fn test_year_range_contains_known_years() {
        let range = YearRange::new(YearBound::Year(1990), YearBound::Year(2000));
        assert!(range.contains(Some(1990)));
        assert!(range.contains(Some(2000)));
        assert!(!range.contains(Some(1989)));
        assert!(!range.contains(Some(2001)));

        let open_end = YearRange::new(YearBound::Year(1990), YearBound::Any);
        assert!(open_end.contains(Some(2024)));
        assert!(!open_end.contains(Some(1980)));
    }

    #[test]
    fn test_unknown_year_only_passes_unbounded_range() {
        assert!(YearRange::default().contains(None));
        assert!(!YearRange::new(YearBound::Year(1990), YearBound::Any).contains(None));
        assert!(!YearRange::new(YearBound::Any, YearBound::Year(2000)).contains(None));
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let range = YearRange::new(YearBound::Year(2005), YearBound::Year(1995));
        assert!(range.is_empty());
        assert!(!range.contains(Some(2000)));
        assert!(!YearRange::new(YearBound::Year(2005), YearBound::Any).is_empty());
    }

    #[test]
    fn test_rating_rounding() {
        assert_eq!(Rating::from_raw(Some(8.369)), Rating::Score(8.4));
        assert_eq!(Rating::from_raw(Some(7.0)), Rating::Score(7.0));
        assert_eq!(Rating::from_raw(Some(-3.14)), Rating::Score(-3.1));
        assert_eq!(Rating::from_raw(None), Rating::Unknown);
        assert_eq!(Rating::from_raw(Some(f64::NAN)), Rating::Unknown);
    }

    #[test]
    fn test_rating_rounds_halves_to_even() {
        assert_eq!(Rating::from_raw(Some(7.25)), Rating::Score(7.2));
        assert_eq!(Rating::from_raw(Some(7.75)), Rating::Score(7.8));
        assert_eq!(Rating::from_raw(Some(0.05)), Rating::Score(0.1));
        // Stored just below and just above the half
        assert_eq!(Rating::from_raw(Some(8.35)), Rating::Score(8.3));
        assert_eq!(Rating::from_raw(Some(6.65)), Rating::Score(6.7));
        assert_eq!(Rating::from_raw(Some(-7.25)), Rating::Score(-7.2));
    }

    #[test]
    fn test_rating_serialization() {
        assert_eq!(serde_json::to_string(&Rating::Score(8.4)).unwrap(), "8.4");
        assert_eq!(serde_json::to_string(&Rating::Unknown).unwrap(), r#""unknown""#);
    }
}

//! Accuracy terms understood by Xapiand's schema, for building `_accuracy` settings on date,
//! geospatial, and numeric fields.

/// Date accuracy terms.
pub mod date {
    pub const HOUR_TERM: &str = "hour";
    pub const DAY_TERM: &str = "day";
    pub const MONTH_TERM: &str = "month";
    pub const YEAR_TERM: &str = "year";
    pub const DECADE_TERM: &str = "decade";
    pub const CENTURY_TERM: &str = "century";
    pub const MILLENIUM_TERM: &str = "millenium";

    pub const DAY_TO_YEAR_ACCURACY: [&str; 3] = [DAY_TERM, MONTH_TERM, YEAR_TERM];
    pub const YEAR_ACCURACY: [&str; 1] = [YEAR_TERM];
    pub const HOUR_TO_YEAR_ACCURACY: [&str; 4] = [HOUR_TERM, DAY_TERM, MONTH_TERM, YEAR_TERM];
}

/// Geospatial accuracy, as HTM trixel levels.
pub mod geo {
    pub const LEVEL_0_TERM: u64 = 0;
    pub const LEVEL_5_TERM: u64 = 5;
    pub const LEVEL_10_TERM: u64 = 10;
    pub const LEVEL_15_TERM: u64 = 15;

    pub const STATE_TO_BLOCK_ACCURACY: [u64; 3] = [LEVEL_5_TERM, LEVEL_10_TERM, LEVEL_15_TERM];
    pub const AREA_TO_BLOCK_ACCURACY: [u64; 2] = [LEVEL_10_TERM, LEVEL_15_TERM];
}

/// Numeric accuracy, as the width of each indexed range.
pub mod numeric {
    pub const LEVEL_10_TERM: u64 = 10;
    pub const LEVEL_100_TERM: u64 = 100;
    pub const LEVEL_1000_TERM: u64 = 1_000;
    pub const LEVEL_10000_TERM: u64 = 10_000;
    pub const LEVEL_100000_TERM: u64 = 100_000;
    pub const LEVEL_1000000_TERM: u64 = 1_000_000;
    pub const LEVEL_10000000_TERM: u64 = 10_000_000;

    pub const TENS_TO_TEN_THOUSANDS_ACCURACY: [u64; 4] =
        [LEVEL_10_TERM, LEVEL_100_TERM, LEVEL_1000_TERM, LEVEL_10000_TERM];
    pub const TENS_ACCURACY: [u64; 1] = [LEVEL_10_TERM];
    pub const HUNDREDS_TO_MILLIONS_ACCURACY: [u64; 5] = [
        LEVEL_100_TERM,
        LEVEL_1000_TERM,
        LEVEL_10000_TERM,
        LEVEL_100000_TERM,
        LEVEL_1000000_TERM,
    ];
    pub const HUNDREDS_ACCURACY: [u64; 1] = [LEVEL_100_TERM];
    pub const HUNDREDS_TO_THOUSANDS_ACCURACY: [u64; 2] = [LEVEL_100_TERM, LEVEL_1000_TERM];
    pub const THOUSANDS_ACCURACY: [u64; 1] = [LEVEL_1000_TERM];
    pub const HUNDREDS_TO_TEN_THOUSANDS_ACCURACY: [u64; 3] =
        [LEVEL_100_TERM, LEVEL_1000_TERM, LEVEL_10000_TERM];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn date_lists() {
        assert_eq!(date::DAY_TO_YEAR_ACCURACY, ["day", "month", "year"]);
        assert_eq!(date::YEAR_ACCURACY, ["year"]);
        assert_eq!(date::HOUR_TO_YEAR_ACCURACY, ["hour", "day", "month", "year"]);
        assert_eq!(date::MILLENIUM_TERM, "millenium");
    }

    #[test]
    fn geo_lists() {
        assert_eq!(geo::LEVEL_0_TERM, 0);
        assert_eq!(geo::STATE_TO_BLOCK_ACCURACY, [5, 10, 15]);
        assert_eq!(geo::AREA_TO_BLOCK_ACCURACY, [10, 15]);
    }

    #[test]
    fn numeric_lists() {
        assert_eq!(numeric::TENS_TO_TEN_THOUSANDS_ACCURACY, [10, 100, 1000, 10000]);
        assert_eq!(numeric::TENS_ACCURACY, [10]);
        assert_eq!(
            numeric::HUNDREDS_TO_MILLIONS_ACCURACY,
            [100, 1000, 10000, 100000, 1000000]
        );
        assert_eq!(numeric::HUNDREDS_ACCURACY, [100]);
        assert_eq!(numeric::HUNDREDS_TO_THOUSANDS_ACCURACY, [100, 1000]);
        assert_eq!(numeric::THOUSANDS_ACCURACY, [1000]);
        assert_eq!(numeric::HUNDREDS_TO_TEN_THOUSANDS_ACCURACY, [100, 1000, 10000]);
        assert_eq!(numeric::LEVEL_10000000_TERM, 10_000_000);
    }

    #[test]
    fn lists_as_values() {
        let accuracy: Value = date::DAY_TO_YEAR_ACCURACY.iter().copied().collect();
        assert_eq!(accuracy[2], Value::from("year"));
        let accuracy: Value = geo::AREA_TO_BLOCK_ACCURACY.iter().copied().collect();
        assert_eq!(accuracy[0], Value::from(10u64));
    }
}

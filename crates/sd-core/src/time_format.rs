//! Elapsed-time strings for the session timer display.

const CENTIS_PER_MINUTE: u64 = 60 * 100;
const CENTIS_PER_HOUR: u64 = 60 * CENTIS_PER_MINUTE;
const CENTIS_PER_DAY: u64 = 24 * CENTIS_PER_HOUR;

/// Format elapsed seconds as `[D:][HH:][MM:]SS.ff`.
///
/// Only the largest non-zero unit and everything below it are shown. Hours and
/// minutes are always two digits, days never padded, and the seconds field is
/// padded only when a larger unit precedes it.
///
/// Rounding to hundredths happens before the split, so a residual that rounds
/// up to a full minute carries instead of printing `60.00`. Negative and
/// non-finite inputs are treated as zero.
pub fn format_elapsed(seconds: f64) -> String {
    let centis = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 100.0).round() as u64
    } else {
        0
    };

    let days = centis / CENTIS_PER_DAY;
    let hours = (centis % CENTIS_PER_DAY) / CENTIS_PER_HOUR;
    let minutes = (centis % CENTIS_PER_HOUR) / CENTIS_PER_MINUTE;
    let residual = centis % CENTIS_PER_MINUTE;
    let (whole, frac) = (residual / 100, residual % 100);

    if days > 0 {
        format!("{days}:{hours:02}:{minutes:02}:{whole:02}.{frac:02}")
    } else if hours > 0 {
        format!("{hours:02}:{minutes:02}:{whole:02}.{frac:02}")
    } else if minutes > 0 {
        format!("{minutes:02}:{whole:02}.{frac:02}")
    } else {
        format!("{whole}.{frac:02}")
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn parse_centis(text: &str) -> u64 {
        let mut parts = text.rsplit(':');
        let seconds = parts.next().unwrap_or_default();
        let (whole, frac) = seconds.split_once('.').unwrap();
        let mut total = whole.parse::<u64>().unwrap() * 100 + frac.parse::<u64>().unwrap();
        for (part, unit) in parts.zip([CENTIS_PER_MINUTE, CENTIS_PER_HOUR, CENTIS_PER_DAY]) {
            total += part.parse::<u64>().unwrap() * unit;
        }
        total
    }

    proptest! {
        #[test]
        fn formatted_text_reads_back_to_same_hundredths(centis in 0_u64..1_000_000_000) {
            let text = format_elapsed(centis as f64 / 100.0);
            prop_assert_eq!(parse_centis(&text), centis);
        }
    }
}

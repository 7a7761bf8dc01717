// Time label formatting for the seek bar

/// Format seconds as `MM:SS` for the elapsed/total labels.
///
/// The minute field carries a single leading `0` only while the whole-second
/// value is below 600, so `600` renders as `10:00` and `6000` as `100:00`.
/// Negative and NaN inputs render as `00:00`.
pub fn time_string(time: f32) -> String {
    let whole = if time.is_nan() { 0 } else { time.floor().max(0.0) as u64 };
    let minutes = whole / 60;
    let seconds = whole % 60;

    let minutes = if whole < 600 {
        format!("0{}", minutes)
    } else {
        minutes.to_string()
    };
    format!("{}:{:02}", minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_string_boundaries() {
        assert_eq!(time_string(0.0), "00:00");
        assert_eq!(time_string(65.0), "01:05");
        assert_eq!(time_string(599.0), "09:59");
        assert_eq!(time_string(600.0), "10:00");
    }

    #[test]
    fn test_time_string_floors_fractions() {
        assert_eq!(time_string(59.999), "00:59");
        assert_eq!(time_string(599.9), "09:59");
        assert_eq!(time_string(3.5), "00:03");
    }

    #[test]
    fn test_time_string_long_tracks() {
        assert_eq!(time_string(3599.0), "59:59");
        assert_eq!(time_string(6000.0), "100:00");
    }

    #[test]
    fn test_time_string_invalid_input() {
        assert_eq!(time_string(-4.0), "00:00");
        assert_eq!(time_string(f32::NAN), "00:00");
    }
}

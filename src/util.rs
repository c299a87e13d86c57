pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

pub fn std_dev(data: &[f64]) -> Option<f64> {
    match (mean(data), data.len()) {
        (Some(data_mean), count) if count > 0 => {
            let variance = data
                .iter()
                .map(|value| {
                    let diff = data_mean - *value;

                    diff * diff
                })
                .sum::<f64>()
                / count as f64;

            Some(variance.sqrt())
        }
        _ => None,
    }
}

/// Render elapsed milliseconds as `s.mmm` or `m:ss.mmm`.
///
/// Input is floored to whole milliseconds; callers guarantee a non-negative
/// finite value.
pub fn format_time(ms: f64) -> String {
    let total_ms = ms.floor() as u64;
    if total_ms == 0 {
        return "0.000".to_string();
    }

    let millis = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;

    if total_ms >= 60_000 {
        format!("{minutes}:{seconds:02}.{millis:03}")
    } else {
        format!("{total_secs}.{millis:03}")
    }
}

/// Format an optional statistic, `-` when there is no value yet
pub fn format_stat(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), format_time)
}

/// Inverse of [`format_time`]
pub fn parse_time(text: &str) -> Option<f64> {
    let text = text.trim();
    let (minutes, rest) = match text.split_once(':') {
        Some((m, rest)) => (m.parse::<u64>().ok()?, rest),
        None => (0, text),
    };
    let (secs, millis) = rest.split_once('.')?;
    if millis.len() != 3 {
        return None;
    }
    let secs = secs.parse::<u64>().ok()?;
    let millis = millis.parse::<u64>().ok()?;
    if minutes > 0 && secs >= 60 {
        return None;
    }

    Some(((minutes * 60 + secs) * 1000 + millis) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[10., 20., 30., 15., 22.]), Some(19.4));
        assert_eq!(mean(&[15., 7., 55., 12., 4.]), Some(18.6));
    }

    #[test]
    fn test_mean_empty_slice() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_std_dev() {
        assert_eq!(
            std_dev(&[100., 120., 90., 102., 94.]),
            Some(10.322790320451151)
        );
        assert_eq!(std_dev(&[15., 7., 55.]), Some(20.997354330698162));
    }

    #[test]
    fn test_std_dev_empty_slice() {
        assert_eq!(std_dev(&[]), None);
    }

    #[test]
    fn test_std_dev_identical_values() {
        assert_eq!(std_dev(&[5.0, 5.0, 5.0, 5.0]), Some(0.0));
    }

    #[test]
    fn test_format_time_examples() {
        assert_eq!(format_time(0.0), "0.000");
        assert_eq!(format_time(1234.0), "1.234");
        assert_eq!(format_time(65432.0), "1:05.432");
        assert_eq!(format_time(59999.0), "59.999");
        assert_eq!(format_time(60000.0), "1:00.000");
        assert_eq!(format_time(7.0), "0.007");
    }

    #[test]
    fn test_format_time_floors_fractions() {
        assert_eq!(format_time(0.9), "0.000");
        assert_eq!(format_time(1234.99), "1.234");
    }

    #[test]
    fn test_format_stat() {
        assert_eq!(format_stat(None), "-");
        assert_eq!(format_stat(Some(9876.0)), "9.876");
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("0.000"), Some(0.0));
        assert_eq!(parse_time("1.234"), Some(1234.0));
        assert_eq!(parse_time("1:05.432"), Some(65432.0));
        assert_eq!(parse_time(" 12:00.001 "), Some(720001.0));
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        assert_eq!(parse_time(""), None);
        assert_eq!(parse_time("1.23"), None);
        assert_eq!(parse_time("abc"), None);
        assert_eq!(parse_time("1:75.000"), None);
    }
}

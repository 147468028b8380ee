use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

pub fn truncate_label(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_owned();
    }

    let kept = name
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    format!("{}…", kept.trim_end())
}

pub fn format_year_span(start: Option<i32>, end: Option<i32>) -> Option<String> {
    match (start, end) {
        (Some(start), Some(end)) if start == end => Some(start.to_string()),
        (Some(start), Some(end)) => Some(format!("{start}–{end}")),
        (Some(start), None) => Some(format!("from {start}")),
        (None, Some(end)) => Some(format!("until {end}")),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_pair_is_stable_and_bounded() {
        let (x, y) = stable_pair("author:31");
        assert_eq!((x, y), stable_pair("author:31"));
        assert!((-1.0..=1.0).contains(&x));
        assert!((-1.0..=1.0).contains(&y));
    }

    #[test]
    fn truncates_long_labels() {
        assert_eq!(truncate_label("Dickens", 10), "Dickens");
        assert_eq!(truncate_label("Elizabeth Barrett Browning", 10), "Elizabeth…");
    }

    #[test]
    fn year_spans() {
        assert_eq!(format_year_span(Some(1840), Some(1861)).as_deref(), Some("1840–1861"));
        assert_eq!(format_year_span(Some(1840), Some(1840)).as_deref(), Some("1840"));
        assert_eq!(format_year_span(None, Some(1861)).as_deref(), Some("until 1861"));
        assert_eq!(format_year_span(None, None), None);
    }
}

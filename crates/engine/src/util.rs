//! Internal formatting helpers shared across the engine.

/// Format whole rupiah with dot thousand separators, e.g. `Rp 1.500.000`.
#[must_use]
pub fn format_rupiah(amount: i64) -> String {
    let negative = amount < 0;
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    if negative {
        format!("Rp -{grouped}")
    } else {
        format!("Rp {grouped}")
    }
}

/// Uppercase the first letter of each whitespace-separated word.
#[must_use]
pub(crate) fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rupiah_grouping() {
        assert_eq!(format_rupiah(0), "Rp 0");
        assert_eq!(format_rupiah(500), "Rp 500");
        assert_eq!(format_rupiah(1500), "Rp 1.500");
        assert_eq!(format_rupiah(1_500_000), "Rp 1.500.000");
        assert_eq!(format_rupiah(-20_000), "Rp -20.000");
    }

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("dompet digital"), "Dompet Digital");
        assert_eq!(title_case("BCA"), "Bca");
        assert_eq!(title_case(""), "");
    }
}

// Small text helpers shared by the renderers

pub fn title_case(s: &str) -> String {
    s.to_lowercase()
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

// Strips everything but digits, `-` and `.` then reads the leading integer,
// so `"12px"` gives 12 and `"12.5em"` gives 12. Returns `None` when no
// integer is left.
pub fn remove_alpha_and_convert_to_number(s: &str) -> Option<i64> {
    let kept: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-' || *c == '.')
        .collect();
    let (negative, rest) = match kept.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, kept.as_str()),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let value: i64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("the quick fox"), "The Quick Fox");
        assert_eq!(title_case("hELLO wORLD"), "Hello World");
        assert_eq!(title_case("two  spaces"), "Two  Spaces");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn pixel_strings_to_numbers() {
        assert_eq!(remove_alpha_and_convert_to_number("12px"), Some(12));
        assert_eq!(remove_alpha_and_convert_to_number("300.75px"), Some(300));
        assert_eq!(remove_alpha_and_convert_to_number("-8px"), Some(-8));
        assert_eq!(remove_alpha_and_convert_to_number("auto"), None);
        assert_eq!(remove_alpha_and_convert_to_number(""), None);
    }
}

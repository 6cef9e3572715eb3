/// Approximate width of a Helvetica string at the given size, in points.
/// Average-advance estimate; the layout only needs a deterministic measure,
/// not typographic truth.
pub(crate) fn approx_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

fn max_fit_chars(max_width: f32, size: f32) -> usize {
    ((max_width / (size * 0.5)) as usize).max(1)
}

/// Greedy word wrap against the approximate measure. Words wider than the
/// column are hard-broken; the result always has at least one line so every
/// table row keeps a height.
pub(crate) fn wrap_text(text: &str, max_width: f32, size: f32) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word.to_string();

        while approx_text_width(&word, size) > max_width {
            let fit = max_fit_chars(max_width, size);
            let head: String = word.chars().take(fit).collect();
            let rest: String = word.chars().skip(fit).collect();
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(head);
            word = rest;
        }
        if word.is_empty() {
            continue;
        }

        let candidate = if current.is_empty() {
            word.clone()
        } else {
            format!("{current} {word}")
        };
        if approx_text_width(&candidate, size) > max_width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current = word;
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_stays_on_one_line() {
        assert_eq!(wrap_text("Savon", 200.0, 11.0), vec!["Savon"]);
    }

    #[test]
    fn empty_text_still_occupies_a_line() {
        assert_eq!(wrap_text("", 200.0, 11.0), vec![""]);
        assert_eq!(wrap_text("   ", 200.0, 11.0), vec![""]);
    }

    #[test]
    fn long_text_breaks_on_spaces_within_width() {
        let lines = wrap_text(
            "Savon artisanal au beurre de karité parfumé à la vanille de Madagascar",
            120.0,
            11.0,
        );
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(approx_text_width(line, 11.0) <= 120.0, "line too wide: {line}");
        }
    }

    #[test]
    fn oversized_word_is_hard_broken() {
        let lines = wrap_text("incontestablementextraordinairementlong", 60.0, 11.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(approx_text_width(line, 11.0) <= 60.0);
        }
        // nothing lost in the break
        assert_eq!(
            lines.concat(),
            "incontestablementextraordinairementlong"
        );
    }

    #[test]
    fn wrapping_is_deterministic() {
        let text = "Huile essentielle d'ylang-ylang pressée à froid";
        assert_eq!(wrap_text(text, 100.0, 11.0), wrap_text(text, 100.0, 11.0));
    }
}

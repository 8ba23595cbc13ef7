//! Small utility helpers used across modules.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Inputs longer than this are cut before normalization.
pub const MAX_INPUT_CHARS: usize = 100;

/// Case/accent-insensitive key for free-text answers.
/// Truncates to `MAX_INPUT_CHARS`, strips combining marks after NFD decomposition,
/// lowercases, trims and collapses inner whitespace runs to a single space.
///
/// Idempotent: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(s: &str) -> String {
  let lowered: String = s.chars().take(MAX_INPUT_CHARS).flat_map(char::to_lowercase).collect();
  let folded: String = lowered.nfd().filter(|c| !is_combining_mark(*c)).collect();
  let joined = folded.split_whitespace().collect::<Vec<_>>().join(" ");
  // Lowercasing/decomposition can grow the string; cap the output as well.
  let capped: String = joined.chars().take(MAX_INPUT_CHARS).collect();
  capped.trim_end().to_string()
}

/// Hint mask for a name: first letter of every word, `_` for the rest.
/// Spaces and hyphens separate words and show up as a double space.
///
/// "Costa Rica" -> "C _ _ _ _  R _ _ _"
pub fn make_hint(name: &str) -> String {
  let mut hint = String::with_capacity(name.len() * 2);
  let mut first = true;
  for ch in name.chars() {
    if ch == ' ' || ch == '-' {
      hint.push_str("  ");
      first = true;
    } else if first {
      hint.push(ch);
      first = false;
    } else {
      hint.push_str(" _");
    }
  }
  hint
}

/// Parse human population labels such as "203M", "1,4B", "410K" or "5300".
/// Unparseable input yields 0.
pub fn parse_population(s: &str) -> u64 {
  let clean: String = s.chars().filter(|c| !c.is_whitespace()).collect::<String>().replacen(',', ".", 1);
  let (num, mult) = match clean.chars().last() {
    Some('B') => (&clean[..clean.len() - 1], 1e9),
    Some('M') => (&clean[..clean.len() - 1], 1e6),
    Some('K') => (&clean[..clean.len() - 1], 1e3),
    _ => {
      let digits: String = clean.chars().take_while(|c| c.is_ascii_digit()).collect();
      return digits.parse().unwrap_or(0);
    }
  };
  num.parse::<f64>().map(|v| (v * mult).round() as u64).unwrap_or(0)
}

/// Compact label for a population figure ("203M", "410K").
pub fn population_label(pop: u64) -> String {
  match pop {
    p if p >= 1_000_000_000 => format!("{:.1}B", p as f64 / 1e9),
    p if p >= 1_000_000 => format!("{:.0}M", p as f64 / 1e6),
    p if p >= 1_000 => format!("{:.0}K", p as f64 / 1e3),
    p => p.to_string(),
  }
}

/// Log-safe truncation for user input.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    let head: String = s.chars().take(max).collect();
    format!("{}… ({} chars total)", head, s.chars().count())
  }
}

//! Small string helpers shared by the AI client and the variant parser.

/// Replaces `{key}` placeholders with the provided values.
/// Unknown placeholders are left as they are.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Log-safe truncation for large strings, cut on a char boundary.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn placeholders_are_filled() {
    let out = fill_template("Topic: {topic}. {missing}", &[("topic", "GCD and LCM")]);
    assert_eq!(out, "Topic: GCD and LCM. {missing}");
  }

  #[test]
  fn truncation_respects_char_boundaries() {
    assert_eq!(trunc_for_log("short", 10), "short");
    assert_eq!(trunc_for_log("√2 + √3", 2), "… (11 bytes total)");
    assert_eq!(trunc_for_log("abcdef", 3), "abc… (6 bytes total)");
  }
}

//! Integer helpers and TeX-lite formatting shared by the generators.

pub fn gcd(a: i64, b: i64) -> i64 {
  let (mut a, mut b) = (a.abs(), b.abs());
  while b != 0 {
    let t = a % b;
    a = b;
    b = t;
  }
  a
}

pub fn lcm(a: i64, b: i64) -> i64 {
  if a == 0 || b == 0 {
    return 0;
  }
  (a / gcd(a, b) * b).abs()
}

/// Smallest integer `>= n/d`. `d` must be positive.
pub fn ceil_div(n: i64, d: i64) -> i64 {
  let q = n.div_euclid(d);
  if n.rem_euclid(d) == 0 { q } else { q + 1 }
}

/// Smallest integer strictly greater than `n/d`. `d` must be positive.
pub fn smallest_int_above(n: i64, d: i64) -> i64 {
  n.div_euclid(d) + 1
}

/// Split `n > 0` into `(outer, inner)` with `n = outer² · inner` and `inner` square-free.
pub fn split_square(n: i64) -> (i64, i64) {
  let mut outer = 1;
  let mut inner = n;
  let mut f = 2;
  while f * f <= inner {
    while inner % (f * f) == 0 {
      inner /= f * f;
      outer *= f;
    }
    f += 1;
  }
  (outer, inner)
}

/// Reduced `n/d` as a TeX-lite fraction, or a plain integer when it divides.
pub fn fraction(n: i64, d: i64) -> String {
  let g = gcd(n, d).max(1);
  let (mut n, mut d) = (n / g, d / g);
  if d < 0 {
    n = -n;
    d = -d;
  }
  if d == 1 {
    return n.to_string();
  }
  let sign = if n < 0 { "-" } else { "" };
  format!("{sign}\\frac{{{}}}{{{}}}", n.abs(), d)
}

/// Operand inside an expression: negatives are parenthesised.
pub fn operand(n: i64) -> String {
  if n < 0 { format!("({n})") } else { n.to_string() }
}

/// Render `coef·var` as the first term of an expression (`3x`, `-x`, `5`).
pub fn lead_term(coef: i64, var: &str) -> String {
  match (coef, var.is_empty()) {
    (_, true) => coef.to_string(),
    (1, false) => var.to_string(),
    (-1, false) => format!("-{var}"),
    _ => format!("{coef}{var}"),
  }
}

/// Render `coef·var` as a following term (` + 3x`, ` - x`, ` - 5`); zero terms vanish.
pub fn next_term(coef: i64, var: &str) -> String {
  if coef == 0 {
    return String::new();
  }
  let sign = if coef < 0 { "-" } else { "+" };
  let mag = coef.abs();
  if var.is_empty() {
    format!(" {sign} {mag}")
  } else if mag == 1 {
    format!(" {sign} {var}")
  } else {
    format!(" {sign} {mag}{var}")
  }
}

/// `(x - h)` style binomial; `h == 0` collapses to `x`.
pub fn shifted(var: &str, h: i64) -> String {
  match h {
    0 => var.to_string(),
    h if h > 0 => format!("({var} - {h})"),
    h => format!("({var} + {})", -h),
  }
}

/// Coefficient in front of a parenthesised group: `1` disappears, `-1` becomes `-`.
pub fn coef_prefix(a: i64) -> String {
  match a {
    1 => String::new(),
    -1 => "-".to_string(),
    a => a.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn gcd_and_lcm() {
    assert_eq!(gcd(24, 36), 12);
    assert_eq!(gcd(-8, 12), 4);
    assert_eq!(lcm(24, 36), 72);
    assert_eq!(lcm(0, 5), 0);
  }

  #[test]
  fn ceilings() {
    assert_eq!(ceil_div(51, 2), 26);
    assert_eq!(ceil_div(18, 1), 18);
    assert_eq!(ceil_div(-7, 2), -3);
    assert_eq!(smallest_int_above(18, 1), 19);
    assert_eq!(smallest_int_above(51, 2), 26);
    assert_eq!(smallest_int_above(-7, 2), -3);
  }

  #[test]
  fn square_splitting() {
    assert_eq!(split_square(72), (6, 2));
    assert_eq!(split_square(18), (3, 2));
    assert_eq!(split_square(7), (1, 7));
    assert_eq!(split_square(49), (7, 1));
    assert_eq!(split_square(1), (1, 1));
  }

  #[test]
  fn fractions_reduce_and_carry_sign() {
    assert_eq!(fraction(6, 3), "2");
    assert_eq!(fraction(-7, 3), "-\\frac{7}{3}");
    assert_eq!(fraction(4, -6), "-\\frac{2}{3}");
    assert_eq!(fraction(0, 5), "0");
  }

  #[test]
  fn terms() {
    assert_eq!(format!("{}{}", lead_term(3, "x"), next_term(5, "")), "3x + 5");
    assert_eq!(format!("{}{}", lead_term(-1, "x"), next_term(-1, "y")), "-x - y");
    assert_eq!(next_term(0, "y"), "");
    assert_eq!(shifted("x", -3), "(x + 3)");
    assert_eq!(coef_prefix(-1), "-");
  }
}

//! Instruction normalization
//!
//! Gantree: L2_Normalize → InstructionNormalizer
//!
//! Rewrites one raw instruction string into a [`CanonicalInstruction`]:
//! a lowercase mnemonic from the fixed vocabulary followed by integer
//! indices and, for parametrized gates, decimal angles.
//!
//! Recognized surface forms, first match wins:
//!
//! | form | example | canonical |
//! |---|---|---|
//! | arrow measurement | `measure 0 0 -> 1`, `0 -> 1`, `q[0] -> c[1]` | `measure 0 1` |
//! | parenthesized conditional | `if(c[0]==1) x 2` | `if c 0 1 x 2` |
//! | prefixed conditional | `conditional: c 0 1 x 2` | `conditional c 0 1 x 2` |
//! | parenthesized angle | `rx(pi/2) 0`, `cp(pi/4) 0 1` | `rx 0 1.5707963267948966` |
//! | default | `cx q[0],q[1];` | `cx 0 1` |

use crate::angle::evaluate_angle;
use crate::error::SkipReason;
use crate::gate::GateKind;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

// ============================================================================
// Canonical Instruction
// ============================================================================

/// Whitespace-tokenized instruction whose mnemonic is in the vocabulary
/// Gantree: CanonicalInstruction // 정규 명령
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalInstruction {
    kind: GateKind,
    tokens: Vec<String>,
}

impl CanonicalInstruction {
    /// Build from tokens; the first token is the mnemonic
    pub fn from_tokens(mut tokens: Vec<String>) -> Result<Self, SkipReason> {
        let mnemonic = tokens.first().ok_or(SkipReason::Empty)?.to_ascii_lowercase();
        let kind = GateKind::from_mnemonic(&mnemonic)
            .ok_or_else(|| SkipReason::UnknownGate(mnemonic.clone()))?;
        tokens[0] = mnemonic;
        Ok(Self { kind, tokens })
    }

    /// Gate kind named by the mnemonic
    pub fn kind(&self) -> GateKind {
        self.kind
    }

    /// Lowercase mnemonic as written (`if` and `conditional` stay distinct here)
    pub fn mnemonic(&self) -> &str {
        &self.tokens[0]
    }

    /// Everything after the mnemonic
    pub fn args(&self) -> &[String] {
        &self.tokens[1..]
    }

    /// All tokens including the mnemonic
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

impl fmt::Display for CanonicalInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}

/// Render an angle the way canonical instructions carry it
pub fn format_angle(value: f64) -> String {
    format!("{:?}", value)
}

// ============================================================================
// Normalizer
// ============================================================================

/// Normalize one raw instruction
/// Gantree: normalize(raw) -> Result<CanonicalInstruction, SkipReason> // 정규화
pub fn normalize(raw: &str) -> Result<CanonicalInstruction, SkipReason> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(SkipReason::Empty);
    }

    let tokens = if text.contains("->") {
        normalize_arrow(text)?
    } else if let Some(rest) = strip_if_paren(text) {
        normalize_paren_conditional("if", rest)?
    } else if let Some(rest) = strip_prefix_ci(text, "conditional:") {
        normalize_prefixed_conditional(rest)?
    } else {
        rewrite_gate(text)?
    };

    let canonical = CanonicalInstruction::from_tokens(tokens)?;
    log::debug!("normalized '{}' -> '{}'", raw, canonical);
    Ok(canonical)
}

/// `measure <q> <c> -> <c2>`, `<q> -> <c>`, or `q[<q>] -> c[<c>]`
fn normalize_arrow(text: &str) -> Result<Vec<String>, SkipReason> {
    let spaced = text.replace("->", " ");
    let parts: Vec<&str> = spaced.split_whitespace().collect();
    if parts.len() < 2 {
        return Err(SkipReason::InvalidMeasurement);
    }

    let last = parts[parts.len() - 1];
    let (qubit, clbit) = if parts[0].eq_ignore_ascii_case("measure") {
        (parts[1], last)
    } else {
        match (bracket_index(parts[0], 'q'), bracket_index(last, 'c')) {
            (Some(q), Some(c)) => (q, c),
            _ => (parts[0], last),
        }
    };

    Ok(vec![
        "measure".to_string(),
        clean_token(qubit),
        clean_token(clbit),
    ])
}

/// `(<reg>[<idx>]==<value>) <gate> <args...>` with the `if` already stripped
fn normalize_paren_conditional(marker: &str, s: &str) -> Result<Vec<String>, SkipReason> {
    let close = matching_paren(s, 0)
        .ok_or_else(|| SkipReason::InvalidConditional("unbalanced parentheses".into()))?;
    let condition = &s[1..close];
    let body = s[close + 1..].trim();

    let caps = condition_re()
        .and_then(|re| re.captures(condition.trim()))
        .ok_or_else(|| {
            SkipReason::InvalidConditional(format!("malformed condition '{}'", condition))
        })?;
    let (reg, value) = (&caps["reg"], &caps["value"]);
    let idx = caps.name("idx").map(|m| m.as_str()).ok_or_else(|| {
        SkipReason::InvalidConditional(format!("condition '{}' names no bit index", reg))
    })?;
    if body.is_empty() {
        return Err(SkipReason::InvalidConditional("missing conditioned gate".into()));
    }

    let mut tokens = vec![
        marker.to_string(),
        reg.to_string(),
        idx.to_string(),
        value.to_string(),
    ];
    tokens.extend(rewrite_gate(body)?);
    Ok(tokens)
}

/// Body of `conditional:<rest>`
fn normalize_prefixed_conditional(rest: &str) -> Result<Vec<String>, SkipReason> {
    let rest = rest.trim();
    if let Some(paren) = strip_if_paren(rest) {
        return normalize_paren_conditional("conditional", paren);
    }

    let mut tokens = split_tokens(rest);
    if matches!(tokens.first(), Some(t) if t.eq_ignore_ascii_case("if")) {
        tokens.remove(0);
    }
    if let Some(gate) = tokens.get_mut(3) {
        *gate = gate.to_ascii_lowercase();
    }
    tokens.insert(0, "conditional".to_string());
    Ok(tokens)
}

/// Parenthesized-angle form if it applies, otherwise a plain split
fn rewrite_gate(text: &str) -> Result<Vec<String>, SkipReason> {
    let mut tokens = match paren_angle_kind(text) {
        Some((kind, open)) => rewrite_paren_angle(text, kind, open)?,
        None => split_tokens(text),
    };
    match tokens.first_mut() {
        Some(first) => {
            *first = first.to_ascii_lowercase();
            Ok(tokens)
        }
        None => Err(SkipReason::Empty),
    }
}

/// `<gate>(<a1>[, <a2>...]) <qubit...>` → `<gate> <qubit...> <a1> <a2>...`
fn rewrite_paren_angle(text: &str, kind: GateKind, open: usize) -> Result<Vec<String>, SkipReason> {
    let close = matching_paren(text, open).ok_or_else(|| SkipReason::InvalidAngle(text.into()))?;

    let angles: Vec<String> = split_top_level(&text[open + 1..close], ',')
        .into_iter()
        .map(|expr| format_angle(evaluate_angle(expr)))
        .collect();

    let mut tokens = vec![kind.mnemonic().to_string()];
    tokens.extend(
        split_tokens(&text[close + 1..])
            .into_iter()
            .take(kind.qubit_arity()),
    );
    tokens.extend(angles);
    Ok(tokens)
}

/// Detect `<parametrized gate>(`, returning the kind and the paren offset
fn paren_angle_kind(text: &str) -> Option<(GateKind, usize)> {
    let open = text.find('(')?;
    let kind = GateKind::from_mnemonic(text[..open].trim())?;
    kind.is_parameterized().then_some((kind, open))
}

// ============================================================================
// Suggested-instruction Pass
// ============================================================================

/// Tidy instructions that came back from a suggester
///
/// Rewrites arrow measurements and parenthesized conditionals to canonical
/// form, evaluates angle expressions written after the qubit
/// (`rx 0 pi/2`), keeps parenthesized rotations as they are, and drops
/// blank entries. Anything else passes through unchanged.
/// Gantree: prepare_suggested(&[S]) -> Vec<String> // 제안 정리
pub fn prepare_suggested<S: AsRef<str>>(instructions: &[S]) -> Vec<String> {
    instructions
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .map(prepare_one)
        .collect()
}

fn prepare_one(s: &str) -> String {
    if s.contains("->") {
        let spaced = s.replace("->", " ");
        let parts: Vec<&str> = spaced.split_whitespace().collect();
        return match parts.as_slice() {
            [q, c] => format!("measure {} {}", q, c),
            [m, q, c] if m.eq_ignore_ascii_case("measure") => format!("measure {} {}", q, c),
            _ => s.to_string(),
        };
    }

    if let Some(rest) = strip_if_paren(s) {
        return match normalize_paren_conditional("if", rest) {
            Ok(tokens) => tokens.join(" "),
            Err(_) => s.to_string(),
        };
    }

    if paren_angle_kind(s).is_some() {
        return s.to_string();
    }

    let parts: Vec<&str> = s.split_whitespace().collect();
    if parts.len() < 3 {
        return s.to_string();
    }
    match parts[0].to_ascii_lowercase().as_str() {
        "rx" | "ry" | "rz" | "u1" => {
            let angle = evaluate_angle(&parts[2..].join(" "));
            format!("{} {} {}", parts[0], parts[1], format_angle(angle))
        }
        "u2" | "u3" => {
            let angles: Vec<String> = parts[2..]
                .iter()
                .map(|a| format_angle(evaluate_angle(a)))
                .collect();
            format!("{} {} {}", parts[0], parts[1], angles.join(" "))
        }
        _ => s.to_string(),
    }
}

// ============================================================================
// Token Helpers
// ============================================================================

/// Split on whitespace and commas, cleaning each token
fn split_tokens(s: &str) -> Vec<String> {
    s.split(|c: char| c.is_whitespace() || c == ',')
        .map(clean_token)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Drop trailing `;`/`,` and reduce `q[3]` to `3`
fn clean_token(token: &str) -> String {
    let token = token.trim().trim_end_matches(|c| c == ';' || c == ',');
    reduce_register(token).unwrap_or(token).to_string()
}

/// `<ident>[<digits>]` → `<digits>`
fn reduce_register(token: &str) -> Option<&str> {
    let caps = register_re()?.captures(token)?;
    caps.get(1).map(|m| m.as_str())
}

/// Digits captured from `<reg>[<digits>]` anywhere in the token
fn bracket_index(token: &str, reg: char) -> Option<&str> {
    bit_ref_re()?
        .captures_iter(token)
        .find(|caps| caps[1].starts_with(reg))
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
}

// ============================================================================
// Patterns
// ============================================================================

fn register_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\w+\[([0-9]+)\]$").ok())
        .as_ref()
}

fn bit_ref_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([qc])\[([0-9]+)\]").ok())
        .as_ref()
}

/// `<reg>[<idx>] == <value>`, the index optional so its absence can be reported
fn condition_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<reg>\w+)\s*(?:\[\s*(?P<idx>[0-9]+)\s*\])?\s*==\s*(?P<value>[0-9]+)$").ok()
    })
    .as_ref()
}

/// `if(` / `if (` prefix, returning the slice starting at `(`
fn strip_if_paren(text: &str) -> Option<&str> {
    let rest = strip_prefix_ci(text, "if")?.trim_start();
    rest.starts_with('(').then_some(rest)
}

fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

/// Byte offset of the `)` closing the `(` at `open`
fn matching_paren(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, ch) in s[open..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on `sep` outside parentheses
fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, ch) in s.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn canon(raw: &str) -> String {
        normalize(raw).unwrap().to_string()
    }

    #[test]
    fn test_default_split() {
        assert_eq!(canon("h 0"), "h 0");
        assert_eq!(canon("  CX 0 1 "), "cx 0 1");
        assert_eq!(normalize("h 0").unwrap().kind(), GateKind::H);
    }

    #[test]
    fn test_qasm_flavoured_tokens() {
        assert_eq!(canon("cx q[0],q[1];"), "cx 0 1");
        assert_eq!(canon("h q[2];"), "h 2");
        assert_eq!(canon("ccx q[0], q[1], q[2];"), "ccx 0 1 2");
    }

    #[test]
    fn test_arrow_forms_agree() {
        let expected = "measure 1 2";
        assert_eq!(canon("measure 1 0 -> 2"), expected);
        assert_eq!(canon("1 -> 2"), expected);
        assert_eq!(canon("q[1] -> c[2]"), expected);
        assert_eq!(canon("measure q[1] -> c[2];"), expected);
    }

    #[test]
    fn test_arrow_measure_scenario() {
        assert_eq!(canon("measure 0 0 -> 0"), "measure 0 0");
    }

    #[test]
    fn test_arrow_too_short() {
        assert_eq!(normalize("-> 0"), Err(SkipReason::InvalidMeasurement));
    }

    #[test]
    fn test_paren_rotation() {
        assert_eq!(canon("rx(pi/2) 0"), "rx 0 1.5707963267948966");
        assert_eq!(canon("rz(0) 1"), "rz 1 0.0");
        assert_eq!(canon("ry(bogus) 0"), "ry 0 0.0");
        assert_eq!(canon("rx(pi/2) q[3];"), "rx 3 1.5707963267948966");
    }

    #[test]
    fn test_paren_multi_angle() {
        assert_eq!(canon("u3(0.5, 0.25, 1) 0"), "u3 0 0.5 0.25 1.0");
        assert_eq!(canon("cp(pi) 0 1"), "cp 0 1 3.141592653589793");
        assert_eq!(canon("u1((pi)/2) 0"), "u1 0 1.5707963267948966");
    }

    #[test]
    fn test_paren_conditional() {
        assert_eq!(canon("if(c[0]==1) x 2"), "if c 0 1 x 2");
        assert_eq!(canon("if (c[1] == 3) Z 0"), "if c 1 3 z 0");
        assert_eq!(
            canon("if(c[0]==1) rx(pi/2) 1"),
            "if c 0 1 rx 1 1.5707963267948966"
        );
    }

    #[test]
    fn test_conditional_without_index_rejected() {
        assert!(matches!(
            normalize("if(c==1) x 0"),
            Err(SkipReason::InvalidConditional(_))
        ));
        assert!(matches!(
            normalize("if(c[0]==1)"),
            Err(SkipReason::InvalidConditional(_))
        ));
        assert!(matches!(
            normalize("if(c[0]=1) x 0"),
            Err(SkipReason::InvalidConditional(_))
        ));
        assert!(matches!(
            normalize("if(c[a]==1) x 0"),
            Err(SkipReason::InvalidConditional(_))
        ));
    }

    #[test]
    fn test_prefixed_conditional() {
        assert_eq!(canon("conditional: c 2 1 x 2"), "conditional c 2 1 x 2");
        assert_eq!(canon("conditional:if c 2 1 x 2"), "conditional c 2 1 x 2");
        assert_eq!(canon("conditional: if(c[2]==1) X 2"), "conditional c 2 1 x 2");
    }

    #[test]
    fn test_unknown_and_empty() {
        assert_eq!(
            normalize("foo 0"),
            Err(SkipReason::UnknownGate("foo".into()))
        );
        assert_eq!(normalize("   "), Err(SkipReason::Empty));
        assert!(matches!(
            normalize("qreg q[2];"),
            Err(SkipReason::UnknownGate(_))
        ));
    }

    #[test]
    fn test_prepare_suggested() {
        let raw = vec![
            "".to_string(),
            "0 -> 1".to_string(),
            "measure 2 -> 0".to_string(),
            "if(c[0]==1) x 2".to_string(),
            "rx(pi/3) 0".to_string(),
            "rx 0 pi / 2".to_string(),
            "u2 1 pi/2 pi".to_string(),
            "h 0".to_string(),
        ];
        assert_eq!(
            prepare_suggested(&raw),
            vec![
                "measure 0 1",
                "measure 2 0",
                "if c 0 1 x 2",
                "rx(pi/3) 0",
                "rx 0 1.5707963267948966",
                "u2 1 1.5707963267948966 3.141592653589793",
                "h 0",
            ]
        );
    }

    #[test]
    fn test_helpers() {
        assert_eq!(reduce_register("q[12]"), Some("12"));
        assert_eq!(reduce_register("q[]"), None);
        assert_eq!(reduce_register("q[1x]"), None);
        assert_eq!(bracket_index("xq[3]", 'q'), Some("3"));
        assert_eq!(bracket_index("c[1]q[4]", 'q'), Some("4"));
        assert_eq!(bracket_index("q[2]", 'c'), None);
        assert_eq!(matching_paren("(a(b)c) d", 0), Some(6));
        assert_eq!(split_top_level("a,(b,c),d", ','), vec!["a", "(b,c)", "d"]);
    }
}

//! Local source scanners
//!
//! Gantree: L5_Suggest → SourceScan
//!
//! Reads QASM, Qiskit and JSON uploads without a language model. Output
//! instructions are canonical where the normalizer accepts them and raw
//! otherwise, so the assembler reports anything unreadable.

use crate::flatten::flatten_instructions;
use crate::suggester::{SuggestError, SuggestResult};
use qcgen_core::normalize::format_angle;
use qcgen_core::{evaluate_angle, normalize};
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Lazily compiled pattern; `None` only if the literal fails to compile
macro_rules! pattern {
    ($name:ident, $re:expr) => {
        fn $name() -> Option<&'static Regex> {
            static RE: OnceLock<Option<Regex>> = OnceLock::new();
            RE.get_or_init(|| Regex::new($re).ok()).as_ref()
        }
    };
}

/// What a scanner read out of a source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScannedSource {
    /// Source with comments and blank lines removed
    pub cleaned: String,
    /// Declared register size, when the source declares one
    pub num_qubits: Option<usize>,
    /// Instructions in source order
    pub instructions: Vec<String>,
}

fn canonical_or_raw(statement: &str) -> String {
    normalize(statement)
        .map(|c| c.to_string())
        .unwrap_or_else(|_| statement.to_string())
}

// ============================================================================
// QASM
// ============================================================================

/// Scan OpenQASM 2 (and the `qubit[n]` declarations of OpenQASM 3)
/// Gantree: scan_qasm(&str) -> ScannedSource // QASM 해석
pub fn scan_qasm(text: &str) -> ScannedSource {
    let mut cleaned = Vec::new();
    let mut instructions = Vec::new();
    let mut declared: Option<usize> = None;
    let mut in_definition = false;

    for line in text.lines() {
        let line = line.split("//").next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        cleaned.push(line.to_string());

        for statement in line.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            if in_definition {
                in_definition = !statement.contains('}');
                continue;
            }

            if let Some(n) = declared_size(statement) {
                *declared.get_or_insert(0) += n;
                continue;
            }
            if is_match(qasm_skip_re(), statement) {
                continue;
            }
            if is_match(qasm_definition_re(), statement) {
                in_definition = statement.contains('{') && !statement.contains('}');
                continue;
            }
            if is_match(barrier_all_re(), statement) {
                instructions.push("barrier".to_string());
                continue;
            }
            instructions.push(canonical_or_raw(&register_condition(statement)));
        }
    }

    ScannedSource {
        cleaned: cleaned.join("\n"),
        num_qubits: declared,
        instructions,
    }
}

fn is_match(re: Option<&Regex>, text: &str) -> bool {
    re.is_some_and(|re| re.is_match(text))
}

/// Size declared by `qreg <name>[n]` or `qubit[n] <name>`
fn declared_size(statement: &str) -> Option<usize> {
    let caps = qasm_declaration_re()?.captures(statement)?;
    caps.name("qreg")
        .or_else(|| caps.name("qubit"))?
        .as_str()
        .parse()
        .ok()
}

/// `if(c==v) <gate>` compares the whole register; read it as bit 0
fn register_condition(statement: &str) -> Cow<'_, str> {
    match register_condition_re() {
        Some(re) => re.replace(statement, "if(${reg}[0]==${value})"),
        None => Cow::Borrowed(statement),
    }
}

pattern!(
    qasm_declaration_re,
    r"(?i)^(?:qreg\s+\w+\s*\[\s*(?P<qreg>[0-9]+)\s*\]|qubit\s*\[\s*(?P<qubit>[0-9]+)\s*\])"
);
pattern!(qasm_skip_re, r"(?i)^(?:openqasm\b|include\b|creg\b|bit\s*\[)");
pattern!(qasm_definition_re, r"(?i)^(?:gate|opaque)\b");
pattern!(barrier_all_re, r"(?i)^barrier\b[^\[]*$");
pattern!(
    register_condition_re,
    r"(?i)^if\s*\(\s*(?P<reg>\w+)\s*==\s*(?P<value>[0-9]+)\s*\)"
);

// ============================================================================
// Qiskit
// ============================================================================

/// Scan Qiskit Python code for circuit method calls
/// Gantree: scan_qiskit(&str) -> ScannedSource // Qiskit 해석
pub fn scan_qiskit(text: &str) -> ScannedSource {
    let mut cleaned = Vec::new();
    let mut instructions = Vec::new();
    let mut declared: Option<usize> = None;
    let mut register_total = 0usize;

    for line in text.lines() {
        let line = line.split('#').next().unwrap_or("").trim_end();
        if line.trim().is_empty() {
            continue;
        }
        cleaned.push(line.to_string());

        for (constructor, size) in constructor_sizes(line) {
            match constructor.as_str() {
                "QuantumRegister" => register_total += size,
                _ => declared = Some(size),
            }
        }

        let calls = method_calls(line);
        let mut produced: Vec<String> = Vec::new();
        for (method, args) in &calls {
            if method == "c_if" {
                if let Some(value) = args.get(1).and_then(|v| v.trim().parse::<u64>().ok()) {
                    produced = produced
                        .iter()
                        .map(|inst| format!("if c 0 {} {}", value, inst))
                        .collect();
                }
                continue;
            }
            let n = declared.or((register_total > 0).then_some(register_total));
            produced.extend(qiskit_call(method, args, n));
        }
        instructions.extend(produced);
    }

    if declared.is_none() && register_total > 0 {
        declared = Some(register_total);
    }

    ScannedSource {
        cleaned: cleaned.join("\n"),
        num_qubits: declared,
        instructions,
    }
}

/// Leading integer argument of each `QuantumRegister(...)` / `QuantumCircuit(...)`
fn constructor_sizes(line: &str) -> Vec<(String, usize)> {
    let Some(re) = constructor_re() else {
        return Vec::new();
    };
    re.captures_iter(line)
        .filter_map(|caps| {
            let size = caps["size"].parse().ok()?;
            Some((caps["name"].to_string(), size))
        })
        .collect()
}

/// Every `.method(args)` on the line, in order
fn method_calls(line: &str) -> Vec<(String, Vec<String>)> {
    let Some(re) = method_call_re() else {
        return Vec::new();
    };
    let mut calls = Vec::new();
    let mut pos = 0;

    while let Some(caps) = re.captures_at(line, pos) {
        let (Some(name), Some(open)) = (caps.name("name"), caps.name("open")) else {
            break;
        };
        match matching_paren(line, open.start()) {
            Some(close) => {
                let args = split_top_level(&line[open.end()..close])
                    .into_iter()
                    .map(|a| a.trim().to_string())
                    .filter(|a| !a.is_empty())
                    .collect();
                calls.push((name.as_str().to_ascii_lowercase(), args));
                pos = close + 1;
            }
            None => pos = open.end(),
        }
    }
    calls
}

/// Instructions for one Qiskit method call
fn qiskit_call(method: &str, args: &[String], num_qubits: Option<usize>) -> Vec<String> {
    let mnemonic = match method {
        "h" | "x" | "y" | "z" | "s" | "t" | "id" | "reset" => method,
        "i" => "id",
        "rx" | "ry" | "rz" | "u1" | "u2" | "cx" | "cz" | "swap" | "cp" | "ccx" | "measure"
        | "barrier" => method,
        "p" => "u1",
        "u" | "u3" => "u3",
        "cnot" => "cx",
        "cu1" | "cphase" => "cp",
        "toffoli" => "ccx",
        "measure_all" => {
            return match num_qubits {
                Some(n) => (0..n).map(|q| format!("measure {} {}", q, q)).collect(),
                None => {
                    log::warn!("measure_all before the circuit size is known, skipped");
                    Vec::new()
                }
            }
        }
        _ => return Vec::new(),
    };

    match mnemonic {
        "h" | "x" | "y" | "z" | "s" | "t" | "id" | "reset" => args
            .first()
            .map(|a| qubit_list(a))
            .unwrap_or_default()
            .into_iter()
            .map(|q| format!("{} {}", mnemonic, q))
            .collect(),
        // (angle..., qubit...) → <gate> <qubit...> <angle...>
        "rx" | "ry" | "rz" | "u1" => reorder(mnemonic, args, 1, 1),
        "u2" => reorder(mnemonic, args, 2, 1),
        "u3" => reorder(mnemonic, args, 3, 1),
        "cp" => reorder(mnemonic, args, 1, 2),
        "cx" | "cz" | "swap" => indices(mnemonic, args, 2),
        "ccx" => indices(mnemonic, args, 3),
        "measure" => {
            let (Some(q), Some(c)) = (args.first(), args.get(1)) else {
                return Vec::new();
            };
            qubit_list(q)
                .into_iter()
                .zip(qubit_list(c))
                .map(|(q, c)| format!("measure {} {}", q, c))
                .collect()
        }
        "barrier" => {
            let qubits: Vec<String> = args.iter().flat_map(|a| qubit_list(a)).collect();
            if qubits.is_empty() {
                vec!["barrier".to_string()]
            } else {
                vec![format!("barrier {}", qubits.join(" "))]
            }
        }
        _ => Vec::new(),
    }
}

/// Qiskit puts angles first; canonical form puts qubits first
fn reorder(mnemonic: &str, args: &[String], angles: usize, qubits: usize) -> Vec<String> {
    if args.len() < angles + qubits {
        return Vec::new();
    }
    let qs: Option<Vec<String>> = args[angles..angles + qubits].iter().map(|a| qubit(a)).collect();
    let Some(qs) = qs else {
        return Vec::new();
    };
    let angle_tokens: Vec<String> = args[..angles]
        .iter()
        .map(|a| format_angle(evaluate_angle(&python_angle(a))))
        .collect();
    vec![format!("{} {} {}", mnemonic, qs.join(" "), angle_tokens.join(" "))]
}

fn indices(mnemonic: &str, args: &[String], count: usize) -> Vec<String> {
    if args.len() < count {
        return Vec::new();
    }
    let qs: Option<Vec<String>> = args[..count].iter().map(|a| qubit(a)).collect();
    qs.map(|qs| vec![format!("{} {}", mnemonic, qs.join(" "))])
        .unwrap_or_default()
}

/// `3`, `qr[3]`
fn qubit(arg: &str) -> Option<String> {
    let caps = qubit_arg_re()?.captures(arg.trim())?;
    let digits = caps.name("indexed").or_else(|| caps.name("bare"))?;
    digits.as_str().parse::<usize>().ok().map(|q| q.to_string())
}

/// `3`, `qr[3]`, `[0, 1]`, `range(3)`, `range(1, 3)`
fn qubit_list(arg: &str) -> Vec<String> {
    let arg = arg.trim();
    if let Some(inner) = arg.strip_prefix('[').and_then(|a| a.strip_suffix(']')) {
        return inner.split(',').filter_map(qubit).collect();
    }
    if let Some(caps) = range_re().and_then(|re| re.captures(arg)) {
        let bound = |name: &str| caps.name(name).and_then(|m| m.as_str().parse::<usize>().ok());
        let range = match (bound("first"), bound("second")) {
            (Some(end), None) => 0..end,
            (Some(start), Some(end)) => start..end,
            _ => 0..0,
        };
        return range.map(|q| q.to_string()).collect();
    }
    qubit(arg).into_iter().collect()
}

/// `np.pi`, `numpy.pi`, `math.pi` → `pi`
fn python_angle(arg: &str) -> Cow<'_, str> {
    match python_pi_re() {
        Some(re) => re.replace_all(arg, "pi"),
        None => Cow::Borrowed(arg),
    }
}

pattern!(
    constructor_re,
    r"\b(?P<name>QuantumRegister|QuantumCircuit)\s*\(\s*(?P<size>[0-9]+)\b"
);
pattern!(method_call_re, r"\.(?P<name>[A-Za-z_][A-Za-z0-9_]*)(?P<open>\()");
pattern!(
    qubit_arg_re,
    r"^(?:\w+\s*\[\s*(?P<indexed>[0-9]+)\s*\]|(?P<bare>[0-9]+))$"
);
pattern!(
    range_re,
    r"^range\(\s*(?P<first>[0-9]+)\s*(?:,\s*(?P<second>[0-9]+)\s*)?\)$"
);
pattern!(python_pi_re, r"\b(?:numpy|np|math)\.pi\b");

// ============================================================================
// JSON
// ============================================================================

/// Scan a JSON circuit document
///
/// Recognizes exported documents (`operations`), instruction lists
/// (`gates`, `custom_gates`, bare arrays) and intent-shaped objects
/// (`params.custom_gates`).
/// Gantree: scan_json(&str) -> Result<ScannedSource> // JSON 해석
pub fn scan_json(text: &str) -> SuggestResult<ScannedSource> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| SuggestError::InvalidSource(e.to_string()))?;

    let num_qubits = [
        value.get("num_qubits"),
        value.pointer("/registers/qubits"),
        value.pointer("/params/num_qubits"),
        value.pointer("/metadata/num_qubits"),
    ]
    .into_iter()
    .flatten()
    .find_map(|v| v.as_u64().map(|n| n as usize));

    let instructions = if let Some(ops) = value.get("operations").and_then(Value::as_array) {
        ops.iter().filter_map(operation_instruction).collect()
    } else if value.is_array() || value.get("gates").is_some() || value.get("custom_gates").is_some()
    {
        flatten_instructions(&value)
    } else if let Some(params) = value.get("params") {
        params
            .get("custom_gates")
            .map(flatten_instructions)
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    let cleaned = serde_json::to_string_pretty(&value)
        .map_err(|e| SuggestError::InvalidSource(e.to_string()))?;

    Ok(ScannedSource {
        cleaned,
        num_qubits,
        instructions,
    })
}

/// Canonical instruction for one exported operation
fn operation_instruction(op: &Value) -> Option<String> {
    let name = op
        .get("gate")
        .or_else(|| op.get("name"))
        .and_then(Value::as_str)?
        .to_ascii_lowercase();
    let qubits: Vec<String> = numbers(op.get("qubits"));
    let clbits: Vec<String> = numbers(op.get("clbits"));
    let params: Vec<String> = op
        .get("params")
        .and_then(Value::as_array)
        .map(|ps| {
            ps.iter()
                .filter_map(|p| match p {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => Some(evaluate_angle(s)),
                    _ => None,
                })
                .map(format_angle)
                .collect()
        })
        .unwrap_or_default();

    let base = match name.as_str() {
        "measure" => {
            let q = qubits.first()?;
            let c = clbits.first().unwrap_or(q);
            format!("measure {} {}", q, c)
        }
        _ => std::iter::once(name.clone())
            .chain(qubits)
            .chain(params)
            .collect::<Vec<_>>()
            .join(" "),
    };

    match op.get("condition").filter(|c| c.is_object()) {
        Some(cond) => {
            let index = cond
                .get("clbit")
                .or_else(|| cond.get("index"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            let value = cond.get("value").and_then(Value::as_u64)?;
            Some(format!("if c {} {} {}", index, value, base))
        }
        None => Some(base),
    }
}

fn numbers(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_u64)
                .map(|n| n.to_string())
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// Paren Helpers
// ============================================================================

fn matching_paren(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, ch) in s[open..].char_indices() {
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => {
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

fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, ch) in s.char_indices() {
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

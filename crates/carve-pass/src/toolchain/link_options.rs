use std::collections::HashMap;

/// Collect the link requirements a disassembled module records.
///
/// `!llvm.dependent-libraries` entries become `-l<name>`, and
/// `!llvm.linker.options` tuples are forwarded verbatim. Order follows the
/// named metadata lists. A repeated tuple is dropped as a whole, so paired
/// options such as `-framework Cocoa` stay intact.
pub fn parse_link_options(ir: &str) -> Vec<String> {
    let mut nodes: HashMap<&str, Vec<String>> = HashMap::new();
    let mut dependent_libs = Vec::new();
    let mut linker_opts = Vec::new();

    for line in ir.lines() {
        let Some((lhs, rhs)) = line.split_once(" = ") else {
            continue;
        };
        let rhs = rhs.trim();
        let rhs = rhs.strip_prefix("distinct ").unwrap_or(rhs);

        match lhs.trim() {
            "!llvm.dependent-libraries" => dependent_libs = node_refs(rhs),
            "!llvm.linker.options" => linker_opts = node_refs(rhs),
            id => {
                if let Some(num) = id.strip_prefix('!') {
                    if !num.is_empty() && num.bytes().all(|b| b.is_ascii_digit()) {
                        nodes.insert(num, metadata_strings(rhs));
                    }
                }
            }
        }
    }

    let libs = dependent_libs
        .iter()
        .flat_map(|id| nodes.get(id).into_iter().flatten())
        .map(|lib| vec![format!("-l{lib}")]);
    let opts = linker_opts
        .iter()
        .filter_map(|id| nodes.get(id))
        .filter(|tuple| !tuple.is_empty())
        .cloned();

    let mut groups: Vec<Vec<String>> = Vec::new();
    for group in libs.chain(opts) {
        if !groups.contains(&group) {
            groups.push(group);
        }
    }
    groups.into_iter().flatten().collect()
}

// `!{!0, !12}` -> ["0", "12"]
fn node_refs(tuple: &str) -> Vec<&str> {
    tuple
        .trim()
        .trim_start_matches("!{")
        .trim_end_matches('}')
        .split(',')
        .filter_map(|r| r.trim().strip_prefix('!'))
        .filter(|r| !r.is_empty())
        .collect()
}

// `!{!"-lfoo", !"bar"}` -> ["-lfoo", "bar"]
fn metadata_strings(tuple: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = tuple;
    while let Some(start) = rest.find("!\"") {
        let body = &rest[start + 2..];
        // quotes inside metadata strings are printed as \22
        let Some(end) = body.find('"') else {
            break;
        };
        out.push(unescape(&body[..end]));
        rest = &body[end + 1..];
    }
    out
}

// LLVM escapes non-printable bytes and backslash as `\XX`.
fn unescape(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .and_then(|h| u8::from_str_radix(h, 16).ok());
            if let Some(b) = hex {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

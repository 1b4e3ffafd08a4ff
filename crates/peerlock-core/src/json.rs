//! Shared JSON pretty-printing: every sibling file peerlock writes is
//! four-space-indented JSON, regardless of which crate produces it.

use std::io;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

pub fn to_pretty_4space<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(String::from_utf8(buf).expect("serde_json only emits valid utf-8"))
}

pub fn write_pretty_4space<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let rendered = to_pretty_4space(value).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    std::fs::write(path, rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn uses_four_space_indent() {
        let v = json!({"a": {"b": 1}});
        let s = to_pretty_4space(&v).unwrap();
        assert!(s.contains("{\n    \"a\": {\n        \"b\": 1\n    }\n}"));
    }
}

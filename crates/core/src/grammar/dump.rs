use super::ast::Invocation;

/// Serialize parsed invocations to a pretty-printed JSON string.
pub fn to_pretty_json(invocations: &[Invocation]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(invocations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::parser::parse_line;

    #[test]
    fn invocations_serialize_with_tagged_nodes() {
        let inv = parse_line("BASIC \"foo\", (1, 2)").unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&to_pretty_json(&[inv]).unwrap()).unwrap();
        let args = &json[0]["args"];
        assert_eq!(json[0]["command"], "BASIC");
        assert!(json[0].get("prefixes").is_none());
        assert_eq!(args["kind"], "array");
        assert_eq!(args["children"][0]["primitive"], "string");
        assert_eq!(args["children"][0]["text"], "foo");
        assert_eq!(args["children"][1]["children"][1]["primitive"], "integer");
    }
}

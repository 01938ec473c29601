use uuid::Uuid;

/// Fresh opaque identifier for session ids and reset tokens.
pub fn generate_token() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tokens_are_hyphenated_uuids() {
        let token = generate_token();
        assert_eq!(token.len(), 36);
        let parsed = Uuid::parse_str(&token).expect("valid uuid");
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn tokens_do_not_repeat() {
        let seen: HashSet<String> = (0..1000).map(|_| generate_token()).collect();
        assert_eq!(seen.len(), 1000);
    }
}

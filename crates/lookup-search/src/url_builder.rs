use lookup_core::SearchMode;

/// Turn a raw query into the path-segment form the source sites expect.
///
/// Returns `None` for a query that is blank after normalization.
pub fn normalize_query(mode: SearchMode, query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return None;
    }

    let normalized = match mode {
        SearchMode::Name | SearchMode::Address => {
            trimmed.split_whitespace().collect::<Vec<_>>().join("-")
        }
        SearchMode::Phone => {
            let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
            if digits.is_empty() {
                trimmed.to_string()
            } else {
                digits
            }
        }
        SearchMode::Email => trimmed.to_string(),
    };

    Some(normalized)
}

/// Expand a search template such as `{base}/search/name/{query}`.
pub fn build_search_url(
    template: &str,
    base_url: &str,
    mode: SearchMode,
    query: &str,
) -> Option<String> {
    let normalized = normalize_query(mode, query)?;
    Some(
        template
            .replace("{base}", base_url.trim_end_matches('/'))
            .replace("{query}", &urlencoding::encode(&normalized)),
    )
}

/// Expand a person template such as `{base}/person/{id}`.
pub fn build_person_url(template: &str, base_url: &str, id: &str) -> Option<String> {
    let id = id.trim();
    if id.is_empty() {
        return None;
    }
    Some(
        template
            .replace("{base}", base_url.trim_end_matches('/'))
            .replace("{id}", &urlencoding::encode(id)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.example.com/";

    #[test]
    fn test_name_query_becomes_slug() {
        let url = build_search_url(
            "{base}/search/name/{query}",
            BASE,
            SearchMode::Name,
            "  John   Smith ",
        );
        assert_eq!(
            url.as_deref(),
            Some("https://www.example.com/search/name/John-Smith")
        );
    }

    #[test]
    fn test_address_query_is_encoded() {
        let url = build_search_url(
            "{base}/search/address/{query}",
            BASE,
            SearchMode::Address,
            "12 Main St, Springfield",
        );
        assert_eq!(
            url.as_deref(),
            Some("https://www.example.com/search/address/12-Main-St%2C-Springfield")
        );
    }

    #[test]
    fn test_phone_keeps_digits() {
        assert_eq!(
            normalize_query(SearchMode::Phone, "(555) 123-4567").as_deref(),
            Some("5551234567")
        );
        assert_eq!(
            normalize_query(SearchMode::Phone, "unknown").as_deref(),
            Some("unknown")
        );
    }

    #[test]
    fn test_email_is_percent_encoded() {
        let url = build_search_url(
            "{base}/search/email/{query}",
            BASE,
            SearchMode::Email,
            "john+smith@example.com",
        );
        assert_eq!(
            url.as_deref(),
            Some("https://www.example.com/search/email/john%2Bsmith%40example.com")
        );
    }

    #[test]
    fn test_blank_query_yields_none() {
        assert!(normalize_query(SearchMode::Name, "   ").is_none());
        assert!(build_search_url("{base}/{query}", BASE, SearchMode::Email, "").is_none());
    }

    #[test]
    fn test_person_url() {
        assert_eq!(
            build_person_url("{base}/person/{id}", BASE, "abc 123").as_deref(),
            Some("https://www.example.com/person/abc%20123")
        );
        assert!(build_person_url("{base}/person/{id}", BASE, " ").is_none());
    }
}

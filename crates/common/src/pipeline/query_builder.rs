//! openFDA query string construction

use super::extractor::SearchClause;

/// Conjunction token understood by the openFDA search grammar
pub const AND_TOKEN: &str = "+AND+";

/// Build the `search=...&limit=n` query string for a set of clauses.
///
/// An empty clause list yields an empty string, meaning "send no search
/// parameters". Clauses are inserted verbatim; they are trusted lexicon
/// constants and are not escaped here.
pub fn build_query(clauses: &[SearchClause], limit: u32) -> String {
    if clauses.is_empty() {
        return String::new();
    }

    let search = clauses
        .iter()
        .map(SearchClause::as_str)
        .collect::<Vec<_>>()
        .join(AND_TOKEN);

    format!("search={}&limit={}", search, limit)
}

/// Join an endpoint and a query string, omitting `?` when there is no query
pub fn request_url(base_url: &str, query: &str) -> String {
    if query.is_empty() {
        base_url.to_string()
    } else {
        format!("{}?{}", base_url, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAUSEA: SearchClause = SearchClause::from_static(r#"reactions:"NAUSEA""#);
    const CORN_CHIPS: SearchClause = SearchClause::from_static(r#"products.name_brand:"CORN+CHIPS""#);

    #[test]
    fn test_empty_clauses_build_nothing() {
        assert_eq!(build_query(&[], 50), "");
    }

    #[test]
    fn test_single_clause() {
        assert_eq!(build_query(&[NAUSEA], 50), r#"search=reactions:"NAUSEA"&limit=50"#);
    }

    #[test]
    fn test_clauses_joined_in_order() {
        assert_eq!(
            build_query(&[NAUSEA, CORN_CHIPS], 50),
            r#"search=reactions:"NAUSEA"+AND+products.name_brand:"CORN+CHIPS"&limit=50"#
        );
        assert_eq!(
            build_query(&[CORN_CHIPS, NAUSEA], 10),
            r#"search=products.name_brand:"CORN+CHIPS"+AND+reactions:"NAUSEA"&limit=10"#
        );
    }

    #[test]
    fn test_deterministic() {
        let clauses = [NAUSEA, CORN_CHIPS];
        assert_eq!(build_query(&clauses, 50), build_query(&clauses, 50));
    }

    #[test]
    fn test_clauses_are_not_escaped() {
        // Whatever a clause holds goes out as-is, so clauses must stay trusted constants
        const HOSTILE: SearchClause = SearchClause::from_static(r#"x"&limit=1000&search=y"#);
        assert_eq!(
            build_query(&[HOSTILE], 50),
            r#"search=x"&limit=1000&search=y&limit=50"#
        );
    }

    #[test]
    fn test_request_url() {
        let base = "https://api.fda.gov/food/event.json";
        assert_eq!(request_url(base, ""), base);
        assert_eq!(
            request_url(base, "search=a&limit=1"),
            "https://api.fda.gov/food/event.json?search=a&limit=1"
        );
    }
}

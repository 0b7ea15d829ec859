use std::fmt;

/// One business listing read out of the result feed.
///
/// Built once by the listing extractor and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessRecord {
    pub name: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub region: String,
}

/// Identity of a record across the whole run. Compared exactly, with no
/// case folding or trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub name: String,
    pub region: String,
}

impl BusinessRecord {
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            name: self.name.clone(),
            region: self.region.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub keyword: String,
    pub region: String,
}

impl Query {
    pub fn new(keyword: impl Into<String>, region: impl Into<String>) -> Self {
        Query {
            keyword: keyword.into(),
            region: region.into(),
        }
    }

    /// Text typed into the search box, e.g. "letting agents Leeds".
    pub fn search_text(&self) -> String {
        format!("{} {}", self.keyword, self.region)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.keyword, self.region)
    }
}

#[cfg(test)]
mod tests {
    use super::{BusinessRecord, Query};

    fn record(name: &str, region: &str) -> BusinessRecord {
        BusinessRecord {
            name: name.to_string(),
            website: None,
            phone: None,
            region: region.to_string(),
        }
    }

    #[test]
    fn dedup_key_ignores_website_and_phone() {
        let a = record("Acme Lettings", "Leeds");
        let mut b = record("Acme Lettings", "Leeds");
        b.website = Some("https://acme.example/".to_string());
        b.phone = Some("0113 000 0000".to_string());

        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn dedup_key_is_case_sensitive() {
        assert_ne!(
            record("Acme Lettings", "Leeds").dedup_key(),
            record("ACME Lettings", "Leeds").dedup_key()
        );
        assert_ne!(
            record("Acme Lettings", "Leeds").dedup_key(),
            record("Acme Lettings", "York").dedup_key()
        );
    }

    #[test]
    fn search_text_puts_keyword_first() {
        let query = Query::new("letting agents", "Milton Keynes");
        assert_eq!(query.search_text(), "letting agents Milton Keynes");
        assert_eq!(query.to_string(), query.search_text());
    }
}
